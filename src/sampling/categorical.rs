//! Weighted categorical sampling from raw census counts
//!
//! Draws are served from a refillable buffer. A refill draws a whole batch
//! at once, sized to at least twice the request and growing with use, so
//! callers asking for one value at a time and callers asking for thousands
//! both touch the cumulative table in bulk.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use thiserror::Error;

use crate::census::labels::strip_condition;

/// Smallest batch drawn on refill
pub const DEFAULT_MIN_BUFFER: usize = 100;

/// Growth stops doubling past this size; a single large request still gets
/// twice its size
const MAX_BUFFER: usize = 1 << 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplerError {
    #[error("Sampler needs one weight per label ({labels} labels, {weights} weights)")]
    LengthMismatch { labels: usize, weights: usize },

    #[error("All category weights are zero")]
    AllWeightsZero,
}

/// Draws category values with probability proportional to integer weights
#[derive(Debug, Clone)]
pub struct WeightedCategoricalSampler<T> {
    values: Vec<T>,
    weights: Vec<u64>,
    index: WeightedIndex<u64>,
    buffer: Vec<usize>,
    cursor: usize,
    min_buffer: usize,
}

impl WeightedCategoricalSampler<String> {
    /// Build from full column labels (`"<condition>.<value>"`) and their counts
    ///
    /// Values handed back by `draw` have the condition path stripped.
    pub fn new(labels: &[String], weights: &[u64]) -> Result<Self, SamplerError> {
        let values = labels.iter().map(|l| strip_condition(l).to_string()).collect();
        Self::from_values(values, weights.to_vec())
    }
}

impl<T> WeightedCategoricalSampler<T> {
    pub fn from_values(values: Vec<T>, weights: Vec<u64>) -> Result<Self, SamplerError> {
        if values.len() != weights.len() {
            return Err(SamplerError::LengthMismatch {
                labels: values.len(),
                weights: weights.len(),
            });
        }
        if weights.iter().all(|&w| w == 0) {
            return Err(SamplerError::AllWeightsZero);
        }
        let index = WeightedIndex::new(weights.iter().copied())
            .map_err(|_| SamplerError::AllWeightsZero)?;

        Ok(Self {
            values,
            weights,
            index,
            buffer: Vec::new(),
            cursor: 0,
            min_buffer: DEFAULT_MIN_BUFFER,
        })
    }

    pub fn with_min_buffer(mut self, min_buffer: usize) -> Self {
        self.min_buffer = min_buffer.max(1);
        self
    }

    /// Convert every category value, keeping weights
    pub fn map_values<U, E, F>(self, f: F) -> Result<WeightedCategoricalSampler<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        let values = self.values.into_iter().map(f).collect::<Result<Vec<U>, E>>()?;
        Ok(WeightedCategoricalSampler {
            values,
            weights: self.weights,
            index: self.index,
            buffer: self.buffer,
            cursor: self.cursor,
            min_buffer: self.min_buffer,
        })
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn weights(&self) -> &[u64] {
        &self.weights
    }

    pub fn total_weight(&self) -> u64 {
        self.weights.iter().sum()
    }

    /// Probability of drawing the category at `idx`
    pub fn probability(&self, idx: usize) -> f64 {
        self.weights.get(idx).copied().unwrap_or(0) as f64 / self.total_weight() as f64
    }

    /// Number of draws left in the buffer before the next refill
    pub fn buffered(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    fn refill_for<R: Rng + ?Sized>(&mut self, k: usize, rng: &mut R) {
        if self.cursor + k <= self.buffer.len() {
            return;
        }
        let grown = (2 * self.buffer.len()).min(MAX_BUFFER).max(self.min_buffer);
        let next = grown.max(2 * k);
        self.buffer.clear();
        self.buffer.extend((0..next).map(|_| self.index.sample(rng)));
        self.cursor = 0;
    }

    /// Draw `k` category indices
    pub fn draw_indices<R: Rng + ?Sized>(&mut self, k: usize, rng: &mut R) -> &[usize] {
        if k == 0 {
            return &[];
        }
        self.refill_for(k, rng);
        let start = self.cursor;
        self.cursor += k;
        &self.buffer[start..start + k]
    }

    /// Draw `k` independent category values
    pub fn draw<R: Rng + ?Sized>(&mut self, k: usize, rng: &mut R) -> Vec<T>
    where
        T: Clone,
    {
        if k == 0 {
            return Vec::new();
        }
        self.refill_for(k, rng);
        let start = self.cursor;
        self.cursor += k;
        self.buffer[start..start + k]
            .iter()
            .map(|&i| self.values[i].clone())
            .collect()
    }
}
