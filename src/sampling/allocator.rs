//! Capacity-bounded school id allocation
//!
//! A single `SchoolIdSource` hands out run-wide unique ids. Each
//! (zone, urban/rural) pair owns a `CapacityCursor` that fills the current
//! school up to its mean size before asking the source for the next one.

/// Run-wide source of strictly increasing school ids, starting at 1
#[derive(Debug, Default, Clone)]
pub struct SchoolIdSource {
    last: u32,
}

impl SchoolIdSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u32 {
        self.last += 1;
        self.last
    }

    /// Number of schools handed out so far
    pub fn issued(&self) -> u32 {
        self.last
    }
}

/// Round a raw enrollment mean half to even; `None` when it is not a finite number
pub fn rounded_mean(mean: Option<f64>) -> Option<i64> {
    mean.filter(|m| m.is_finite()).map(|m| m.round_ties_even() as i64)
}

/// Fills consecutive schools up to a mean size
#[derive(Debug, Clone)]
pub struct CapacityCursor {
    mean: i64,
    capacity: i64,
    filled: i64,
    current: u32,
}

impl CapacityCursor {
    /// Start an empty cursor for a mean school size
    pub fn new(mean: i64) -> Self {
        Self {
            mean,
            capacity: -1,
            filled: 0,
            current: 0,
        }
    }

    pub fn mean(&self) -> i64 {
        self.mean
    }

    /// Place one more student, opening a new school when the current one is full
    pub fn assign(&mut self, source: &mut SchoolIdSource) -> u32 {
        if self.filled >= self.capacity {
            self.current = source.next_id();
            self.capacity = self.mean;
            self.filled = 0;
        }
        self.filled += 1;
        self.current
    }
}

/// The urban and rural cursors of one zone
#[derive(Debug, Clone)]
pub struct ZoneSchools {
    pub urban: CapacityCursor,
    pub rural: CapacityCursor,
}

impl ZoneSchools {
    pub fn cursor_mut(&mut self, urban: bool) -> &mut CapacityCursor {
        if urban {
            &mut self.urban
        } else {
            &mut self.rural
        }
    }
}
