//! Natural key to compact index, assigned in first-seen order

use ahash::AHashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct IdMap<K> {
    index: AHashMap<K, u32>,
    keys: Vec<K>,
}

impl<K> Default for IdMap<K> {
    fn default() -> Self {
        Self {
            index: AHashMap::new(),
            keys: Vec::new(),
        }
    }
}

impl<K: Hash + Eq + Clone> IdMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `key`, assigning the next one if it is new
    pub fn id_of(&mut self, key: &K) -> u32 {
        if let Some(&id) = self.index.get(key) {
            return id;
        }
        let id = self.keys.len() as u32;
        self.index.insert(key.clone(), id);
        self.keys.push(key.clone());
        id
    }

    pub fn get(&self, key: &K) -> Option<u32> {
        self.index.get(key).copied()
    }

    /// Keys in index order
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
