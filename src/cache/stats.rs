//! Cache Statistics Module
//!
//! Tracks hit, miss, and eviction counters for the cache facade.

use serde::Serialize;

// == Cache Stats ==
/// Performance counters for the page cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups served from cache
    pub hits: u64,
    /// Lookups that fell through to rendering (absent, expired, or bypassed)
    pub misses: u64,
    /// Entries dropped to stay within the capacity bound
    pub evictions: u64,
    /// Current number of live entries
    pub entries: usize,
}

impl CacheStats {
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache hit rate: hits / (hits + misses), 0.0 if nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn set_entries(&mut self, count: usize) {
        self.entries = count;
    }
}
