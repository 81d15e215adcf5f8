//! Cache Statistics Module
//!
//! Tracks hit/miss/eviction counters and produces point-in-time snapshots.

use serde::Serialize;

// == Counters ==
/// Lifetime counters of one cache instance. They only ever go up.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl Counters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

// == Cache Stats ==
/// Snapshot returned by [`Cache::stats`](crate::cache::Cache::stats).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Current number of entries, expired-but-untouched ones included
    pub size: usize,
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted to make room for new keys
    pub evictions: u64,
    /// Current keys, next eviction candidate first
    pub keys: Vec<String>,
}

impl CacheStats {
    pub(crate) fn from_parts(counters: Counters, keys: Vec<String>) -> Self {
        Self {
            size: keys.len(),
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
            keys,
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
