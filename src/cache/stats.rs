//! Cache Statistics Module
//!
//! Point-in-time snapshot of cache occupancy plus running access counters.

use serde::Serialize;

// == Access Counters ==
/// Running totals of reads and evictions since the store was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessCounters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl AccessCounters {
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
/// Snapshot returned by `CacheStore::get_stats`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    /// Entries physically present
    pub total_entries: usize,
    /// Entries still within their TTL
    pub valid_entries: usize,
    /// Entries past their TTL but not yet purged
    pub expired_entries: usize,
    /// Sum of estimated entry sizes in bytes
    pub memory_usage: usize,
    pub max_size: usize,
    pub max_memory_size: usize,
    /// memory_usage / max_memory_size * 100
    pub memory_usage_percent: f64,
    /// valid_entries / total_entries * 100.
    ///
    /// A freshness ratio, not a hit/miss ratio. See `true_hit_rate`.
    pub hit_rate: f64,
    /// Successful reads
    pub hits: u64,
    /// Reads of missing or expired keys
    pub misses: u64,
    /// Entries removed by LRU pressure
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Builds a snapshot and derives the percentage fields.
    pub fn new(
        total_entries: usize,
        valid_entries: usize,
        memory_usage: usize,
        max_size: usize,
        max_memory_size: usize,
        counters: AccessCounters,
    ) -> Self {
        Self {
            total_entries,
            valid_entries,
            expired_entries: total_entries - valid_entries,
            memory_usage,
            max_size,
            max_memory_size,
            memory_usage_percent: percent(memory_usage, max_memory_size),
            hit_rate: percent(valid_entries, total_entries),
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
        }
    }

    // == True Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was read.
    pub fn true_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
