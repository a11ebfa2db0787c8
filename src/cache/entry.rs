//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with access metadata.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A single cached payload plus its bookkeeping.
///
/// Serialized in camelCase so the durable record keeps the
/// `accessCount`/`lastAccessed` field names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    /// The stored value
    pub data: V,
    /// Insertion or last overwrite time (Unix milliseconds)
    pub timestamp: u64,
    /// The key this entry is stored under
    pub key: String,
    /// Successful reads since creation, starting at 1
    pub access_count: u64,
    /// Most recent read or write (Unix milliseconds)
    pub last_accessed: u64,
    /// Estimated byte footprint of `data`
    pub size: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry written at `now_ms`.
    pub fn new(key: String, data: V, size: usize, now_ms: u64) -> Self {
        Self {
            data,
            timestamp: now_ms,
            key,
            access_count: 1,
            last_accessed: now_ms,
            size,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `ttl_ms`.
    ///
    /// Expiry is strict: an entry exactly `ttl_ms` old is still valid.
    pub fn is_expired(&self, ttl_ms: u64, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.timestamp) > ttl_ms
    }

    // == Record Access ==
    /// Marks a successful read. The creation timestamp is left alone.
    pub fn record_access(&mut self, now_ms: u64) {
        self.access_count += 1;
        self.last_accessed = now_ms;
    }

    /// Milliseconds since the entry was written.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp)
    }
}
