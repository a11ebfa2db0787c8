//! Cache Module
//!
//! Provides a bounded in-memory cache with TTL expiration, LRU eviction,
//! memory accounting and optional durable persistence.

mod clock;
mod config;
mod entry;
mod lru;
mod persistence;
mod size;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use config::{
    CacheConfig, DEFAULT_CLEANUP_INTERVAL, DEFAULT_MAX_MEMORY_SIZE, DEFAULT_MAX_SIZE,
    DEFAULT_STORAGE_KEY, DEFAULT_TTL,
};
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use persistence::{FileStorage, MemoryStorage, Storage};
pub use size::{FixedSizeEstimator, JsonSizeEstimator, SizeEstimator, DEFAULT_ENTRY_SIZE};
pub use stats::{AccessCounters, CacheStats};
pub use store::{CacheStore, CacheStoreBuilder, SharedCache};
