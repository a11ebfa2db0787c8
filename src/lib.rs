//! Stats Cache - a client-side cache for expensive statistics queries
//!
//! Bounded LRU + TTL cache with memory accounting and optional
//! persistence, canonical key generation, and a memoizing wrapper for
//! async fetch functions. An HTTP API exposes the cache for inspection.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod memo;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheConfig, CacheStats, CacheStore, SharedCache};
pub use config::Config;
pub use keys::{generate_filter_key, generate_stats_key};
pub use memo::{memoize, Memoized};
pub use tasks::{spawn_sweep_task, SweepHandle};
