//! Configuration Module
//!
//! Handles loading process configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{
    CacheConfig, DEFAULT_CLEANUP_INTERVAL, DEFAULT_MAX_MEMORY_SIZE, DEFAULT_MAX_SIZE,
    DEFAULT_STORAGE_KEY, DEFAULT_TTL,
};

/// Default directory for persisted cache records
pub const DEFAULT_STORAGE_DIR: &str = ".stats_cache";

/// Process configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings for the shared cache store
    pub cache: CacheConfig,
    /// Directory holding persisted cache records
    pub storage_dir: PathBuf,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 100)
    /// - `DEFAULT_TTL` - Entry TTL in seconds (default: 300)
    /// - `MAX_MEMORY_BYTES` - Memory ceiling in bytes (default: 10 MiB)
    /// - `ENABLE_PERSISTENCE` - Persist the cache to disk (default: false)
    /// - `STORAGE_KEY` - Durable record name (default: stats_cache)
    /// - `STORAGE_DIR` - Durable record directory (default: .stats_cache)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let cache = CacheConfig {
            ttl: Duration::from_secs(env_or("DEFAULT_TTL", DEFAULT_TTL.as_secs())),
            max_size: env_or("MAX_ENTRIES", DEFAULT_MAX_SIZE),
            max_memory_size: env_or("MAX_MEMORY_BYTES", DEFAULT_MAX_MEMORY_SIZE),
            enable_persistence: env_or("ENABLE_PERSISTENCE", false),
            storage_key: env::var("STORAGE_KEY")
                .unwrap_or_else(|_| DEFAULT_STORAGE_KEY.to_string()),
            auto_cleanup_interval: Duration::from_secs(env_or(
                "CLEANUP_INTERVAL",
                DEFAULT_CLEANUP_INTERVAL.as_secs(),
            )),
        };

        Self {
            cache,
            storage_dir: env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_DIR)),
            server_port: env_or("SERVER_PORT", 3000),
        }
    }
}

/// Parses an environment variable, falling back to `default` when it is
/// unset or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            server_port: 3000,
        }
    }
}
