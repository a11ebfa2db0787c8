//! Cache configuration.

use std::time::Duration;

/// Default time-to-live for entries
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default maximum number of entries
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Default memory ceiling (10 MiB)
pub const DEFAULT_MAX_MEMORY_SIZE: usize = 10 * 1024 * 1024;

/// Default durable record key
pub const DEFAULT_STORAGE_KEY: &str = "stats_cache";

/// Default period between background sweeps
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Settings fixed when a cache store is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries older than this are invalid
    pub ttl: Duration,
    /// Hard cap on entry count
    pub max_size: usize,
    /// Hard cap on total estimated bytes
    pub max_memory_size: usize,
    /// Serialize the whole store after every mutation
    pub enable_persistence: bool,
    /// Record key in durable storage
    pub storage_key: String,
    /// Period between background sweeps
    pub auto_cleanup_interval: Duration,
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_max_memory_size(mut self, bytes: usize) -> Self {
        self.max_memory_size = bytes;
        self
    }

    pub fn with_persistence(mut self, storage_key: impl Into<String>) -> Self {
        self.enable_persistence = true;
        self.storage_key = storage_key.into();
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.auto_cleanup_interval = interval;
        self
    }

    /// TTL in whole milliseconds.
    pub fn ttl_ms(&self) -> u64 {
        self.ttl.as_millis() as u64
    }

    /// Largest size a single entry may have.
    pub fn max_entry_size(&self) -> usize {
        self.max_memory_size / 2
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_size: DEFAULT_MAX_SIZE,
            max_memory_size: DEFAULT_MAX_MEMORY_SIZE,
            enable_persistence: false,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            auto_cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert_eq!(config.max_size, 100);
        assert!(!config.enable_persistence);
        assert_eq!(config.storage_key, "stats_cache");
    }

    #[test]
    fn test_builder_setters() {
        let config = CacheConfig::default()
            .with_ttl(Duration::from_millis(100))
            .with_max_size(2)
            .with_max_memory_size(1_000)
            .with_persistence("custom");

        assert_eq!(config.ttl_ms(), 100);
        assert_eq!(config.max_size, 2);
        assert_eq!(config.max_entry_size(), 500);
        assert!(config.enable_persistence);
        assert_eq!(config.storage_key, "custom");
    }
}
