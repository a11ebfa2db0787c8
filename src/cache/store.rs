//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking, TTL
//! expiration, memory accounting and optional durable persistence.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{
    AccessCounters, CacheConfig, CacheEntry, CacheStats, Clock, JsonSizeEstimator, LruTracker,
    SizeEstimator, Storage, SystemClock,
};
use crate::error::StorageError;

/// A cache store shared between tasks.
pub type SharedCache<V = serde_json::Value> = Arc<RwLock<CacheStore<V>>>;

// == Cache Store ==
/// Bounded cache with LRU eviction, TTL expiry and size accounting.
///
/// No operation fails: misses return `None`, oversized writes are skipped
/// with a warning, and storage failures turn persistence off.
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Sum of `size` over all live entries
    memory_usage: usize,
    counters: AccessCounters,
    config: CacheConfig,
    estimator: Box<dyn SizeEstimator<V>>,
    /// Present only while persistence is active
    storage: Option<Box<dyn Storage>>,
    clock: Arc<dyn Clock>,
}

// == Builder ==
/// Assembles a `CacheStore` with optional strategy overrides.
pub struct CacheStoreBuilder<V> {
    config: CacheConfig,
    estimator: Option<Box<dyn SizeEstimator<V>>>,
    storage: Option<Box<dyn Storage>>,
    clock: Option<Arc<dyn Clock>>,
}

impl<V> CacheStoreBuilder<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    /// Replaces the default JSON-length size estimate.
    pub fn estimator(mut self, estimator: impl SizeEstimator<V> + 'static) -> Self {
        self.estimator = Some(Box::new(estimator));
        self
    }

    /// Durable backend. Ignored unless `enable_persistence` is set.
    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Builds the store, rehydrating it from storage when persistence is on.
    pub fn build(self) -> CacheStore<V> {
        let storage = if self.config.enable_persistence {
            if self.storage.is_none() {
                warn!("Cache persistence enabled without a storage backend, running in memory only");
            }
            self.storage
        } else {
            None
        };

        let mut store = CacheStore {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            memory_usage: 0,
            counters: AccessCounters::default(),
            config: self.config,
            estimator: self
                .estimator
                .unwrap_or_else(|| Box::new(JsonSizeEstimator) as Box<dyn SizeEstimator<V>>),
            storage,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>),
        };

        store.load_from_storage();
        store
    }
}

impl<V> CacheStore<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    // == Constructor ==
    /// Creates an in-memory store with the default estimator and clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: CacheConfig) -> CacheStoreBuilder<V> {
        CacheStoreBuilder {
            config,
            estimator: None,
            storage: None,
            clock: None,
        }
    }

    /// Wraps the store for sharing across tasks.
    pub fn into_shared(self) -> SharedCache<V> {
        Arc::new(RwLock::new(self))
    }

    // == Set ==
    /// Stores `data` under `key`, evicting least recently used entries as
    /// needed.
    ///
    /// Returns false when the value is larger than half the memory ceiling;
    /// the store is left untouched in that case.
    pub fn set(&mut self, key: impl Into<String>, data: V) -> bool {
        let key = key.into();
        let size = self.estimator.estimate_bytes(&data);

        if size > self.config.max_entry_size() {
            warn!(
                "Skipping cache write for '{}': {} bytes exceeds entry limit of {} bytes",
                key,
                size,
                self.config.max_entry_size()
            );
            return false;
        }

        // Overwrites release the old size first
        let exists = match self.entries.get(&key) {
            Some(old) => {
                self.memory_usage -= old.size;
                true
            }
            None => false,
        };

        while !exists
            && !self.entries.is_empty()
            && (self.memory_usage + size > self.config.max_memory_size
                || self.entries.len() >= self.config.max_size)
        {
            if self.evict_lru().is_none() {
                break;
            }
        }

        let now = self.clock.now_ms();
        self.entries
            .insert(key.clone(), CacheEntry::new(key.clone(), data, size, now));
        self.memory_usage += size;
        self.lru.touch(&key);

        self.persist();
        true
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed and reported as absent. A hit bumps the
    /// entry's access count and makes it the most recently used.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let ttl = self.config.ttl_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(ttl, now),
            None => {
                self.counters.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.persist();
            self.counters.record_miss();
            debug!("Cache entry '{}' expired on read", key);
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.record_access(now);
        let data = entry.data.clone();

        self.lru.touch(key);
        self.counters.record_hit();
        Some(data)
    }

    // == Has ==
    /// Checks for a live entry without touching recency or counters.
    pub fn has(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(self.config.ttl_ms(), now))
    }

    /// Raw entry access for inspection, expired or not.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.remove_entry(key).is_some() {
            self.persist();
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.reset();
        self.persist();
    }

    // == Clear By Pattern ==
    /// Removes every entry whose key contains `pattern` as a literal
    /// substring. Returns the number removed.
    pub fn clear_by_pattern(&mut self, pattern: &str) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.contains(pattern))
            .cloned()
            .collect();

        for key in &matching {
            self.remove_entry(key);
        }

        if !matching.is_empty() {
            debug!(
                "Cleared {} cache entries matching '{}'",
                matching.len(),
                pattern
            );
            self.persist();
        }
        matching.len()
    }

    // == Cleanup ==
    /// Removes all entries older than the TTL. Limits are not evaluated.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now_ms();
        let ttl = self.config.ttl_ms();

        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(ttl, now))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }

        if !expired.is_empty() {
            self.persist();
        }
        expired.len()
    }

    // == Enforce Memory Limit ==
    /// Evicts least recently used entries until memory is within the
    /// ceiling. Returns the number evicted.
    pub fn enforce_memory_limit(&mut self) -> usize {
        let mut evicted = 0;
        while self.memory_usage > self.config.max_memory_size && !self.entries.is_empty() {
            if self.evict_lru().is_none() {
                break;
            }
            evicted += 1;
        }

        if evicted > 0 {
            self.persist();
        }
        evicted
    }

    // == Stats ==
    /// Returns a snapshot of occupancy. Expired entries are counted, not
    /// removed.
    pub fn get_stats(&self) -> CacheStats {
        let now = self.clock.now_ms();
        let ttl = self.config.ttl_ms();
        let valid = self
            .entries
            .values()
            .filter(|entry| !entry.is_expired(ttl, now))
            .count();

        CacheStats::new(
            self.entries.len(),
            valid,
            self.memory_usage,
            self.config.max_size,
            self.config.max_memory_size,
            self.counters,
        )
    }

    // == Destroy ==
    /// Drops all in-memory state. The durable record is left as is so the
    /// next store built on the same storage can pick it up.
    pub fn destroy(&mut self) {
        self.reset();
        info!("Cache store destroyed");
    }

    // == Accessors ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        self.lru.iter().cloned().collect()
    }

    /// Sum of estimated entry sizes in bytes.
    pub fn memory_usage(&self) -> usize {
        self.memory_usage
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Whether mutations are still being written to durable storage.
    pub fn is_persisting(&self) -> bool {
        self.storage.is_some()
    }

    // == Internals ==
    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.memory_usage -= entry.size;
        Some(entry)
    }

    fn evict_lru(&mut self) -> Option<String> {
        let key = self.lru.evict_oldest()?;
        if let Some(entry) = self.entries.remove(&key) {
            self.memory_usage -= entry.size;
        }
        self.counters.record_eviction();
        debug!("Evicted least recently used cache entry '{}'", key);
        Some(key)
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.memory_usage = 0;
    }

    /// Writes the whole store to durable storage. A failed write turns
    /// persistence off for the lifetime of the store.
    fn persist(&mut self) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };

        let result = serde_json::to_string(&self.entries)
            .map_err(StorageError::from)
            .and_then(|record| storage.write(&self.config.storage_key, &record));

        if let Err(err) = result {
            warn!("Disabling cache persistence after write failure: {}", err);
            self.storage = None;
        }
    }

    fn load_from_storage(&mut self) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };

        let parsed = storage.read(&self.config.storage_key).and_then(|raw| {
            raw.map(|raw| serde_json::from_str::<HashMap<String, CacheEntry<V>>>(&raw))
                .transpose()
                .map_err(StorageError::from)
        });

        let record = match parsed {
            Ok(Some(record)) => record,
            Ok(None) => return,
            Err(err) => {
                warn!("Discarding unreadable cache record: {}", err);
                if let Err(err) = storage.remove(&self.config.storage_key) {
                    debug!("Could not remove cache record: {}", err);
                }
                return;
            }
        };

        let now = self.clock.now_ms();
        let ttl = self.config.ttl_ms();
        let stored = record.len();

        let mut live: Vec<CacheEntry<V>> = record
            .into_iter()
            .map(|(key, mut entry)| {
                entry.key = key;
                entry
            })
            .filter(|entry| !entry.is_expired(ttl, now))
            .collect();
        live.sort_by_key(|entry| entry.last_accessed);

        let restored = live.len();
        for entry in live {
            self.lru.touch(&entry.key);
            self.entries.insert(entry.key.clone(), entry);
        }
        self.memory_usage = self.entries.values().map(|entry| entry.size).sum();

        // Limits may have shrunk since the record was written
        while !self.entries.is_empty()
            && (self.entries.len() > self.config.max_size
                || self.memory_usage > self.config.max_memory_size)
        {
            if self.evict_lru().is_none() {
                break;
            }
        }

        info!(
            "Restored {} of {} cached entries from storage",
            self.entries.len(),
            stored
        );
        if restored < stored {
            debug!("Dropped {} expired entries on load", stored - restored);
        }

        // Dropped entries must not come back on the next load
        if self.entries.len() < stored {
            self.persist();
        }
    }
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.entries.len())
            .field("memory_usage", &self.memory_usage)
            .field("config", &self.config)
            .field("persisting", &self.storage.is_some())
            .finish()
    }
}
