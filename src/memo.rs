//! Memoized Fetching
//!
//! Wraps an async fetch function so repeated calls with equivalent
//! arguments are answered from a cache store instead of the network.
//!
//! Concurrent misses for the same key are coalesced: one caller runs the
//! fetch while the rest wait for its result in the cache. A failed fetch is
//! never cached, so the next caller in line fetches again.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::cache::{CacheConfig, CacheStore, SharedCache};
use crate::tasks::{spawn_sweep_task, SweepHandle};

// == In-Flight Registry ==
/// One async lock per key with a fetch underway, shared by every caller
/// currently working on that key.
#[derive(Debug, Default)]
struct InFlight {
    slots: Mutex<HashMap<String, SlotEntry>>,
}

#[derive(Debug)]
struct SlotEntry {
    lock: Arc<tokio::sync::Mutex<()>>,
    holders: usize,
}

/// A caller's claim on a key's slot. Dropping it, including when the
/// call is cancelled, releases the claim and frees the slot once unused.
struct Slot<'a> {
    in_flight: &'a InFlight,
    key: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl InFlight {
    fn slot(&self, key: &str) -> Slot<'_> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = slots.entry(key.to_string()).or_insert_with(|| SlotEntry {
            lock: Arc::default(),
            holders: 0,
        });
        entry.holders += 1;

        Slot {
            in_flight: self,
            key: key.to_string(),
            lock: entry.lock.clone(),
        }
    }

    fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        let mut slots = self
            .in_flight
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = slots.get_mut(&self.key) {
            entry.holders = entry.holders.saturating_sub(1);
            if entry.holders == 0 {
                slots.remove(&self.key);
            }
        }
    }
}

// == TTL Caches ==
/// Dedicated store for results fetched under a TTL override, swept on
/// its own TTL for as long as the wrapper lives.
struct TtlCache<V> {
    cache: SharedCache<V>,
    _sweep: Option<SweepHandle>,
}

// == Memoized ==
/// A fetch function fronted by a cache.
///
/// `fetch` produces the value for a set of arguments, `key_fn` derives the
/// cache key for the same arguments. Lookups always consult the shared
/// cache first.
pub struct Memoized<F, K, V> {
    cache: SharedCache<V>,
    fetch: F,
    key_fn: K,
    default_ttl: Option<Duration>,
    ttl_caches: Mutex<HashMap<Duration, TtlCache<V>>>,
    in_flight: InFlight,
}

/// Shorthand for [`Memoized::new`].
pub fn memoize<F, K, V>(cache: SharedCache<V>, fetch: F, key_fn: K) -> Memoized<F, K, V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    Memoized::new(cache, fetch, key_fn)
}

impl<F, K, V> Memoized<F, K, V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(cache: SharedCache<V>, fetch: F, key_fn: K) -> Self {
        Self {
            cache,
            fetch,
            key_fn,
            default_ttl: None,
            ttl_caches: Mutex::new(HashMap::new()),
            in_flight: InFlight::default(),
        }
    }

    /// Applies `ttl` as the override for every [`call`](Self::call).
    ///
    /// Hits in the shared cache are still served; only fresh results go to
    /// the dedicated cache for `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// The shared cache this wrapper reads first.
    pub fn cache(&self) -> &SharedCache<V> {
        &self.cache
    }

    /// Returns the cached value for `args`, fetching and caching it on a miss.
    ///
    /// Fetch errors are returned as-is and leave the cache untouched.
    pub async fn call<A, Fut, E>(&self, args: A) -> Result<V, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<V, E>>,
        K: Fn(&A) -> String,
    {
        self.call_inner(args, self.default_ttl).await
    }

    /// Like [`call`](Self::call), but a fetched result is stored in a
    /// dedicated cache whose entries live for `ttl`.
    pub async fn call_with_ttl<A, Fut, E>(&self, args: A, ttl: Duration) -> Result<V, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<V, E>>,
        K: Fn(&A) -> String,
    {
        self.call_inner(args, Some(ttl)).await
    }

    async fn call_inner<A, Fut, E>(&self, args: A, ttl: Option<Duration>) -> Result<V, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<V, E>>,
        K: Fn(&A) -> String,
    {
        let key = (self.key_fn)(&args);
        let target = ttl.map(|ttl| self.ttl_cache(ttl));

        if let Some(value) = self.lookup(&key, target.as_ref()).await {
            debug!("Memoized call served from cache: '{}'", key);
            return Ok(value);
        }

        let slot = self.in_flight.slot(&key);
        let _turn = slot.lock.lock().await;

        // A caller ahead of us may have filled the slot while we waited
        if let Some(value) = self.lookup(&key, target.as_ref()).await {
            return Ok(value);
        }

        debug!("Memoized call fetching: '{}'", key);
        let value = (self.fetch)(args).await?;
        target
            .as_ref()
            .unwrap_or(&self.cache)
            .write()
            .await
            .set(key, value.clone());
        Ok(value)
    }

    /// Shared cache first, then the override cache when there is one.
    async fn lookup(&self, key: &str, target: Option<&SharedCache<V>>) -> Option<V> {
        let shared = self.cache.write().await.get(key);
        match (shared, target) {
            (Some(value), _) => Some(value),
            (None, Some(cache)) => cache.write().await.get(key),
            (None, None) => None,
        }
    }

    /// Returns the dedicated cache for `ttl`, creating it on first use.
    fn ttl_cache(&self, ttl: Duration) -> SharedCache<V> {
        let mut caches = self
            .ttl_caches
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        caches
            .entry(ttl)
            .or_insert_with(|| {
                let cache = CacheStore::new(CacheConfig::default().with_ttl(ttl)).into_shared();
                let sweep = spawn_sweep_task(cache.clone(), ttl);
                TtlCache {
                    cache,
                    _sweep: sweep,
                }
            })
            .cache
            .clone()
    }
}
