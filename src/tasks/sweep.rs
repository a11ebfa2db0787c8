//! Periodic Sweep Task
//!
//! Background task that purges expired cache entries and then brings the
//! store back under its memory ceiling.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, SharedCache};

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Entries removed for exceeding the TTL
    pub expired: usize,
    /// Entries evicted to get under the memory ceiling
    pub evicted: usize,
}

/// Runs a single sweep: TTL cleanup, then memory-ceiling enforcement.
pub fn sweep_once<V>(store: &mut CacheStore<V>) -> SweepReport
where
    V: Clone + Serialize + DeserializeOwned,
{
    let expired = store.cleanup();
    let evicted = store.enforce_memory_limit();
    SweepReport { expired, evicted }
}

// == Sweep Handle ==
/// Owns a running sweep task. Dropping the handle stops the task.
#[derive(Debug)]
pub struct SweepHandle {
    task: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Stops the sweep. Safe to call more than once; returns whether a
    /// running task was stopped by this call.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                info!("Cache sweep task stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawns a task that sweeps `cache` every `interval`.
///
/// Returns `None` without starting anything when called outside a Tokio
/// runtime or with a zero interval.
///
/// # Example
/// ```ignore
/// let cache = CacheStore::new(CacheConfig::default()).into_shared();
/// let mut sweep = spawn_sweep_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// if let Some(sweep) = sweep.as_mut() {
///     sweep.stop();
/// }
/// ```
pub fn spawn_sweep_task<V>(cache: SharedCache<V>, interval: Duration) -> Option<SweepHandle>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let Ok(runtime) = Handle::try_current() else {
        debug!("No async runtime available, cache sweep not started");
        return None;
    };

    if interval.is_zero() {
        warn!("Cache sweep interval is zero, sweep not started");
        return None;
    }

    let task = runtime.spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let report = {
                let mut store = cache.write().await;
                sweep_once(&mut *store)
            };

            if report.expired > 0 || report.evicted > 0 {
                info!(
                    "Cache sweep: removed {} expired entries, evicted {} for memory",
                    report.expired, report.evicted
                );
            } else {
                debug!("Cache sweep: nothing to remove");
            }
        }
    });

    Some(SweepHandle { task: Some(task) })
}
