//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - Sweep: purges expired entries and enforces the memory ceiling

mod sweep;

pub use sweep::{spawn_sweep_task, sweep_once, SweepHandle, SweepReport};
