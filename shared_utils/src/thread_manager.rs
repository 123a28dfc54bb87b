//! Worker-count policy for batch pools.
//!
//! The pool is sized to the host's logical CPU count, sampled once per
//! process and never resized afterwards.

use std::sync::OnceLock;

static DEFAULT_WORKERS: OnceLock<usize> = OnceLock::new();

/// Worker count used when the caller does not supply one (cached).
pub fn default_worker_count() -> usize {
    *DEFAULT_WORKERS.get_or_init(|| num_cpus::get().max(1))
}

/// Never more workers than tasks, never fewer than one.
pub fn effective_worker_count(requested: usize, tasks: usize) -> usize {
    requested.min(tasks).max(1)
}
