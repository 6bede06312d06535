//! Work Queue Data
//!
//! Plain data owned by a [`WorkQueue`](super::WorkQueue): the shared state
//! guarded by the queue mutex, the per-item counters and the pool settings.

use crate::world::error::WorldResult;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Per-item processing function shared by all workers of one queue
pub type Processor<T> = Arc<dyn Fn(T) -> WorldResult<()> + Send + Sync>;

/// Worker pool settings
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Used for thread names and log prefixes
    pub name: String,
    pub worker_count: usize,
}

impl WorkerPoolConfig {
    pub fn new(name: impl Into<String>, worker_count: usize) -> Self {
        Self {
            name: name.into(),
            worker_count,
        }
    }
}

/// Point-in-time counters for one queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkQueueStats {
    /// Items whose processor returned `Ok`
    pub processed: u64,
    /// Items whose processor returned an error
    pub failed: u64,
    /// Items whose processor panicked
    pub panicked: u64,
    pub pending: usize,
    pub in_flight: usize,
}

/// State guarded by the queue mutex
pub(crate) struct QueueState<T> {
    pub pending: VecDeque<T>,
    pub paused: bool,
    pub stopped: bool,
    pub in_flight: usize,
}

impl<T> QueueState<T> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            paused: false,
            stopped: false,
            in_flight: 0,
        }
    }

    /// A worker may take the next item
    pub fn has_work(&self) -> bool {
        !self.paused && !self.pending.is_empty()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight == 0
    }
}

#[derive(Default)]
pub(crate) struct QueueCounters {
    pub processed: AtomicU64,
    pub failed: AtomicU64,
    pub panicked: AtomicU64,
}

impl QueueCounters {
    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_panicked(&self) {
        self.panicked.fetch_add(1, Ordering::Relaxed);
    }
}

/// Everything the workers share with the owning handle
pub(crate) struct SharedQueue<T> {
    pub name: String,
    pub state: Mutex<QueueState<T>>,
    /// Signalled when work arrives, on resume and on stop
    pub work_available: Condvar,
    /// Signalled when the queue drains and nothing is in flight
    pub drained: Condvar,
    pub counters: QueueCounters,
    pub processor: Processor<T>,
}
