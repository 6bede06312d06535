//! Work Queue Operations
//!
//! A fixed set of worker threads consuming one ordered pending list. The
//! owner can replace the whole list at once when priorities change; items
//! already handed to a worker always run to completion.

use super::thread_pool_data::{
    Processor, QueueCounters, QueueState, SharedQueue, WorkQueueStats, WorkerPoolConfig,
};
use crate::error::{EngineError, EngineResult};
use crate::world::error::WorldResult;
use parking_lot::{Condvar, Mutex};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct WorkQueue<T: Send + 'static> {
    shared: Arc<SharedQueue<T>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: Send + 'static> WorkQueue<T> {
    /// Spawn `config.worker_count` workers running `processor` on each item
    pub fn new<F>(config: WorkerPoolConfig, processor: F) -> EngineResult<Self>
    where
        F: Fn(T) -> WorldResult<()> + Send + Sync + 'static,
    {
        if config.worker_count == 0 {
            return Err(EngineError::invalid_config(
                &format!("{}.worker_count", config.name),
                0,
                "at least one worker is required",
            ));
        }

        let processor: Processor<T> = Arc::new(processor);
        let shared = Arc::new(SharedQueue {
            name: config.name.clone(),
            state: Mutex::new(QueueState::new()),
            work_available: Condvar::new(),
            drained: Condvar::new(),
            counters: QueueCounters::default(),
            processor,
        });

        let queue = Self {
            shared,
            workers: Mutex::new(Vec::with_capacity(config.worker_count)),
        };

        for index in 0..config.worker_count {
            let shared = Arc::clone(&queue.shared);
            let spawned = thread::Builder::new()
                .name(format!("{}-worker-{}", config.name, index))
                .spawn(move || worker_loop(shared));

            match spawned {
                Ok(handle) => queue.workers.lock().push(handle),
                Err(e) => {
                    log::error!(
                        "[WorkQueue::new] Failed to spawn worker {} for '{}': {}",
                        index,
                        config.name,
                        e
                    );
                    // Dropping `queue` stops and joins whatever did start
                    return Err(EngineError::TaskJoinError {
                        task: format!("{}-worker-{}: {}", config.name, index, e),
                    });
                }
            }
        }

        log::info!(
            "[WorkQueue::new] Started '{}' with {} workers",
            config.name,
            config.worker_count
        );

        Ok(queue)
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Append one item and wake one idle worker
    pub fn enqueue(&self, item: T) {
        let mut state = self.shared.state.lock();
        if state.stopped {
            log::trace!(
                "[WorkQueue::enqueue] '{}' is stopped, dropping item",
                self.shared.name
            );
            return;
        }
        state.pending.push_back(item);
        drop(state);
        self.shared.work_available.notify_one();
    }

    /// Discard the pending list and install `items` in the given order.
    ///
    /// Happens under the queue mutex, so no worker sees a mix of the old and
    /// new lists. In-flight items are unaffected.
    pub fn replace_all(&self, items: Vec<T>) {
        let mut state = self.shared.state.lock();
        if state.stopped {
            return;
        }
        state.pending.clear();
        state.pending.extend(items);
        let has_work = state.has_work();
        let now_idle = state.is_idle();
        drop(state);

        if has_work {
            self.shared.work_available.notify_all();
        }
        if now_idle {
            self.shared.drained.notify_all();
        }
    }

    /// Stop handing out items; the pending list is kept
    pub fn pause(&self) {
        self.shared.state.lock().paused = true;
        log::debug!("[WorkQueue::pause] '{}' paused", self.shared.name);
    }

    pub fn resume(&self) {
        self.shared.state.lock().paused = false;
        self.shared.work_available.notify_all();
        log::debug!("[WorkQueue::resume] '{}' resumed", self.shared.name);
    }

    /// Signal every worker to exit after its current item and join them.
    ///
    /// Idempotent. Nothing is dequeued once the signal is set.
    pub fn stop(&self) {
        {
            let mut state = self.shared.state.lock();
            if state.stopped {
                return;
            }
            state.stopped = true;
        }
        self.shared.work_available.notify_all();
        self.shared.drained.notify_all();

        let handles: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        let current = thread::current().id();
        let mut joined = 0;
        for handle in handles {
            // A processor stopping its own queue cannot join itself
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                log::error!(
                    "[WorkQueue::stop] A worker of '{}' exited abnormally",
                    self.shared.name
                );
            } else {
                joined += 1;
            }
        }

        log::info!(
            "[WorkQueue::stop] '{}' stopped ({} workers joined)",
            self.shared.name,
            joined
        );
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.state.lock().stopped
    }

    pub fn is_paused(&self) -> bool {
        self.shared.state.lock().paused
    }

    pub fn pending_len(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    pub fn in_flight(&self) -> usize {
        self.shared.state.lock().in_flight
    }

    /// Nothing pending and nothing running
    pub fn is_idle(&self) -> bool {
        self.shared.state.lock().is_idle()
    }

    /// Block until the queue is idle, the queue stops, or `timeout` passes.
    /// Returns whether the queue was idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let mut state = self.shared.state.lock();
        self.shared
            .drained
            .wait_while_for(&mut state, |s| !s.is_idle() && !s.stopped, timeout);
        state.is_idle()
    }

    pub fn stats(&self) -> WorkQueueStats {
        let (pending, in_flight) = {
            let state = self.shared.state.lock();
            (state.pending.len(), state.in_flight)
        };
        let counters = &self.shared.counters;
        WorkQueueStats {
            processed: counters.processed.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            panicked: counters.panicked.load(Ordering::Relaxed),
            pending,
            in_flight,
        }
    }
}

impl<T: Send + Clone + 'static> WorkQueue<T> {
    /// Copy of the pending list in dequeue order
    pub fn pending_snapshot(&self) -> Vec<T> {
        self.shared.state.lock().pending.iter().cloned().collect()
    }
}

impl<T: Send + 'static> Drop for WorkQueue<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop<T: Send + 'static>(shared: Arc<SharedQueue<T>>) {
    loop {
        let item = {
            let mut state = shared.state.lock();
            shared
                .work_available
                .wait_while(&mut state, |s| !s.stopped && !s.has_work());

            if state.stopped {
                return;
            }

            match state.pending.pop_front() {
                Some(item) => {
                    state.in_flight += 1;
                    item
                }
                None => continue,
            }
        };

        run_item(&shared, item);

        let mut state = shared.state.lock();
        state.in_flight -= 1;
        if state.is_idle() {
            drop(state);
            shared.drained.notify_all();
        }
    }
}

/// Containment boundary: neither an error nor a panic leaves this function
fn run_item<T>(shared: &SharedQueue<T>, item: T) {
    let processor = &shared.processor;
    let result = panic::catch_unwind(AssertUnwindSafe(|| processor(item)));

    match result {
        Ok(Ok(())) => shared.counters.record_processed(),
        Ok(Err(e)) => {
            shared.counters.record_failed();
            if e.is_retryable() {
                log::warn!("[WorkQueue::{}] {}", shared.name, e);
            } else {
                log::error!("[WorkQueue::{}] {}", shared.name, e);
            }
        }
        Err(payload) => {
            shared.counters.record_panicked();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!(
                "[WorkQueue::{}] Processor panicked, worker continues: {}",
                shared.name,
                message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::ChunkPos;
    use crate::world::error::WorldError;

    const WAIT: Duration = Duration::from_secs(5);

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn recording_queue(workers: usize) -> (WorkQueue<u32>, Arc<Mutex<Vec<u32>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let queue = WorkQueue::new(WorkerPoolConfig::new("test", workers), move |item| {
            sink.lock().push(item);
            Ok(())
        })
        .expect("queue should start");
        (queue, seen)
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = WorkQueue::new(WorkerPoolConfig::new("empty", 0), |_: u32| Ok(()));
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_processes_in_order_with_one_worker() {
        init_logging();
        let (queue, seen) = recording_queue(1);
        for i in 0..10 {
            queue.enqueue(i);
        }
        assert!(queue.wait_idle(WAIT));
        assert_eq!(*seen.lock(), (0..10).collect::<Vec<_>>());
        assert_eq!(queue.stats().processed, 10);
    }

    #[test]
    fn test_replace_all_discards_old_list() {
        let (queue, seen) = recording_queue(1);
        queue.pause();
        for i in 0..5 {
            queue.enqueue(i);
        }
        queue.replace_all(vec![9, 8, 7]);
        assert_eq!(queue.pending_snapshot(), vec![9, 8, 7]);

        queue.resume();
        assert!(queue.wait_idle(WAIT));
        assert_eq!(*seen.lock(), vec![9, 8, 7]);
    }

    #[test]
    fn test_replace_all_leaves_in_flight_item_alone() {
        let (started_tx, started_rx) = crossbeam_channel::unbounded();
        let (release_tx, release_rx) = crossbeam_channel::unbounded::<()>();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let queue = WorkQueue::new(WorkerPoolConfig::new("gate", 1), move |item: u32| {
            if item == 1 {
                started_tx.send(()).ok();
                release_rx.recv().ok();
            }
            sink.lock().push(item);
            Ok(())
        })
        .expect("queue should start");

        queue.enqueue(1);
        queue.enqueue(2);
        started_rx.recv_timeout(WAIT).expect("item 1 should start");

        queue.replace_all(vec![3]);
        assert_eq!(queue.in_flight(), 1);
        release_tx.send(()).expect("worker waiting");

        assert!(queue.wait_idle(WAIT));
        assert_eq!(*seen.lock(), vec![1, 3]);
    }

    #[test]
    fn test_pause_keeps_pending_items() {
        let (queue, seen) = recording_queue(2);
        queue.pause();
        queue.enqueue(1);
        queue.enqueue(2);
        thread::sleep(Duration::from_millis(50));
        assert!(seen.lock().is_empty());
        assert_eq!(queue.pending_len(), 2);
        assert!(queue.is_paused());

        queue.resume();
        assert!(queue.wait_idle(WAIT));
        let mut items = seen.lock().clone();
        items.sort_unstable();
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn test_stop_is_idempotent_and_drops_new_work() {
        let (queue, seen) = recording_queue(3);
        queue.stop();
        queue.stop();
        assert!(queue.is_stopped());

        queue.enqueue(5);
        assert_eq!(queue.pending_len(), 0);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_errors_and_panics_are_contained() {
        init_logging();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let queue = WorkQueue::new(WorkerPoolConfig::new("faulty", 1), move |item: u32| {
            match item {
                0 => panic!("boom"),
                1 => Err(WorldError::MissingDependency {
                    chunk: ChunkPos::new(0, 0, 0),
                    neighbor: ChunkPos::new(1, 0, 0),
                }),
                _ => {
                    sink.lock().push(item);
                    Ok(())
                }
            }
        })
        .expect("queue should start");

        for i in 0..4 {
            queue.enqueue(i);
        }
        assert!(queue.wait_idle(WAIT));

        // The single worker survived both faults
        assert_eq!(*seen.lock(), vec![2, 3]);
        let stats = queue.stats();
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.panicked, 1);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.in_flight, 0);
    }
}
