use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::Context as _;

use crate::foundation::error::MaskResult;
use crate::foundation::sync::lock;
use crate::mask::source::{FrameTask, FrameToken};

/// Dedicated timer thread that fires animation frame tasks for one view.
///
/// Determinism rule: tasks fire in `(fire_time, post order)` order. Stopping the scheduler drops
/// every pending task without running it.
pub struct FrameScheduler {
    shared: Arc<SchedulerShared>,
    worker: Option<JoinHandle<()>>,
}

struct SchedulerShared {
    queue: Mutex<QueueState>,
    wake: Condvar,
}

#[derive(Default)]
struct QueueState {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
    stopped: bool,
}

struct Entry {
    at: Instant,
    seq: u64,
    token: FrameToken,
    task: FrameTask,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at).then(self.seq.cmp(&other.seq))
    }
}

impl FrameScheduler {
    /// Spawn the worker thread.
    pub fn start() -> MaskResult<Self> {
        let shared = Arc::new(SchedulerShared {
            queue: Mutex::new(QueueState::default()),
            wake: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("maskview-frames".to_string())
            .spawn(move || run_worker(&worker_shared))
            .context("spawn frame scheduler thread")?;
        tracing::debug!("frame scheduler started");
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Post `task` to run at `at`. Returns `false` when the scheduler is stopped and the task was
    /// dropped.
    pub fn schedule(&self, token: FrameToken, at: Instant, task: FrameTask) -> bool {
        let mut q = lock(&self.shared.queue);
        if q.stopped {
            tracing::debug!(?token, "frame scheduler stopped, dropping task");
            return false;
        }
        let seq = q.next_seq;
        q.next_seq = q.next_seq.wrapping_add(1);
        q.heap.push(Reverse(Entry {
            at,
            seq,
            token,
            task,
        }));
        drop(q);
        self.shared.wake.notify_one();
        true
    }

    /// Remove every pending task posted under `token`; returns how many were removed.
    pub fn unschedule(&self, token: FrameToken) -> usize {
        let mut q = lock(&self.shared.queue);
        let before = q.heap.len();
        q.heap.retain(|Reverse(e)| e.token != token);
        let removed = before - q.heap.len();
        if removed > 0 {
            drop(q);
            self.shared.wake.notify_one();
            tracing::trace!(?token, removed, "unscheduled frame tasks");
        }
        removed
    }

    /// Number of tasks waiting to fire.
    pub fn pending(&self) -> usize {
        lock(&self.shared.queue).heap.len()
    }

    /// True until [`FrameScheduler::stop`] is called.
    pub fn is_running(&self) -> bool {
        !lock(&self.shared.queue).stopped
    }

    /// Stop the worker, discarding pending tasks. Waits for a task that is already running.
    pub fn stop(&mut self) {
        let discarded = {
            let mut q = lock(&self.shared.queue);
            q.stopped = true;
            std::mem::take(&mut q.heap)
        };
        self.shared.wake.notify_all();
        if !discarded.is_empty() {
            tracing::debug!(discarded = discarded.len(), "discarded pending frame tasks");
        }
        drop(discarded);

        if let Some(worker) = self.worker.take() {
            // A task that detaches its own view runs on this thread; joining would deadlock.
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                tracing::warn!("frame scheduler thread panicked");
            }
            tracing::debug!("frame scheduler stopped");
        }
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(shared: &SchedulerShared) {
    loop {
        let task = {
            let mut q = lock(&shared.queue);
            loop {
                if q.stopped {
                    return;
                }
                let now = Instant::now();
                let next_at = q.heap.peek().map(|Reverse(e)| e.at);
                match next_at {
                    None => {
                        q = shared.wake.wait(q).unwrap_or_else(PoisonError::into_inner);
                    }
                    Some(at) if at <= now => {
                        if let Some(Reverse(entry)) = q.heap.pop() {
                            break entry.task;
                        }
                    }
                    Some(at) => {
                        q = shared
                            .wake
                            .wait_timeout(q, at - now)
                            .unwrap_or_else(PoisonError::into_inner)
                            .0;
                    }
                }
            }
        };
        // Run without the queue lock: tasks schedule their own follow-ups.
        task();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scheduler.rs"]
mod tests;
