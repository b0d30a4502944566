//! # Bulkhead Executor
//!
//! A bulkhead isolates one category of work behind a fixed number of workers and a bounded
//! wait queue, so that saturation there cannot starve the rest of the process.
//!
//! Like the store actor in the service crate, the bulkhead is split in two halves:
//!
//! - [`WorkerPool`] is the *server* half. It owns the receiving end of the job channel and
//!   `core_size` worker tasks. Spawn its [`run`](WorkerPool::run) future once.
//! - [`BulkheadExecutor`] is the *client* half. It is cheap to clone and is what callers
//!   use to [`submit`](BulkheadExecutor::submit) work.
//!
//! ## Admission
//!
//! A task is admitted when a permit can be taken from a semaphore holding
//! `core_size + max_queue_size` permits. Taking it never waits: when no permit is left the
//! submission fails with [`ResilienceError::BulkheadSaturated`]. An admitted task either
//! runs right away (a worker is idle) or sits in the channel until a worker frees up.
//! The permit travels with the job and is released when the job finishes, *before* its
//! result is delivered.
//!
//! ## Cancellation
//!
//! Dropping a [`BulkheadHandle`] abandons the task. A queued task is skipped by the worker
//! that dequeues it; a running task is dropped at its next suspension point.

use crate::error::ResilienceError;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, Mutex, OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub const DEFAULT_CORE_SIZE: usize = 30;
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 10;

/// Sizing of a bulkhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkheadConfig {
    /// Number of tasks that may run concurrently.
    pub core_size: usize,
    /// Number of admitted tasks that may wait for a worker.
    pub max_queue_size: usize,
}

impl Default for BulkheadConfig {
    fn default() -> Self {
        Self {
            core_size: DEFAULT_CORE_SIZE,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
        }
    }
}

impl BulkheadConfig {
    pub fn new(core_size: usize, max_queue_size: usize) -> Self {
        Self {
            core_size,
            max_queue_size,
        }
    }

    /// Upper bound on running plus queued tasks.
    pub fn capacity(&self) -> usize {
        self.core_size.saturating_add(self.max_queue_size)
    }

    pub fn validate(&self) -> Result<(), ResilienceError> {
        if self.core_size == 0 {
            return Err(ResilienceError::InvalidConfig(
                "core_size must be at least 1".to_string(),
            ));
        }
        if self.capacity() > Semaphore::MAX_PERMITS {
            return Err(ResilienceError::InvalidConfig(format!(
                "core_size + max_queue_size must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }
        Ok(())
    }
}

/// Point-in-time view of a bulkhead's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkheadMetrics {
    pub active: usize,
    pub queued: usize,
    pub available: usize,
}

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

struct Shared {
    name: String,
    config: BulkheadConfig,
    admission: Arc<Semaphore>,
    active: AtomicUsize,
}

// =============================================================================
// SERVER HALF
// =============================================================================

/// The worker side of a bulkhead.
pub struct WorkerPool {
    shared: Arc<Shared>,
    receiver: mpsc::Receiver<Job>,
}

impl WorkerPool {
    /// Creates a worker pool and the executor handle that feeds it.
    ///
    /// Nothing runs until [`WorkerPool::run`] is spawned; tasks submitted before that are
    /// admitted and queued as usual.
    pub fn new(
        name: impl Into<String>,
        config: BulkheadConfig,
    ) -> Result<(Self, BulkheadExecutor), ResilienceError> {
        config.validate()?;
        let (sender, receiver) = mpsc::channel(config.capacity());
        let shared = Arc::new(Shared {
            name: name.into(),
            config,
            admission: Arc::new(Semaphore::new(config.capacity())),
            active: AtomicUsize::new(0),
        });
        let pool = Self {
            shared: Arc::clone(&shared),
            receiver,
        };
        let executor = BulkheadExecutor { shared, sender };
        Ok((pool, executor))
    }

    /// Runs `core_size` workers until every [`BulkheadExecutor`] clone has been dropped and
    /// the queue is drained.
    pub async fn run(self) {
        let bulkhead = self.shared.name.clone();
        let core_size = self.shared.config.core_size;
        info!(
            %bulkhead,
            core_size,
            max_queue_size = self.shared.config.max_queue_size,
            "Worker pool started"
        );

        let receiver = Arc::new(Mutex::new(self.receiver));
        let mut workers = JoinSet::new();
        for _ in 0..core_size {
            let receiver = Arc::clone(&receiver);
            workers.spawn(async move {
                loop {
                    // Only one idle worker waits on the channel; the rest wait on the lock.
                    let next = receiver.lock().await.recv().await;
                    match next {
                        Some(job) => job.await,
                        None => break,
                    }
                }
            });
        }

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                warn!(%bulkhead, error = %e, "Worker exited abnormally");
            }
        }
        info!(%bulkhead, "Worker pool shutdown");
    }
}

// =============================================================================
// CLIENT HALF
// =============================================================================

/// Submits work to a [`WorkerPool`].
#[derive(Clone)]
pub struct BulkheadExecutor {
    shared: Arc<Shared>,
    sender: mpsc::Sender<Job>,
}

impl BulkheadExecutor {
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn config(&self) -> BulkheadConfig {
        self.shared.config
    }

    /// Admits `task` or rejects it immediately.
    ///
    /// # Errors
    ///
    /// - [`ResilienceError::BulkheadSaturated`] when `core_size` tasks are running and
    ///   `max_queue_size` more are waiting.
    /// - [`ResilienceError::BulkheadClosed`] when the worker pool is gone.
    pub fn submit<F>(&self, task: F) -> Result<BulkheadHandle<F::Output>, ResilienceError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permit = match Arc::clone(&self.shared.admission).try_acquire_owned() {
            Ok(permit) => permit,
            Err(TryAcquireError::NoPermits) => {
                warn!(bulkhead = %self.shared.name, "Rejected: bulkhead saturated");
                return Err(self.saturated());
            }
            Err(TryAcquireError::Closed) => {
                return Err(ResilienceError::BulkheadClosed(self.shared.name.clone()))
            }
        };

        let (respond_to, response) = oneshot::channel();
        let job = run_job(Arc::clone(&self.shared), permit, task, respond_to);
        self.sender
            .try_send(Box::pin(job))
            .map_err(|e| match e {
                TrySendError::Full(_) => self.saturated(),
                TrySendError::Closed(_) => ResilienceError::BulkheadClosed(self.shared.name.clone()),
            })?;

        debug!(bulkhead = %self.shared.name, "Admitted");
        Ok(BulkheadHandle { response })
    }

    pub fn metrics(&self) -> BulkheadMetrics {
        let capacity = self.shared.config.capacity();
        let available = self.shared.admission.available_permits();
        let admitted = capacity.saturating_sub(available);
        let active = self.shared.active.load(Ordering::SeqCst).min(admitted);
        BulkheadMetrics {
            active,
            queued: admitted - active,
            available,
        }
    }

    fn saturated(&self) -> ResilienceError {
        ResilienceError::BulkheadSaturated {
            name: self.shared.name.clone(),
            capacity: self.shared.config.capacity(),
        }
    }
}

/// Handle to an admitted task.
///
/// Dropping the handle abandons the task.
pub struct BulkheadHandle<T> {
    response: oneshot::Receiver<Result<T, ResilienceError>>,
}

impl<T> BulkheadHandle<T> {
    /// Waits for the task's output.
    ///
    /// # Errors
    ///
    /// [`ResilienceError::TaskFailed`] if the task panicked, [`ResilienceError::Cancelled`]
    /// if it was dropped without running to completion (e.g. the pool shut down).
    pub async fn join(self) -> Result<T, ResilienceError> {
        self.response
            .await
            .map_err(|_| ResilienceError::Cancelled)?
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl<'a> ActiveGuard<'a> {
    fn enter(active: &'a AtomicUsize) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self(active)
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn run_job<F>(
    shared: Arc<Shared>,
    permit: OwnedSemaphorePermit,
    task: F,
    mut respond_to: oneshot::Sender<Result<F::Output, ResilienceError>>,
) where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    if respond_to.is_closed() {
        debug!(bulkhead = %shared.name, "Skipping abandoned task");
        return;
    }

    let outcome = {
        let _active = ActiveGuard::enter(&shared.active);
        tokio::select! {
            result = AssertUnwindSafe(task).catch_unwind() => Some(result),
            () = respond_to.closed() => None,
        }
    };
    drop(permit);

    match outcome {
        Some(Ok(value)) => {
            let _ = respond_to.send(Ok(value));
        }
        Some(Err(_)) => {
            warn!(bulkhead = %shared.name, "Task panicked");
            let _ = respond_to.send(Err(ResilienceError::TaskFailed(
                "task panicked".to_string(),
            )));
        }
        None => debug!(bulkhead = %shared.name, "Task abandoned by caller, dropped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn start(core_size: usize, max_queue_size: usize) -> BulkheadExecutor {
        let (pool, executor) =
            WorkerPool::new("test", BulkheadConfig::new(core_size, max_queue_size)).unwrap();
        tokio::spawn(pool.run());
        executor
    }

    async fn wait_for(executor: &BulkheadExecutor, expected: BulkheadMetrics) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while executor.metrics() != expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("metrics never reached {expected:?}, got {:?}", executor.metrics()));
    }

    #[tokio::test]
    async fn test_runs_submitted_task() {
        let bulkhead = start(2, 1);
        let handle = bulkhead.submit(async { 21 * 2 }).unwrap();
        assert_eq!(handle.join().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_rejects_when_workers_and_queue_are_full() {
        let bulkhead = start(2, 1);

        let mut gates = Vec::new();
        let mut handles = Vec::new();
        for i in 0..3 {
            let (gate, wait) = oneshot::channel::<()>();
            gates.push(gate);
            handles.push(
                bulkhead
                    .submit(async move {
                        let _ = wait.await;
                        i
                    })
                    .unwrap(),
            );
        }

        let rejected = bulkhead.submit(async { 99 });
        assert!(matches!(
            rejected,
            Err(ResilienceError::BulkheadSaturated { capacity: 3, .. })
        ));

        wait_for(
            &bulkhead,
            BulkheadMetrics {
                active: 2,
                queued: 1,
                available: 0,
            },
        )
        .await;

        for gate in gates {
            gate.send(()).unwrap();
        }
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.join().await.unwrap());
        }
        assert_eq!(results, vec![0, 1, 2]);

        // Slots come back before results are delivered.
        assert_eq!(bulkhead.metrics().available, 3);
        assert_eq!(bulkhead.submit(async { 7 }).unwrap().join().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_zero_queue_admits_only_core_size() {
        let bulkhead = start(1, 0);
        let (_gate, wait) = oneshot::channel::<()>();
        let _running = bulkhead.submit(async move { wait.await.ok() }).unwrap();

        assert!(matches!(
            bulkhead.submit(async {}),
            Err(ResilienceError::BulkheadSaturated { capacity: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_panicking_task_reports_failure_and_frees_slot() {
        let bulkhead = start(1, 0);
        let handle = bulkhead
            .submit(async {
                if true {
                    panic!("boom");
                }
                1
            })
            .unwrap();

        assert!(matches!(handle.join().await, Err(ResilienceError::TaskFailed(_))));
        assert_eq!(bulkhead.submit(async { 2 }).unwrap().join().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels_running_task() {
        let bulkhead = start(1, 0);
        let handle = bulkhead.submit(std::future::pending::<()>()).unwrap();
        wait_for(
            &bulkhead,
            BulkheadMetrics {
                active: 1,
                queued: 0,
                available: 0,
            },
        )
        .await;

        drop(handle);
        wait_for(
            &bulkhead,
            BulkheadMetrics {
                active: 0,
                queued: 0,
                available: 1,
            },
        )
        .await;
    }

    #[tokio::test]
    async fn test_pool_stops_when_executors_dropped() {
        let (pool, executor) = WorkerPool::new("test", BulkheadConfig::new(2, 2)).unwrap();
        let pool_handle = tokio::spawn(pool.run());

        let queued = executor.submit(async { "done" }).unwrap();
        drop(executor);

        assert_eq!(queued.join().await.unwrap(), "done");
        tokio::time::timeout(Duration::from_secs(2), pool_handle)
            .await
            .expect("pool did not stop")
            .unwrap();
    }

    #[test]
    fn test_zero_core_size_is_rejected() {
        let result = WorkerPool::new("test", BulkheadConfig::new(0, 10));
        assert!(matches!(result, Err(ResilienceError::InvalidConfig(_))));
    }

    #[test]
    fn test_default_config_matches_documented_sizes() {
        let config = BulkheadConfig::default();
        assert_eq!(config.core_size, 30);
        assert_eq!(config.max_queue_size, 10);
        assert_eq!(config.capacity(), 40);
    }
}
