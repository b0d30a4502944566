//! # Resilient Invoker
//!
//! [`ResilientInvoker::execute`] runs a task on a [`BulkheadExecutor`], waits for it at most
//! `timeout`, and substitutes a fallback value whenever the primary path does not produce a
//! result. It never returns an error.
//!
//! ```rust
//! use resilience::{BulkheadConfig, ResilientInvoker, WorkerPool};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (pool, bulkhead) = WorkerPool::new("lookups", BulkheadConfig::new(4, 2)).unwrap();
//!     tokio::spawn(pool.run());
//!     let invoker = ResilientInvoker::new("lookups", bulkhead, Duration::from_millis(500));
//!
//!     let outcome = invoker
//!         .execute(
//!             "42".to_string(),
//!             |id| async move { Err::<String, _>(format!("{id} unavailable")) },
//!             Duration::from_millis(100),
//!             |id| format!("default for {id}"),
//!         )
//!         .await;
//!
//!     assert!(outcome.is_fallback());
//!     assert_eq!(outcome.into_inner(), "default for 42");
//! }
//! ```

use crate::bulkhead::BulkheadExecutor;
use crate::error::ResilienceError;
use std::fmt::Display;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(7000);

/// Why a fallback value was returned instead of the primary result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The bulkhead refused the task; it never ran.
    Saturated,
    /// The deadline passed before the task finished.
    TimedOut(Duration),
    /// The task returned an error or panicked.
    Failed(String),
    /// The task was dropped before producing a result.
    Cancelled,
}

impl From<ResilienceError> for FallbackReason {
    fn from(error: ResilienceError) -> Self {
        match error {
            ResilienceError::BulkheadSaturated { .. } => FallbackReason::Saturated,
            ResilienceError::TimeoutExceeded(after) => FallbackReason::TimedOut(after),
            ResilienceError::Cancelled | ResilienceError::BulkheadClosed(_) => {
                FallbackReason::Cancelled
            }
            ResilienceError::TaskFailed(msg) | ResilienceError::InvalidConfig(msg) => {
                FallbackReason::Failed(msg)
            }
        }
    }
}

impl Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::Saturated => write!(f, "bulkhead saturated"),
            FallbackReason::TimedOut(after) => write!(f, "timed out after {}ms", after.as_millis()),
            FallbackReason::Failed(msg) => write!(f, "failed: {msg}"),
            FallbackReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of [`ResilientInvoker::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome<T> {
    Success(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> CallOutcome<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, CallOutcome::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            CallOutcome::Success(_) => None,
            CallOutcome::Fallback { reason, .. } => Some(reason),
        }
    }

    /// The primary result or the fallback value, whichever was produced.
    pub fn into_inner(self) -> T {
        match self {
            CallOutcome::Success(value) | CallOutcome::Fallback { value, .. } => value,
        }
    }
}

/// Bulkheaded, time-bounded invocation with a fallback.
///
/// Cloning is cheap; clones share the same bulkhead.
#[derive(Clone)]
pub struct ResilientInvoker {
    name: String,
    bulkhead: BulkheadExecutor,
    timeout: Duration,
}

impl ResilientInvoker {
    pub fn new(name: impl Into<String>, bulkhead: BulkheadExecutor, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            bulkhead,
            timeout,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn bulkhead(&self) -> &BulkheadExecutor {
        &self.bulkhead
    }

    /// Runs `task(args)` on the bulkhead and waits up to `timeout` for it.
    ///
    /// `fallback(args)` is called with the original arguments (never with the error) when
    /// the bulkhead is saturated, the deadline passes, or the task fails, panics or is
    /// cancelled. A panic raised by `task` while it builds its future counts as a failure.
    ///
    /// On timeout the task is abandoned and dropped at its next suspension point. Its
    /// bulkhead slot is freed once the worker observes the abandonment, which can be
    /// shortly after the fallback has been returned.
    #[instrument(skip_all, fields(command = %self.name))]
    pub async fn execute<A, T, E, F, Fut, FB>(
        &self,
        args: A,
        task: F,
        timeout: Duration,
        fallback: FB,
    ) -> CallOutcome<T>
    where
        A: Clone,
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
        FB: FnOnce(A) -> T,
    {
        let future = match catch_unwind(AssertUnwindSafe(|| task(args.clone()))) {
            Ok(future) => future,
            Err(_) => {
                let reason = FallbackReason::Failed("task panicked before it started".to_string());
                return self.fall_back(args, fallback, reason);
            }
        };
        let handle = match self.bulkhead.submit(future) {
            Ok(handle) => handle,
            Err(e) => return self.fall_back(args, fallback, e.into()),
        };

        let reason = match tokio::time::timeout(timeout, handle.join()).await {
            Ok(Ok(Ok(value))) => {
                debug!("Primary call succeeded");
                return CallOutcome::Success(value);
            }
            Ok(Ok(Err(e))) => FallbackReason::Failed(e.to_string()),
            Ok(Err(e)) => e.into(),
            Err(_) => ResilienceError::TimeoutExceeded(timeout).into(),
        };
        self.fall_back(args, fallback, reason)
    }

    /// [`execute`](Self::execute) with the invoker's configured timeout.
    pub async fn execute_with_default_timeout<A, T, E, F, Fut, FB>(
        &self,
        args: A,
        task: F,
        fallback: FB,
    ) -> CallOutcome<T>
    where
        A: Clone,
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
        FB: FnOnce(A) -> T,
    {
        self.execute(args, task, self.timeout, fallback).await
    }

    fn fall_back<A, T, FB>(&self, args: A, fallback: FB, reason: FallbackReason) -> CallOutcome<T>
    where
        FB: FnOnce(A) -> T,
    {
        warn!(command = %self.name, %reason, "Falling back");
        CallOutcome::Fallback {
            value: fallback(args),
            reason,
        }
    }
}
