//! # Resilience Errors
//!
//! This module defines the error types raised by the bulkhead and the service registry.
//! None of them ever escape [`ResilientInvoker::execute`](crate::ResilientInvoker::execute):
//! the invoker converts every one of them into a fallback result. They are visible to
//! code that drives a [`BulkheadExecutor`](crate::BulkheadExecutor) or a
//! [`ServiceRegistry`](crate::ServiceRegistry) directly.

use std::time::Duration;

/// Errors produced while admitting or running a task on a bulkhead.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ResilienceError {
    /// Every worker is busy and the wait queue is full.
    #[error("Bulkhead '{name}' saturated ({capacity} tasks admitted)")]
    BulkheadSaturated { name: String, capacity: usize },

    /// The task did not complete before its deadline.
    #[error("Timed out after {}ms", .0.as_millis())]
    TimeoutExceeded(Duration),

    /// The task itself failed (returned an error or panicked).
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// The task was dropped before it delivered a result.
    #[error("Task cancelled")]
    Cancelled,

    /// The worker pool has shut down and accepts no more work.
    #[error("Bulkhead '{0}' closed")]
    BulkheadClosed(String),

    /// The bulkhead configuration cannot be used.
    #[error("Invalid bulkhead configuration: {0}")]
    InvalidConfig(String),
}

/// Errors produced by a [`ServiceRegistry`](crate::ServiceRegistry) backend.
///
/// An empty instance list is *not* an error; these variants only describe a registry
/// that could not be asked at all.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("Service registry unavailable: {0}")]
    Unavailable(String),
    #[error("Service registry returned an invalid response: {0}")]
    InvalidResponse(String),
}
