//! # Resilience
//!
//! Building blocks for calling a remote, dynamically discovered service without letting its
//! failures leak into the caller.
//!
//! ## Architecture Overview
//!
//! 1. **Discovery** ([`ServiceRegistry`]) - resolves a logical service name to instances at call time
//! 2. **Isolation** ([`WorkerPool`] / [`BulkheadExecutor`]) - a bounded pool plus bounded queue per kind of call
//! 3. **Invocation** ([`ResilientInvoker`]) - bulkhead + timeout + fallback as one explicit combinator
//!
//! The bulkhead follows the actor layout used throughout this workspace: a server half
//! ([`WorkerPool`]) that is spawned once and owns the workers, and a cheap-to-clone client
//! half ([`BulkheadExecutor`]) used to submit work. Dropping every client half stops the pool.
//!
//! ## Example
//!
//! ```rust
//! use resilience::{BulkheadConfig, CallOutcome, ResilientInvoker, WorkerPool};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (pool, bulkhead) = WorkerPool::new("prices", BulkheadConfig::default()).unwrap();
//!     let pool_handle = tokio::spawn(pool.run());
//!
//!     let invoker = ResilientInvoker::new("prices", bulkhead, Duration::from_secs(1));
//!     let outcome = invoker
//!         .execute_with_default_timeout(
//!             10u32,
//!             |qty| async move { Ok::<_, String>(qty * 3) },
//!             |_| 0,
//!         )
//!         .await;
//!     assert_eq!(outcome, CallOutcome::Success(30));
//!
//!     drop(invoker);
//!     pool_handle.await.unwrap();
//! }
//! ```
//!
//! ## Error Handling
//!
//! [`ResilienceError`] and [`DiscoveryError`] are visible to code that uses the bulkhead or a
//! registry directly. [`ResilientInvoker::execute`] never returns them: every failure becomes
//! a [`CallOutcome::Fallback`] carrying a [`FallbackReason`].

pub mod bulkhead;
pub mod discovery;
pub mod error;
pub mod invoker;
pub mod logging;
pub mod mock;

pub use bulkhead::{BulkheadConfig, BulkheadExecutor, BulkheadHandle, BulkheadMetrics, WorkerPool};
pub use discovery::{
    ConsulServiceRegistry, InstanceSelector, SelectionPolicy, ServiceInstance, ServiceRegistry,
    StaticServiceRegistry,
};
pub use error::{DiscoveryError, ResilienceError};
pub use invoker::{CallOutcome, FallbackReason, ResilientInvoker};
pub use logging::setup_tracing;
