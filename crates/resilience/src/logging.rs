//! # Logging Setup
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by `RUST_LOG`.
//!
//! ```bash
//! # Lifecycle events, rejections and fallbacks
//! RUST_LOG=info cargo run
//!
//! # Admissions, registry lookups and remote calls
//! RUST_LOG=debug cargo run
//!
//! # Only the resilience machinery
//! RUST_LOG=resilience=debug cargo run
//! ```
//!
//! Fallbacks are logged at `warn` with the command name and the reason, e.g.
//!
//! ```text
//! WARN execute{command="ordersByCustomer"}: Falling back command="ordersByCustomer" reason=timed out after 7000ms
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Calling it twice is a no-op.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
