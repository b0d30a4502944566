//! # Test Doubles
//!
//! [`MockServiceRegistry`] answers [`ServiceRegistry::resolve`] calls from a queue of scripted
//! expectations, so client code can be tested against empty registries, multiple instances or
//! an unreachable registry without running one.
//!
//! ```rust
//! use resilience::mock::MockServiceRegistry;
//! use resilience::{DiscoveryError, ServiceInstance, ServiceRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockServiceRegistry::new();
//!     mock.expect_resolve("customerservice")
//!         .return_instances(vec![ServiceInstance::new("localhost", 8080)]);
//!     mock.expect_resolve("customerservice")
//!         .return_err(DiscoveryError::Unavailable("agent down".into()));
//!
//!     assert_eq!(mock.resolve("customerservice").await.unwrap().len(), 1);
//!     assert!(mock.resolve("customerservice").await.is_err());
//!     mock.verify();
//! }
//! ```
//!
//! Expectations are consumed in order. A call that does not match the next expectation
//! panics, as does [`verify`](MockServiceRegistry::verify) when expectations remain.

use crate::discovery::{ServiceInstance, ServiceRegistry};
use crate::error::DiscoveryError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct Expectation {
    service_name: String,
    response: Result<Vec<ServiceInstance>, DiscoveryError>,
}

/// A [`ServiceRegistry`] driven by expectations.
///
/// Clones share the same expectation queue, so one clone can be handed to the code under
/// test while the test keeps another for [`verify`](Self::verify).
#[derive(Clone, Default)]
pub struct MockServiceRegistry {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `resolve` of `service_name`.
    pub fn expect_resolve(&self, service_name: impl Into<String>) -> ResolveExpectationBuilder {
        ResolveExpectationBuilder {
            service_name: service_name.into(),
            expectations: Arc::clone(&self.expectations),
        }
    }

    /// Service names passed to `resolve`, in call order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Panics unless every expectation has been consumed.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

#[async_trait]
impl ServiceRegistry for MockServiceRegistry {
    async fn resolve(&self, service_name: &str) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        lock(&self.calls).push(service_name.to_string());
        let next = lock(&self.expectations).pop_front();
        match next {
            Some(expectation) if expectation.service_name == service_name => expectation.response,
            Some(expectation) => panic!(
                "Unexpected resolve('{service_name}'), expected resolve('{}')",
                expectation.service_name
            ),
            None => panic!("Unexpected resolve('{service_name}'), no expectations left"),
        }
    }
}

/// Builder for `resolve` expectations.
pub struct ResolveExpectationBuilder {
    service_name: String,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ResolveExpectationBuilder {
    pub fn return_instances(self, instances: Vec<ServiceInstance>) {
        self.push(Ok(instances));
    }

    pub fn return_err(self, error: DiscoveryError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Vec<ServiceInstance>, DiscoveryError>) {
        lock(&self.expectations).push_back(Expectation {
            service_name: self.service_name,
            response,
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
