//! # Service Discovery
//!
//! A [`ServiceRegistry`] resolves a logical service name to the instances currently known
//! for it. Callers resolve on every call and never cache the result; an empty list is a
//! valid answer meaning "nothing is registered right now".
//!
//! Two backends are provided:
//!
//! - [`StaticServiceRegistry`]: a fixed, config-backed table for tests and local runs.
//! - [`ConsulServiceRegistry`]: queries a Consul agent's health endpoint for passing instances.
//!
//! [`InstanceSelector`] picks one instance out of a resolved list.

mod consul;
mod static_registry;

pub use consul::ConsulServiceRegistry;
pub use static_registry::StaticServiceRegistry;

use crate::error::DiscoveryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One addressable instance of a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

fn default_scheme() -> String {
    "http".to_string()
}

impl ServiceInstance {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            scheme: default_scheme(),
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Base URI of the instance, e.g. `http://10.0.0.7:8080`.
    pub fn uri(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl fmt::Display for ServiceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

/// Resolves logical service names to instances.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Returns the instances currently registered under `service_name`.
    ///
    /// # Errors
    ///
    /// Only when the registry itself cannot be reached or answers garbage. Unknown services
    /// resolve to an empty list.
    async fn resolve(&self, service_name: &str) -> Result<Vec<ServiceInstance>, DiscoveryError>;
}

/// How [`InstanceSelector`] chooses among resolved instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Always the first instance in the registry's order.
    #[default]
    First,
    /// The n-th selection picks index `n mod len`.
    RoundRobin,
}

/// Picks one instance per call according to a [`SelectionPolicy`].
#[derive(Debug, Default)]
pub struct InstanceSelector {
    policy: SelectionPolicy,
    cursor: AtomicUsize,
}

impl InstanceSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// `None` when `instances` is empty.
    pub fn select<'a>(&self, instances: &'a [ServiceInstance]) -> Option<&'a ServiceInstance> {
        if instances.is_empty() {
            return None;
        }
        match self.policy {
            SelectionPolicy::First => instances.first(),
            SelectionPolicy::RoundRobin => {
                let n = self.cursor.fetch_add(1, Ordering::Relaxed);
                instances.get(n % instances.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instances() -> Vec<ServiceInstance> {
        vec![
            ServiceInstance::new("a", 1),
            ServiceInstance::new("b", 2),
            ServiceInstance::new("c", 3),
        ]
    }

    #[test]
    fn test_uri_uses_scheme_host_and_port() {
        assert_eq!(ServiceInstance::new("10.0.0.7", 8080).uri(), "http://10.0.0.7:8080");
        assert_eq!(
            ServiceInstance::new("customers.internal", 443)
                .with_scheme("https")
                .to_string(),
            "https://customers.internal:443"
        );
    }

    #[test]
    fn test_scheme_defaults_to_http_when_deserialized() {
        let instance: ServiceInstance =
            serde_json::from_str(r#"{"host":"localhost","port":8080}"#).unwrap();
        assert_eq!(instance.scheme, "http");
    }

    #[test]
    fn test_first_policy_always_picks_first() {
        let selector = InstanceSelector::default();
        let instances = instances();
        for _ in 0..3 {
            assert_eq!(selector.select(&instances).unwrap().host, "a");
        }
    }

    #[test]
    fn test_round_robin_cycles_through_instances() {
        let selector = InstanceSelector::new(SelectionPolicy::RoundRobin);
        let instances = instances();
        let picked: Vec<_> = (0..4)
            .map(|_| selector.select(&instances).unwrap().host.clone())
            .collect();
        assert_eq!(picked, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_empty_list_selects_nothing() {
        assert!(InstanceSelector::new(SelectionPolicy::RoundRobin)
            .select(&[])
            .is_none());
        assert!(InstanceSelector::default().select(&[]).is_none());
    }
}
