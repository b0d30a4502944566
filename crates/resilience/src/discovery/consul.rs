use super::{ServiceInstance, ServiceRegistry};
use crate::error::DiscoveryError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Resolves instances through a Consul agent's health API.
///
/// Only instances whose health checks are passing are returned. An instance's host is its
/// service address, or the node address when the service did not register one.
#[derive(Debug, Clone)]
pub struct ConsulServiceRegistry {
    base_url: reqwest::Url,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthEntry {
    node: NodeEntry,
    service: ServiceEntry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NodeEntry {
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceEntry {
    #[serde(default)]
    address: String,
    port: u16,
}

impl From<HealthEntry> for ServiceInstance {
    fn from(entry: HealthEntry) -> Self {
        let host = if entry.service.address.is_empty() {
            entry.node.address
        } else {
            entry.service.address
        };
        ServiceInstance::new(host, entry.service.port)
    }
}

impl ConsulServiceRegistry {
    /// `base_url` is the agent's HTTP address, e.g. `http://localhost:8500`.
    pub fn new(base_url: &str) -> Result<Self, DiscoveryError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_QUERY_TIMEOUT)
            .build()
            .map_err(|e| DiscoveryError::Unavailable(e.to_string()))?;
        Self::with_client(base_url, http)
    }

    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, DiscoveryError> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| DiscoveryError::Unavailable(format!("invalid Consul URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DiscoveryError::Unavailable(format!(
                "invalid Consul URL '{base_url}'"
            )));
        }
        Ok(Self { base_url, http })
    }

    fn health_url(&self, service_name: &str) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v1", "health", "service", service_name]);
        }
        url.query_pairs_mut().append_pair("passing", "true");
        url
    }
}

#[async_trait]
impl ServiceRegistry for ConsulServiceRegistry {
    #[instrument(skip(self), fields(consul = %self.base_url))]
    async fn resolve(&self, service_name: &str) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        let response = self
            .http
            .get(self.health_url(service_name))
            .send()
            .await
            .map_err(|e| DiscoveryError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Unavailable(format!(
                "Consul answered {status}"
            )));
        }

        let entries: Vec<HealthEntry> = response
            .json()
            .await
            .map_err(|e| DiscoveryError::InvalidResponse(e.to_string()))?;
        let instances: Vec<ServiceInstance> = entries.into_iter().map(Into::into).collect();
        debug!(count = instances.len(), "Resolved from Consul");
        Ok(instances)
    }
}
