use super::{ServiceInstance, ServiceRegistry};
use crate::error::DiscoveryError;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// A fixed name → instances table.
#[derive(Debug, Clone, Default)]
pub struct StaticServiceRegistry {
    services: HashMap<String, Vec<ServiceInstance>>,
}

impl StaticServiceRegistry {
    pub fn new(services: HashMap<String, Vec<ServiceInstance>>) -> Self {
        Self { services }
    }

    /// Adds instances under `service_name`, keeping any already registered.
    pub fn with_service(
        mut self,
        service_name: impl Into<String>,
        instances: impl IntoIterator<Item = ServiceInstance>,
    ) -> Self {
        self.services
            .entry(service_name.into())
            .or_default()
            .extend(instances);
        self
    }
}

#[async_trait]
impl ServiceRegistry for StaticServiceRegistry {
    async fn resolve(&self, service_name: &str) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        let instances = self.services.get(service_name).cloned().unwrap_or_default();
        debug!(service = service_name, count = instances.len(), "Resolved from static table");
        Ok(instances)
    }
}
