use super::CustomerError;
use crate::model::Customer;
use async_trait::async_trait;
use resilience::{InstanceSelector, SelectionPolicy, ServiceInstance, ServiceRegistry};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const DEFAULT_SERVICE_NAME: &str = "customerservice";

/// Fetches customer records from the customer service.
#[async_trait]
pub trait CustomerClient: Send + Sync {
    async fn get_customer(&self, customer_id: &str) -> Result<Customer, CustomerError>;
}

/// [`CustomerClient`] over HTTP, with the target instance looked up on every call.
///
/// A call resolves the service name, picks one instance, and issues
/// `GET {instance}/v1/customers/{customer_id}`. There is no retry.
pub struct HttpCustomerClient {
    registry: Arc<dyn ServiceRegistry>,
    selector: InstanceSelector,
    service_name: String,
    http: reqwest::Client,
}

impl HttpCustomerClient {
    pub fn new(registry: Arc<dyn ServiceRegistry>, http: reqwest::Client) -> Self {
        Self {
            registry,
            selector: InstanceSelector::default(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            http,
        }
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    pub fn with_selection(mut self, policy: SelectionPolicy) -> Self {
        self.selector = InstanceSelector::new(policy);
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn customer_url(
        instance: &ServiceInstance,
        customer_id: &str,
    ) -> Result<reqwest::Url, CustomerError> {
        let mut url = reqwest::Url::parse(&instance.uri())
            .map_err(|e| CustomerError::RemoteCallFailed(format!("bad instance {instance}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| CustomerError::RemoteCallFailed(format!("bad instance {instance}")))?
            .pop_if_empty()
            .extend(["v1", "customers", customer_id]);
        Ok(url)
    }
}

#[async_trait]
impl CustomerClient for HttpCustomerClient {
    #[instrument(skip(self), fields(service = %self.service_name))]
    async fn get_customer(&self, customer_id: &str) -> Result<Customer, CustomerError> {
        let instances = self.registry.resolve(&self.service_name).await?;
        let instance = self
            .selector
            .select(&instances)
            .ok_or_else(|| CustomerError::NoInstanceAvailable(self.service_name.clone()))?;
        let url = Self::customer_url(instance, customer_id)?;
        debug!(%url, "Fetching customer");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CustomerError::RemoteCallFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "Customer service returned an error status");
            return Err(CustomerError::RemoteCallFailed(format!(
                "{url} answered {status}"
            )));
        }

        response
            .json::<Customer>()
            .await
            .map_err(|e| CustomerError::RemoteCallFailed(format!("malformed customer body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_url_encodes_id_segment() {
        let instance = ServiceInstance::new("localhost", 8080);
        let url = HttpCustomerClient::customer_url(&instance, "a/b c").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v1/customers/a%2Fb%20c");
    }

    #[test]
    fn test_customer_url_uses_instance_scheme() {
        let instance = ServiceInstance::new("customers.internal", 8443).with_scheme("https");
        let url = HttpCustomerClient::customer_url(&instance, "26").unwrap();
        assert_eq!(url.as_str(), "https://customers.internal:8443/v1/customers/26");
    }
}
