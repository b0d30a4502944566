use crate::clients::{CustomerClient, HttpCustomerClient};
use crate::config::{ConfigError, DiscoverySettings, Settings};
use crate::service::{OrderService, OrderServiceImpl, ORDERS_BY_CUSTOMER};
use crate::store::{OrderRepository, OrderStore, OrderStoreClient};
use resilience::{
    ConsulServiceRegistry, ResilientInvoker, ServiceRegistry, StaticServiceRegistry, WorkerPool,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Background task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Owns the running order service and its background tasks.
///
/// `OrderSystem` is responsible for:
/// - **Wiring**: store actor, `ordersByCustomer` bulkhead, service registry, customer client
/// - **Lifecycle**: spawning the store actor and the worker pool, and stopping them again
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::new(&Settings::load()?)?;
/// system.order_service.save_order(Order::new("c1", "o1", "NEW")).await?;
/// let orders = system.order_service.get_orders_by_customer_id("c1").await;
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    pub order_service: Arc<dyn OrderService>,

    /// Direct access to storage, e.g. for seeding.
    pub order_store: OrderStoreClient,

    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    /// Builds every component from `settings` and starts the background tasks.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let (store, order_store) = OrderStore::new(settings.store.buffer_size);

        let command = &settings.orders_by_customer;
        let (pool, bulkhead) = WorkerPool::new(ORDERS_BY_CUSTOMER, command.bulkhead())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let invoker = ResilientInvoker::new(ORDERS_BY_CUSTOMER, bulkhead, command.timeout());

        let registry = build_registry(&settings.discovery)?;
        let http = reqwest::Client::builder()
            .timeout(settings.customer_service.request_timeout())
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {e}")))?;
        let customers: Arc<dyn CustomerClient> = Arc::new(
            HttpCustomerClient::new(registry, http)
                .with_service_name(&settings.customer_service.service_name)
                .with_selection(settings.customer_service.selection),
        );

        let repository: Arc<dyn OrderRepository> = Arc::new(order_store.clone());
        let order_service = Arc::new(OrderServiceImpl::new(repository, customers, invoker));

        let store_handle = tokio::spawn(store.run());
        let pool_handle = tokio::spawn(pool.run());
        info!(
            core_size = command.core_size,
            max_queue_size = command.max_queue_size,
            timeout_ms = command.timeout_ms,
            "Order system started"
        );

        Ok(Self {
            order_service,
            order_store,
            handles: vec![store_handle, pool_handle],
        })
    }

    /// Drops the service and the store client, then waits for the store actor and the
    /// worker pool to finish.
    ///
    /// Waits indefinitely if a clone of `order_service` is still alive elsewhere.
    pub async fn shutdown(self) -> Result<(), LifecycleError> {
        info!("Shutting down order system...");

        drop(self.order_service);
        drop(self.order_store);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Background task failed");
                return Err(e.into());
            }
        }

        info!("Order system shutdown complete.");
        Ok(())
    }
}

fn build_registry(discovery: &DiscoverySettings) -> Result<Arc<dyn ServiceRegistry>, ConfigError> {
    match discovery {
        DiscoverySettings::Static { services } => {
            info!(services = services.len(), "Using static service registry");
            Ok(Arc::new(StaticServiceRegistry::new(services.clone())))
        }
        DiscoverySettings::Consul { base_url } => {
            info!(%base_url, "Using Consul service registry");
            let registry = ConsulServiceRegistry::new(base_url)
                .map_err(|e| ConfigError::Invalid(format!("discovery: {e}")))?;
            Ok(Arc::new(registry))
        }
    }
}
