//! # Order Service
//!
//! The business-facing API. It reads and writes orders through an [`OrderRepository`] and
//! enriches single-order reads with customer data from a [`CustomerClient`].
//!
//! Which operations are guarded:
//!
//! | Operation | Path | On failure |
//! |-----------|------|------------|
//! | [`get_all_orders`](OrderService::get_all_orders) | storage | error |
//! | [`get_orders_by_customer_id`](OrderService::get_orders_by_customer_id) | storage behind the invoker | placeholder order |
//! | [`get_order`](OrderService::get_order) | storage, then customer service | error |
//! | [`save_order`](OrderService::save_order) | storage | error |
//! | [`delete_order`](OrderService::delete_order) | storage | error |
//!
//! `get_orders_by_customer_id` runs a local storage read through the same bulkhead, timeout
//! and fallback used for remote calls, so here they bound storage latency rather than
//! network failures. Only genuinely remote operations need that treatment.
// TODO: move the invoker to the customer lookup once callers no longer rely on the
// placeholder order for slow storage.

mod error;

pub use error::OrderError;

use crate::clients::CustomerClient;
use crate::model::Order;
use crate::store::OrderRepository;
use async_trait::async_trait;
use resilience::{CallOutcome, ResilientInvoker};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Name of the bulkhead guarding per-customer order listings.
pub const ORDERS_BY_CUSTOMER: &str = "ordersByCustomer";

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Every stored order, without enrichment.
    async fn get_all_orders(&self) -> Result<Vec<Order>, OrderError>;

    /// The customer's orders, or a single placeholder order whose status is
    /// [`FALLBACK_ORDER_STATUS`](crate::model::FALLBACK_ORDER_STATUS) when the lookup fails,
    /// times out or is rejected. Never fails.
    async fn get_orders_by_customer_id(&self, customer_id: &str) -> Vec<Order>;

    /// One order, enriched with the customer's name and address.
    ///
    /// # Errors
    ///
    /// [`OrderError::NotFound`] when no such order is stored; [`OrderError::Customer`] when
    /// the customer cannot be fetched.
    async fn get_order(&self, customer_id: &str, order_id: &str) -> Result<Order, OrderError>;

    async fn save_order(&self, order: Order) -> Result<(), OrderError>;

    /// Deleting an id nobody has is not an error.
    async fn delete_order(&self, order_id: &str) -> Result<(), OrderError>;
}

pub struct OrderServiceImpl {
    repository: Arc<dyn OrderRepository>,
    customers: Arc<dyn CustomerClient>,
    orders_by_customer: ResilientInvoker,
}

impl OrderServiceImpl {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        customers: Arc<dyn CustomerClient>,
        orders_by_customer: ResilientInvoker,
    ) -> Self {
        Self {
            repository,
            customers,
            orders_by_customer,
        }
    }

    /// Like [`OrderService::get_orders_by_customer_id`], but reports whether the orders
    /// are real or the fallback.
    #[instrument(skip(self))]
    pub async fn orders_by_customer_outcome(&self, customer_id: &str) -> CallOutcome<Vec<Order>> {
        let repository = Arc::clone(&self.repository);
        self.orders_by_customer
            .execute_with_default_timeout(
                customer_id.to_string(),
                move |customer_id| async move {
                    repository.find_by_customer_id(&customer_id).await
                },
                |_| vec![Order::placeholder()],
            )
            .await
    }
}

#[async_trait]
impl OrderService for OrderServiceImpl {
    #[instrument(skip(self))]
    async fn get_all_orders(&self) -> Result<Vec<Order>, OrderError> {
        let orders = self.repository.find_all().await?;
        debug!(count = orders.len(), "Listed all orders");
        Ok(orders)
    }

    async fn get_orders_by_customer_id(&self, customer_id: &str) -> Vec<Order> {
        self.orders_by_customer_outcome(customer_id)
            .await
            .into_inner()
    }

    #[instrument(skip(self))]
    async fn get_order(&self, customer_id: &str, order_id: &str) -> Result<Order, OrderError> {
        let order = self
            .repository
            .find_by_customer_id_and_order_id(customer_id, order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound {
                customer_id: customer_id.to_string(),
                order_id: order_id.to_string(),
            })?;

        let customer = self.customers.get_customer(customer_id).await?;
        debug!(customer_id, "Enriched order with customer data");
        Ok(order
            .with_customer_name(customer.customer_name)
            .with_customer_address(customer.customer_address))
    }

    #[instrument(skip(self, order), fields(customer_id = %order.customer_id, order_id = %order.order_id))]
    async fn save_order(&self, order: Order) -> Result<(), OrderError> {
        debug!(?order, "save_order called");
        self.repository.save(order).await?;
        info!("Order saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_order(&self, order_id: &str) -> Result<(), OrderError> {
        self.repository.delete_by_id(order_id).await?;
        info!("Order deleted");
        Ok(())
    }
}
