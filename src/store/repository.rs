use super::StoreError;
use crate::model::Order;
use async_trait::async_trait;

/// The storage operations the order service needs.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Order>, StoreError>;

    async fn find_by_customer_id(&self, customer_id: &str) -> Result<Vec<Order>, StoreError>;

    async fn find_by_customer_id_and_order_id(
        &self,
        customer_id: &str,
        order_id: &str,
    ) -> Result<Option<Order>, StoreError>;

    /// Inserts or replaces the order stored under the same `(customer_id, order_id)`.
    async fn save(&self, order: Order) -> Result<(), StoreError>;

    /// Removes every order with `order_id`. Succeeds when there is none.
    async fn delete_by_id(&self, order_id: &str) -> Result<(), StoreError>;
}
