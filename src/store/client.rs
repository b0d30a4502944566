use super::{OrderRepository, StoreError, StoreRequest};
use crate::model::Order;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// The *client* half of the order store. Cheap to clone.
#[derive(Clone)]
pub struct OrderStoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl OrderStoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, StoreError>>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }
}

#[async_trait]
impl OrderRepository for OrderStoreClient {
    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        self.request(|respond_to| StoreRequest::FindAll { respond_to })
            .await
    }

    async fn find_by_customer_id(&self, customer_id: &str) -> Result<Vec<Order>, StoreError> {
        let customer_id = customer_id.to_string();
        self.request(|respond_to| StoreRequest::FindByCustomerId {
            customer_id,
            respond_to,
        })
        .await
    }

    async fn find_by_customer_id_and_order_id(
        &self,
        customer_id: &str,
        order_id: &str,
    ) -> Result<Option<Order>, StoreError> {
        let customer_id = customer_id.to_string();
        let order_id = order_id.to_string();
        self.request(|respond_to| StoreRequest::FindByCustomerIdAndOrderId {
            customer_id,
            order_id,
            respond_to,
        })
        .await
    }

    async fn save(&self, order: Order) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Save { order, respond_to })
            .await
    }

    async fn delete_by_id(&self, order_id: &str) -> Result<(), StoreError> {
        let order_id = order_id.to_string();
        self.request(|respond_to| StoreRequest::DeleteById {
            order_id,
            respond_to,
        })
        .await
    }
}
