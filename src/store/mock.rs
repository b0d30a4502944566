//! # Store Test Helpers
//!
//! [`create_mock_store`] hands out a real [`OrderStoreClient`] whose requests land on a
//! receiver owned by the test instead of an [`OrderStore`](super::OrderStore) actor. The test
//! decides when, and whether, each request is answered, which makes slow or failing storage
//! easy to simulate.
//!
//! ```rust
//! use order_service::model::Order;
//! use order_service::store::mock::{create_mock_store, expect_find_by_customer_id};
//! use order_service::store::OrderRepository;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (client, mut requests) = create_mock_store(4);
//!
//!     let responder = tokio::spawn(async move {
//!         let (customer_id, respond_to) = expect_find_by_customer_id(&mut requests).await.unwrap();
//!         assert_eq!(customer_id, "c1");
//!         respond_to.send(Ok(vec![Order::new("c1", "o1", "NEW")])).unwrap();
//!     });
//!
//!     let orders = client.find_by_customer_id("c1").await.unwrap();
//!     assert_eq!(orders.len(), 1);
//!     responder.await.unwrap();
//! }
//! ```

use super::{OrderStoreClient, Response, StoreRequest};
use crate::model::Order;
use tokio::sync::mpsc;

/// Creates a store client and the receiver its requests arrive on.
pub fn create_mock_store(buffer_size: usize) -> (OrderStoreClient, mpsc::Receiver<StoreRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (OrderStoreClient::new(sender), receiver)
}

/// Next request, if it is a `FindAll`.
pub async fn expect_find_all(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<Response<Vec<Order>>> {
    match receiver.recv().await {
        Some(StoreRequest::FindAll { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Next request, if it is a `FindByCustomerId`.
pub async fn expect_find_by_customer_id(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(String, Response<Vec<Order>>)> {
    match receiver.recv().await {
        Some(StoreRequest::FindByCustomerId {
            customer_id,
            respond_to,
        }) => Some((customer_id, respond_to)),
        _ => None,
    }
}

/// Next request, if it is a `FindByCustomerIdAndOrderId`.
pub async fn expect_find_one(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(String, String, Response<Option<Order>>)> {
    match receiver.recv().await {
        Some(StoreRequest::FindByCustomerIdAndOrderId {
            customer_id,
            order_id,
            respond_to,
        }) => Some((customer_id, order_id, respond_to)),
        _ => None,
    }
}

/// Next request, if it is a `Save`.
pub async fn expect_save(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Order, Response<()>)> {
    match receiver.recv().await {
        Some(StoreRequest::Save { order, respond_to }) => Some((order, respond_to)),
        _ => None,
    }
}

/// Next request, if it is a `DeleteById`.
pub async fn expect_delete(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(String, Response<()>)> {
    match receiver.recv().await {
        Some(StoreRequest::DeleteById {
            order_id,
            respond_to,
        }) => Some((order_id, respond_to)),
        _ => None,
    }
}
