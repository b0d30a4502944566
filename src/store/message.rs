//! # Store Messages
//!
//! Requests sent from [`OrderStoreClient`](super::OrderStoreClient) to
//! [`OrderStore`](super::OrderStore). Every request carries the oneshot sender its reply goes to.

use super::StoreError;
use crate::model::Order;
use tokio::sync::oneshot;

pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum StoreRequest {
    FindAll {
        respond_to: Response<Vec<Order>>,
    },
    FindByCustomerId {
        customer_id: String,
        respond_to: Response<Vec<Order>>,
    },
    FindByCustomerIdAndOrderId {
        customer_id: String,
        order_id: String,
        respond_to: Response<Option<Order>>,
    },
    Save {
        order: Order,
        respond_to: Response<()>,
    },
    DeleteById {
        order_id: String,
        respond_to: Response<()>,
    },
}
