use crate::clients::CustomerError;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Order '{order_id}' of customer '{customer_id}' not found")]
    NotFound {
        customer_id: String,
        order_id: String,
    },
    #[error("Customer lookup failed: {0}")]
    Customer(#[from] CustomerError),
    #[error("Storage failed: {0}")]
    Store(#[from] StoreError),
}
