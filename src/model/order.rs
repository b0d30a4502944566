use serde::{Deserialize, Serialize};

/// Status carried by the placeholder order returned when orders cannot be listed.
pub const FALLBACK_ORDER_STATUS: &str = "No orders available";

/// An order, identified by `(customer_id, order_id)`.
///
/// `customer_name` and `customer_address` are filled in from the customer service at read
/// time and are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub order_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,
}

impl Order {
    pub fn new(
        customer_id: impl Into<String>,
        order_id: impl Into<String>,
        order_status: impl Into<String>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            order_id: order_id.into(),
            order_status: order_status.into(),
            ..Self::default()
        }
    }

    /// The order listed in place of a customer's orders when the lookup falls back.
    pub fn placeholder() -> Self {
        Self::default().with_order_status(FALLBACK_ORDER_STATUS)
    }

    pub fn with_order_status(mut self, order_status: impl Into<String>) -> Self {
        self.order_status = order_status.into();
        self
    }

    pub fn with_customer_name(mut self, customer_name: impl Into<String>) -> Self {
        self.customer_name = Some(customer_name.into());
        self
    }

    pub fn with_customer_address(mut self, customer_address: impl Into<String>) -> Self {
        self.customer_address = Some(customer_address.into());
        self
    }

    pub fn key(&self) -> (String, String) {
        (self.customer_id.clone(), self.order_id.clone())
    }

    pub fn is_enriched(&self) -> bool {
        self.customer_name.is_some() || self.customer_address.is_some()
    }

    /// The order as it is persisted: enrichment removed.
    pub fn without_enrichment(mut self) -> Self {
        self.customer_name = None;
        self.customer_address = None;
        self
    }
}
