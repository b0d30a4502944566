use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A customer record as served by the customer service.
///
/// Two customers are equal when their ids are equal, whatever their name or address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_address: String,
}

impl Customer {
    pub fn new(
        customer_id: impl Into<String>,
        customer_name: impl Into<String>,
        customer_address: impl Into<String>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            customer_name: customer_name.into(),
            customer_address: customer_address.into(),
        }
    }
}

impl PartialEq for Customer {
    fn eq(&self, other: &Self) -> bool {
        self.customer_id == other.customer_id
    }
}

impl Eq for Customer {}

impl Hash for Customer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.customer_id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_and_hash_use_id_only() {
        let a = Customer::new("26", "Jane", "New York");
        let b = Customer::new("26", "Janet", "Boston");
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b, Customer::new("27", "Jane", "New York")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_parses_customer_service_payload() {
        let customer: Customer = serde_json::from_str(
            r#"{"customerId":"26","customerName":"Jane","customerAddress":"New York"}"#,
        )
        .unwrap();
        assert_eq!(customer.customer_name, "Jane");
        assert_eq!(customer.customer_address, "New York");
    }
}
