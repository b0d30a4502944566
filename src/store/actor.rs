//! # Order Store Actor
//!
//! The *server* half of the order store. It owns every stored order and processes
//! [`StoreRequest`]s one at a time, so the map needs no lock.

use super::{OrderStoreClient, StoreRequest};
use crate::model::Order;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info};

type OrderKey = (String, String);

/// In-memory order storage keyed by `(customer_id, order_id)`.
///
/// Lists come back in key order. Saving an order replaces any order with the same key and
/// drops its enrichment fields.
pub struct OrderStore {
    receiver: mpsc::Receiver<StoreRequest>,
    orders: BTreeMap<OrderKey, Order>,
}

impl OrderStore {
    /// Creates the store and the client that talks to it.
    ///
    /// `buffer_size` bounds the request channel; callers wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, OrderStoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let store = Self {
            receiver,
            orders: BTreeMap::new(),
        };
        (store, OrderStoreClient::new(sender))
    }

    /// Processes requests until every client has been dropped.
    pub async fn run(mut self) {
        info!("Order store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::FindAll { respond_to } => {
                    let orders: Vec<Order> = self.orders.values().cloned().collect();
                    debug!(count = orders.len(), "FindAll");
                    let _ = respond_to.send(Ok(orders));
                }
                StoreRequest::FindByCustomerId {
                    customer_id,
                    respond_to,
                } => {
                    let orders = self.orders_of(&customer_id);
                    debug!(%customer_id, count = orders.len(), "FindByCustomerId");
                    let _ = respond_to.send(Ok(orders));
                }
                StoreRequest::FindByCustomerIdAndOrderId {
                    customer_id,
                    order_id,
                    respond_to,
                } => {
                    let order = self.orders.get(&(customer_id, order_id)).cloned();
                    debug!(found = order.is_some(), "FindByCustomerIdAndOrderId");
                    let _ = respond_to.send(Ok(order));
                }
                StoreRequest::Save { order, respond_to } => {
                    let order = order.without_enrichment();
                    let key = order.key();
                    let replaced = self.orders.insert(key, order).is_some();
                    info!(replaced, size = self.orders.len(), "Saved");
                    let _ = respond_to.send(Ok(()));
                }
                StoreRequest::DeleteById {
                    order_id,
                    respond_to,
                } => {
                    let before = self.orders.len();
                    self.orders.retain(|(_, id), _| *id != order_id);
                    let removed = before - self.orders.len();
                    info!(%order_id, removed, size = self.orders.len(), "Deleted");
                    let _ = respond_to.send(Ok(()));
                }
            }
        }

        info!(size = self.orders.len(), "Order store shutdown");
    }

    fn orders_of(&self, customer_id: &str) -> Vec<Order> {
        self.orders
            .range((customer_id.to_string(), String::new())..)
            .take_while(|((cid, _), _)| cid == customer_id)
            .map(|(_, order)| order.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OrderRepository;

    fn start() -> OrderStoreClient {
        let (store, client) = OrderStore::new(8);
        tokio::spawn(store.run());
        client
    }

    #[tokio::test]
    async fn test_save_then_find_by_composite_key() {
        let store = start();
        store.save(Order::new("c1", "o1", "NEW")).await.unwrap();

        let found = store.find_by_customer_id_and_order_id("c1", "o1").await.unwrap();
        assert_eq!(found, Some(Order::new("c1", "o1", "NEW")));
        assert_eq!(store.find_by_customer_id_and_order_id("c2", "o1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_strips_enrichment_and_upserts() {
        let store = start();
        store
            .save(Order::new("c1", "o1", "NEW").with_customer_name("Jane"))
            .await
            .unwrap();
        store.save(Order::new("c1", "o1", "SHIPPED")).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all, vec![Order::new("c1", "o1", "SHIPPED")]);
    }

    #[tokio::test]
    async fn test_find_by_customer_returns_only_that_customer_in_order() {
        let store = start();
        for (cid, oid) in [("c2", "o9"), ("c1", "o2"), ("c10", "o1"), ("c1", "o1")] {
            store.save(Order::new(cid, oid, "NEW")).await.unwrap();
        }

        let orders = store.find_by_customer_id("c1").await.unwrap();
        let ids: Vec<_> = orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "o2"]);
        assert!(store.find_by_customer_id("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_every_order_with_that_id() {
        let store = start();
        store.save(Order::new("c1", "o1", "NEW")).await.unwrap();
        store.save(Order::new("c2", "o1", "NEW")).await.unwrap();
        store.save(Order::new("c2", "o2", "NEW")).await.unwrap();

        store.delete_by_id("o1").await.unwrap();
        assert_eq!(store.find_all().await.unwrap(), vec![Order::new("c2", "o2", "NEW")]);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() {
        let store = start();
        store.save(Order::new("c1", "o1", "NEW")).await.unwrap();

        store.delete_by_id("missing").await.unwrap();
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_client_reports_closed_store() {
        let (store, client) = OrderStore::new(1);
        drop(store);
        assert_eq!(
            client.find_all().await,
            Err(crate::store::StoreError::ActorClosed)
        );
    }
}
