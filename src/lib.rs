//! # Order Service
//!
//! Stores orders and enriches them with customer data fetched from a separately deployed
//! customer service.
//!
//! ## Core Components
//!
//! - **[model]**: [`Order`](model::Order) and [`Customer`](model::Customer).
//! - **[store]**: the order store actor and the [`OrderRepository`](store::OrderRepository) trait.
//! - **[clients]**: [`HttpCustomerClient`](clients::HttpCustomerClient), which looks the
//!   customer service up in a [`ServiceRegistry`](resilience::ServiceRegistry) on every call.
//! - **[service]**: [`OrderServiceImpl`](service::OrderServiceImpl), the business-facing API.
//! - **[config]**: layered [`Settings`](config::Settings).
//! - **[lifecycle]**: [`OrderSystem`](lifecycle::OrderSystem), which wires and runs everything.
//!
//! Bulkheads, the resilient invoker and service discovery live in the `resilience` crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use order_service::config::Settings;
//! use order_service::lifecycle::OrderSystem;
//! use order_service::model::{Order, FALLBACK_ORDER_STATUS};
//!
//! #[tokio::main]
//! async fn main() {
//!     let system = OrderSystem::new(&Settings::default()).unwrap();
//!
//!     system
//!         .order_service
//!         .save_order(Order::new("c1", "o1", "NEW"))
//!         .await
//!         .unwrap();
//!     let orders = system.order_service.get_orders_by_customer_id("c1").await;
//!     assert_eq!(orders, vec![Order::new("c1", "o1", "NEW")]);
//!     assert_ne!(orders[0].order_status, FALLBACK_ORDER_STATUS);
//!
//!     system.shutdown().await.unwrap();
//! }
//! ```
//!
//! ## Testing
//!
//! See [`store::mock`] for driving the service against scripted storage and
//! `resilience::mock` for a scripted service registry.

pub mod clients;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod service;
pub mod store;
