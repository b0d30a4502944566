//! # Order Store
//!
//! Order persistence as an actor: [`OrderStore`] owns the data and runs in its own task,
//! [`OrderStoreClient`] sends it requests and implements [`OrderRepository`]. The service
//! layer only sees the trait.

mod actor;
mod client;
mod error;
mod message;
pub mod mock;
mod repository;

pub use actor::OrderStore;
pub use client::OrderStoreClient;
pub use error::StoreError;
pub use message::{Response, StoreRequest};
pub use repository::OrderRepository;
