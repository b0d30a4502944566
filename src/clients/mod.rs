//! # Remote Clients
//!
//! Clients for services this one depends on. Each exposes a trait so the service layer can
//! be tested with stubs.

mod customer_client;
mod error;

pub use customer_client::{CustomerClient, HttpCustomerClient, DEFAULT_SERVICE_NAME};
pub use error::CustomerError;
