pub mod order_system;

pub use order_system::*;
