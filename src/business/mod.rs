pub mod auth_service;
pub mod consumer_service;
pub mod order_service;
pub mod validation;

pub use auth_service::*;
pub use consumer_service::*;
pub use order_service::*;
pub use validation::*;
