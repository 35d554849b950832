//! Shared types used across the commerce backend.

pub mod principal;
pub mod types;

pub use principal::{Principal, Role};
pub use types::{OrderId, PaymentId, ProductId, UserId};
