//! Checkout error taxonomy.

use common::ProductId;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by the checkout workflow and its collaborators.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Requested quantity exceeds the product's current stock.
    #[error(
        "insufficient stock for '{product}': requested {requested}, available {available}"
    )]
    InsufficientStock {
        product: String,
        requested: u32,
        available: u32,
    },

    /// Lost the optimistic stock update race after bounded retries.
    #[error("concurrent stock update on product {0} exhausted retries")]
    Conflict(ProductId),

    /// The payment processor declined the charge. The failed attempt is
    /// still recorded.
    #[error("payment failed: {0}")]
    PaymentFailed(String),

    /// The principal may not access the requested resource.
    #[error("permission denied")]
    PermissionDenied,

    /// The order request itself is malformed (no lines, zero quantity).
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// Storage failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CheckoutError {
    /// Builds a `NotFound` error for the given entity kind and id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CheckoutError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
