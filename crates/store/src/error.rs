//! Store error types.

use common::ProductId;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An expected-version guard did not match the stored row.
    #[error(
        "version conflict on product {product_id}: expected {expected}, actual {actual}"
    )]
    VersionConflict {
        product_id: ProductId,
        expected: u64,
        actual: u64,
    },

    /// A guarded update targeted a product that does not exist.
    #[error("product {0} does not exist")]
    MissingProduct(ProductId),

    /// A product with this id already exists.
    #[error("product {0} already exists")]
    DuplicateProduct(ProductId),
}
