//! Persistence layer for the commerce backend.
//!
//! Exposes a single async [`CommerceStore`] trait covering products, orders
//! and payments, plus an in-memory engine used by the server and tests.
//! Product updates are guarded by an expected-version compare-and-swap;
//! everything else is plain CRUD and paged queries.

pub mod cache;
pub mod error;
pub mod memory;
pub mod query;
pub mod store;

pub use cache::ProductCache;
pub use error::StoreError;
pub use memory::InMemoryCommerceStore;
pub use query::{Page, PageRequest, SortDirection, SortField};
pub use store::CommerceStore;

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;
