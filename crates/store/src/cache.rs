//! Coarse product read cache.
//!
//! Invalidation policy is deliberately blunt: any successful stock mutation
//! clears the whole cache. Write volume on inventory is low enough that
//! per-id eviction is not worth the bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;

use common::ProductId;
use domain::Product;
use tokio::sync::RwLock;

/// Shared read view over product rows.
#[derive(Clone, Default)]
pub struct ProductCache {
    inner: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl ProductCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached product, if present.
    pub async fn get(&self, id: ProductId) -> Option<Product> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Caches a product row.
    pub async fn put(&self, product: Product) {
        self.inner.write().await.insert(product.id, product);
    }

    /// Drops every cached entry.
    pub async fn invalidate_all(&self) {
        self.inner.write().await.clear();
    }

    /// Returns the number of cached entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
