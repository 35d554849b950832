//! Inventory stock ledger.
//!
//! The ledger owns per-product stock bookkeeping. Reads for validation are
//! advisory and may come from the cache; only the version-guarded
//! compare-and-swap in [`InventoryLedger::deduct_stock`] is authoritative,
//! because two concurrent orders can both pass validation against the same
//! remaining unit before either deducts.

use common::ProductId;
use domain::Product;
use store::{CommerceStore, ProductCache, StoreError};

use crate::error::{CheckoutError, Result};

/// Bounded attempts for the read-modify-write loop on stock mutations.
const MAX_CAS_ATTEMPTS: u32 = 3;

/// Default threshold for the low-stock report.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Stock-quantity bookkeeping over the product store.
#[derive(Clone)]
pub struct InventoryLedger<S> {
    store: S,
    cache: ProductCache,
}

impl<S: CommerceStore> InventoryLedger<S> {
    /// Creates a ledger over the given store with an empty read cache.
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: ProductCache::new(),
        }
    }

    /// Reads a product through the cache, populating it on miss.
    ///
    /// Cached rows may be stale; callers needing authoritative state go
    /// through the CAS mutation path instead.
    async fn cached_product(&self, product_id: ProductId) -> Result<Product> {
        if let Some(product) = self.cache.get(product_id).await {
            return Ok(product);
        }
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("Product", product_id))?;
        self.cache.put(product.clone()).await;
        Ok(product)
    }

    /// Advisory stock check; no side effects.
    pub async fn validate_stock(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        let product = self.cached_product(product_id).await?;
        if quantity > product.stock_quantity {
            return Err(CheckoutError::InsufficientStock {
                product: product.name,
                requested: quantity,
                available: product.stock_quantity,
            });
        }
        Ok(())
    }

    /// Atomically decrements stock by `quantity`.
    ///
    /// The decrement is a version-guarded read-modify-write retried up to
    /// [`MAX_CAS_ATTEMPTS`] times; contention past that surfaces
    /// [`CheckoutError::Conflict`]. Insufficient stock at the moment of the
    /// guarded write surfaces [`CheckoutError::InsufficientStock`].
    #[tracing::instrument(skip(self))]
    pub async fn deduct_stock(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        self.mutate_stock(product_id, |product| {
            if quantity > product.stock_quantity {
                return Err(CheckoutError::InsufficientStock {
                    product: product.name.clone(),
                    requested: quantity,
                    available: product.stock_quantity,
                });
            }
            Ok(product.stock_quantity - quantity)
        })
        .await?;
        metrics::counter!("stock_deductions_total").increment(1);
        Ok(())
    }

    /// Compensating increment, used when a later checkout step fails after
    /// stock was already deducted. Sets availability back to true. The
    /// increment saturates at `u32::MAX` instead of overflowing.
    #[tracing::instrument(skip(self))]
    pub async fn restore_stock(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        self.mutate_stock(product_id, |product| {
            Ok(product.stock_quantity.saturating_add(quantity))
        })
        .await?;
        metrics::counter!("stock_restores_total").increment(1);
        Ok(())
    }

    /// Administrative absolute overwrite of a product's stock.
    #[tracing::instrument(skip(self))]
    pub async fn set_stock(&self, product_id: ProductId, new_quantity: u32) -> Result<Product> {
        let updated = self
            .mutate_stock(product_id, |_| Ok(new_quantity))
            .await?;
        tracing::info!(%product_id, new_quantity, "stock overwritten");
        Ok(updated)
    }

    /// Products with stock below `threshold` (default 10), lowest first.
    pub async fn low_stock(&self, threshold: Option<u32>) -> Result<Vec<Product>> {
        let threshold = threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        let mut products: Vec<_> = self
            .store
            .list_products()
            .await?
            .into_iter()
            .filter(|p| p.stock_quantity < threshold)
            .collect();
        products.sort_by_key(|p| p.stock_quantity);
        Ok(products)
    }

    /// Version-guarded read-modify-write loop shared by all stock mutations.
    ///
    /// `next_quantity` computes the new stock from the freshly read row and
    /// may reject the mutation. A lost compare-and-swap re-reads and retries
    /// against the refreshed version; exhaustion surfaces `Conflict`.
    async fn mutate_stock<F>(&self, product_id: ProductId, next_quantity: F) -> Result<Product>
    where
        F: Fn(&Product) -> Result<u32>,
    {
        for attempt in 0..MAX_CAS_ATTEMPTS {
            let product = self
                .store
                .get_product(product_id)
                .await?
                .ok_or_else(|| CheckoutError::not_found("Product", product_id))?;

            let updated = product.with_stock(next_quantity(&product)?);
            match self
                .store
                .update_product(updated.clone(), product.version)
                .await
            {
                Ok(()) => {
                    self.cache.invalidate_all().await;
                    return Ok(updated);
                }
                Err(StoreError::VersionConflict { actual, .. }) => {
                    tracing::debug!(
                        %product_id,
                        attempt,
                        actual_version = actual,
                        "stock CAS lost, retrying"
                    );
                    continue;
                }
                Err(StoreError::MissingProduct(id)) => {
                    return Err(CheckoutError::not_found("Product", id));
                }
                Err(e) => return Err(e.into()),
            }
        }

        metrics::counter!("stock_cas_exhausted_total").increment(1);
        Err(CheckoutError::Conflict(product_id))
    }
}
