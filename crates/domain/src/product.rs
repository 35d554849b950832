//! Catalog product with stock accounting.

use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A catalog product carrying its inventory record.
///
/// `version` is an optimistic-concurrency token: it increments on every
/// successful stock mutation and guards compare-and-swap updates in the
/// store. Invariant: `available == (stock_quantity > 0)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Money,
    pub stock_quantity: u32,
    pub available: bool,
    pub version: u64,
}

impl Product {
    /// Creates a new product at version 0 with the given starting stock.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price: Money,
        stock_quantity: u32,
    ) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            category: category.into(),
            price,
            stock_quantity,
            available: stock_quantity > 0,
            version: 0,
        }
    }

    /// Returns a copy with stock set to `quantity`, availability refreshed
    /// and the version token bumped.
    pub fn with_stock(&self, quantity: u32) -> Self {
        let mut next = self.clone();
        next.stock_quantity = quantity;
        next.available = quantity > 0;
        next.version = self.version + 1;
        next
    }
}
