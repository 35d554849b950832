//! In-memory store implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, PaymentId, ProductId, UserId};
use domain::{Order, Payment, Product};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::query::{Page, PageRequest, SortDirection, SortField};
use crate::store::CommerceStore;
use crate::Result;

/// In-memory commerce store backed by `tokio::sync::RwLock` maps.
///
/// The version guard on product updates is checked and applied under a
/// single write lock, giving the same atomicity as a conditional UPDATE.
#[derive(Clone, Default)]
pub struct InMemoryCommerceStore {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
}

impl InMemoryCommerceStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of order rows.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Returns the total number of payment rows.
    pub async fn payment_count(&self) -> usize {
        self.payments.read().await.len()
    }
}

#[async_trait]
impl CommerceStore for InMemoryCommerceStore {
    async fn insert_product(&self, product: Product) -> Result<()> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(StoreError::DuplicateProduct(product.id));
        }
        products.insert(product.id, product);
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn update_product(&self, product: Product, expected_version: u64) -> Result<()> {
        let mut products = self.products.write().await;
        let current = products
            .get(&product.id)
            .ok_or(StoreError::MissingProduct(product.id))?;

        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                product_id: product.id,
                expected: expected_version,
                actual: current.version,
            });
        }

        products.insert(product.id, product);
        Ok(())
    }

    async fn save_order(&self, order: Order) -> Result<()> {
        self.orders.write().await.insert(order.id, order);
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut result: Vec<_> = orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn page_orders(&self, request: PageRequest) -> Result<Page<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<_> = orders.values().cloned().collect();

        all.sort_by(|a, b| {
            let ordering = match request.sort_field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::TotalAmount => a.total_amount.cmp(&b.total_amount),
                SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            };
            match request.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        Ok(Page::from_sorted(all, request))
    }

    async fn save_payment(&self, payment: Payment) -> Result<()> {
        self.payments.write().await.insert(payment.id, payment);
        Ok(())
    }

    async fn payment_for_order(&self, order_id: OrderId) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.values().find(|p| p.order_id == order_id).cloned())
    }

    async fn payment_for_idempotency_key(&self, key: &str) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .find(|p| p.idempotency_key == key)
            .cloned())
    }
}
