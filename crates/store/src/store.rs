//! The persistence trait consumed by the checkout workflow.

use async_trait::async_trait;
use common::{OrderId, ProductId, UserId};
use domain::{Order, Payment, Product};

use crate::Result;
use crate::query::{Page, PageRequest};

/// CRUD and query operations over products, orders and payments.
///
/// Implementations must make [`update_product`](CommerceStore::update_product)
/// atomic with respect to the expected-version guard: at most one concurrent
/// writer wins a given version, losers observe
/// [`StoreError::VersionConflict`](crate::StoreError::VersionConflict).
#[async_trait]
pub trait CommerceStore: Send + Sync {
    // -- Products --

    /// Inserts a new product row.
    async fn insert_product(&self, product: Product) -> Result<()>;

    /// Looks up a product by id.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Returns all product rows.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Replaces a product row iff its stored version equals `expected_version`.
    ///
    /// The replacement row carries the incremented version token.
    async fn update_product(&self, product: Product, expected_version: u64) -> Result<()>;

    // -- Orders --

    /// Inserts or replaces an order row. Orders are never deleted.
    async fn save_order(&self, order: Order) -> Result<()>;

    /// Looks up an order by id.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns a user's orders, most recent first.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Returns one page of all orders, sorted per the request.
    async fn page_orders(&self, request: PageRequest) -> Result<Page<Order>>;

    // -- Payments --

    /// Inserts or replaces a payment row.
    async fn save_payment(&self, payment: Payment) -> Result<()>;

    /// Looks up the payment attempt for an order, if any.
    async fn payment_for_order(&self, order_id: OrderId) -> Result<Option<Payment>>;

    /// Looks up a payment attempt by its idempotency key.
    async fn payment_for_idempotency_key(&self, key: &str) -> Result<Option<Payment>>;
}
