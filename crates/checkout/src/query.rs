//! Read-side order queries with visibility rules.

use common::{OrderId, Principal};
use domain::Order;
use store::{CommerceStore, Page, PageRequest};

use crate::error::{CheckoutError, Result};

/// Thin read-side wrapper over persisted orders.
///
/// Owns the visibility rule shared with the write path: an order is visible
/// to its owner and to admins. Not separately stateful.
#[derive(Clone)]
pub struct OrderQueries<S> {
    store: S,
}

impl<S: CommerceStore> OrderQueries<S> {
    /// Creates a query service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetches one order, enforcing visibility.
    ///
    /// Existence is checked first: `NotFound` takes precedence over
    /// `PermissionDenied` when the order does not exist.
    pub async fn get_order(&self, order_id: OrderId, principal: &Principal) -> Result<Order> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("Order", order_id))?;

        if !principal.can_view(order.user_id) {
            return Err(CheckoutError::PermissionDenied);
        }
        Ok(order)
    }

    /// Returns the principal's own orders, most recent first.
    pub async fn orders_for_user(&self, principal: &Principal) -> Result<Vec<Order>> {
        Ok(self.store.orders_for_user(principal.user_id).await?)
    }

    /// Returns one page of all orders. Administrative only.
    pub async fn all_orders(
        &self,
        principal: &Principal,
        request: PageRequest,
    ) -> Result<Page<Order>> {
        if !principal.is_admin() {
            return Err(CheckoutError::PermissionDenied);
        }
        Ok(self.store.page_orders(request).await?)
    }
}
