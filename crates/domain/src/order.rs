//! Order aggregate and its status machine.

use chrono::{DateTime, Utc};
use common::{OrderId, PaymentId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// The status of an order in the checkout workflow.
///
/// Transitions:
/// ```text
/// Pending ──┬──► Confirmed   (payment success + stock deducted)
///           └──► Cancelled   (payment failure or lost stock race)
/// ```
///
/// Both outcomes are terminal here; fulfillment states belong to a
/// downstream process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order persisted, payment not yet resolved.
    #[default]
    Pending,

    /// Payment succeeded and stock was deducted (terminal state).
    Confirmed,

    /// Checkout failed; kept for audit (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the order can still be finalized.
    pub fn can_finalize(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Cancelled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A line within an order.
///
/// The unit price is captured at order time and never recomputed from the
/// live catalog. Lines are owned by their order and immutable after
/// creation; identity is positional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    /// Product name captured for display, decoupled from catalog renames.
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    /// Creates a new order line.
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the subtotal for this line (unit_price × quantity).
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A customer order.
///
/// Orders are never deleted; cancelled orders remain as an audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_id: Option<PaymentId>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a pending order, computing the total from the captured lines.
    ///
    /// The total is computed exactly once here and never recomputed from
    /// live product prices.
    pub fn pending(user_id: UserId, lines: Vec<OrderLine>) -> Self {
        let total_amount = lines.iter().map(OrderLine::subtotal).sum();
        Self {
            id: OrderId::new(),
            user_id,
            lines,
            total_amount,
            status: OrderStatus::Pending,
            payment_id: None,
            created_at: Utc::now(),
        }
    }

    /// Marks the order confirmed, attaching the successful payment.
    pub fn confirm(&mut self, payment_id: PaymentId) {
        self.status = OrderStatus::Confirmed;
        self.payment_id = Some(payment_id);
    }

    /// Marks the order cancelled, keeping any recorded payment attempt.
    pub fn cancel(&mut self, payment_id: Option<PaymentId>) {
        self.status = OrderStatus::Cancelled;
        if payment_id.is_some() {
            self.payment_id = payment_id;
        }
    }
}
