//! Payment attempt record.

use chrono::{DateTime, Utc};
use common::{OrderId, PaymentId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// The status of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    /// Attempt created, processor outcome not yet known.
    #[default]
    Pending,

    /// Processor accepted the charge.
    Success,

    /// Processor declined the charge. The row is kept for audit.
    Failed,
}

impl PaymentStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Success => "Success",
            PaymentStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supported payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    DebitCard,
    Paypal,
    BankTransfer,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::BankTransfer => "bank_transfer",
        };
        write!(f, "{name}")
    }
}

/// A single payment attempt for an order (1:1 per charge call).
///
/// Exactly one row is recorded per charge outcome, success or failure —
/// a declined charge is still durably persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    /// Copied from the order total at charge time.
    pub amount: Money,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    /// Unique processor transaction reference.
    pub transaction_id: String,
    /// Caller-supplied token making retried charges safe.
    pub idempotency_key: String,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a pending payment attempt with a fresh transaction id.
    pub fn pending(
        order_id: OrderId,
        amount: Money,
        method: PaymentMethod,
        idempotency_key: impl Into<String>,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            order_id,
            amount,
            status: PaymentStatus::Pending,
            method,
            transaction_id: generate_transaction_id(),
            idempotency_key: idempotency_key.into(),
            created_at: Utc::now(),
        }
    }

    /// Resolves the attempt to its final status.
    pub fn resolve(&mut self, status: PaymentStatus) {
        self.status = status;
    }
}

/// Generates a short unique processor transaction reference.
fn generate_transaction_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("TXN-{}", uuid[..8].to_uppercase())
}
