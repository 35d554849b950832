//! Payment gateway trait and simulated processor.
//!
//! Every charge call records a payment row, success or failure. A declined
//! charge raises [`CheckoutError::PaymentFailed`] to the caller while the
//! failed row stays persisted for audit, so callers must not assume "no row"
//! on failure.

use std::time::Duration;

use async_trait::async_trait;
use common::OrderId;
use domain::{Order, Payment, PaymentMethod, PaymentStatus};
use rand::Rng;
use store::CommerceStore;

use crate::error::{CheckoutError, Result};

/// Processing behaviour of the simulated payment processor.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Probability a charge resolves to Success, clamped to `[0.0, 1.0]`.
    pub success_rate: f64,
    /// Simulated processor latency per charge.
    pub processing_delay: Duration,
    /// Upper bound on how long a charge waits out the simulated latency.
    /// An elapsed bound is non-fatal; the charge still resolves.
    pub delay_bound: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            success_rate: 0.7,
            processing_delay: Duration::from_millis(500),
            delay_bound: Duration::from_secs(2),
        }
    }
}

impl GatewayConfig {
    /// A configuration that always succeeds with no simulated latency.
    pub fn always_succeed() -> Self {
        Self {
            success_rate: 1.0,
            processing_delay: Duration::ZERO,
            delay_bound: Duration::from_secs(1),
        }
    }

    /// A configuration that always declines with no simulated latency.
    pub fn always_decline() -> Self {
        Self {
            success_rate: 0.0,
            processing_delay: Duration::ZERO,
            delay_bound: Duration::from_secs(1),
        }
    }
}

/// Trait for payment processing operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges the order total under the given idempotency key.
    ///
    /// A repeated key replays the recorded outcome without creating a
    /// second payment row.
    async fn charge(
        &self,
        order: &Order,
        method: PaymentMethod,
        idempotency_key: &str,
    ) -> Result<Payment>;

    /// Read-only lookup of the payment attempt for an order.
    async fn payment_for_order(&self, order_id: OrderId) -> Result<Option<Payment>>;
}

/// Simulated external payment processor persisting attempts in the store.
#[derive(Clone)]
pub struct SimulatedGateway<S> {
    store: S,
    config: GatewayConfig,
}

impl<S: CommerceStore> SimulatedGateway<S> {
    /// Creates a gateway with the default ~70% success simulation.
    pub fn new(store: S) -> Self {
        Self::with_config(store, GatewayConfig::default())
    }

    /// Creates a gateway with explicit processing behaviour.
    pub fn with_config(store: S, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    /// Replays the outcome recorded under an idempotency key.
    ///
    /// A key stays bound to the order it first charged; reuse against a
    /// different order is rejected rather than replayed.
    fn replay(&self, order: &Order, existing: Payment) -> Result<Payment> {
        if existing.order_id != order.id {
            return Err(CheckoutError::InvalidOrder(format!(
                "idempotency key is already bound to order {}",
                existing.order_id
            )));
        }
        match existing.status {
            PaymentStatus::Success => Ok(existing),
            PaymentStatus::Failed | PaymentStatus::Pending => Err(CheckoutError::PaymentFailed(
                format!("charge {} previously declined", existing.transaction_id),
            )),
        }
    }

    /// Waits out the simulated processor latency, bounded by the configured
    /// timeout. An elapsed bound is not a payment failure.
    async fn simulate_latency(&self) {
        if self.config.processing_delay.is_zero() {
            return;
        }
        let wait = tokio::time::timeout(
            self.config.delay_bound,
            tokio::time::sleep(self.config.processing_delay),
        )
        .await;
        if wait.is_err() {
            tracing::debug!("simulated processor latency exceeded bound, resolving anyway");
        }
    }
}

#[async_trait]
impl<S: CommerceStore> PaymentGateway for SimulatedGateway<S> {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id))]
    async fn charge(
        &self,
        order: &Order,
        method: PaymentMethod,
        idempotency_key: &str,
    ) -> Result<Payment> {
        if let Some(existing) = self
            .store
            .payment_for_idempotency_key(idempotency_key)
            .await?
        {
            tracing::info!(
                transaction_id = %existing.transaction_id,
                "replaying recorded charge outcome"
            );
            return self.replay(order, existing);
        }

        metrics::counter!("payment_charges_total").increment(1);
        let mut payment = Payment::pending(order.id, order.total_amount, method, idempotency_key);

        self.simulate_latency().await;

        let rate = self.config.success_rate.clamp(0.0, 1.0);
        let success = rand::rng().random_bool(rate);
        payment.resolve(if success {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        });

        // Both outcomes are durably recorded before the result is surfaced.
        self.store.save_payment(payment.clone()).await?;

        if success {
            metrics::counter!("payment_success_total").increment(1);
            tracing::info!(transaction_id = %payment.transaction_id, "payment succeeded");
            Ok(payment)
        } else {
            metrics::counter!("payment_failed_total").increment(1);
            tracing::warn!(transaction_id = %payment.transaction_id, "payment declined");
            Err(CheckoutError::PaymentFailed(
                "payment declined by processor".to_string(),
            ))
        }
    }

    async fn payment_for_order(&self, order_id: OrderId) -> Result<Option<Payment>> {
        Ok(self.store.payment_for_order(order_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;
    use domain::{Money, OrderLine};
    use store::InMemoryCommerceStore;

    fn order() -> Order {
        let line = OrderLine::new(
            common::ProductId::new(),
            "Widget",
            2,
            Money::from_cents(1000),
        );
        Order::pending(UserId::new(), vec![line])
    }

    #[tokio::test]
    async fn successful_charge_persists_success_row() {
        let store = InMemoryCommerceStore::new();
        let gateway = SimulatedGateway::with_config(store.clone(), GatewayConfig::always_succeed());
        let order = order();

        let payment = gateway
            .charge(&order, PaymentMethod::CreditCard, "key-1")
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Success);
        assert_eq!(payment.amount, order.total_amount);
        assert!(payment.transaction_id.starts_with("TXN-"));

        let stored = store.payment_for_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Success);
    }

    #[tokio::test]
    async fn declined_charge_still_persists_failed_row() {
        let store = InMemoryCommerceStore::new();
        let gateway = SimulatedGateway::with_config(store.clone(), GatewayConfig::always_decline());
        let order = order();

        let err = gateway
            .charge(&order, PaymentMethod::Paypal, "key-2")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentFailed(_)));

        // The failed attempt is durably recorded.
        let stored = store.payment_for_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Failed);
        assert_eq!(stored.amount, order.total_amount);
    }

    #[tokio::test]
    async fn repeated_key_replays_success_without_second_row() {
        let store = InMemoryCommerceStore::new();
        let gateway = SimulatedGateway::with_config(store.clone(), GatewayConfig::always_succeed());
        let order = order();

        let first = gateway
            .charge(&order, PaymentMethod::CreditCard, "key-3")
            .await
            .unwrap();
        let second = gateway
            .charge(&order, PaymentMethod::CreditCard, "key-3")
            .await
            .unwrap();

        assert_eq!(first.transaction_id, second.transaction_id);
        assert_eq!(store.payment_count().await, 1);
    }

    #[tokio::test]
    async fn repeated_key_replays_decline() {
        let store = InMemoryCommerceStore::new();
        let gateway = SimulatedGateway::with_config(store.clone(), GatewayConfig::always_decline());
        let order = order();

        gateway
            .charge(&order, PaymentMethod::CreditCard, "key-4")
            .await
            .unwrap_err();

        // Even with a now-permissive gateway, the recorded decline wins.
        let permissive =
            SimulatedGateway::with_config(store.clone(), GatewayConfig::always_succeed());
        let err = permissive
            .charge(&order, PaymentMethod::CreditCard, "key-4")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentFailed(_)));
        assert_eq!(store.payment_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn charge_resolves_when_latency_exceeds_bound() {
        let store = InMemoryCommerceStore::new();
        let config = GatewayConfig {
            success_rate: 1.0,
            processing_delay: Duration::from_secs(30),
            delay_bound: Duration::from_secs(2),
        };
        let gateway = SimulatedGateway::with_config(store.clone(), config);
        let order = order();

        // The bound elapses long before the simulated latency; the charge
        // must still resolve rather than surface a payment failure.
        let payment = gateway
            .charge(&order, PaymentMethod::CreditCard, "key-slow")
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Success);
        assert_eq!(store.payment_count().await, 1);
    }

    #[tokio::test]
    async fn reused_key_for_different_order_is_rejected() {
        let store = InMemoryCommerceStore::new();
        let gateway = SimulatedGateway::with_config(store.clone(), GatewayConfig::always_succeed());

        gateway
            .charge(&order(), PaymentMethod::CreditCard, "key-bound")
            .await
            .unwrap();

        let err = gateway
            .charge(&order(), PaymentMethod::CreditCard, "key-bound")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidOrder(_)));
        assert_eq!(store.payment_count().await, 1);
    }

    #[tokio::test]
    async fn lookup_absent_payment() {
        let store = InMemoryCommerceStore::new();
        let gateway = SimulatedGateway::new(store);
        assert!(gateway
            .payment_for_order(OrderId::new())
            .await
            .unwrap()
            .is_none());
    }
}
