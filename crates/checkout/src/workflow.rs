//! Order placement workflow.
//!
//! `place_order` coordinates stock validation, stock reservation, payment
//! and order finalization as one sequential saga:
//!
//! ```text
//! validate (advisory) ─► persist Pending ─► reserve stock (CAS per line)
//!      ─► charge payment ─► Confirmed
//! ```
//!
//! Stock is reserved *before* the charge; a payment failure releases the
//! reservation (compensating restore) and cancels the order. This closes
//! the window where a charge could succeed against stock that a concurrent
//! sale already consumed. The cancelled order and the failed payment row
//! both remain persisted for audit.

use common::{OrderId, PaymentId, Principal, ProductId};
use domain::{Order, OrderLine, Payment, PaymentMethod, PaymentStatus};
use store::{CommerceStore, Page, PageRequest};

use crate::error::{CheckoutError, Result};
use crate::gateway::PaymentGateway;
use crate::ledger::InventoryLedger;
use crate::query::OrderQueries;

/// One requested order line.
#[derive(Debug, Clone, Copy)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl LineRequest {
    /// Creates a line request.
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Coordinates order placement across the ledger, the gateway and the store.
#[derive(Clone)]
pub struct OrderWorkflow<S, G> {
    store: S,
    ledger: InventoryLedger<S>,
    queries: OrderQueries<S>,
    gateway: G,
}

impl<S, G> OrderWorkflow<S, G>
where
    S: CommerceStore + Clone,
    G: PaymentGateway,
{
    /// Creates a workflow over the given store and payment gateway.
    pub fn new(store: S, gateway: G) -> Self {
        Self {
            ledger: InventoryLedger::new(store.clone()),
            queries: OrderQueries::new(store.clone()),
            store,
            gateway,
        }
    }

    /// The inventory ledger, also used by administrative stock endpoints.
    pub fn ledger(&self) -> &InventoryLedger<S> {
        &self.ledger
    }

    /// The payment gateway, for read-only payment lookups.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Places an order for the authenticated principal.
    ///
    /// Line prices are captured from the catalog at this instant; the order
    /// total is computed once from the captured lines and never recomputed.
    /// Without a caller-supplied idempotency key the charge is keyed by the
    /// order id, which makes the single charge per order retry-safe. A
    /// caller-supplied key makes the whole placement retry-safe: a repeated
    /// key resolves to the originally placed order (or re-raises the
    /// recorded decline) without creating a second order or touching stock.
    ///
    /// On any failure after the Pending order is persisted, the order is
    /// cancelled (kept for audit) and the error propagates.
    #[tracing::instrument(skip(self, requests, idempotency_key), fields(user_id = %principal.user_id))]
    pub async fn place_order(
        &self,
        principal: Principal,
        requests: Vec<LineRequest>,
        method: PaymentMethod,
        idempotency_key: Option<String>,
    ) -> Result<Order> {
        metrics::counter!("orders_placed_total").increment(1);
        let started = std::time::Instant::now();

        // A retried placement resolves to its recorded outcome before
        // anything is validated, persisted or deducted. Creating a second
        // order (and deducting stock again) for the same key would break
        // the one-payment-per-order invariant.
        if let Some(key) = idempotency_key.as_deref() {
            if let Some(recorded) = self.store.payment_for_idempotency_key(key).await? {
                return self.replay_placement(&principal, recorded).await;
            }
        }

        if requests.is_empty() {
            return Err(CheckoutError::InvalidOrder("order has no lines".into()));
        }

        // 1. Advisory validation. Fail-fast: nothing is persisted if any
        // line cannot be satisfied right now.
        for request in &requests {
            if request.quantity == 0 {
                return Err(CheckoutError::InvalidOrder(format!(
                    "zero quantity for product {}",
                    request.product_id
                )));
            }
            self.ledger
                .validate_stock(request.product_id, request.quantity)
                .await?;
        }

        // 2. Capture lines at current catalog prices and persist Pending.
        let mut lines = Vec::with_capacity(requests.len());
        for request in &requests {
            let product = self
                .store
                .get_product(request.product_id)
                .await?
                .ok_or_else(|| CheckoutError::not_found("Product", request.product_id))?;
            lines.push(OrderLine::new(
                product.id,
                product.name,
                request.quantity,
                product.price,
            ));
        }

        let mut order = Order::pending(principal.user_id, lines);
        self.store.save_order(order.clone()).await?;
        tracing::info!(order_id = %order.id, total = %order.total_amount, "order persisted pending");

        // 3. Reserve stock. The CAS inside deduct_stock is the authority;
        // validation above was only advisory.
        let lines = order.lines.clone();
        let mut reserved: Vec<OrderLine> = Vec::with_capacity(lines.len());
        for line in &lines {
            match self.ledger.deduct_stock(line.product_id, line.quantity).await {
                Ok(()) => reserved.push(line.clone()),
                Err(e) => {
                    tracing::warn!(order_id = %order.id, error = %e, "reservation failed");
                    self.release(&reserved).await;
                    self.cancel(order, None).await;
                    metrics::counter!("orders_cancelled_total").increment(1);
                    return Err(e);
                }
            }
        }

        // 4. Charge. A failed charge is recorded by the gateway and then
        // surfaced here; the reservation is released in compensation.
        let key = idempotency_key.unwrap_or_else(|| order.id.to_string());
        match self.gateway.charge(&order, method, &key).await {
            Ok(payment) => {
                order.confirm(payment.id);
                self.store.save_order(order.clone()).await?;
                metrics::counter!("orders_confirmed_total").increment(1);
                metrics::histogram!("order_placement_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::info!(order_id = %order.id, "order confirmed");
                Ok(order)
            }
            Err(e) => {
                self.release(&lines).await;

                // Attach the recorded failed attempt, if lookup succeeds.
                let payment_id = self
                    .gateway
                    .payment_for_order(order.id)
                    .await
                    .ok()
                    .flatten()
                    .map(|p| p.id);
                let order_id = order.id;
                self.cancel(order, payment_id).await;

                metrics::counter!("orders_cancelled_total").increment(1);
                metrics::histogram!("order_placement_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::warn!(%order_id, error = %e, "order cancelled");
                Err(e)
            }
        }
    }

    /// Fetches one order, enforcing visibility.
    pub async fn get_order(&self, order_id: OrderId, principal: &Principal) -> Result<Order> {
        self.queries.get_order(order_id, principal).await
    }

    /// Returns the principal's orders, most recent first.
    pub async fn orders_for_user(&self, principal: &Principal) -> Result<Vec<Order>> {
        self.queries.orders_for_user(principal).await
    }

    /// Returns one page of all orders. Administrative only.
    pub async fn all_orders(
        &self,
        principal: &Principal,
        request: PageRequest,
    ) -> Result<Page<Order>> {
        self.queries.all_orders(principal, request).await
    }

    /// Resolves a repeated idempotency key to the placement it recorded:
    /// the originally confirmed order on success, the original decline as
    /// [`CheckoutError::PaymentFailed`] otherwise.
    async fn replay_placement(&self, principal: &Principal, recorded: Payment) -> Result<Order> {
        let order = self
            .store
            .get_order(recorded.order_id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("Order", recorded.order_id))?;
        if !principal.can_view(order.user_id) {
            return Err(CheckoutError::PermissionDenied);
        }
        match recorded.status {
            PaymentStatus::Success => {
                tracing::info!(order_id = %order.id, "replaying recorded placement");
                Ok(order)
            }
            PaymentStatus::Failed | PaymentStatus::Pending => {
                Err(CheckoutError::PaymentFailed(format!(
                    "charge {} previously declined",
                    recorded.transaction_id
                )))
            }
        }
    }

    /// Compensating release of already-deducted lines.
    ///
    /// A failed restore is logged rather than propagated so it cannot mask
    /// the error that triggered the compensation.
    async fn release(&self, reserved: &[OrderLine]) {
        for line in reserved {
            if let Err(e) = self
                .ledger
                .restore_stock(line.product_id, line.quantity)
                .await
            {
                tracing::error!(
                    product_id = %line.product_id,
                    quantity = line.quantity,
                    error = %e,
                    "failed to restore reserved stock"
                );
            }
        }
    }

    /// Persists the order as cancelled, keeping it as an audit record.
    async fn cancel(&self, mut order: Order, payment_id: Option<PaymentId>) {
        order.cancel(payment_id);
        if let Err(e) = self.store.save_order(order.clone()).await {
            tracing::error!(order_id = %order.id, error = %e, "failed to persist cancelled order");
        }
    }
}
