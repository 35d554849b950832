//! Integration tests for the order placement workflow.

use checkout::{
    CheckoutError, GatewayConfig, LineRequest, OrderWorkflow, SimulatedGateway,
};
use common::{Principal, ProductId, UserId};
use domain::{Money, OrderStatus, PaymentMethod, PaymentStatus, Product};
use store::{CommerceStore, InMemoryCommerceStore, PageRequest, SortDirection, SortField};

type Workflow = OrderWorkflow<InMemoryCommerceStore, SimulatedGateway<InMemoryCommerceStore>>;

async fn seed_product(store: &InMemoryCommerceStore, name: &str, cents: i64, stock: u32) -> ProductId {
    let product = Product::new(name, "test", Money::from_cents(cents), stock);
    let id = product.id;
    store.insert_product(product).await.unwrap();
    id
}

fn workflow_with(store: &InMemoryCommerceStore, config: GatewayConfig) -> Workflow {
    let gateway = SimulatedGateway::with_config(store.clone(), config);
    OrderWorkflow::new(store.clone(), gateway)
}

#[tokio::test]
async fn successful_placement_deducts_stock_and_confirms() {
    let store = InMemoryCommerceStore::new();
    let product_id = seed_product(&store, "P", 1000, 5).await;
    let workflow = workflow_with(&store, GatewayConfig::always_succeed());
    let principal = Principal::customer(UserId::new());

    let order = workflow
        .place_order(
            principal,
            vec![LineRequest::new(product_id, 5)],
            PaymentMethod::CreditCard,
            None,
        )
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.total_amount, Money::from_cents(5000));
    assert!(order.payment_id.is_some());

    let product = store.get_product(product_id).await.unwrap().unwrap();
    assert_eq!(product.stock_quantity, 0);
    assert!(!product.available);

    // The concrete follow-up from the scenario: one more unit is refused.
    let err = workflow
        .place_order(
            principal,
            vec![LineRequest::new(product_id, 1)],
            PaymentMethod::CreditCard,
            None,
        )
        .await
        .unwrap_err();
    match err {
        CheckoutError::InsufficientStock {
            product,
            requested,
            available,
        } => {
            assert_eq!(product, "P");
            assert_eq!(requested, 1);
            assert_eq!(available, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn total_captured_at_order_time_ignores_later_price_changes() {
    let store = InMemoryCommerceStore::new();
    let product_id = seed_product(&store, "Widget", 1000, 10).await;
    let workflow = workflow_with(&store, GatewayConfig::always_succeed());

    let order = workflow
        .place_order(
            Principal::customer(UserId::new()),
            vec![LineRequest::new(product_id, 3)],
            PaymentMethod::CreditCard,
            None,
        )
        .await
        .unwrap();
    assert_eq!(order.total_amount, Money::from_cents(3000));

    // Raise the catalog price after the fact.
    let current = store.get_product(product_id).await.unwrap().unwrap();
    let mut repriced = current.clone();
    repriced.price = Money::from_cents(9999);
    repriced.version += 1;
    store.update_product(repriced, current.version).await.unwrap();

    let stored = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.total_amount, Money::from_cents(3000));
    assert_eq!(stored.lines[0].unit_price, Money::from_cents(1000));
}

#[tokio::test]
async fn failed_validation_persists_nothing() {
    let store = InMemoryCommerceStore::new();
    let product_id = seed_product(&store, "Scarce", 500, 5).await;
    let workflow = workflow_with(&store, GatewayConfig::always_succeed());

    let err = workflow
        .place_order(
            Principal::customer(UserId::new()),
            vec![LineRequest::new(product_id, 10)],
            PaymentMethod::CreditCard,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::InsufficientStock { .. }));

    assert_eq!(store.order_count().await, 0);
    assert_eq!(store.payment_count().await, 0);
    let product = store.get_product(product_id).await.unwrap().unwrap();
    assert_eq!(product.stock_quantity, 5);
}

#[tokio::test]
async fn unknown_product_aborts_before_persistence() {
    let store = InMemoryCommerceStore::new();
    let workflow = workflow_with(&store, GatewayConfig::always_succeed());

    let err = workflow
        .place_order(
            Principal::customer(UserId::new()),
            vec![LineRequest::new(ProductId::new(), 1)],
            PaymentMethod::CreditCard,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::NotFound { entity: "Product", .. }));
    assert_eq!(store.order_count().await, 0);
}

#[tokio::test]
async fn empty_order_is_rejected() {
    let store = InMemoryCommerceStore::new();
    let workflow = workflow_with(&store, GatewayConfig::always_succeed());

    let err = workflow
        .place_order(
            Principal::customer(UserId::new()),
            vec![],
            PaymentMethod::CreditCard,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::InvalidOrder(_)));
}

#[tokio::test]
async fn payment_failure_restores_stock_and_cancels_order() {
    let store = InMemoryCommerceStore::new();
    let a = seed_product(&store, "A", 1000, 5).await;
    let b = seed_product(&store, "B", 2000, 8).await;
    let workflow = workflow_with(&store, GatewayConfig::always_decline());
    let user = UserId::new();

    let err = workflow
        .place_order(
            Principal::customer(user),
            vec![LineRequest::new(a, 2), LineRequest::new(b, 3)],
            PaymentMethod::Paypal,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::PaymentFailed(_)));

    // Stock is back to pre-order levels for every involved product.
    assert_eq!(
        store.get_product(a).await.unwrap().unwrap().stock_quantity,
        5
    );
    assert_eq!(
        store.get_product(b).await.unwrap().unwrap().stock_quantity,
        8
    );

    // The cancelled order and exactly one FAILED payment row remain.
    assert_eq!(store.order_count().await, 1);
    assert_eq!(store.payment_count().await, 1);

    let orders = store.orders_for_user(user).await.unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(order.total_amount, Money::from_cents(8000));

    let payment = store.payment_for_order(order.id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);
    assert_eq!(payment.amount, order.total_amount);
    assert_eq!(order.payment_id, Some(payment.id));
}

#[tokio::test]
async fn concurrent_orders_for_last_unit_admit_one_winner() {
    let store = InMemoryCommerceStore::new();
    let product_id = seed_product(&store, "Last", 1500, 1).await;
    let workflow = workflow_with(&store, GatewayConfig::always_succeed());

    let spawn_order = |workflow: Workflow| {
        tokio::spawn(async move {
            workflow
                .place_order(
                    Principal::customer(UserId::new()),
                    vec![LineRequest::new(product_id, 1)],
                    PaymentMethod::CreditCard,
                    None,
                )
                .await
        })
    };

    let first = spawn_order(workflow.clone());
    let second = spawn_order(workflow.clone());
    let results = [first.await.unwrap(), second.await.unwrap()];

    let confirmed: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(confirmed.len(), 1);

    for result in &results {
        if let Err(e) = result {
            assert!(matches!(
                e,
                CheckoutError::InsufficientStock { .. } | CheckoutError::Conflict(_)
            ));
        }
    }

    let product = store.get_product(product_id).await.unwrap().unwrap();
    assert_eq!(product.stock_quantity, 0);
    assert!(!product.available);
}

#[tokio::test]
async fn visibility_rules_on_get_order() {
    let store = InMemoryCommerceStore::new();
    let product_id = seed_product(&store, "P", 1000, 10).await;
    let workflow = workflow_with(&store, GatewayConfig::always_succeed());
    let owner = UserId::new();

    let order = workflow
        .place_order(
            Principal::customer(owner),
            vec![LineRequest::new(product_id, 1)],
            PaymentMethod::CreditCard,
            None,
        )
        .await
        .unwrap();

    // Owner and admin succeed.
    workflow
        .get_order(order.id, &Principal::customer(owner))
        .await
        .unwrap();
    workflow
        .get_order(order.id, &Principal::admin(UserId::new()))
        .await
        .unwrap();

    // A stranger is denied.
    let err = workflow
        .get_order(order.id, &Principal::customer(UserId::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::PermissionDenied));
}

#[tokio::test]
async fn order_history_newest_first_and_admin_paging() {
    let store = InMemoryCommerceStore::new();
    let product_id = seed_product(&store, "P", 100, 100).await;
    let workflow = workflow_with(&store, GatewayConfig::always_succeed());
    let user = UserId::new();
    let principal = Principal::customer(user);

    for quantity in [1, 2, 3] {
        workflow
            .place_order(
                principal,
                vec![LineRequest::new(product_id, quantity)],
                PaymentMethod::CreditCard,
                None,
            )
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let history = workflow.orders_for_user(&principal).await.unwrap();
    assert_eq!(history.len(), 3);
    assert!(history[0].created_at >= history[1].created_at);
    assert!(history[1].created_at >= history[2].created_at);

    let page = workflow
        .all_orders(
            &Principal::admin(UserId::new()),
            PageRequest::new(0, 2).sorted_by(SortField::TotalAmount, SortDirection::Desc),
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_items, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items[0].total_amount, Money::from_cents(300));

    let err = workflow
        .all_orders(&principal, PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::PermissionDenied));
}

#[tokio::test]
async fn retried_placement_with_same_key_charges_once() {
    let store = InMemoryCommerceStore::new();
    let product_id = seed_product(&store, "P", 1000, 10).await;
    let workflow = workflow_with(&store, GatewayConfig::always_succeed());
    let principal = Principal::customer(UserId::new());

    let first = workflow
        .place_order(
            principal,
            vec![LineRequest::new(product_id, 1)],
            PaymentMethod::CreditCard,
            Some("client-retry-1".to_string()),
        )
        .await
        .unwrap();

    // A client retry resolves to the original order instead of re-billing.
    let second = workflow
        .place_order(
            principal,
            vec![LineRequest::new(product_id, 1)],
            PaymentMethod::CreditCard,
            Some("client-retry-1".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.payment_id, first.payment_id);
    assert_eq!(store.order_count().await, 1);
    assert_eq!(store.payment_count().await, 1);

    // Stock was only deducted once.
    let product = store.get_product(product_id).await.unwrap().unwrap();
    assert_eq!(product.stock_quantity, 9);
}

#[tokio::test]
async fn retried_placement_replays_recorded_decline() {
    let store = InMemoryCommerceStore::new();
    let product_id = seed_product(&store, "P", 1000, 10).await;
    let workflow = workflow_with(&store, GatewayConfig::always_decline());
    let principal = Principal::customer(UserId::new());

    let request = vec![LineRequest::new(product_id, 2)];
    workflow
        .place_order(
            principal,
            request.clone(),
            PaymentMethod::CreditCard,
            Some("client-retry-2".to_string()),
        )
        .await
        .unwrap_err();

    let err = workflow
        .place_order(
            principal,
            request,
            PaymentMethod::CreditCard,
            Some("client-retry-2".to_string()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::PaymentFailed(_)));

    // Only the original cancelled order and its failed attempt exist, and
    // the retry never touched stock.
    assert_eq!(store.order_count().await, 1);
    assert_eq!(store.payment_count().await, 1);
    let product = store.get_product(product_id).await.unwrap().unwrap();
    assert_eq!(product.stock_quantity, 10);
}

#[tokio::test]
async fn idempotency_key_reuse_by_stranger_is_denied() {
    let store = InMemoryCommerceStore::new();
    let product_id = seed_product(&store, "P", 1000, 10).await;
    let workflow = workflow_with(&store, GatewayConfig::always_succeed());
    let owner = Principal::customer(UserId::new());
    let stranger = Principal::customer(UserId::new());

    workflow
        .place_order(
            owner,
            vec![LineRequest::new(product_id, 1)],
            PaymentMethod::CreditCard,
            Some("client-retry-3".to_string()),
        )
        .await
        .unwrap();

    let err = workflow
        .place_order(
            stranger,
            vec![LineRequest::new(product_id, 1)],
            PaymentMethod::CreditCard,
            Some("client-retry-3".to_string()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::PermissionDenied));
    assert_eq!(store.order_count().await, 1);
    assert_eq!(store.payment_count().await, 1);
}
