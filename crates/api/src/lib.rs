//! HTTP API server for the commerce backend.
//!
//! Thin layer over the checkout workflow: explicit principal extraction
//! from identity headers, JSON DTO shaping, and HTTP status mapping, with
//! structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use checkout::{GatewayConfig, OrderWorkflow, SimulatedGateway};
use domain::{Money, Product};
use metrics_exporter_prometheus::PrometheusHandle;
use store::CommerceStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CommerceStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::place::<S>))
        .route("/orders", get(routes::orders::list_mine::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/admin/orders", get(routes::orders::list_all::<S>))
        .route(
            "/inventory/{id}/stock",
            put(routes::inventory::update_stock::<S>),
        )
        .route("/inventory/low-stock", get(routes::inventory::low_stock::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state wiring the workflow over the given store.
pub fn create_state<S: CommerceStore + Clone + 'static>(
    store: S,
    gateway_config: GatewayConfig,
) -> Arc<AppState<S>> {
    let gateway = SimulatedGateway::with_config(store.clone(), gateway_config);
    Arc::new(AppState {
        workflow: OrderWorkflow::new(store, gateway),
    })
}

/// Seeds a small demo catalog on startup if the store is empty.
pub async fn seed_demo_catalog<S: CommerceStore>(store: &S) -> Result<(), store::StoreError> {
    if !store.list_products().await?.is_empty() {
        tracing::info!("catalog already populated, skipping seed");
        return Ok(());
    }

    let seed = [
        ("Mechanical Keyboard", "peripherals", 8999_i64, 25_u32),
        ("Wireless Mouse", "peripherals", 2999, 40),
        ("27\" Monitor", "displays", 24999, 12),
        ("USB-C Dock", "accessories", 15999, 8),
        ("Laptop Stand", "accessories", 4599, 3),
    ];
    for (name, category, cents, stock) in seed {
        store
            .insert_product(Product::new(name, category, Money::from_cents(cents), stock))
            .await?;
    }
    tracing::info!(products = seed.len(), "seeded demo catalog");
    Ok(())
}
