//! Order placement and query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use checkout::{LineRequest, OrderWorkflow, PaymentGateway, SimulatedGateway};
use common::{OrderId, ProductId};
use domain::{Order, Payment, PaymentMethod};
use serde::{Deserialize, Serialize};
use store::{CommerceStore, Page, PageRequest, SortDirection, SortField};
use uuid::Uuid;

use crate::auth::principal_from_headers;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: CommerceStore + Clone> {
    pub workflow: OrderWorkflow<S, SimulatedGateway<S>>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub lines: Vec<LineItemRequest>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Client-supplied token making retried submissions charge-safe.
    pub idempotency_key: Option<String>,
}

#[derive(Deserialize)]
pub struct LineItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct ListAllParams {
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub size: usize,
    #[serde(default)]
    pub sort: SortField,
    #[serde(default)]
    pub dir: SortDirection,
}

fn default_page_size() -> usize {
    20
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderSummary {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub total_cents: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub lines: Vec<OrderLineSummary>,
    pub payment: Option<PaymentSummary>,
}

#[derive(Serialize)]
pub struct OrderLineSummary {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Serialize)]
pub struct PaymentSummary {
    pub status: String,
    pub method: String,
    pub transaction_id: String,
}

#[derive(Serialize)]
pub struct OrderPage {
    pub items: Vec<OrderSummary>,
    pub page: usize,
    pub size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl OrderSummary {
    fn from_order(order: &Order, payment: Option<&Payment>) -> Self {
        Self {
            id: order.id.to_string(),
            user_id: order.user_id.to_string(),
            status: order.status.to_string(),
            total_cents: order.total_amount.cents(),
            created_at: order.created_at,
            lines: order
                .lines
                .iter()
                .map(|line| OrderLineSummary {
                    product_id: line.product_id.to_string(),
                    product_name: line.product_name.clone(),
                    quantity: line.quantity,
                    unit_price_cents: line.unit_price.cents(),
                    subtotal_cents: line.subtotal().cents(),
                })
                .collect(),
            payment: payment.map(|p| PaymentSummary {
                status: p.status.to_string(),
                method: p.method.to_string(),
                transaction_id: p.transaction_id.clone(),
            }),
        }
    }
}

async fn summarize<S: CommerceStore + Clone>(
    state: &AppState<S>,
    order: &Order,
) -> Result<OrderSummary, ApiError> {
    let payment = state.workflow.gateway().payment_for_order(order.id).await?;
    Ok(OrderSummary::from_order(order, payment.as_ref()))
}

// -- Handlers --

/// POST /orders — place an order for the authenticated principal.
#[tracing::instrument(skip(state, headers, req))]
pub async fn place<S: CommerceStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderSummary>), ApiError> {
    let principal = principal_from_headers(&headers)?;

    let lines: Vec<LineRequest> = req
        .lines
        .iter()
        .map(|l| LineRequest::new(ProductId::from_uuid(l.product_id), l.quantity))
        .collect();

    let order = state
        .workflow
        .place_order(principal, lines, req.payment_method, req.idempotency_key)
        .await?;

    let summary = summarize(&state, &order).await?;
    Ok((axum::http::StatusCode::CREATED, Json(summary)))
}

/// GET /orders/{id} — fetch one order, visibility-checked.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: CommerceStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderSummary>, ApiError> {
    let principal = principal_from_headers(&headers)?;
    let order = state
        .workflow
        .get_order(OrderId::from_uuid(id), &principal)
        .await?;
    Ok(Json(summarize(&state, &order).await?))
}

/// GET /orders — the principal's order history, newest first.
#[tracing::instrument(skip(state, headers))]
pub async fn list_mine<S: CommerceStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderSummary>>, ApiError> {
    let principal = principal_from_headers(&headers)?;
    let orders = state.workflow.orders_for_user(&principal).await?;

    let mut summaries = Vec::with_capacity(orders.len());
    for order in &orders {
        summaries.push(summarize(&state, order).await?);
    }
    Ok(Json(summaries))
}

/// GET /admin/orders — paged listing of all orders, admin only.
#[tracing::instrument(skip(state, headers))]
pub async fn list_all<S: CommerceStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Query(params): Query<ListAllParams>,
) -> Result<Json<OrderPage>, ApiError> {
    let principal = principal_from_headers(&headers)?;
    let request = PageRequest::new(params.page, params.size).sorted_by(params.sort, params.dir);
    let page: Page<Order> = state.workflow.all_orders(&principal, request).await?;

    let mut items = Vec::with_capacity(page.items.len());
    for order in &page.items {
        items.push(summarize(&state, order).await?);
    }
    Ok(Json(OrderPage {
        items,
        page: page.page,
        size: page.size,
        total_items: page.total_items,
        total_pages: page.total_pages,
    }))
}
