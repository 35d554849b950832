//! Administrative inventory endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use checkout::CheckoutError;
use common::ProductId;
use domain::Product;
use serde::{Deserialize, Serialize};
use store::CommerceStore;
use uuid::Uuid;

use crate::auth::principal_from_headers;
use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Deserialize)]
pub struct StockUpdateRequest {
    /// Absolute new stock quantity (non-negative by type).
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct LowStockParams {
    pub threshold: Option<u32>,
}

#[derive(Serialize)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub stock_quantity: u32,
    pub available: bool,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            category: product.category.clone(),
            price_cents: product.price.cents(),
            stock_quantity: product.stock_quantity,
            available: product.available,
        }
    }
}

/// PUT /inventory/{id}/stock — absolute stock overwrite, admin only.
#[tracing::instrument(skip(state, headers, req))]
pub async fn update_stock<S: CommerceStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<StockUpdateRequest>,
) -> Result<Json<ProductSummary>, ApiError> {
    let principal = principal_from_headers(&headers)?;
    if !principal.is_admin() {
        return Err(CheckoutError::PermissionDenied.into());
    }

    let product = state
        .workflow
        .ledger()
        .set_stock(ProductId::from_uuid(id), req.quantity)
        .await?;
    Ok(Json(ProductSummary::from(&product)))
}

/// GET /inventory/low-stock — products below the threshold, admin only.
#[tracing::instrument(skip(state, headers))]
pub async fn low_stock<S: CommerceStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Query(params): Query<LowStockParams>,
) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    let principal = principal_from_headers(&headers)?;
    if !principal.is_admin() {
        return Err(CheckoutError::PermissionDenied.into());
    }

    let products = state
        .workflow
        .ledger()
        .low_stock(params.threshold)
        .await?;
    Ok(Json(products.iter().map(ProductSummary::from).collect()))
}
