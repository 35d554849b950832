//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

/// Body of the liveness probe.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /health — liveness probe for the commerce API.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "commerce-api",
    })
}
