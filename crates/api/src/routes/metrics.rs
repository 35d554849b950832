//! Prometheus exposition endpoint.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// GET /metrics — renders the recorder's state in Prometheus text format.
///
/// Serves the saga counters (orders placed/confirmed/cancelled, payment
/// outcomes, stock CAS exhaustion) alongside the API-level ones.
pub async fn render(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    let body = handle.render();
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}
