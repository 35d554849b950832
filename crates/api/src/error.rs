//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client (malformed ids, headers, parameters).
    BadRequest(String),
    /// Checkout/domain error.
    Checkout(CheckoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
        };

        metrics::counter!("api_error_responses_total", "status" => status.as_u16().to_string())
            .increment(1);
        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    let status = match &err {
        CheckoutError::NotFound { .. } => StatusCode::NOT_FOUND,
        CheckoutError::InsufficientStock { .. } | CheckoutError::Conflict(_) => {
            StatusCode::CONFLICT
        }
        CheckoutError::PaymentFailed(_) => StatusCode::PAYMENT_REQUIRED,
        CheckoutError::PermissionDenied => StatusCode::FORBIDDEN,
        CheckoutError::InvalidOrder(_) => StatusCode::BAD_REQUEST,
        CheckoutError::Store(_) => {
            tracing::error!(error = %err, "store failure surfaced to API");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}
