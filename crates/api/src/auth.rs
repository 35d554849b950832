//! Principal extraction from request headers.
//!
//! Token verification lives at the edge (out of scope here); this layer
//! trusts the identity headers the edge injects and turns them into an
//! explicit [`Principal`] handed to every workflow call.

use axum::http::HeaderMap;
use common::{Principal, Role, UserId};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated user id (UUID).
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated role (`customer` | `admin`).
pub const ROLE_HEADER: &str = "x-user-role";

/// Builds the caller's principal from identity headers.
///
/// A missing role header defaults to `customer`; a missing or malformed
/// user id is a bad request.
pub fn principal_from_headers(headers: &HeaderMap) -> Result<Principal, ApiError> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest(format!("missing {USER_ID_HEADER} header")))?;
    let user_id = Uuid::parse_str(user_id)
        .map(UserId::from_uuid)
        .map_err(|e| ApiError::BadRequest(format!("invalid {USER_ID_HEADER}: {e}")))?;

    let role = match headers.get(ROLE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|e| ApiError::BadRequest(format!("invalid {ROLE_HEADER}: {e}")))?,
        None => Role::Customer,
    };

    Ok(Principal { user_id, role })
}
