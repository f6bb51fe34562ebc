//! Bearer-token authentication for protected routes

use crate::error::ApiError;
use crate::AppState;
use axum::http::header::HeaderMap;

/// Authenticated caller identity. The token subject is the only thing the
/// server knows or needs; identity management lives with the token issuer.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
}

/// Resolve the caller from the `Authorization: Bearer` header.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))?;

    let user_id = state
        .auth_service
        .validate_token(token)
        .await
        .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {}", e)))?;

    Ok(AuthUser { user_id })
}
