//! User handlers

use crate::error::ApiError;
use crate::extractors::authenticate;
use crate::AppState;
use axum::{extract::State, http::HeaderMap, Json};
use aquatrack_types::User;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    user: User,
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let user = state
        .db
        .get_user_by_id(&auth.user_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(UserResponse { user }))
}
