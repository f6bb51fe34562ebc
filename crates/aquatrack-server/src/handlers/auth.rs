//! Authentication handlers

use crate::error::ApiError;
use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    id: String,
    email: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    email: String,
    name: Option<String>,
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    refresh_token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    info!("Login attempt for: {}", req.email);

    let tokens = state
        .auth_service
        .login(&req.email, &req.password)
        .await
        .map_err(|e| {
            error!("Login error: {}", e);
            ApiError::Unauthorized("Invalid credentials".to_string())
        })?;

    let user_id = state
        .auth_service
        .validate_token(&tokens.access_token)
        .await
        .map_err(ApiError::Internal)?;

    info!("Login successful for: {}", req.email);

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: UserInfo {
            id: user_id,
            email: req.email,
            name: None,
        },
    }))
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    info!("Registration attempt for: {}", req.email);

    if !req.email.contains('@') {
        return Err(ApiError::Validation {
            field: "email".to_string(),
            message: "must be an email address".to_string(),
        });
    }

    if req.password.len() < 6 {
        return Err(ApiError::Validation {
            field: "password".to_string(),
            message: "must be at least 6 characters".to_string(),
        });
    }

    if state
        .db
        .get_user_by_email(&req.email)
        .await
        .map_err(ApiError::Internal)?
        .is_some()
    {
        return Err(ApiError::Conflict("email already registered"));
    }

    let tokens = state
        .auth_service
        .register(&req.email, &req.password, req.name.as_deref())
        .await
        .map_err(|e| {
            error!("Registration error: {}", e);
            ApiError::Internal(e)
        })?;

    let user_id = state
        .auth_service
        .validate_token(&tokens.access_token)
        .await
        .map_err(ApiError::Internal)?;

    info!("Registration successful for: {}", req.email);

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: UserInfo {
            id: user_id,
            email: req.email,
            name: req.name,
        },
    }))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let tokens = state
        .auth_service
        .refresh(&req.refresh_token)
        .await
        .map_err(|e| ApiError::Unauthorized(format!("Invalid refresh token: {}", e)))?;

    let user_id = state
        .auth_service
        .validate_token(&tokens.access_token)
        .await
        .map_err(ApiError::Internal)?;

    let user = state
        .db
        .get_user_by_id(&user_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: UserInfo {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    }))
}
