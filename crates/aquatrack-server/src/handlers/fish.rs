//! Fish handlers

use crate::error::ApiError;
use crate::extractors::authenticate;
use crate::services::livestock::NewLivestock;
use crate::AppState;
use aquatrack_types::UserFish;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct FishListResponse {
    fish: Vec<UserFish>,
}

#[derive(Debug, Serialize)]
pub struct FishResponse {
    fish: UserFish,
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FishListResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let fish = state.livestock.list_fish(&auth.user_id).await?;
    Ok(Json(FishListResponse { fish }))
}

#[derive(Debug, Deserialize)]
pub struct NewFishRequest {
    tank_id: String,
    species_id: String,
    name: String,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFishRequest {
    fish: Vec<NewFishRequest>,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AddFishRequest>,
) -> Result<Json<FishListResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let batch = req
        .fish
        .into_iter()
        .map(|f| NewLivestock {
            tank_id: f.tank_id,
            species_id: f.species_id,
            name: f.name,
            image_url: f.image_url,
        })
        .collect();

    let fish = state.livestock.add_fish(&auth.user_id, batch).await?;
    Ok(Json(FishListResponse { fish }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateFishRequest {
    name: Option<String>,
    next_update: Option<DateTime<Utc>>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateFishRequest>,
) -> Result<Json<FishResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let fish = state.livestock.get_fish(&id).await?;
    if fish.user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    let fish = state
        .livestock
        .update_fish(&id, req.name, req.next_update)
        .await?;

    Ok(Json(FishResponse { fish }))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let fish = state.livestock.get_fish(&id).await?;
    if fish.user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    state.livestock.delete_fish(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Default)]
pub struct CompleteRequest {
    /// Anchor for the next due date; defaults to the current time.
    from: Option<DateTime<Utc>>,
}

pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<FishResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let fish = state.livestock.get_fish(&id).await?;
    if fish.user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    let fish = state.care.complete_fish(&id, req.from).await?;
    Ok(Json(FishResponse { fish }))
}
