//! Plant handlers

use crate::error::ApiError;
use crate::extractors::authenticate;
use crate::services::livestock::NewLivestock;
use crate::AppState;
use aquatrack_types::UserPlant;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct PlantListResponse {
    plants: Vec<UserPlant>,
}

#[derive(Debug, Serialize)]
pub struct PlantResponse {
    plant: UserPlant,
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PlantListResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let plants = state.livestock.list_plants(&auth.user_id).await?;
    Ok(Json(PlantListResponse { plants }))
}

#[derive(Debug, Deserialize)]
pub struct NewPlantRequest {
    tank_id: String,
    species_id: String,
    name: String,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddPlantsRequest {
    plants: Vec<NewPlantRequest>,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AddPlantsRequest>,
) -> Result<Json<PlantListResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let batch = req
        .plants
        .into_iter()
        .map(|p| NewLivestock {
            tank_id: p.tank_id,
            species_id: p.species_id,
            name: p.name,
            image_url: p.image_url,
        })
        .collect();

    let plants = state.livestock.add_plants(&auth.user_id, batch).await?;
    Ok(Json(PlantListResponse { plants }))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlantRequest {
    name: Option<String>,
    image_url: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdatePlantRequest>,
) -> Result<Json<PlantResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let plant = state.livestock.get_plant(&id).await?;
    if plant.user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    let plant = state
        .livestock
        .update_plant(&id, req.name, req.image_url)
        .await?;

    Ok(Json(PlantResponse { plant }))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let plant = state.livestock.get_plant(&id).await?;
    if plant.user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    state.livestock.delete_plant(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Default)]
pub struct CompleteRequest {
    /// Anchor for the new maintenance time; defaults to the current time.
    from: Option<DateTime<Utc>>,
}

pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<PlantResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let plant = state.livestock.get_plant(&id).await?;
    if plant.user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    let plant = state.care.complete_plant(&id, req.from).await?;
    Ok(Json(PlantResponse { plant }))
}
