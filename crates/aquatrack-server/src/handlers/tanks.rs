//! Tank handlers

use crate::error::ApiError;
use crate::extractors::authenticate;
use crate::services::care::TankReminders;
use crate::services::tanks::{TankDeletion, TankPatch};
use crate::AppState;
use aquatrack_types::{Tank, TankView, WaterParams};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct TankListResponse {
    tanks: Vec<Tank>,
}

#[derive(Debug, Serialize)]
pub struct TankResponse {
    tank: Tank,
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TankListResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let tanks = state.tanks.list_tanks(&auth.user_id).await?;
    Ok(Json(TankListResponse { tanks }))
}

#[derive(Debug, Deserialize)]
pub struct CreateTankRequest {
    name: String,
    image: Option<String>,
    #[serde(flatten)]
    water: WaterParams,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateTankRequest>,
) -> Result<Json<TankResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let tank = state
        .tanks
        .create_tank(&auth.user_id, req.name, req.image, req.water)
        .await?;

    Ok(Json(TankResponse { tank }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<TankView>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let view = state.tanks.get_tank_view(&id).await?;
    if view.tank.user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTankRequest {
    name: Option<String>,
    image: Option<String>,
    #[serde(flatten)]
    water: WaterParams,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateTankRequest>,
) -> Result<Json<TankResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let tank = state.tanks.get_tank(&id).await?;
    if tank.user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    let patch = TankPatch {
        name: req.name,
        image: req.image,
        water: req.water,
    };
    let tank = state.tanks.update_tank(&id, patch, Utc::now()).await?;

    Ok(Json(TankResponse { tank }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteTankRequest {
    #[serde(default)]
    is_removing_fish: bool,
    #[serde(default)]
    removed_fish: Vec<String>,
    #[serde(default)]
    is_removing_plants: bool,
    #[serde(default)]
    removed_plants: Vec<String>,
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<DeleteTankRequest>,
) -> Result<StatusCode, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let tank = state.tanks.get_tank(&id).await?;
    if tank.user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    let deletion = TankDeletion {
        remove_fish: req.is_removing_fish,
        removed_fish: req.removed_fish,
        remove_plants: req.is_removing_plants,
        removed_plants: req.removed_plants,
    };
    state.tanks.delete_tank(&id, deletion).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn reminders(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<TankReminders>, ApiError> {
    let auth = authenticate(&state, &headers).await?;

    let tank = state.tanks.get_tank(&id).await?;
    if tank.user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    let reminders = state
        .care
        .tank_reminders(&id, Utc::now().date_naive())
        .await?;

    Ok(Json(reminders))
}
