//! Species catalog handlers
//!
//! Reference data joined into the read paths. Catalog entries are keyed by
//! uuid like everything else; both verbs require a valid token.

use crate::error::ApiError;
use crate::extractors::authenticate;
use crate::AppState;
use aquatrack_core::validation::validate_name;
use aquatrack_types::{FishSpecies, PlantSpecies};
use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct FishSpeciesListResponse {
    species: Vec<FishSpecies>,
}

#[derive(Debug, Serialize)]
pub struct PlantSpeciesListResponse {
    species: Vec<PlantSpecies>,
}

pub async fn list_fish(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FishSpeciesListResponse>, ApiError> {
    authenticate(&state, &headers).await?;

    let species = state.db.list_fish_species().await.map_err(ApiError::Internal)?;
    Ok(Json(FishSpeciesListResponse { species }))
}

#[derive(Debug, Deserialize)]
pub struct CreateFishSpeciesRequest {
    species: String,
    #[serde(default)]
    habitat: String,
    #[serde(default)]
    diet: String,
    #[serde(default)]
    tank_sizes: String,
    #[serde(default)]
    tank_friends: String,
    #[serde(default)]
    illnesses: String,
    image_url: Option<String>,
}

pub async fn create_fish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateFishSpeciesRequest>,
) -> Result<Json<FishSpecies>, ApiError> {
    authenticate(&state, &headers).await?;

    validate_name("species", &req.species)?;

    let species = FishSpecies {
        id: uuid::Uuid::new_v4().to_string(),
        species: req.species,
        habitat: req.habitat,
        diet: req.diet,
        tank_sizes: req.tank_sizes,
        tank_friends: req.tank_friends,
        illnesses: req.illnesses,
        image_url: req.image_url,
    };
    state
        .db
        .create_fish_species(&species)
        .await
        .map_err(ApiError::Internal)?;

    Ok(Json(species))
}

pub async fn list_plants(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PlantSpeciesListResponse>, ApiError> {
    authenticate(&state, &headers).await?;

    let species = state
        .db
        .list_plant_species()
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(PlantSpeciesListResponse { species }))
}

#[derive(Debug, Deserialize)]
pub struct CreatePlantSpeciesRequest {
    species: String,
    #[serde(default)]
    lighting: String,
    #[serde(default)]
    soil: String,
    #[serde(default)]
    illnesses: String,
    image_url: Option<String>,
}

pub async fn create_plant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePlantSpeciesRequest>,
) -> Result<Json<PlantSpecies>, ApiError> {
    authenticate(&state, &headers).await?;

    validate_name("species", &req.species)?;

    let species = PlantSpecies {
        id: uuid::Uuid::new_v4().to_string(),
        species: req.species,
        lighting: req.lighting,
        soil: req.soil,
        illnesses: req.illnesses,
        image_url: req.image_url,
    };
    state
        .db
        .create_plant_species(&species)
        .await
        .map_err(ApiError::Internal)?;

    Ok(Json(species))
}
