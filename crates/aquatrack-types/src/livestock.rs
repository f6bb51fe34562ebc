//! Fish and plant types: species catalogs plus user-owned records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference catalog entry for a fish species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FishSpecies {
    pub id: String,
    pub species: String,
    pub habitat: String,
    pub diet: String,
    pub tank_sizes: String,
    pub tank_friends: String,
    pub illnesses: String,
    pub image_url: Option<String>,
}

/// Reference catalog entry for a plant species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantSpecies {
    pub id: String,
    pub species: String,
    pub lighting: String,
    pub soil: String,
    pub illnesses: String,
    pub image_url: Option<String>,
}

/// A fish a user keeps in one of their tanks.
///
/// `next_update` is when the next feeding/maintenance is due. It defaults to
/// the creation time, so a freshly added fish shows up as due immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFish {
    pub id: String,
    pub user_id: String,
    pub tank_id: String,
    pub species_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub next_update: DateTime<Utc>,
}

impl UserFish {
    pub fn new(
        user_id: String,
        tank_id: String,
        species_id: String,
        name: String,
        image_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            tank_id,
            species_id,
            name,
            image_url,
            next_update: now,
        }
    }
}

/// A plant a user keeps in one of their tanks.
///
/// Plants track when they were last maintained; the due date is derived from
/// `maintained_at` plus the care interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPlant {
    pub id: String,
    pub user_id: String,
    pub tank_id: String,
    pub species_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub maintained_at: DateTime<Utc>,
}

impl UserPlant {
    pub fn new(
        user_id: String,
        tank_id: String,
        species_id: String,
        name: String,
        image_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            tank_id,
            species_id,
            name,
            image_url,
            maintained_at: now,
        }
    }
}

/// Read-path view of a fish with its catalog species name attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FishWithSpecies {
    #[serde(flatten)]
    pub fish: UserFish,
    pub species: Option<String>,
}

/// Read-path view of a plant with its catalog species name attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantWithSpecies {
    #[serde(flatten)]
    pub plant: UserPlant,
    pub species: Option<String>,
}
