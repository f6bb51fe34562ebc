//! Tank types

use crate::livestock::{FishWithSpecies, PlantWithSpecies};
use crate::water::WaterParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-owned aquarium with its latest water-parameter snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub image: Option<String>,
    #[serde(flatten)]
    pub water: WaterParams,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub maintained_at: DateTime<Utc>,
}

impl Tank {
    /// Create a fresh tank owned by `user_id`. All three timestamps start at
    /// `now`, which keeps the `created_at <= updated_at` invariant trivially.
    pub fn new(
        user_id: String,
        name: String,
        image: Option<String>,
        water: WaterParams,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            name,
            image,
            water,
            created_at: now,
            updated_at: now,
            maintained_at: now,
        }
    }
}

/// A tank together with its inhabitants, as returned by the detail read path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankView {
    pub tank: Tank,
    pub fish: Vec<FishWithSpecies>,
    pub plants: Vec<PlantWithSpecies>,
}
