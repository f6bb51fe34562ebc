//! Tank service

use crate::services::{ServiceError, ServiceResult};
use crate::storage::{Database, QueryCache};
use aquatrack_core::validation::{validate_name, validate_optional_name, validate_water_params};
use aquatrack_types::{Tank, TankView, WaterParams};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Partial update payload for a tank.
#[derive(Debug, Default)]
pub struct TankPatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub water: WaterParams,
}

/// Caller-driven cascade decisions for tank deletion. Only explicitly listed
/// ids are removed, and only when the matching flag is set.
#[derive(Debug, Default)]
pub struct TankDeletion {
    pub remove_fish: bool,
    pub removed_fish: Vec<String>,
    pub remove_plants: bool,
    pub removed_plants: Vec<String>,
}

pub struct TankService {
    db: Arc<Database>,
    cache: Arc<QueryCache>,
}

impl TankService {
    pub fn new(db: Arc<Database>, cache: Arc<QueryCache>) -> Self {
        Self { db, cache }
    }

    fn view_key(id: &str) -> String {
        format!("tankview:{}", id)
    }

    pub async fn create_tank(
        &self,
        user_id: &str,
        name: String,
        image: Option<String>,
        water: WaterParams,
    ) -> ServiceResult<Tank> {
        validate_name("name", &name)?;
        validate_water_params(&water)?;

        info!("Creating tank: user={}, name={}", user_id, name);

        let tank = Tank::new(user_id.to_string(), name, image, water, Utc::now());
        self.db.create_tank(&tank).await?;

        Ok(tank)
    }

    pub async fn get_tank(&self, id: &str) -> ServiceResult<Tank> {
        self.db
            .get_tank(id)
            .await?
            .ok_or(ServiceError::NotFound("tank"))
    }

    pub async fn list_tanks(&self, user_id: &str) -> ServiceResult<Vec<Tank>> {
        Ok(self.db.list_tanks_by_user(user_id).await?)
    }

    /// Detail read path: the tank with its fish and plants, each enriched
    /// with the catalog species name. Cached until the next mutation.
    pub async fn get_tank_view(&self, id: &str) -> ServiceResult<TankView> {
        let key = Self::view_key(id);
        if let Some(data) = self.cache.get(&key) {
            if let Ok(view) = serde_json::from_slice::<TankView>(&data) {
                return Ok(view);
            }
        }

        let tank = self
            .db
            .get_tank(id)
            .await?
            .ok_or(ServiceError::NotFound("tank"))?;
        let fish = self.db.list_fish_by_tank(id).await?;
        let plants = self.db.list_plants_by_tank(id).await?;

        let view = TankView { tank, fish, plants };
        self.cache.set(key, serde_json::to_vec(&view)?);

        Ok(view)
    }

    pub async fn update_tank(
        &self,
        id: &str,
        patch: TankPatch,
        now: DateTime<Utc>,
    ) -> ServiceResult<Tank> {
        validate_optional_name("name", patch.name.as_deref())?;
        validate_water_params(&patch.water)?;

        debug!("Updating tank {}", id);

        let affected = self
            .db
            .update_tank(
                id,
                patch.name.as_deref(),
                patch.image.as_deref(),
                &patch.water,
                now,
            )
            .await?;
        if affected == 0 {
            return Err(ServiceError::NotFound("tank"));
        }

        self.cache.delete(&Self::view_key(id));

        self.get_tank(id).await
    }

    /// Delete a tank, honoring the caller's cascade flags. The deletes are
    /// sequential independent calls, not a transaction.
    pub async fn delete_tank(&self, id: &str, deletion: TankDeletion) -> ServiceResult<()> {
        info!(
            "Deleting tank {} (remove_fish={}, remove_plants={})",
            id, deletion.remove_fish, deletion.remove_plants
        );

        if deletion.remove_fish {
            self.db.delete_fish_many(&deletion.removed_fish).await?;
        }
        if deletion.remove_plants {
            self.db.delete_plants_many(&deletion.removed_plants).await?;
        }

        let affected = self.db.delete_tank(id).await?;
        if affected == 0 {
            return Err(ServiceError::NotFound("tank"));
        }

        self.cache.delete(&Self::view_key(id));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquatrack_types::UserFish;

    async fn service() -> TankService {
        let db = Arc::new(Database::in_memory().await.unwrap());
        TankService::new(db, Arc::new(QueryCache::new()))
    }

    fn valid_water() -> WaterParams {
        WaterParams {
            ammonia: Some(0.0),
            ph: Some(7.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_returns_consistent_timestamps() {
        let tanks = service().await;

        let tank = tanks
            .create_tank("user-1", "Community 60L".into(), None, valid_water())
            .await
            .unwrap();

        assert!(tank.created_at <= tank.updated_at);
        assert_eq!(tank.user_id, "user-1");

        let fetched = tanks.get_tank(&tank.id).await.unwrap();
        assert_eq!(fetched.name, "Community 60L");
        assert_eq!(fetched.water.ph, Some(7.0));
    }

    #[tokio::test]
    async fn out_of_range_ph_is_rejected_before_any_store_write() {
        let tanks = service().await;

        let bad_water = WaterParams {
            ph: Some(15.0),
            ..Default::default()
        };
        let err = tanks
            .create_tank("user-1", "Bad tank".into(), None, bad_water)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));

        // Nothing was written.
        assert!(tanks.list_tanks("user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_refreshes_maintenance_timestamps() {
        let tanks = service().await;

        let tank = tanks
            .create_tank("user-1", "Shrimp tank".into(), None, valid_water())
            .await
            .unwrap();

        let later = tank.updated_at + chrono::Duration::hours(5);
        let patch = TankPatch {
            name: Some("Shrimp & moss".into()),
            ..Default::default()
        };
        let updated = tanks.update_tank(&tank.id, patch, later).await.unwrap();

        assert_eq!(updated.name, "Shrimp & moss");
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.maintained_at, later);
        // Untouched fields survive the patch.
        assert_eq!(updated.water.ph, Some(7.0));
        assert_eq!(updated.created_at, tank.created_at);
    }

    #[tokio::test]
    async fn update_of_missing_tank_is_not_found() {
        let tanks = service().await;
        let err = tanks
            .update_tank("no-such-id", TankPatch::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("tank")));
    }

    #[tokio::test]
    async fn delete_without_cascade_leaves_fish_intact() {
        let tanks = service().await;
        let db = tanks.db.clone();

        let tank = tanks
            .create_tank("user-1", "Betta bowl".into(), None, valid_water())
            .await
            .unwrap();

        let fish: Vec<UserFish> = (0..3)
            .map(|i| {
                UserFish::new(
                    "user-1".into(),
                    tank.id.clone(),
                    "species-1".into(),
                    format!("fish-{i}"),
                    None,
                    Utc::now(),
                )
            })
            .collect();
        db.insert_fish(&fish).await.unwrap();

        tanks
            .delete_tank(&tank.id, TankDeletion::default())
            .await
            .unwrap();

        assert!(tanks.get_tank(&tank.id).await.is_err());
        assert_eq!(db.list_fish_by_user("user-1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_with_cascade_removes_only_listed_ids() {
        let tanks = service().await;
        let db = tanks.db.clone();

        let tank = tanks
            .create_tank("user-1", "Big tank".into(), None, valid_water())
            .await
            .unwrap();

        let fish: Vec<UserFish> = (0..3)
            .map(|i| {
                UserFish::new(
                    "user-1".into(),
                    tank.id.clone(),
                    "species-1".into(),
                    format!("fish-{i}"),
                    None,
                    Utc::now(),
                )
            })
            .collect();
        db.insert_fish(&fish).await.unwrap();

        let deletion = TankDeletion {
            remove_fish: true,
            removed_fish: vec![fish[0].id.clone(), fish[2].id.clone()],
            ..Default::default()
        };
        tanks.delete_tank(&tank.id, deletion).await.unwrap();

        let remaining = db.list_fish_by_user("user-1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, fish[1].id);
    }
}
