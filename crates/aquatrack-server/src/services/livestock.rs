//! Livestock service: user-owned fish and plants

use crate::services::{ServiceError, ServiceResult};
use crate::storage::{Database, QueryCache};
use aquatrack_core::validation::{validate_name, validate_optional_name};
use aquatrack_types::{UserFish, UserPlant};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// One record of a batch-add request, before ids and timestamps exist.
#[derive(Debug)]
pub struct NewLivestock {
    pub tank_id: String,
    pub species_id: String,
    pub name: String,
    pub image_url: Option<String>,
}

pub struct LivestockService {
    db: Arc<Database>,
    cache: Arc<QueryCache>,
}

impl LivestockService {
    pub fn new(db: Arc<Database>, cache: Arc<QueryCache>) -> Self {
        Self { db, cache }
    }

    fn invalidate_tank(&self, tank_id: &str) {
        self.cache.delete(&format!("tankview:{}", tank_id));
    }

    // Fish

    /// Batch add. Every new fish is due immediately: `next_update` defaults
    /// to the creation time.
    pub async fn add_fish(
        &self,
        user_id: &str,
        batch: Vec<NewLivestock>,
    ) -> ServiceResult<Vec<UserFish>> {
        for item in &batch {
            validate_name("name", &item.name)?;
        }

        info!("Adding {} fish for user {}", batch.len(), user_id);

        let now = Utc::now();
        let fish: Vec<UserFish> = batch
            .into_iter()
            .map(|item| {
                UserFish::new(
                    user_id.to_string(),
                    item.tank_id,
                    item.species_id,
                    item.name,
                    item.image_url,
                    now,
                )
            })
            .collect();

        self.db.insert_fish(&fish).await?;

        for f in &fish {
            self.invalidate_tank(&f.tank_id);
        }

        Ok(fish)
    }

    pub async fn get_fish(&self, id: &str) -> ServiceResult<UserFish> {
        self.db
            .get_fish(id)
            .await?
            .ok_or(ServiceError::NotFound("fish"))
    }

    pub async fn list_fish(&self, user_id: &str) -> ServiceResult<Vec<UserFish>> {
        Ok(self.db.list_fish_by_user(user_id).await?)
    }

    pub async fn update_fish(
        &self,
        id: &str,
        name: Option<String>,
        next_update: Option<DateTime<Utc>>,
    ) -> ServiceResult<UserFish> {
        validate_optional_name("name", name.as_deref())?;

        let affected = self.db.update_fish(id, name.as_deref(), next_update).await?;
        if affected == 0 {
            return Err(ServiceError::NotFound("fish"));
        }

        let fish = self.get_fish(id).await?;
        self.invalidate_tank(&fish.tank_id);

        Ok(fish)
    }

    pub async fn delete_fish(&self, id: &str) -> ServiceResult<()> {
        let fish = self.get_fish(id).await?;

        self.db.delete_fish(id).await?;
        self.invalidate_tank(&fish.tank_id);

        Ok(())
    }

    // Plants

    /// Batch add. `maintained_at` defaults to the creation time, putting the
    /// first reminder one care interval out.
    pub async fn add_plants(
        &self,
        user_id: &str,
        batch: Vec<NewLivestock>,
    ) -> ServiceResult<Vec<UserPlant>> {
        for item in &batch {
            validate_name("name", &item.name)?;
        }

        info!("Adding {} plants for user {}", batch.len(), user_id);

        let now = Utc::now();
        let plants: Vec<UserPlant> = batch
            .into_iter()
            .map(|item| {
                UserPlant::new(
                    user_id.to_string(),
                    item.tank_id,
                    item.species_id,
                    item.name,
                    item.image_url,
                    now,
                )
            })
            .collect();

        self.db.insert_plants(&plants).await?;

        for p in &plants {
            self.invalidate_tank(&p.tank_id);
        }

        Ok(plants)
    }

    pub async fn get_plant(&self, id: &str) -> ServiceResult<UserPlant> {
        self.db
            .get_plant(id)
            .await?
            .ok_or(ServiceError::NotFound("plant"))
    }

    pub async fn list_plants(&self, user_id: &str) -> ServiceResult<Vec<UserPlant>> {
        Ok(self.db.list_plants_by_user(user_id).await?)
    }

    /// Edit a plant. Any edit counts as touching the plant, so the
    /// maintenance anchor is refreshed as well.
    pub async fn update_plant(
        &self,
        id: &str,
        name: Option<String>,
        image_url: Option<String>,
    ) -> ServiceResult<UserPlant> {
        validate_optional_name("name", name.as_deref())?;

        let affected = self
            .db
            .update_plant(id, name.as_deref(), image_url.as_deref(), Some(Utc::now()))
            .await?;
        if affected == 0 {
            return Err(ServiceError::NotFound("plant"));
        }

        let plant = self.get_plant(id).await?;
        self.invalidate_tank(&plant.tank_id);

        Ok(plant)
    }

    pub async fn delete_plant(&self, id: &str) -> ServiceResult<()> {
        let plant = self.get_plant(id).await?;

        self.db.delete_plant(id).await?;
        self.invalidate_tank(&plant.tank_id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> LivestockService {
        let db = Arc::new(Database::in_memory().await.unwrap());
        LivestockService::new(db, Arc::new(QueryCache::new()))
    }

    fn new_fish(name: &str) -> NewLivestock {
        NewLivestock {
            tank_id: "tank-1".into(),
            species_id: "species-1".into(),
            name: name.into(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn batch_add_defaults_due_date_to_creation() {
        let livestock = service().await;

        let before = Utc::now();
        let added = livestock
            .add_fish("user-1", vec![new_fish("Nemo"), new_fish("Dory")])
            .await
            .unwrap();
        let after = Utc::now();

        assert_eq!(added.len(), 2);
        for f in &added {
            assert!(f.next_update >= before && f.next_update <= after);
        }

        assert_eq!(livestock.list_fish("user-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn oversized_name_rejected_and_record_unchanged() {
        let livestock = service().await;

        let added = livestock
            .add_fish("user-1", vec![new_fish("Nemo")])
            .await
            .unwrap();
        let id = added[0].id.clone();

        let err = livestock
            .update_fish(&id, Some("x".repeat(256)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));

        // The stored record is untouched.
        let stored = livestock.get_fish(&id).await.unwrap();
        assert_eq!(stored.name, "Nemo");
    }

    #[tokio::test]
    async fn empty_batch_rejects_nothing_and_writes_nothing() {
        let livestock = service().await;
        let added = livestock.add_fish("user-1", vec![]).await.unwrap();
        assert!(added.is_empty());
        assert!(livestock.list_fish("user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_batch_member_rejects_whole_batch() {
        let livestock = service().await;

        let err = livestock
            .add_fish("user-1", vec![new_fish("Ok"), new_fish("")])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));

        // Validation happens before any insert, so the valid member was not
        // written either.
        assert!(livestock.list_fish("user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn plant_update_refreshes_maintenance_anchor() {
        let livestock = service().await;

        let added = livestock
            .add_plants("user-1", vec![new_fish("Java fern")])
            .await
            .unwrap();
        let id = added[0].id.clone();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = livestock
            .update_plant(&id, Some("Java fern (left)".into()), None)
            .await
            .unwrap();

        assert_eq!(updated.name, "Java fern (left)");
        assert!(updated.maintained_at > added[0].maintained_at);
    }

    #[tokio::test]
    async fn delete_missing_fish_is_not_found() {
        let livestock = service().await;
        let err = livestock.delete_fish("no-such-id").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("fish")));
    }
}
