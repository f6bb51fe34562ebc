//! Care service: reminder buckets and maintenance completion
//!
//! Completion is a two-phase update: the tentative record is staged in the
//! query cache so concurrent reads observe it, then the store write either
//! commits or reverts the staged value. Nothing mutates the shared cache
//! until the store has been asked, and nothing stays there if it refuses.

use crate::services::{ServiceError, ServiceResult};
use crate::storage::{Database, QueryCache};
use aquatrack_core::{next_due_date, partition_due, ReminderBuckets};
use aquatrack_types::{FishWithSpecies, PlantWithSpecies, UserFish, UserPlant};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Reminder buckets for one tank, fish and plants partitioned separately.
#[derive(Debug, Serialize)]
pub struct TankReminders {
    pub fish: ReminderBuckets<FishWithSpecies>,
    pub plants: ReminderBuckets<PlantWithSpecies>,
}

pub struct CareService {
    db: Arc<Database>,
    cache: Arc<QueryCache>,
}

impl CareService {
    pub fn new(db: Arc<Database>, cache: Arc<QueryCache>) -> Self {
        Self { db, cache }
    }

    /// Partition a tank's inhabitants into due-today/upcoming buckets.
    pub async fn tank_reminders(
        &self,
        tank_id: &str,
        today: NaiveDate,
    ) -> ServiceResult<TankReminders> {
        let fish = self.db.list_fish_by_tank(tank_id).await?;
        let plants = self.db.list_plants_by_tank(tank_id).await?;

        debug!(
            "Classifying reminders for tank {}: {} fish, {} plants",
            tank_id,
            fish.len(),
            plants.len()
        );

        Ok(TankReminders {
            fish: partition_due(fish, today),
            plants: partition_due(plants, today),
        })
    }

    /// Mark a fish's care complete: next due date = (from or now) + the care
    /// interval, staged in the cache until the store confirms.
    pub async fn complete_fish(
        &self,
        id: &str,
        from: Option<DateTime<Utc>>,
    ) -> ServiceResult<UserFish> {
        let fish = self
            .db
            .get_fish(id)
            .await?
            .ok_or(ServiceError::NotFound("fish"))?;

        let next = next_due_date(from, Utc::now());
        info!("Completing care for fish {}: next due {}", id, next);

        let mut updated = fish.clone();
        updated.next_update = next;

        let key = format!("fish:{}", id);
        self.cache.stage(key.clone(), serde_json::to_vec(&updated)?);

        match self.db.update_fish(id, None, Some(next)).await {
            Ok(0) => {
                // Deleted between the read and the write.
                self.cache.revert(&key);
                Err(ServiceError::NotFound("fish"))
            }
            Ok(_) => {
                self.cache.commit(&key);
                self.cache.delete(&format!("tankview:{}", fish.tank_id));
                Ok(updated)
            }
            Err(e) => {
                self.cache.revert(&key);
                Err(e.into())
            }
        }
    }

    /// Mark a plant's care complete by re-anchoring `maintained_at`; the due
    /// date derives from the anchor plus the care interval.
    pub async fn complete_plant(
        &self,
        id: &str,
        from: Option<DateTime<Utc>>,
    ) -> ServiceResult<UserPlant> {
        let plant = self
            .db
            .get_plant(id)
            .await?
            .ok_or(ServiceError::NotFound("plant"))?;

        let anchor = from.unwrap_or_else(Utc::now);
        info!("Completing care for plant {}: anchored at {}", id, anchor);

        let mut updated = plant.clone();
        updated.maintained_at = anchor;

        let key = format!("plant:{}", id);
        self.cache.stage(key.clone(), serde_json::to_vec(&updated)?);

        match self.db.update_plant(id, None, None, Some(anchor)).await {
            Ok(0) => {
                self.cache.revert(&key);
                Err(ServiceError::NotFound("plant"))
            }
            Ok(_) => {
                self.cache.commit(&key);
                self.cache.delete(&format!("tankview:{}", plant.tank_id));
                Ok(updated)
            }
            Err(e) => {
                self.cache.revert(&key);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquatrack_core::CARE_INTERVAL_DAYS;
    use chrono::{Duration, TimeZone};

    struct Fixture {
        care: CareService,
        db: Arc<Database>,
        cache: Arc<QueryCache>,
    }

    async fn fixture() -> Fixture {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let cache = Arc::new(QueryCache::new());
        Fixture {
            care: CareService::new(db.clone(), cache.clone()),
            db,
            cache,
        }
    }

    async fn seed_fish(db: &Database, name: &str, next_update: DateTime<Utc>) -> UserFish {
        let fish = UserFish::new(
            "user-1".into(),
            "tank-1".into(),
            "species-1".into(),
            name.into(),
            None,
            next_update,
        );
        db.insert_fish(std::slice::from_ref(&fish)).await.unwrap();
        fish
    }

    #[tokio::test]
    async fn completion_from_day_d_lands_on_d_plus_interval() {
        let fx = fixture().await;
        let fish = seed_fish(&fx.db, "Nemo", Utc::now()).await;

        let day_d = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let updated = fx.care.complete_fish(&fish.id, Some(day_d)).await.unwrap();

        assert_eq!(updated.next_update, day_d + Duration::days(CARE_INTERVAL_DAYS));

        // And the store agrees.
        let stored = fx.db.get_fish(&fish.id).await.unwrap().unwrap();
        assert_eq!(stored.next_update, updated.next_update);
    }

    #[tokio::test]
    async fn completion_without_anchor_uses_now() {
        let fx = fixture().await;
        let fish = seed_fish(&fx.db, "Dory", Utc::now() - Duration::days(10)).await;

        let before = Utc::now() + Duration::days(CARE_INTERVAL_DAYS);
        let updated = fx.care.complete_fish(&fish.id, None).await.unwrap();
        let after = Utc::now() + Duration::days(CARE_INTERVAL_DAYS);

        assert!(updated.next_update >= before && updated.next_update <= after);
    }

    #[tokio::test]
    async fn successful_completion_commits_staged_record() {
        let fx = fixture().await;
        let fish = seed_fish(&fx.db, "Nemo", Utc::now()).await;

        let updated = fx.care.complete_fish(&fish.id, None).await.unwrap();

        let cached = fx.cache.get(&format!("fish:{}", fish.id)).unwrap();
        let cached: UserFish = serde_json::from_slice(&cached).unwrap();
        assert_eq!(cached.next_update, updated.next_update);
    }

    #[tokio::test]
    async fn failed_completion_reverts_staged_record() {
        let fx = fixture().await;

        // No such row: the staged value must not survive the failure.
        let err = fx.care.complete_fish("ghost", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("fish")));
        assert!(fx.cache.get("fish:ghost").is_none());
    }

    #[tokio::test]
    async fn reminders_partition_covers_every_record() {
        let fx = fixture().await;
        let now = Utc::now();

        seed_fish(&fx.db, "overdue", now - Duration::days(4)).await;
        seed_fish(&fx.db, "due-now", now).await;
        seed_fish(&fx.db, "later", now + Duration::days(2)).await;

        let reminders = fx
            .care
            .tank_reminders("tank-1", now.date_naive())
            .await
            .unwrap();

        assert_eq!(reminders.fish.today.len(), 2);
        assert_eq!(reminders.fish.upcoming.len(), 1);
        assert_eq!(reminders.fish.upcoming[0].fish.name, "later");
        assert!(reminders.plants.today.is_empty());
        assert!(reminders.plants.upcoming.is_empty());
    }

    #[tokio::test]
    async fn plant_completion_reanchors_maintained_at() {
        let fx = fixture().await;

        let plant = UserPlant::new(
            "user-1".into(),
            "tank-1".into(),
            "species-1".into(),
            "Anubias".into(),
            None,
            Utc::now() - Duration::days(7),
        );
        fx.db
            .insert_plants(std::slice::from_ref(&plant))
            .await
            .unwrap();

        let day_d = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let updated = fx.care.complete_plant(&plant.id, Some(day_d)).await.unwrap();
        assert_eq!(updated.maintained_at, day_d);

        use aquatrack_core::Due;
        assert_eq!(updated.due_at(), day_d + Duration::days(CARE_INTERVAL_DAYS));
    }
}
