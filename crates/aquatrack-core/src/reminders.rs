//! Reminder classifier
//!
//! Partitions owned records into "due today" and "upcoming" buckets for
//! display. Comparison is at day granularity: anything due on or before the
//! reference day counts as due today, including records that are overdue.

use crate::schedule::CARE_INTERVAL_DAYS;
use aquatrack_types::{FishWithSpecies, PlantWithSpecies, UserFish, UserPlant};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

/// Anything with a maintenance due date.
pub trait Due {
    fn due_at(&self) -> DateTime<Utc>;
}

impl Due for UserFish {
    fn due_at(&self) -> DateTime<Utc> {
        self.next_update
    }
}

impl Due for UserPlant {
    fn due_at(&self) -> DateTime<Utc> {
        self.maintained_at + Duration::days(CARE_INTERVAL_DAYS)
    }
}

impl Due for FishWithSpecies {
    fn due_at(&self) -> DateTime<Utc> {
        self.fish.due_at()
    }
}

impl Due for PlantWithSpecies {
    fn due_at(&self) -> DateTime<Utc> {
        self.plant.due_at()
    }
}

/// The two display buckets. Together they always hold every input record
/// exactly once, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderBuckets<T> {
    pub today: Vec<T>,
    pub upcoming: Vec<T>,
}

impl<T> Default for ReminderBuckets<T> {
    fn default() -> Self {
        Self {
            today: Vec::new(),
            upcoming: Vec::new(),
        }
    }
}

/// Split `items` by due date relative to `today`. No sorting is applied;
/// each bucket preserves the insertion order of the input.
pub fn partition_due<T: Due>(items: Vec<T>, today: NaiveDate) -> ReminderBuckets<T> {
    let mut buckets = ReminderBuckets::default();
    for item in items {
        if item.due_at().date_naive() <= today {
            buckets.today.push(item);
        } else {
            buckets.upcoming.push(item);
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fish(name: &str, next_update: DateTime<Utc>) -> UserFish {
        UserFish {
            id: format!("fish-{name}"),
            user_id: "user-1".into(),
            tank_id: "tank-1".into(),
            species_id: "species-1".into(),
            name: name.into(),
            image_url: None,
            next_update,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_yields_empty_buckets() {
        let buckets = partition_due(Vec::<UserFish>::new(), day(2024, 5, 1).date_naive());
        assert!(buckets.today.is_empty());
        assert!(buckets.upcoming.is_empty());
    }

    #[test]
    fn partitions_without_loss_or_duplication() {
        let today = day(2024, 5, 10).date_naive();
        let input = vec![
            fish("overdue", day(2024, 5, 1)),
            fish("due-today", day(2024, 5, 10)),
            fish("tomorrow", day(2024, 5, 11)),
            fish("next-week", day(2024, 5, 17)),
        ];
        let total = input.len();

        let buckets = partition_due(input, today);
        assert_eq!(buckets.today.len() + buckets.upcoming.len(), total);

        let names: Vec<&str> = buckets
            .today
            .iter()
            .chain(buckets.upcoming.iter())
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["overdue", "due-today", "tomorrow", "next-week"]);
    }

    #[test]
    fn due_on_or_before_today_counts_as_today() {
        let today = day(2024, 5, 10).date_naive();
        let buckets = partition_due(
            vec![fish("past", day(2024, 5, 9)), fish("exact", day(2024, 5, 10))],
            today,
        );
        assert_eq!(buckets.today.len(), 2);
        assert!(buckets.upcoming.is_empty());
    }

    #[test]
    fn day_granularity_ignores_time_of_day() {
        let today = day(2024, 5, 10).date_naive();
        // Due late tonight: still today, not upcoming.
        let late_tonight = Utc.with_ymd_and_hms(2024, 5, 10, 23, 59, 59).unwrap();
        let buckets = partition_due(vec![fish("tonight", late_tonight)], today);
        assert_eq!(buckets.today.len(), 1);
    }

    #[test]
    fn preserves_insertion_order_within_buckets() {
        let today = day(2024, 5, 10).date_naive();
        let buckets = partition_due(
            vec![
                fish("b", day(2024, 5, 2)),
                fish("a", day(2024, 5, 1)),
                fish("z", day(2024, 5, 12)),
                fish("y", day(2024, 5, 11)),
            ],
            today,
        );
        let today_names: Vec<&str> = buckets.today.iter().map(|f| f.name.as_str()).collect();
        let upcoming_names: Vec<&str> = buckets.upcoming.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(today_names, vec!["b", "a"]);
        assert_eq!(upcoming_names, vec!["z", "y"]);
    }

    #[test]
    fn plant_due_date_derives_from_maintained_at() {
        let plant = UserPlant {
            id: "plant-1".into(),
            user_id: "user-1".into(),
            tank_id: "tank-1".into(),
            species_id: "species-1".into(),
            name: "Anubias".into(),
            image_url: None,
            maintained_at: day(2024, 5, 8),
        };
        assert_eq!(plant.due_at(), day(2024, 5, 11));

        // Maintained three days ago: due today.
        let buckets = partition_due(vec![plant], day(2024, 5, 11).date_naive());
        assert_eq!(buckets.today.len(), 1);
    }
}
