//! Care schedule
//!
//! A single fixed interval covers all species. Species data is joined into
//! read paths for display, but it never changes the cadence.

use chrono::{DateTime, Duration, Utc};

/// Days between one completed maintenance and the next due date.
pub const CARE_INTERVAL_DAYS: i64 = 3;

/// Compute the next due date after completing care.
///
/// The anchor is the provided `from` date when the caller completes ahead of
/// schedule against an existing due date, otherwise `now`.
pub fn next_due_date(from: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    from.unwrap_or(now) + Duration::days(CARE_INTERVAL_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn advances_three_days_from_explicit_anchor() {
        let day_d = Utc.with_ymd_and_hms(2024, 3, 10, 9, 30, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 12, 18, 0, 0).unwrap();

        let due = next_due_date(Some(day_d), now);
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 3, 13, 9, 30, 0).unwrap());
    }

    #[test]
    fn falls_back_to_now_without_anchor() {
        let now = Utc.with_ymd_and_hms(2024, 3, 12, 18, 0, 0).unwrap();

        let due = next_due_date(None, now);
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap());
    }

    #[test]
    fn previous_due_date_is_irrelevant() {
        // Completing against anchor D always lands on D+3, no matter how
        // overdue the record was.
        let long_overdue = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 12, 18, 0, 0).unwrap();

        let due = next_due_date(Some(long_overdue), now);
        assert_eq!(due, Utc.with_ymd_and_hms(2020, 1, 4, 0, 0, 0).unwrap());
    }
}
