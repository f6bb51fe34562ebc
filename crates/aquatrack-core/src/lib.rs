//! Aquatrack core domain logic
//!
//! Everything in this crate is synchronous and store-agnostic: input
//! validation, the care schedule, and the reminder classifier. The server
//! crate wires these into handlers and services.

pub mod error;
pub mod reminders;
pub mod schedule;
pub mod validation;

pub use error::{CoreError, Result};
pub use reminders::{partition_due, Due, ReminderBuckets};
pub use schedule::{next_due_date, CARE_INTERVAL_DAYS};
