//! Storage layer
//!
//! SQLite (embedded) for durable rows, a DashMap-backed query cache for
//! read-path views and staged optimistic updates.

pub mod db;
pub mod memory;

pub use db::Database;
pub use memory::QueryCache;
