//! Business logic services

pub mod auth;
pub mod care;
pub mod livestock;
pub mod tanks;

pub use auth::AuthService;
pub use care::CareService;
pub use livestock::LivestockService;
pub use tanks::TankService;

use aquatrack_core::CoreError;
use thiserror::Error;

/// Error taxonomy shared by the entity services: invalid input (rejected
/// before any store call), missing rows, and store failures propagated
/// unchanged.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
