//! Error types for Aquatrack domain logic

use thiserror::Error;

/// Errors produced by domain-level checks.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("validation failed for `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl CoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
