//! Error types for the store crate.

use match_core::{CoreError, ValidationErrors};

/// Errors raised by a [`Store`](crate::Store) backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A foreign key names a row that does not exist.
    #[error("{field} references missing {resource} {id}")]
    MissingReference {
        field: &'static str,
        resource: &'static str,
        id: i64,
    },

    /// A unique column already holds the value.
    #[error("{resource} with {field} '{value}' already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },

    /// A stored row no longer satisfies a model invariant.
    #[error("corrupt row: {0}")]
    Corrupt(#[from] CoreError),

    /// The store could not be opened with the given settings.
    #[error("invalid store configuration: {0}")]
    Config(String),

    /// A password could not be hashed.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors raised by the [`Registry`](crate::Registry).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The request body failed validation.
    #[error("validation failed: {0}")]
    Invalid(ValidationErrors),

    /// No row has the requested primary key.
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: i64 },

    /// The backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationErrors> for RegistryError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}
