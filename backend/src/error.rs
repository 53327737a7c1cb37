//! Error types for the listing store.
//!
//! Every failure is scoped to the request that caused it and surfaced as a
//! typed variant; nothing here is retried internally.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Field-level problems found before anything reaches the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing")]
    MissingField { field: &'static str },

    #[error("Field '{field}' exceeds maximum length of {max_length}")]
    FieldTooLong {
        field: &'static str,
        max_length: usize,
    },

    #[error("Field '{field}' must not be negative")]
    Negative { field: &'static str },

    #[error("Field '{field}' does not fit numeric({precision}, {scale})")]
    PrecisionOutOfRange {
        field: &'static str,
        precision: u32,
        scale: u32,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Unique constraint violated on {entity}: {detail}")]
    UniqueConstraintViolated { entity: &'static str, detail: String },

    #[error("{entity} references a missing {reference}")]
    ForeignKeyMissing {
        entity: &'static str,
        reference: String,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Cannot delete {entity} {id}: {count} live {dependent} row(s) still reference it")]
    ReferentialRestrictionViolated {
        entity: &'static str,
        id: i64,
        dependent: &'static str,
        count: i64,
    },

    #[error("Stored {entity} row is corrupt: {reason}")]
    CorruptRow { entity: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] DieselError),

    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn missing_reference(entity: &'static str, target: &str, id: i64) -> Self {
        Self::ForeignKeyMissing {
            entity,
            reference: format!("{target} {id}"),
        }
    }

    /// Classifies an engine error raised while writing a row of `entity`.
    pub fn from_write(entity: &'static str, err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueConstraintViolated {
                    entity,
                    detail: info.message().to_string(),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ForeignKeyMissing {
                    entity,
                    reference: info.message().to_string(),
                }
            }
            other => Self::Database(other),
        }
    }

    /// True for failures caused by the request payload rather than the store.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed(_)
                | Self::UniqueConstraintViolated { .. }
                | Self::ForeignKeyMissing { .. }
                | Self::NotFound { .. }
                | Self::ReferentialRestrictionViolated { .. }
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
