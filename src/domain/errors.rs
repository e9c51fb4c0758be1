//! Domain errors for the step synchronization engine.

use thiserror::Error;

/// Domain-level errors that can occur while syncing day records.
///
/// Stale and conflicting reports are not errors; they are reported through
/// [`SyncStatus`](crate::domain::models::SyncStatus).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Concurrency conflict: {entity} {id} was modified")]
    ConcurrencyConflict { entity: String, id: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl DomainError {
    /// Conflict raised when a day record changed underneath a conditional write.
    pub fn day_record_conflict(user_id: uuid::Uuid, date: chrono::NaiveDate) -> Self {
        Self::ConcurrencyConflict {
            entity: "day_record".to_string(),
            id: format!("{user_id}/{date}"),
        }
    }

    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::ExternalService(err.to_string())
    }
}
