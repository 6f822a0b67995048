//! Database-specific error types and conversions.

use warden_core::error::WardenError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated on {entity}")]
    Conflict { entity: String },

    #[error("Invalid stored {entity}: {message}")]
    Decode { entity: String, message: String },
}

impl DbError {
    /// Classify a failed write. Unique index violations become
    /// [`DbError::Conflict`]; the offending value is not kept, since
    /// messages may reach the caller.
    pub(crate) fn write(entity: &str, err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        if msg.contains("already contains") {
            DbError::Conflict {
                entity: entity.into(),
            }
        } else {
            DbError::Query(msg)
        }
    }

    /// Optimistic transaction conflict between concurrent writers.
    pub(crate) fn is_write_conflict(&self) -> bool {
        match self {
            DbError::Query(msg) => msg.contains("conflict"),
            DbError::Surreal(err) => err.to_string().contains("conflict"),
            _ => false,
        }
    }
}

impl From<DbError> for WardenError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => WardenError::NotFound { entity, id },
            DbError::Conflict { entity } => WardenError::AlreadyExists { entity },
            other => WardenError::Database(other.to_string()),
        }
    }
}
