//! Error types for the Warden system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WardenError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Notification delivery failed: {0}")]
    Notification(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WardenError {
    /// Store or notifier failure, as opposed to a problem with the
    /// caller's input.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            WardenError::Database(_)
                | WardenError::Notification(_)
                | WardenError::Crypto(_)
                | WardenError::Internal(_)
        )
    }
}

pub type WardenResult<T> = Result<T, WardenError>;
