//! Authentication error types.

use thiserror::Error;
use warden_core::error::WardenError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("invalid or expired reset token")]
    ResetTokenInvalid,

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for WardenError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_)
            | AuthError::ResetTokenInvalid => WardenError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Configuration(msg) => WardenError::Configuration(msg),
            AuthError::Crypto(msg) => WardenError::Crypto(msg),
        }
    }
}
