//! Warden Auth: password hashing, session token issuance and the
//! password-reset lifecycle.

pub mod config;
pub mod error;
pub mod password;
pub mod reset;
pub mod service;
pub mod token;

pub use config::{Argon2Params, AuthConfig};
pub use error::AuthError;
pub use service::{
    AuthService, LoginInput, LoginOutput, RegisterInput, RegisterOutput, ResetPasswordInput,
};
pub use token::SessionClaims;
