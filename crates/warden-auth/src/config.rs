//! Authentication configuration.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::AuthError;

/// Argon2id cost parameters used when hashing new passwords.
///
/// Verification always uses the parameters embedded in the stored
/// digest, so changing these only affects hashes created afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    /// OWASP recommended: m=19456 (19 MiB), t=2, p=1.
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric HS256 signing secret. Redacted in `Debug`.
    pub jwt_secret: SecretString,
    /// Session token lifetime in seconds, exactly as supplied by the
    /// environment. Validated on every issuance; there is no default.
    pub session_token_ttl: Option<String>,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Reset token lifetime in seconds (default: 3600 = 1 hour).
    pub reset_token_lifetime_secs: u64,
    /// `From` address of password reset emails.
    pub email_sender: String,
    /// Public base URL; reset links are `<base_url>/forgot-password/<token>`.
    pub base_url: String,
    /// Optional pepper prepended to passwords before Argon2id.
    pub pepper: Option<SecretString>,
    pub argon2: Argon2Params,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::default(),
            session_token_ttl: None,
            jwt_issuer: "warden".into(),
            reset_token_lifetime_secs: 3600,
            email_sender: String::new(),
            base_url: String::new(),
            pepper: None,
            argon2: Argon2Params::default(),
        }
    }
}

impl AuthConfig {
    /// Parse the configured session TTL.
    ///
    /// Absent, unparseable and zero values are configuration errors.
    pub fn session_ttl(&self) -> Result<Duration, AuthError> {
        let raw = self
            .session_token_ttl
            .as_deref()
            .ok_or_else(|| AuthError::Configuration("session token TTL is not set".into()))?;

        let secs: u64 = raw.trim().parse().map_err(|_| {
            AuthError::Configuration(format!("session token TTL is not a number of seconds: {raw:?}"))
        })?;

        if secs == 0 {
            return Err(AuthError::Configuration(
                "session token TTL must be positive".into(),
            ));
        }

        Ok(Duration::from_secs(secs))
    }

    /// The signing secret as bytes, rejecting an empty secret.
    pub(crate) fn signing_secret(&self) -> Result<&[u8], AuthError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(AuthError::Configuration("JWT secret is not set".into()));
        }
        Ok(secret.as_bytes())
    }

    pub(crate) fn pepper(&self) -> Option<&str> {
        self.pepper.as_ref().map(|p| p.expose_secret())
    }
}
