//! HS256 JWT session token issuance and verification.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::models::user::{Role, UserId};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every session token. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: user ID as a decimal string.
    pub sub: String,
    pub role: Role,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

impl SessionClaims {
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::TokenInvalid(format!("non-numeric subject: {}", self.sub)))
    }
}

/// Issue a signed HS256 session token valid for `ttl`.
///
/// Fails only when the signing secret is missing or the TTL does not
/// fit a timestamp.
pub fn issue_session_token(
    user_id: UserId,
    role: Role,
    ttl: Duration,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let secret = config.signing_secret()?;

    let ttl_secs = i64::try_from(ttl.as_secs())
        .map_err(|_| AuthError::Configuration("session token TTL out of range".into()))?;
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        role,
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now
            .checked_add(ttl_secs)
            .ok_or_else(|| AuthError::Configuration("session token TTL out of range".into()))?,
        jti: Uuid::new_v4().to_string(),
    };

    let header = Header::new(Algorithm::HS256);
    jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify an HS256 session token (signature, expiry, issuer).
pub fn decode_session_token(token: &str, config: &AuthConfig) -> Result<SessionClaims, AuthError> {
    let secret = config.signing_secret()?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<SessionClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Session claims whose signature, expiry and issuer have been checked.
#[derive(Debug, Clone)]
pub struct ValidatedClaims(pub SessionClaims);

/// Entry point for request-level authentication. Stateless; no store
/// lookup is performed.
pub fn validate_session_token(
    token: &str,
    config: &AuthConfig,
) -> Result<ValidatedClaims, AuthError> {
    decode_session_token(token, config).map(ValidatedClaims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::from("secret_jwt".to_string()),
            session_token_ttl: Some("100000".into()),
            jwt_issuer: "warden-test".into(),
            ..Default::default()
        }
    }

    #[test]
    fn jwt_roundtrip() {
        let config = test_config();
        let token =
            issue_session_token(42, Role::Admin, Duration::from_secs(900), &config).unwrap();
        let claims = decode_session_token(&token, &config).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, "warden-test");
    }

    #[test]
    fn token_has_three_segments() {
        let config = test_config();
        let token =
            issue_session_token(1, Role::GeneralUser, Duration::from_secs(60), &config).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn expiry_matches_ttl() {
        let config = test_config();
        let ttl = Duration::from_secs(3600);
        let token = issue_session_token(1, Role::GeneralUser, ttl, &config).unwrap();
        let claims = decode_session_token(&token, &config).unwrap();
        assert!((claims.exp - (claims.iat + 3600)).abs() <= 1);
    }

    #[test]
    fn jti_is_unique() {
        let config = test_config();
        let ttl = Duration::from_secs(60);
        let t1 = issue_session_token(1, Role::Admin, ttl, &config).unwrap();
        let t2 = issue_session_token(1, Role::Admin, ttl, &config).unwrap();

        let c1 = decode_session_token(&t1, &config).unwrap();
        let c2 = decode_session_token(&t2, &config).unwrap();
        assert_ne!(c1.jti, c2.jti);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let config = test_config();
        let token =
            issue_session_token(1, Role::GeneralUser, Duration::from_secs(60), &config).unwrap();
        let tampered = format!("{token}x");
        assert!(matches!(
            validate_session_token(&tampered, &config),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn other_secret_is_rejected() {
        let config = test_config();
        let token =
            issue_session_token(1, Role::GeneralUser, Duration::from_secs(60), &config).unwrap();
        let other = AuthConfig {
            jwt_secret: SecretString::from("another-secret".to_string()),
            ..test_config()
        };
        assert!(decode_session_token(&token, &other).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: "1".into(),
            role: Role::GeneralUser,
            iss: config.jwt_issuer.clone(),
            iat: now - 120,
            exp: now - 60,
            jti: Uuid::new_v4().to_string(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret_jwt"),
        )
        .unwrap();

        assert!(matches!(
            decode_session_token(&token, &config),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn missing_secret_fails_issuance() {
        let config = AuthConfig {
            jwt_secret: SecretString::default(),
            ..test_config()
        };
        let result = issue_session_token(1, Role::Admin, Duration::from_secs(60), &config);
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }
}
