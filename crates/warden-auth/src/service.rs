//! Authentication service: registration, login and password-reset
//! orchestration.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::notification::EmailMessage;
use warden_core::models::reset_token::CreateResetToken;
use warden_core::models::user::{CreateUser, Role, User, UserId};
use warden_core::notify::Notifier;
use warden_core::repository::{ResetTokenRepository, UserRepository};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::reset;
use crate::token::{self, ValidatedClaims};

const RESET_EMAIL_SUBJECT: &str = "Password reset request";

/// Input for the registration flow. Field formats are checked by the
/// boundary layer; only the role is re-checked here.
#[derive(Debug)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub role: String,
    pub password: String,
}

/// Persisted identity returned from registration.
#[derive(Debug, Clone)]
pub struct RegisterOutput {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed HS256 session token.
    pub access_token: String,
    /// Session token lifetime in seconds.
    pub expires_in: u64,
}

/// Input for completing a password reset.
#[derive(Debug)]
pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
}

/// Authentication service.
///
/// Generic over the store and notifier so the auth layer has no
/// dependency on the database or mail crates. Holds no mutable state
/// beyond a lazily computed dummy hash used to equalize login timing.
pub struct AuthService<U: UserRepository, R: ResetTokenRepository, N: Notifier> {
    user_repo: U,
    reset_repo: R,
    notifier: N,
    config: AuthConfig,
    dummy_hash: Option<String>,
}

impl<U: UserRepository, R: ResetTokenRepository, N: Notifier> AuthService<U, R, N> {
    /// Computes the dummy hash used by [`login`](Self::login) up front,
    /// so construction costs one password hash.
    pub fn new(user_repo: U, reset_repo: R, notifier: N, config: AuthConfig) -> Self {
        let dummy_hash =
            password::hash_password("warden-dummy-password", None, &config.argon2).ok();
        Self {
            user_repo,
            reset_repo,
            notifier,
            config,
            dummy_hash,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Hash the password and persist a new user.
    ///
    /// Store errors (e.g. `AlreadyExists` for a taken username or email)
    /// are returned unchanged; nothing is retried.
    pub async fn register(&self, input: RegisterInput) -> WardenResult<RegisterOutput> {
        let role: Role = input.role.parse()?;

        let password_hash =
            password::hash_password(&input.password, self.config.pepper(), &self.config.argon2)?;
        if password_hash.is_empty() {
            return Err(AuthError::Crypto("empty password hash".into()).into());
        }

        let user = self
            .user_repo
            .create(CreateUser {
                username: input.username.clone(),
                email: input.email.clone(),
                role,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, email = %user.email, role = %role, "User registered");

        Ok(RegisterOutput {
            id: user.id,
            username: input.username,
            email: input.email,
            role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }

    /// Authenticate by email + password and issue a session token.
    ///
    /// An unknown email and a wrong password produce the same
    /// `AuthenticationFailed { reason: "invalid credentials" }`.
    pub async fn login(&self, input: LoginInput) -> WardenResult<LoginOutput> {
        // 1. Look up user.
        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(u) => u,
            Err(WardenError::NotFound { .. }) => {
                self.equalize_timing(&input.password);
                warn!(email = %input.email, "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        // 2. Verify password.
        let valid =
            password::verify_password(&input.password, &user.password_hash, self.config.pepper())?;
        if !valid {
            warn!(email = %input.email, "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Issue session token.
        let ttl = self.config.session_ttl()?;
        let access_token = token::issue_session_token(user.id, user.role, ttl, &self.config)?;

        info!(user_id = user.id, "User logged in");

        Ok(LoginOutput {
            access_token,
            expires_in: ttl.as_secs(),
        })
    }

    /// Verify a session token previously issued by [`login`](Self::login).
    pub fn validate_session(&self, session_token: &str) -> WardenResult<ValidatedClaims> {
        token::validate_session_token(session_token, &self.config).map_err(Into::into)
    }

    /// Create a reset token for the account behind `email` and mail the
    /// reset link.
    ///
    /// The token is persisted before the email is sent; if persisting
    /// fails nothing is sent. If sending fails the call fails and the
    /// stored token is left to expire.
    pub async fn initiate_password_reset(&self, email: &str) -> WardenResult<String> {
        // 1. Look up user. Unknown email is reported as NotFound.
        let user = self.user_repo.get_by_email(email).await?;

        // 2. Generate token and expiry.
        let token = reset::generate_reset_token();
        let expires_at = self.reset_token_expiry(Utc::now())?;

        // 3. Persist (supersedes any earlier token of this user).
        self.reset_repo
            .create(CreateResetToken {
                token: token.clone(),
                user_id: user.id,
                expires_at,
            })
            .await?;

        // 4. Notify.
        let link = reset::reset_link(&self.config.base_url, &token);
        self.notifier
            .send(EmailMessage {
                from: self.config.email_sender.clone(),
                to: vec![user.email.clone()],
                subject: RESET_EMAIL_SUBJECT.into(),
                html: format!("<p>This is your forgot password link: {link}</p>"),
            })
            .await
            .inspect_err(|e| warn!(user_id = user.id, error = %e, "Reset email not delivered"))?;

        info!(user_id = user.id, %expires_at, "Password reset initiated");

        Ok(token)
    }

    /// Redeem a reset token exactly once and return its owner.
    ///
    /// Unknown, expired and already redeemed tokens are indistinguishable
    /// to the caller.
    pub async fn redeem_reset_token(&self, reset_token: &str) -> WardenResult<User> {
        let redeemed = self
            .reset_repo
            .consume(reset_token, Utc::now())
            .await
            .map_err(|e| match e {
                WardenError::NotFound { .. } => AuthError::ResetTokenInvalid.into(),
                other => other,
            })?;

        let user = self.user_repo.get_by_id(redeemed.user_id).await?;
        info!(user_id = user.id, "Reset token redeemed");
        Ok(user)
    }

    /// Redeem a reset token and replace the owner's password.
    pub async fn reset_password(&self, input: ResetPasswordInput) -> WardenResult<User> {
        // Hash first so a hashing failure cannot burn the token.
        let password_hash = password::hash_password(
            &input.new_password,
            self.config.pepper(),
            &self.config.argon2,
        )?;

        let user = self.redeem_reset_token(&input.token).await?;
        let updated = self.user_repo.update_password(user.id, password_hash).await?;

        info!(user_id = updated.id, "Password reset completed");
        Ok(updated)
    }

    /// Delete reset tokens that are past their expiry.
    pub async fn purge_expired_reset_tokens(&self) -> WardenResult<u64> {
        let purged = self.reset_repo.delete_expired(Utc::now()).await?;
        if purged > 0 {
            info!(purged, "Expired reset tokens purged");
        }
        Ok(purged)
    }

    fn reset_token_expiry(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AuthError> {
        i64::try_from(self.config.reset_token_lifetime_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| AuthError::Configuration("reset token lifetime out of range".into()))
    }

    /// Run one Argon2 verification for a login that has no account, so
    /// the unknown-email path costs about as much as a wrong password.
    fn equalize_timing(&self, password: &str) {
        if let Some(hash) = &self.dummy_hash {
            let _ = password::verify_password(password, hash, self.config.pepper());
        }
    }
}
