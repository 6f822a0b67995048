//! Command-line and environment configuration.

use clap::{Parser, ValueEnum};
use secrecy::SecretString;
use warden_auth::config::AuthConfig;
use warden_db::DbConfig;

/// How reset emails leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MailMode {
    /// Send through Resend and fail the request if delivery fails.
    Resend,
    /// Send through Resend from a background task.
    Detached,
    /// Log the message instead of sending it.
    Log,
}

// No Debug derive: several fields hold secrets.
#[derive(Parser)]
#[command(name = "warden", version, about = "Authentication backend")]
pub struct Args {
    /// Port to listen on
    #[arg(long, env = "WARDEN_PORT", default_value_t = 8080)]
    pub port: u16,

    /// HMAC secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    #[arg(long, env = "JWT_EXPIRY_TIME")]
    pub jwt_expiry_time: Option<String>,

    /// Issuer claim placed in session tokens
    #[arg(long, env = "JWT_ISSUER", default_value = "warden")]
    pub jwt_issuer: String,

    /// From address for reset emails
    #[arg(long, env = "EMAIL_SENDER")]
    pub email_sender: String,

    /// Public base URL used to build reset links
    #[arg(long, env = "BASE_URL")]
    pub base_url: String,

    /// Resend API key (required unless mail mode is `log`)
    #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
    pub resend_api_key: Option<String>,

    #[arg(long, env = "WARDEN_MAIL_MODE", value_enum, default_value_t = MailMode::Resend)]
    pub mail_mode: MailMode,

    /// Reset token lifetime in seconds
    #[arg(long, env = "RESET_TOKEN_LIFETIME", default_value_t = 3600)]
    pub reset_token_lifetime: u64,

    /// Seconds between purges of expired reset tokens (0 disables)
    #[arg(long, env = "RESET_TOKEN_PURGE_INTERVAL", default_value_t = 3600)]
    pub reset_token_purge_interval: u64,

    /// Optional server-side pepper mixed into password hashes
    #[arg(long, env = "PASSWORD_PEPPER", hide_env_values = true)]
    pub password_pepper: Option<String>,

    #[arg(long, env = "SURREAL_URL", default_value = "127.0.0.1:8000")]
    pub surreal_url: String,

    #[arg(long, env = "SURREAL_NS", default_value = "warden")]
    pub surreal_ns: String,

    #[arg(long, env = "SURREAL_DB", default_value = "main")]
    pub surreal_db: String,

    #[arg(long, env = "SURREAL_USER", default_value = "root")]
    pub surreal_user: String,

    #[arg(long, env = "SURREAL_PASS", default_value = "root", hide_env_values = true)]
    pub surreal_pass: String,
}

impl Args {
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::from(self.jwt_secret.clone()),
            session_token_ttl: self.jwt_expiry_time.clone(),
            jwt_issuer: self.jwt_issuer.clone(),
            reset_token_lifetime_secs: self.reset_token_lifetime,
            email_sender: self.email_sender.clone(),
            base_url: self.base_url.clone(),
            pepper: self
                .password_pepper
                .clone()
                .filter(|p| !p.is_empty())
                .map(SecretString::from),
            ..AuthConfig::default()
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.surreal_url.clone(),
            namespace: self.surreal_ns.clone(),
            database: self.surreal_db.clone(),
            username: self.surreal_user.clone(),
            password: SecretString::from(self.surreal_pass.clone()),
        }
    }
}
