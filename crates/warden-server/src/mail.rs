//! Runtime selection of the outbound mail transport.

use anyhow::{Context, Result};
use secrecy::SecretString;
use warden_core::error::WardenResult;
use warden_core::models::notification::EmailMessage;
use warden_core::notify::Notifier;
use warden_mail::{DetachedNotifier, LogNotifier, ResendNotifier};

use crate::cli::MailMode;

#[derive(Debug, Clone)]
pub enum Mailer {
    Resend(ResendNotifier),
    Detached(DetachedNotifier<ResendNotifier>),
    Log(LogNotifier),
}

impl Mailer {
    pub fn from_mode(mode: MailMode, api_key: Option<&str>) -> Result<Self> {
        if mode == MailMode::Log {
            return Ok(Self::Log(LogNotifier));
        }

        let api_key = api_key
            .filter(|k| !k.is_empty())
            .context("RESEND_API_KEY is required unless WARDEN_MAIL_MODE=log")?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        let resend = ResendNotifier::new(client, SecretString::from(api_key.to_string()));

        Ok(match mode {
            MailMode::Detached => Self::Detached(DetachedNotifier::new(resend)),
            _ => Self::Resend(resend),
        })
    }
}

impl Notifier for Mailer {
    async fn send(&self, message: EmailMessage) -> WardenResult<()> {
        match self {
            Self::Resend(n) => n.send(message).await,
            Self::Detached(n) => n.send(message).await,
            Self::Log(n) => n.send(message).await,
        }
    }
}
