//! Delivery through the Resend HTTP API.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{error, info, instrument};
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::notification::EmailMessage;
use warden_core::notify::Notifier;

pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

/// Sends mail with a single `POST /emails` per message.
#[derive(Clone)]
pub struct ResendNotifier {
    client: Client,
    api_key: SecretString,
    endpoint: String,
}

impl std::fmt::Debug for ResendNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendNotifier")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ResendNotifier {
    pub fn new(client: Client, api_key: SecretString) -> Self {
        Self::with_endpoint(client, api_key, RESEND_ENDPOINT)
    }

    pub fn with_endpoint(client: Client, api_key: SecretString, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: endpoint.into(),
        }
    }
}

impl Notifier for ResendNotifier {
    // The HTML body carries the reset link; only routing fields are traced.
    #[instrument(skip_all, fields(to = ?message.to, subject = %message.subject))]
    async fn send(&self, message: EmailMessage) -> WardenResult<()> {
        let body = SendEmailRequest {
            from: &message.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("email transport failed: {e}");
                WardenError::Notification(format!("transport error: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(%status, "email provider rejected message");
            return Err(WardenError::Notification(format!(
                "provider returned {status}: {detail}"
            )));
        }

        info!("email accepted by provider");
        Ok(())
    }
}
