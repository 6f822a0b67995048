//! A notifier that only records that a message would have been sent.
//!
//! Used for local development where no mail provider is configured.

use tracing::info;
use warden_core::error::WardenResult;
use warden_core::models::notification::EmailMessage;
use warden_core::notify::Notifier;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&self, message: EmailMessage) -> WardenResult<()> {
        info!(
            from = %message.from,
            to = ?message.to,
            subject = %message.subject,
            "email delivery skipped (log mode)"
        );
        Ok(())
    }
}
