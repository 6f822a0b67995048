//! Fire-and-forget delivery.
//!
//! [`DetachedNotifier`] hands each message to a spawned task and returns
//! immediately. The caller no longer learns about delivery failures;
//! they are only logged.

use tracing::error;
use warden_core::error::WardenResult;
use warden_core::models::notification::EmailMessage;
use warden_core::notify::Notifier;

/// Wraps another notifier and moves its sends off the request path.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug, Clone)]
pub struct DetachedNotifier<N> {
    inner: N,
}

impl<N> DetachedNotifier<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

impl<N> Notifier for DetachedNotifier<N>
where
    N: Notifier + Clone + 'static,
{
    async fn send(&self, message: EmailMessage) -> WardenResult<()> {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let recipients = message.to.clone();
            if let Err(e) = inner.send(message).await {
                error!(to = ?recipients, "Detached email delivery failed: {e}");
            }
        });
        Ok(())
    }
}
