//! Outbound notification contract.

use crate::error::WardenResult;
use crate::models::notification::EmailMessage;

/// Delivers email out of band.
///
/// Called synchronously by the auth service; a failed send fails the
/// calling operation. Implementations that queue or detach delivery
/// must say so in their own docs.
pub trait Notifier: Send + Sync {
    fn send(&self, message: EmailMessage) -> impl Future<Output = WardenResult<()>> + Send;
}
