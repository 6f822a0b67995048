//! Outbound email for Warden.
//!
//! Every type here implements [`warden_core::notify::Notifier`]. The
//! auth service only ever sees that trait, so the transport is chosen
//! by the server at startup.

pub mod detached;
pub mod log;
pub mod resend;

pub use detached::DetachedNotifier;
pub use log::LogNotifier;
pub use resend::{RESEND_ENDPOINT, ResendNotifier};
