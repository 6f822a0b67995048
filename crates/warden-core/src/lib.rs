//! Warden Core: domain models, error taxonomy and the collaborator
//! traits (credential store, notifier) shared by every crate.

pub mod error;
pub mod models;
pub mod notify;
pub mod repository;

pub use error::{WardenError, WardenResult};
