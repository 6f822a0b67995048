//! Domain models for Warden.

pub mod notification;
pub mod reset_token;
pub mod user;
