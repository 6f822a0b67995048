//! SurrealDB-backed credential store.
//!
//! [`open`] returns a migrated [`Store`]; the [`repository`] types wrap
//! it and implement the `warden-core` store traits.

mod connection;
mod error;
pub mod repository;
mod retry;
mod schema;

pub use connection::{DbConfig, Store, open};
pub use error::DbError;
pub use schema::run_migrations;
