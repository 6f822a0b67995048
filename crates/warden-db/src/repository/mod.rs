//! SurrealDB repository implementations.

mod reset_token;
mod user;

pub use reset_token::SurrealResetTokenRepository;
pub use user::SurrealUserRepository;
