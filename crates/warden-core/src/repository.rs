//! Repository trait definitions for the credential store.
//!
//! All operations are async. Implementations own uniqueness: a
//! duplicate username or email must surface as
//! [`WardenError::AlreadyExists`](crate::error::WardenError::AlreadyExists),
//! a missing row as `NotFound`.

use chrono::{DateTime, Utc};

use crate::error::WardenResult;
use crate::models::{
    reset_token::{CreateResetToken, ResetToken},
    user::{CreateUser, User, UserId},
};

pub trait UserRepository: Send + Sync {
    /// Persist a new user; the store assigns `id` and timestamps.
    fn create(&self, input: CreateUser) -> impl Future<Output = WardenResult<User>> + Send;
    fn get_by_id(&self, id: UserId) -> impl Future<Output = WardenResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = WardenResult<User>> + Send;
    fn update_password(
        &self,
        id: UserId,
        password_hash: String,
    ) -> impl Future<Output = WardenResult<User>> + Send;
}

pub trait ResetTokenRepository: Send + Sync {
    /// Store a reset token, superseding any earlier token of the same
    /// user (upsert keyed by user ID).
    fn create(
        &self,
        input: CreateResetToken,
    ) -> impl Future<Output = WardenResult<ResetToken>> + Send;
    fn get_by_token(&self, token: &str) -> impl Future<Output = WardenResult<ResetToken>> + Send;
    /// Atomically mark a token redeemed if it is still valid at `now`.
    ///
    /// Returns `NotFound` when no live token matched: unknown, expired
    /// or already redeemed. Of concurrent calls for one token at most
    /// one returns `Ok`.
    fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = WardenResult<ResetToken>> + Send;
    /// Delete every token with `expires_at <= now`; returns the count.
    fn delete_expired(&self, now: DateTime<Utc>) -> impl Future<Output = WardenResult<u64>> + Send;
}
