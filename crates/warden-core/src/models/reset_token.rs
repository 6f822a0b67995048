//! Password reset token domain model.
//!
//! A reset token moves through `created -> valid -> expired | redeemed`.
//! Redemption is terminal and happens at most once; the store enforces
//! it, this type only answers the validity predicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetToken {
    /// Opaque random token, unique across the table.
    pub token: String,
    /// Owning user. At most one live token per user.
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_redeemed(&self) -> bool {
        self.redeemed_at.is_some()
    }

    /// `now < expires_at` and not yet redeemed.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.is_redeemed()
    }
}

#[derive(Debug, Clone)]
pub struct CreateResetToken {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}
