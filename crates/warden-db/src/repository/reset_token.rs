//! SurrealDB implementation of [`ResetTokenRepository`].
//!
//! The record ID of a reset token is its owner's user ID, so `create`
//! is an UPSERT that supersedes the previous token of that user.
//! Redemption is a single conditional UPDATE, which the datastore
//! applies atomically per record.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use warden_core::error::WardenResult;
use warden_core::models::reset_token::{CreateResetToken, ResetToken};
use warden_core::repository::ResetTokenRepository;

use crate::error::DbError;
use crate::retry;

#[derive(Debug, SurrealValue)]
struct ResetTokenRow {
    token: String,
    user_id: i64,
    expires_at: DateTime<Utc>,
    redeemed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<ResetTokenRow> for ResetToken {
    fn from(row: ResetTokenRow) -> Self {
        ResetToken {
            token: row.token,
            user_id: row.user_id,
            expires_at: row.expires_at,
            redeemed_at: row.redeemed_at,
            created_at: row.created_at,
        }
    }
}

fn not_found() -> DbError {
    // The token itself is a credential; keep it out of error messages.
    DbError::NotFound {
        entity: "reset_token".into(),
        id: "<redacted>".into(),
    }
}

/// SurrealDB implementation of the ResetToken repository.
#[derive(Clone)]
pub struct SurrealResetTokenRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealResetTokenRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn upsert(&self, input: &CreateResetToken) -> Result<ResetToken, DbError> {
        let result = self
            .db
            .query(
                "UPSERT type::record('reset_token', $user_id) SET \
                 token = $reset_token, \
                 user_id = $user_id, \
                 expires_at = $expires_at, \
                 redeemed_at = NONE, \
                 created_at = time::now()",
            )
            .bind(("user_id", input.user_id))
            .bind(("reset_token", input.token.clone()))
            .bind(("expires_at", input.expires_at))
            .await?;

        let mut result = result
            .check()
            .map_err(|e| DbError::write("reset_token", e))?;

        let rows: Vec<ResetTokenRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(not_found)?;

        Ok(row.into())
    }
}

impl<C: Connection> ResetTokenRepository for SurrealResetTokenRepository<C> {
    async fn create(&self, input: CreateResetToken) -> WardenResult<ResetToken> {
        // Concurrent requests for one user write the same record.
        let input = &input;
        let token = retry::on_conflict("reset_token", move || self.upsert(input)).await?;
        Ok(token)
    }

    async fn get_by_token(&self, token: &str) -> WardenResult<ResetToken> {
        let mut result = self
            .db
            .query("SELECT * FROM reset_token WHERE token = $reset_token")
            .bind(("reset_token", token.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResetTokenRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(not_found)?;

        Ok(row.into())
    }

    async fn consume(&self, token: &str, now: DateTime<Utc>) -> WardenResult<ResetToken> {
        let response = self
            .db
            .query(
                "UPDATE reset_token SET redeemed_at = $now \
                 WHERE token = $reset_token \
                 AND redeemed_at = NONE \
                 AND expires_at > $now \
                 RETURN AFTER",
            )
            .bind(("reset_token", token.to_string()))
            .bind(("now", now))
            .await;

        let checked = response
            .map_err(DbError::from)
            .and_then(|r| r.check().map_err(|e| DbError::write("reset_token", e)));

        let mut result = match checked {
            Ok(result) => result,
            // A concurrent redemption won the race for this record.
            Err(e) if e.is_write_conflict() => return Err(not_found().into()),
            Err(e) => return Err(e.into()),
        };

        let rows: Vec<ResetTokenRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(not_found)?;

        Ok(row.into())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> WardenResult<u64> {
        let result = self
            .db
            .query("DELETE reset_token WHERE expires_at <= $now RETURN BEFORE")
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::write("reset_token", e))?;

        let rows: Vec<ResetTokenRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }
}
