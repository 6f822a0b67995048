//! SurrealDB implementation of [`UserRepository`].
//!
//! User IDs are sequential integers drawn from `counter:user`. An ID
//! consumed by a create that then fails a unique index, or that is
//! retried after a write conflict, is not reused.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use warden_core::error::WardenResult;
use warden_core::models::user::{CreateUser, Role, User, UserId};
use warden_core::repository::UserRepository;

use crate::error::DbError;
use crate::retry;

/// DB-side row struct for queries where the ID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    username: String,
    email: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: i64,
    username: String,
    email: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "SuperAdmin" => Ok(Role::SuperAdmin),
        "Admin" => Ok(Role::Admin),
        "GeneralUser" => Ok(Role::GeneralUser),
        other => Err(DbError::Decode {
            entity: "user".into(),
            message: format!("unknown role: {other}"),
        }),
    }
}

fn role_to_string(r: Role) -> &'static str {
    match r {
        Role::SuperAdmin => "SuperAdmin",
        Role::Admin => "Admin",
        Role::GeneralUser => "GeneralUser",
    }
}

impl UserRow {
    fn into_user(self, id: UserId) -> Result<User, DbError> {
        Ok(User {
            id,
            username: self.username,
            email: self.email,
            role: parse_role(&self.role)?,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        UserRow {
            username: self.username,
            email: self.email,
            role: self.role,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_user(self.record_id)
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn next_id(&self) -> Result<UserId, DbError> {
        let result = self
            .db
            .query(
                "UPSERT type::record('counter', 'user') \
                 SET current = (current ?? 0) + 1 \
                 RETURN VALUE current",
            )
            .await?;

        let mut result = result.check().map_err(|e| DbError::write("counter", e))?;
        let ids: Vec<i64> = result.take(0)?;
        ids.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "counter".into(),
            id: "user".into(),
        })
    }

    /// One allocation-and-insert attempt. A write conflict on either
    /// statement leaves nothing behind except a skipped ID.
    async fn insert(&self, input: &CreateUser) -> Result<User, DbError> {
        let id = self.next_id().await?;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, email = $email, \
                 role = $role, \
                 password_hash = $password_hash",
            )
            .bind(("id", id))
            .bind(("username", input.username.clone()))
            .bind(("email", input.email.clone()))
            .bind(("role", role_to_string(input.role).to_string()))
            .bind(("password_hash", input.password_hash.clone()))
            .await?;

        let mut result = result.check().map_err(|e| DbError::write("user", e))?;

        let rows: Vec<UserRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id.to_string(),
        })?;

        row.into_user(id)
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    /// Concurrent creates contend on the ID counter and on the unique
    /// indexes. Conflicted attempts are retried, so a duplicate that
    /// loses the race is reported by the index as `AlreadyExists`.
    async fn create(&self, input: CreateUser) -> WardenResult<User> {
        let input = &input;
        let user = retry::on_conflict("user", move || self.insert(input)).await?;
        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> WardenResult<User> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id.to_string(),
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_email(&self, email: &str) -> WardenResult<User> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user WHERE email = $email")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn update_password(&self, id: UserId, password_hash: String) -> WardenResult<User> {
        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 password_hash = $password_hash, \
                 updated_at = time::now()",
            )
            .bind(("id", id))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::write("user", e))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id.to_string(),
        })?;

        Ok(row.into_user(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings_roundtrip() {
        for role in [Role::SuperAdmin, Role::Admin, Role::GeneralUser] {
            assert_eq!(parse_role(role_to_string(role)).unwrap(), role);
        }
    }

    #[test]
    fn unknown_stored_role_is_decode_error() {
        assert!(matches!(
            parse_role("Owner"),
            Err(DbError::Decode { .. })
        ));
    }
}
