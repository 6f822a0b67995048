//! User domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WardenError;

/// Store-assigned numeric user identifier.
pub type UserId = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    SuperAdmin,
    Admin,
    GeneralUser,
}

impl Role {
    /// Wire name used in token claims and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super-admin",
            Role::Admin => "admin",
            Role::GeneralUser => "general-user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = WardenError;

    /// Accepts the kebab-case wire name or the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super-admin" | "SuperAdmin" => Ok(Role::SuperAdmin),
            "admin" | "Admin" => Ok(Role::Admin),
            "general-user" | "GeneralUser" => Ok(Role::GeneralUser),
            other => Err(WardenError::Validation {
                message: format!("unrecognized role: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// Argon2id PHC string. Never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}
