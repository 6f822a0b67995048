//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. User IDs are integers allocated from the
//! `counter` table; roles are stored as strings with ASSERT
//! constraints. Uniqueness of usernames, emails and reset tokens is
//! enforced by UNIQUE indexes.

use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

// Each applied migration is a `_migration:<version>` record.
const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
";

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- ID counters
-- =======================================================================
DEFINE TABLE counter SCHEMAFULL;
DEFINE FIELD current ON TABLE counter TYPE int;

-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['SuperAdmin', 'Admin', 'GeneralUser'];
DEFINE FIELD password_hash ON TABLE user TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Password reset tokens (record ID = owning user ID)
-- =======================================================================
DEFINE TABLE reset_token SCHEMAFULL;
DEFINE FIELD token ON TABLE reset_token TYPE string;
DEFINE FIELD user_id ON TABLE reset_token TYPE int;
DEFINE FIELD expires_at ON TABLE reset_token TYPE datetime;
DEFINE FIELD redeemed_at ON TABLE reset_token TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE reset_token TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_reset_token_token ON TABLE reset_token \
    COLUMNS token UNIQUE;
DEFINE INDEX idx_reset_token_expires ON TABLE reset_token \
    COLUMNS expires_at;
";

/// Apply every migration that has no `_migration` record yet.
///
/// A migration and its record are written in one transaction, so a
/// failed migration leaves neither behind and is retried on the next
/// start.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(format!("tracking table: {e}")))?;

    let mut result = db.query("SELECT VALUE version FROM _migration").await?;
    let applied: Vec<u32> = result.take(0)?;

    for migration in MIGRATIONS.iter().filter(|m| !applied.contains(&m.version)) {
        apply(db, migration).await?;
    }
    Ok(())
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    info!(version = migration.version, name = migration.name, "Applying migration");

    db.query(transactional(migration.sql))
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!("v{} {}: {e}", migration.version, migration.name))
        })?;
    Ok(())
}

fn transactional(sql: &str) -> String {
    format!(
        "BEGIN TRANSACTION;\n{sql}\n\
         CREATE type::record('_migration', $version) \
         SET version = $version, name = $name;\n\
         COMMIT TRANSACTION;"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_defines_store_tables() {
        for table in ["counter", "user", "reset_token"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing {table} table"
            );
        }
    }

    #[test]
    fn uniqueness_is_indexed() {
        assert!(SCHEMA_V1.contains("COLUMNS username UNIQUE"));
        assert!(SCHEMA_V1.contains("COLUMNS email UNIQUE"));
        assert!(SCHEMA_V1.contains("COLUMNS token UNIQUE"));
    }

    #[test]
    fn migration_is_wrapped_with_its_record() {
        let sql = transactional("DEFINE TABLE t SCHEMAFULL;");
        assert!(sql.starts_with("BEGIN TRANSACTION;"));
        assert!(sql.trim_end().ends_with("COMMIT TRANSACTION;"));
        let body = sql.find("DEFINE TABLE t").unwrap();
        let record = sql.find("CREATE type::record('_migration'").unwrap();
        assert!(body < record);
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
