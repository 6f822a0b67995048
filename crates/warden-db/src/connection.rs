//! Opening the credential store.

use secrecy::{ExposeSecret, SecretString};
use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

/// Handle to a remote SurrealDB instance.
pub type Store = Surreal<Client>;

#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address, e.g. `127.0.0.1:8000`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials.
    pub username: String,
    pub password: SecretString,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "warden".into(),
            database: "main".into(),
            username: "root".into(),
            password: SecretString::from("root".to_string()),
        }
    }
}

/// Connect, sign in as root, select the namespace and database, and
/// bring the schema up to date.
///
/// Each step reports its own [`DbError::Connection`], so a bad
/// password is distinguishable from an unreachable server.
pub async fn open(config: &DbConfig) -> Result<Store, DbError> {
    let db = Surreal::new::<Ws>(config.url.as_str())
        .await
        .map_err(|e| DbError::Connection(format!("cannot reach {}: {e}", config.url)))?;

    db.signin(Root {
        username: config.username.clone(),
        password: config.password.expose_secret().to_string(),
    })
    .await
    .map_err(|e| DbError::Connection(format!("sign-in as {} rejected: {e}", config.username)))?;

    db.use_ns(&config.namespace)
        .use_db(&config.database)
        .await
        .map_err(|e| {
            DbError::Connection(format!(
                "cannot select {}/{}: {e}",
                config.namespace, config.database
            ))
        })?;

    run_migrations(&db).await?;

    info!(
        url = %config.url,
        namespace = %config.namespace,
        database = %config.database,
        "Credential store ready"
    );
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let config = DbConfig {
            password: SecretString::from("hunter2".to_string()),
            ..DbConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("127.0.0.1:8000"));
    }
}
