//! Warden server: application entry point.

mod cli;
mod error;
mod mail;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use warden_auth::service::AuthService;
use warden_core::notify::Notifier;
use warden_core::repository::{ResetTokenRepository, UserRepository};
use warden_db::repository::{SurrealResetTokenRepository, SurrealUserRepository};

use crate::cli::Args;
use crate::mail::Mailer;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warden=info".parse()?))
        .json()
        .init();

    info!("Starting Warden server...");

    let auth_config = args.auth_config();
    // Fail at startup rather than on the first login.
    auth_config
        .session_ttl()
        .context("JWT_EXPIRY_TIME must be a positive number of seconds")?;

    let db = warden_db::open(&args.db_config())
        .await
        .context("failed to open the credential store")?;

    let mailer = Mailer::from_mode(args.mail_mode, args.resend_api_key.as_deref())?;
    info!(mode = ?args.mail_mode, "Mail transport configured");

    let service = Arc::new(AuthService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealResetTokenRepository::new(db),
        mailer,
        auth_config,
    ));

    if args.reset_token_purge_interval > 0 {
        spawn_purge_task(
            service.clone(),
            Duration::from_secs(args.reset_token_purge_interval),
        );
    }

    let app = routes::router(service);
    let listener = TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("failed to bind port {}", args.port))?;
    info!(port = args.port, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Warden server stopped.");
    Ok(())
}

fn spawn_purge_task<U, R, N>(service: Arc<AuthService<U, R, N>>, every: Duration)
where
    U: UserRepository + 'static,
    R: ResetTokenRepository + 'static,
    N: Notifier + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = service.purge_expired_reset_tokens().await {
                error!("reset token purge failed: {e}");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
