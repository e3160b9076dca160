//! Q&A HTTP Server Binary
//!
//! # Usage
//!
//! ```bash
//! # In-memory repository
//! PORT=8080 REPOSITORY_TYPE=local cargo run --bin qa-server
//!
//! # PostgreSQL repository
//! PORT=8080 POSTGRES_HOST=localhost POSTGRES_PORT=5432 POSTGRES_USER=qa POSTGRES_DB=qa \
//!   POSTGRES_PASSWORD_FILE=./secrets/db-password \
//!   cargo run --bin qa-server --features "postgres-repo"
//! ```
//!
//! Configuration is read from `CONFIG_PATH` or the first `*.toml` in `./config/`.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use qa_service::config::AppConfig;
use qa_service::db::RepositoryFactory;
#[cfg(feature = "postgres-repo")]
use qa_service::db::RepositoryType;
use qa_service::http::{create_router, with_timeouts, AppState};
use qa_service::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load config")?;
    init_logging(&config.log)?;

    info!(env = %config.env, repository = ?config.repository.repo_type, "Starting Q&A server");

    #[cfg(feature = "postgres-repo")]
    let postgres_config = match config.repository.repo_type {
        RepositoryType::Postgres => Some(config.database.postgres_config()?),
        RepositoryType::Local => None,
    };
    #[cfg(not(feature = "postgres-repo"))]
    let postgres_config: Option<qa_service::db::PostgresConfig> = None;
    let repository = RepositoryFactory::create(config.repository.repo_type, postgres_config.as_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "failed to initialize repository");
            anyhow::anyhow!(e)
        })?;
    info!("Repository initialized successfully");

    let state = AppState::new(repository);
    let app = with_timeouts(create_router(state), &config.server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = stop_tx.send(());
    info!(
        grace_secs = config.server.shutdown_grace_secs,
        "Shutting down server gracefully"
    );

    match tokio::time::timeout(config.server.shutdown_grace(), server).await {
        Ok(Ok(Ok(()))) => info!("Server stopped"),
        Ok(Ok(Err(e))) => error!(error = %e, "Server error during shutdown"),
        Ok(Err(e)) => error!(error = %e, "Server task failed"),
        Err(_) => warn!("Grace period elapsed, abandoning in-flight requests"),
    }

    Ok(())
}

/// Resolves on Ctrl-C, SIGTERM or SIGQUIT.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut term, mut quit) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::quit()),
        ) {
            (Ok(term), Ok(quit)) => (term, quit),
            _ => {
                error!("Failed to install SIGTERM/SIGQUIT handlers");
                return std::future::pending::<()>().await;
            }
        };
        tokio::select! {
            _ = term.recv() => {}
            _ = quit.recv() => {}
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl-C, shutting down");
        }
        _ = terminate => {
            info!("Received termination signal, shutting down");
        }
    }
}
