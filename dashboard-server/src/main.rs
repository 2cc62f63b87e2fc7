use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use log_dashboard::{ConnectionManager, DashboardLayer, DatabaseProvider, TableLayout};

mod cli;
mod diagnostics;

use cli::{CliArguments, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let arguments = CliArguments::parse();
    let layout = arguments.table_layout().context("Invalid log table configuration")?;
    let settings = arguments.connection_settings();

    info!(
        dialect = %settings.dialect,
        host = %settings.host,
        port = settings.port(),
        table = %layout.table(),
        "Starting log dashboard"
    );

    let manager = Arc::new(ConnectionManager::new(settings));
    manager.connect().await.context("Failed to connect to database")?;

    let outcome = match arguments.command() {
        Command::Check => diagnostics::run_check(&manager, &layout).await,
        Command::Serve => serve(manager.clone(), layout, &arguments).await,
    };

    manager.close().await;
    outcome
}

async fn serve(
    manager: Arc<ConnectionManager>,
    layout: TableLayout,
    arguments: &CliArguments,
) -> Result<()> {
    let app = DashboardLayer::new(manager, layout)
        .with_environment(arguments.environment.clone())
        .into_router();

    let listener = tokio::net::TcpListener::bind(arguments.address)
        .await
        .with_context(|| format!("Failed to bind {}", arguments.address))?;

    info!(address = %arguments.address, environment = %arguments.environment, "Dashboard listening");
    info!("Dashboard at http://{}/", arguments.address);
    info!("Health check at http://{}/api/health", arguments.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(error = %error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            warn!("Received SIGTERM, shutting down");
        }
    }
}
