use anyhow::{Context, Result};
use dotenvy::dotenv;
use rmcp::ServiceExt;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cinemcp::config::Settings;
use cinemcp::omdb::OmdbClient;
use cinemcp::server::CineServer;
use cinemcp::tmdb::TmdbClient;
use cinemcp::tools::Catalogs;

// stdout carries the protocol, so logs go to stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let settings = Settings::from_env()?;
    info!(
        omdb = %settings.omdb_base_url,
        tmdb = %settings.tmdb_base_url,
        timeout = ?settings.timeout,
        retries = settings.retry.max_retries,
        "Configuration loaded"
    );

    let omdb = OmdbClient::from_settings(&settings).context("building OMDb client")?;
    let tmdb = TmdbClient::from_settings(&settings).context("building TMDB client")?;
    let server = CineServer::new(Catalogs::new(Arc::new(omdb), Arc::new(tmdb)));

    info!(version = env!("CARGO_PKG_VERSION"), "Serving MCP over stdio");
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("starting MCP service")?;
    let cancel = service.cancellation_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });
    let reason = service.waiting().await?;
    info!(?reason, "MCP service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Shutdown signal received (Ctrl+C)"),
        _ = terminate => info!("Shutdown signal received (SIGTERM)"),
    }
}
