//! mushaf server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use mushaf_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod context;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let services = context::Services::from_config(&config)?;
    let manager = services.manager.clone();

    tracing::info!(
        namespace = %config.namespace,
        collection_size = config.collection_size,
        origin = %config.origin_base_url,
        "Starting mushaf server on stdio transport"
    );

    let handler = handler::MushafServer::new(services);
    let server = serve_server(handler, stdio()).await?;

    tokio::select! {
        quit = server.waiting() => {
            match quit {
                Ok(reason) => tracing::info!(?reason, "client session ended"),
                Err(error) => tracing::warn!(%error, "server task failed"),
            }
        }
        () = shutdown_signal() => {}
    }

    manager.shutdown().await;
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Ctrl+C received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
