//! School admin dashboard server.
//!
//! Serves the dashboard API and page WebSocket, registers the background
//! notification worker, and shuts down cleanly on Ctrl+C.

use tracing_subscriber::EnvFilter;

use school_dashboard_lib::app::SharedState;
use school_dashboard_lib::server;
use school_dashboard_lib::shutdown;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting school dashboard");

    let config = school_dashboard_lib::init_foundation()?;
    let state = SharedState::new(config);

    let s = state.clone();
    tokio::spawn(async move { school_dashboard_lib::init_worker(s).await });

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    tracing::info!(
        port = state.server_port(),
        "Dashboard running. Press Ctrl+C to stop."
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    shutdown::graceful_shutdown(&state).await;
    if let Err(e) = server_handle.await {
        tracing::warn!("Server task ended abnormally: {e}");
    }
    Ok(())
}
