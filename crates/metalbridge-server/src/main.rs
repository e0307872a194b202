use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metalbridge_probe::{Prober, ProcessRunner};
use metalbridge_server::{create_router, AppState, Cli, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ServerConfig::from_env(Cli::parse())?;
    let dashboard = config.dashboard_path();

    let prober = Prober::new(Arc::new(ProcessRunner::new()), config.probes.clone());
    let app = create_router(AppState::new(prober, dashboard.clone()));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("MetalBridge listening on http://{}", addr);
    info!("Serving dashboard from {}", dashboard.display());
    info!(sensor_helper = %config.probes.sensor_helper, "Probe commands configured");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
