use std::sync::Arc;
use std::time::Duration;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use rawpeek_core::{AppConfig, ExtractionPipeline};
use rawpeek_extraction::FallbackPipeline;
use rawpeek_transfer::{HttpDownloader, HttpUploader};

mod handlers;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rawpeek=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    tokio::fs::create_dir_all(&config.scratch_dir).await?;

    let capabilities = rawpeek_extraction::probe_tools(&config.tools).await;
    if !capabilities.all_available() {
        tracing::warn!(missing = ?capabilities.missing(), "Some extraction tools are unavailable");
    }

    let pipeline = FallbackPipeline::from_config(&config.tools);
    tracing::info!(strategies = ?pipeline.strategy_names(), "Extraction pipeline ready");

    let downloader = HttpDownloader::new(Duration::from_secs(config.download_timeout_secs))?;
    let uploader = HttpUploader::new(
        Duration::from_secs(config.upload_timeout_secs),
        config.upload_method,
    )?;

    let addr = format!("{}:{}", config.server_host, config.server_port);

    let state = AppState {
        config: Arc::new(config),
        pipeline: Arc::new(pipeline),
        downloader: Arc::new(downloader),
        uploader: Arc::new(uploader),
        capabilities: Arc::new(capabilities),
    };

    let app = routes::create_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("RAW thumbnail service listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
