//! Stowbot Server - Main Entry Point
//!
//! Slack events webhook bridging shared files to S3 object storage.

use anyhow::Result;
use tracing::info;

use stow_server::{api, config, s3, slack};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stow_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Stowbot Server"
    );

    // Initialize clients
    let slack = slack::SlackClient::new(&config);
    let s3 = s3::S3Client::new(&config);

    // Verify bucket access; the service still answers verification requests
    // if storage is unreachable at startup
    match s3.health_check().await {
        Ok(()) => info!(bucket = %config.s3_bucket, "S3 storage connected"),
        Err(e) => tracing::warn!("S3 health check failed: {e}. Storage commands will fail."),
    }

    // Build application state and router
    let state = api::AppState::new(config.clone(), slack, s3);
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
