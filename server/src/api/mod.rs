//! API Router and Application State
//!
//! Central routing configuration and shared state.

pub mod events;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{config::Config, s3::S3Client, slack::SlackClient};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Slack Web API client
    pub slack: SlackClient,
    /// S3 client for bucket operations
    pub s3: S3Client,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(config: Config, slack: SlackClient, s3: S3Client) -> Self {
        Self {
            config: Arc::new(config),
            slack,
            s3,
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Slack events and slash commands webhook
        .route("/slack/events", post(events::receive_event))
        // Middleware
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Configured bucket name
    bucket: String,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        bucket: state.config.s3_bucket.clone(),
    })
}
