//! Slack Webhook Endpoint
//!
//! Receives Slack event callbacks and slash command posts, normalizes the
//! body, and hands the envelope to the dispatcher.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::AppState;
use crate::bridge::{self, Envelope};

/// Handle an inbound webhook delivery.
///
/// POST /slack/events
///
/// The body is JSON (event callbacks, verification) or URL-encoded form
/// data (slash commands), optionally base64 transport-encoded when relayed
/// through a proxy that wraps binary-safe payloads.
#[tracing::instrument(skip(state, headers, body))]
pub async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let base64_encoded = headers
        .get("content-transfer-encoding")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("base64"));

    let raw = match bridge::decode_body(&body, base64_encoded) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Failed to decode request body: {e}");
            return (StatusCode::BAD_REQUEST, "Bad request body.").into_response();
        }
    };

    let envelope = Envelope::parse(&raw);
    bridge::dispatch(&state, &envelope).await
}
