//! Event Dispatch
//!
//! Routes a normalized envelope to exactly one handler. Routing is a pure
//! function over the envelope so the decision table is testable without any
//! client plumbing.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::envelope::Envelope;
use super::handlers;
use crate::api::AppState;

/// Slash command that posts a presigned download link.
pub const FETCH_COMMAND: &str = "/s3-fetch";

/// Slash command that posts the bucket listing.
pub const LIST_COMMAND: &str = "/s3-list";

/// The single action chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Echo the verification challenge back to Slack.
    Verification,
    /// Post a presigned download link for a requested key.
    Fetch,
    /// Post the bucket listing.
    List,
    /// Relay a file shared in a channel into the bucket.
    FileShared,
    /// Acknowledge anything else with no side effects.
    Ack,
}

/// Decide the route for an envelope.
///
/// Precedence: verification challenge, then slash command, then event
/// callback. An unrecognized command name falls through to the default
/// acknowledgement rather than erroring.
#[must_use]
pub fn route(envelope: &Envelope) -> Route {
    if envelope.first("type") == Some("url_verification") {
        return Route::Verification;
    }

    if envelope.contains("command") {
        match envelope.first("command") {
            Some(FETCH_COMMAND) => return Route::Fetch,
            Some(LIST_COMMAND) => return Route::List,
            _ => {}
        }
    }

    if let Some(event) = envelope.event() {
        if event.get("type").and_then(serde_json::Value::as_str) == Some("file_shared") {
            return Route::FileShared;
        }
    }

    Route::Ack
}

/// Run the chosen handler. Exactly one handler executes per request, and
/// the HTTP response is the sole output.
pub async fn dispatch(state: &AppState, envelope: &Envelope) -> Response {
    match route(envelope) {
        Route::Verification => handlers::handle_verification(envelope),
        Route::Fetch => handlers::handle_fetch(state, envelope).await,
        Route::List => handlers::handle_list(state, envelope).await,
        Route::FileShared => handlers::handle_file_shared(state, envelope).await,
        Route::Ack => (StatusCode::OK, Json(json!({ "message": "Event received." }))).into_response(),
    }
}
