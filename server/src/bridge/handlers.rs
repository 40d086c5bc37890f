//! Bridge Handlers
//!
//! One handler per route: relay a shared file into the bucket, post a
//! presigned download link, or post the bucket listing. Each handler owns
//! its response policy; downstream failures never escape the handler
//! boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use super::envelope::{Envelope, EnvelopeError};
use crate::api::AppState;
use crate::s3::S3Error;
use crate::slack::SlackError;

/// Usage hint posted when `/s3-fetch` is invoked without a filename.
const FETCH_USAGE_HINT: &str = "Please provide a filename. Usage: `/s3-fetch <filename>`";

/// Channel message for an empty bucket listing.
const BUCKET_EMPTY_MESSAGE: &str = "📂 The S3 bucket is empty.";

/// Downstream failures a handler can hit.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Slack Web API call failed.
    #[error(transparent)]
    Slack(#[from] SlackError),

    /// S3 operation failed.
    #[error(transparent)]
    Storage(#[from] S3Error),
}

// ============================================================================
// Verification
// ============================================================================

/// Echo the verification challenge with no side effects.
pub fn handle_verification(envelope: &Envelope) -> Response {
    match envelope.require("challenge") {
        Ok(challenge) => (StatusCode::OK, challenge.to_string()).into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// File upload relay (file_shared event)
// ============================================================================

/// Relay a file shared in Slack into the bucket.
///
/// Fetches the file's metadata and content from Slack, writes it under a
/// key equal to its display name (silently overwriting any existing
/// object), and posts the outcome to the originating channel. Exactly one
/// chat message is sent per invocation; a failure posting it is logged but
/// does not change the response.
pub async fn handle_file_shared(state: &AppState, envelope: &Envelope) -> Response {
    let Some(event) = envelope.event() else {
        return EnvelopeError::MissingKey("event").into_response();
    };
    let file_id = match require_event_field(event, "file_id") {
        Ok(v) => v,
        Err(e) => return e.into_response(),
    };
    let channel_id = match require_event_field(event, "channel_id") {
        Ok(v) => v,
        Err(e) => return e.into_response(),
    };

    match relay_file(state, file_id).await {
        Ok(file_name) => {
            let message = format!("✅ File `{file_name}` uploaded to S3.");
            if let Err(e) = state.slack.post_message(channel_id, &message).await {
                error!(channel_id = %channel_id, "Failed to post upload confirmation: {e}");
            }
            StatusCode::OK.into_response()
        }
        Err(e) => {
            error!(file_id = %file_id, "Failed to relay shared file to S3: {e}");
            let message = format!("❌ Error: {e}");
            if let Err(post_err) = state.slack.post_message(channel_id, &message).await {
                error!(channel_id = %channel_id, "Failed to post upload error: {post_err}");
            }
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Metadata lookup, content download, and bucket write for one shared file.
/// Returns the file's display name, which doubles as the object key.
async fn relay_file(state: &AppState, file_id: &str) -> Result<String, BridgeError> {
    let file = state.slack.file_info(file_id).await?;
    let content = state.slack.download(&file.download_url).await?;
    state.s3.upload(&file.name, content).await?;
    Ok(file.name)
}

// ============================================================================
// Presigned download link (/s3-fetch)
// ============================================================================

/// Post a presigned download link for the requested key.
///
/// Object existence is not checked: presigning is local signing and never
/// contacts the service, so a link for an absent key simply 404s when
/// followed.
pub async fn handle_fetch(state: &AppState, envelope: &Envelope) -> Response {
    let channel_id = match envelope.require("channel_id") {
        Ok(v) => v,
        Err(e) => return e.into_response(),
    };
    let key = envelope.first("text").unwrap_or_default().trim();

    if key.is_empty() {
        return (StatusCode::OK, FETCH_USAGE_HINT).into_response();
    }

    match post_download_link(state, channel_id, key).await {
        Ok(()) => (StatusCode::OK, format!("Fetching `{key}`...")).into_response(),
        Err(e) => {
            error!(key = %key, "Failed to post download link: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.").into_response()
        }
    }
}

async fn post_download_link(
    state: &AppState,
    channel_id: &str,
    key: &str,
) -> Result<(), BridgeError> {
    let url = state.s3.presign_download(key).await?;
    let message =
        format!("🔗 Here is your download link for `{key}` (valid for 1 hour):\n{url}");
    state.slack.post_message(channel_id, &message).await?;
    Ok(())
}

// ============================================================================
// Bucket listing (/s3-list)
// ============================================================================

/// Post the bucket listing to the channel.
///
/// A single unpaginated listing call; buckets larger than one page are
/// truncated. Failures are logged and reported as a server error without a
/// channel message.
pub async fn handle_list(state: &AppState, envelope: &Envelope) -> Response {
    let channel_id = match envelope.require("channel_id") {
        Ok(v) => v,
        Err(e) => return e.into_response(),
    };

    match post_bucket_listing(state, channel_id).await {
        Ok(true) => (StatusCode::OK, "Files listed.").into_response(),
        Ok(false) => (StatusCode::OK, "No files found.").into_response(),
        Err(e) => {
            error!(bucket = %state.s3.bucket(), "Failed to list bucket contents: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing files.").into_response()
        }
    }
}

/// Returns `true` when the bucket had entries to list.
async fn post_bucket_listing(state: &AppState, channel_id: &str) -> Result<bool, BridgeError> {
    let keys = state.s3.list_keys().await?;

    if keys.is_empty() {
        state.slack.post_message(channel_id, BUCKET_EMPTY_MESSAGE).await?;
        return Ok(false);
    }

    state
        .slack
        .post_message(channel_id, &format_listing(&keys))
        .await?;
    Ok(true)
}

/// Newline-delimited bullet list of object keys, in listing order.
fn format_listing(keys: &[String]) -> String {
    let bullets = keys
        .iter()
        .map(|key| format!("- {key}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("📂 **Files in S3:**\n{bullets}")
}

// ============================================================================
// Helpers
// ============================================================================

fn require_event_field<'a>(
    event: &'a serde_json::Value,
    field: &'static str,
) -> Result<&'a str, EnvelopeError> {
    event
        .get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or(EnvelopeError::MissingKey(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_formats_keys_in_order() {
        let keys = vec!["a.txt".to_string(), "b.txt".to_string()];
        let message = format_listing(&keys);
        assert_eq!(message, "📂 **Files in S3:**\n- a.txt\n- b.txt");
    }

    #[test]
    fn listing_single_key_has_no_trailing_newline() {
        let keys = vec!["report.csv".to_string()];
        assert_eq!(format_listing(&keys), "📂 **Files in S3:**\n- report.csv");
    }

    #[test]
    fn usage_hint_names_the_command() {
        assert!(FETCH_USAGE_HINT.contains("/s3-fetch"));
    }
}
