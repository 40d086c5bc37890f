//! Slack Web API Client
//!
//! Thin wrapper over the three Slack calls the bridge needs: file metadata
//! lookup, private file download, and posting channel messages. All calls
//! authenticate with the bot's bearer token.

use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;

/// Base URL for Slack Web API methods.
const SLACK_API_BASE: &str = "https://slack.com/api";

/// Slack-related errors.
#[derive(Debug, Error)]
pub enum SlackError {
    /// Transport failure or non-success HTTP status.
    #[error("Slack API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack returned `"ok": false` with an error string.
    #[error("Slack API error: {0}")]
    Api(String),

    /// Response body did not have the expected shape.
    #[error("Malformed Slack API response: {0}")]
    MalformedResponse(String),
}

/// File metadata subset returned by `files.info`.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackFile {
    /// Display name, used as the object key on upload.
    pub name: String,
    /// Bearer-authenticated download URL for the file content.
    #[serde(rename = "url_private_download")]
    pub download_url: String,
}

#[derive(Debug, Deserialize)]
struct FileInfoResponse {
    ok: bool,
    error: Option<String>,
    file: Option<SlackFile>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
}

/// Slack Web API client with a shared connection pool.
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    token: String,
}

impl SlackClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: config.slack_bot_token.clone(),
        }
    }

    /// Fetch file metadata via `files.info`.
    pub async fn file_info(&self, file_id: &str) -> Result<SlackFile, SlackError> {
        let response = self
            .http
            .get(format!("{SLACK_API_BASE}/files.info"))
            .bearer_auth(&self.token)
            .query(&[("file", file_id)])
            .send()
            .await?
            .error_for_status()?;

        let body: FileInfoResponse = response.json().await?;
        if !body.ok {
            return Err(SlackError::Api(
                body.error.unwrap_or_else(|| "unknown".into()),
            ));
        }
        body.file.ok_or_else(|| {
            SlackError::MalformedResponse("files.info response missing file object".into())
        })
    }

    /// Download file content from a `url_private_download` URL.
    pub async fn download(&self, url: &str) -> Result<Bytes, SlackError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?)
    }

    /// Post a message to a channel via `chat.postMessage`.
    pub async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), SlackError> {
        let response = self
            .http
            .post(format!("{SLACK_API_BASE}/chat.postMessage"))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "channel": channel_id, "text": text }))
            .send()
            .await?
            .error_for_status()?;

        let body: ApiResponse = response.json().await?;
        if !body.ok {
            return Err(SlackError::Api(
                body.error.unwrap_or_else(|| "unknown".into()),
            ));
        }
        Ok(())
    }
}
