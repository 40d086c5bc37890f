//! Request Normalization
//!
//! Decodes the inbound webhook body (optionally base64 transport-encoded)
//! and parses it as either JSON or URL-encoded form data. Slack delivers
//! event callbacks as JSON and slash commands as form posts, so both shapes
//! funnel into one envelope type.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

/// Errors from decoding or reading the inbound body.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Body claimed base64 transport encoding but did not decode.
    #[error("Invalid base64 transport encoding: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded body is not valid UTF-8 text.
    #[error("Request body is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A field the handler needs is absent from the envelope.
    #[error("Missing required field: {0}")]
    MissingKey(&'static str),
}

impl IntoResponse for EnvelopeError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::Base64(_) | Self::Utf8(_) => "Bad request body.".to_string(),
            Self::MissingKey(_) => self.to_string(),
        };
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

/// Decode the raw request body into text.
///
/// Proxies that base64-wrap binary-safe payloads mark them with a
/// `Content-Transfer-Encoding: base64` header; `base64_encoded` carries
/// that flag.
pub fn decode_body(raw: &[u8], base64_encoded: bool) -> Result<String, EnvelopeError> {
    if base64_encoded {
        let decoded = BASE64.decode(raw.trim_ascii())?;
        Ok(String::from_utf8(decoded)?)
    } else {
        Ok(String::from_utf8(raw.to_vec())?)
    }
}

/// The parsed request body.
///
/// Form parsing follows `application/x-www-form-urlencoded` semantics where
/// a repeated key maps to a list of values; [`Envelope::first`] is the one
/// accessor for that quirk.
#[derive(Debug)]
pub enum Envelope {
    /// Body parsed as a JSON value.
    Json(serde_json::Value),
    /// Body parsed as URL-encoded form data.
    Form(HashMap<String, Vec<String>>),
}

impl Envelope {
    /// Parse a body string, attempting JSON first and falling back to
    /// URL-encoded form data. Never fails: garbage input yields a form map
    /// with no recognized keys, which routes to the default acknowledgement.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Ok(value) = serde_json::from_str(raw) {
            return Self::Json(value);
        }

        let mut form: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            form.entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self::Form(form)
    }

    /// The first value for a key: the JSON string value, or the first
    /// element of the form value list.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        match self {
            Self::Json(value) => value.get(key).and_then(serde_json::Value::as_str),
            Self::Form(form) => form.get(key)?.first().map(String::as_str),
        }
    }

    /// Like [`Envelope::first`], but absence is a typed error.
    pub fn require(&self, key: &'static str) -> Result<&str, EnvelopeError> {
        self.first(key).ok_or(EnvelopeError::MissingKey(key))
    }

    /// Whether the envelope carries a value for `key` at the top level.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        match self {
            Self::Json(value) => value.get(key).is_some(),
            Self::Form(form) => form.contains_key(key),
        }
    }

    /// The nested `event` object of an event callback (JSON bodies only).
    #[must_use]
    pub fn event(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => value.get("event"),
            Self::Form(_) => None,
        }
    }
}
