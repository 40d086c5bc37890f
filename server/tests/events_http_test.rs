//! HTTP-Level Webhook Tests
//!
//! Exercises the webhook endpoint through the real router for every path
//! that completes without an outbound Slack or S3 call: URL verification,
//! the default acknowledgement, the blank-argument fetch hint, transport
//! decode failures, and the health probe.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use http_body_util::BodyExt;
use tower::ServiceExt;

use stow_server::api::{create_router, AppState};
use stow_server::config::Config;
use stow_server::s3::S3Client;
use stow_server::slack::SlackClient;

/// Build the app from a test config. Client construction is local; none of
/// the requests issued here trigger an outbound call.
fn test_app() -> axum::Router {
    let config = Config::default_for_test();
    let slack = SlackClient::new(&config);
    let s3 = S3Client::new(&config);
    create_router(AppState::new(config, slack, s3))
}

fn webhook_request(content_type: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/slack/events")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

#[tokio::test]
async fn url_verification_echoes_challenge() {
    let response = test_app()
        .oneshot(webhook_request(
            "application/json",
            r#"{"type":"url_verification","challenge":"abc123"}"#,
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "abc123");
}

#[tokio::test]
async fn url_verification_without_challenge_is_bad_request() {
    let response = test_app()
        .oneshot(webhook_request(
            "application/json",
            r#"{"type":"url_verification"}"#,
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unrecognized_event_gets_default_ack() {
    let response = test_app()
        .oneshot(webhook_request(
            "application/json",
            r#"{"event":{"type":"reaction_added"}}"#,
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        r#"{"message":"Event received."}"#
    );
}

#[tokio::test]
async fn unknown_command_gets_default_ack() {
    let response = test_app()
        .oneshot(webhook_request(
            "application/x-www-form-urlencoded",
            "command=%2Funrelated&channel_id=C123",
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        r#"{"message":"Event received."}"#
    );
}

#[tokio::test]
async fn fetch_with_blank_text_returns_usage_hint() {
    let response = test_app()
        .oneshot(webhook_request(
            "application/x-www-form-urlencoded",
            "command=%2Fs3-fetch&text=+++&channel_id=C123",
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        "Please provide a filename. Usage: `/s3-fetch <filename>`"
    );
}

#[tokio::test]
async fn fetch_without_channel_is_bad_request() {
    let response = test_app()
        .oneshot(webhook_request(
            "application/x-www-form-urlencoded",
            "command=%2Fs3-fetch&text=report.csv",
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_string(response).await,
        "Missing required field: channel_id"
    );
}

#[tokio::test]
async fn base64_transport_encoding_is_decoded() {
    let payload = r#"{"type":"url_verification","challenge":"wrapped"}"#;
    let request = Request::builder()
        .method("POST")
        .uri("/slack/events")
        .header(header::CONTENT_TYPE, "application/json")
        .header("content-transfer-encoding", "base64")
        .body(Body::from(BASE64.encode(payload)))
        .expect("Failed to build request");

    let response = test_app().oneshot(request).await.expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "wrapped");
}

#[tokio::test]
async fn invalid_base64_body_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/slack/events")
        .header("content-transfer-encoding", "base64")
        .body(Body::from("!!not base64!!"))
        .expect("Failed to build request");

    let response = test_app().oneshot(request).await.expect("Request failed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Bad request body.");
}

#[tokio::test]
async fn garbage_body_gets_default_ack() {
    let response = test_app()
        .oneshot(webhook_request("text/plain", "not json and not a form"))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_reports_bucket() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("Failed to build request");

    let response = test_app().oneshot(request).await.expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(r#""status":"ok""#));
    assert!(body.contains("test-bucket"));
}
