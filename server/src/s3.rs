//! S3 Storage Client
//!
//! Handles S3-compatible storage for the bridge: object writes, single-page
//! listings, and presigned download URLs.
//! Supports any S3-compatible backend: AWS S3, MinIO, Backblaze B2, Cloudflare R2.

use aws_config::Region;
use aws_sdk_s3::{
    config::{Credentials, IdentityCache, SharedCredentialsProvider, StalledStreamProtectionConfig},
    presigning::PresigningConfig,
    primitives::ByteStream,
    Client,
};
use aws_smithy_async::rt::sleep::TokioSleep;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::Config;

/// Presigned download URLs are valid for one hour.
const PRESIGN_EXPIRY: Duration = Duration::from_secs(3600);

/// S3 client wrapper with configuration.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

/// S3-related errors.
#[derive(Debug, Error)]
pub enum S3Error {
    /// Failed to upload an object.
    #[error("Failed to upload file: {0}")]
    Upload(String),

    /// Failed to list the bucket.
    #[error("Failed to list bucket: {0}")]
    List(String),

    /// Failed to generate a presigned URL.
    #[error("Failed to generate presigned URL: {0}")]
    Presign(String),

    /// S3 configuration error.
    #[error("S3 configuration error: {0}")]
    Config(String),
}

impl S3Client {
    /// Create a new S3 client from configuration.
    ///
    /// Supports custom endpoints for S3-compatible backends (MinIO, R2, B2).
    /// Uses path-style addressing when a custom endpoint is configured.
    pub fn new(config: &Config) -> Self {
        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .region(Region::new(config.s3_region.clone()))
            .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
            .identity_cache(IdentityCache::no_cache())
            .sleep_impl(TokioSleep::new());

        // Configure credentials from environment
        if let (Ok(access_key), Ok(secret_key)) = (
            std::env::var("AWS_ACCESS_KEY_ID"),
            std::env::var("AWS_SECRET_ACCESS_KEY"),
        ) {
            let credentials = Credentials::new(
                access_key,
                secret_key,
                None, // session token
                None, // expiry
                "environment",
            );
            s3_config_builder =
                s3_config_builder.credentials_provider(SharedCredentialsProvider::new(credentials));
        }

        // Configure custom endpoint for S3-compatible backends
        if let Some(endpoint) = &config.s3_endpoint {
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true); // Required for MinIO and most S3-compatible backends
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!(
            bucket = %config.s3_bucket,
            region = %config.s3_region,
            endpoint = ?config.s3_endpoint,
            "S3 client initialized"
        );

        Self {
            client,
            bucket: config.s3_bucket.clone(),
        }
    }

    /// Upload an object.
    ///
    /// An existing object under the same key is silently overwritten; key
    /// lifecycle is owned entirely by the storage service.
    pub async fn upload(&self, key: &str, data: Bytes) -> Result<(), S3Error> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| S3Error::Upload(e.to_string()))?;

        Ok(())
    }

    /// List object keys in the bucket.
    ///
    /// Single `ListObjectsV2` page; entries beyond one page are not fetched.
    pub async fn list_keys(&self) -> Result<Vec<String>, S3Error> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| S3Error::List(e.to_string()))?;

        Ok(response
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect())
    }

    /// Generate a presigned download URL for a key.
    ///
    /// The URL is valid for one hour and forces a download disposition with
    /// the key as the filename. Presigning is local signing only; the key's
    /// existence is not checked.
    pub async fn presign_download(&self, key: &str) -> Result<String, S3Error> {
        let presign_config = PresigningConfig::builder()
            .expires_in(PRESIGN_EXPIRY)
            .build()
            .map_err(|e| S3Error::Presign(e.to_string()))?;

        let disposition = format!("attachment; filename=\"{}\"", quote_plus(key));

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .response_content_disposition(disposition)
            .presigned(presign_config)
            .await
            .map_err(|e| S3Error::Presign(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// Check if the bucket is accessible (health check).
    pub async fn health_check(&self) -> Result<(), S3Error> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| S3Error::Config(format!("Bucket not accessible: {e}")))?;

        Ok(())
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Form-urlencode a filename for a content-disposition override (spaces
/// become `+`).
fn quote_plus(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_plus_escapes_spaces_and_reserved_chars() {
        assert_eq!(quote_plus("report.csv"), "report.csv");
        assert_eq!(quote_plus("report 2024.csv"), "report+2024.csv");
        assert_eq!(quote_plus("a&b=c.txt"), "a%26b%3Dc.txt");
    }

    #[test]
    fn presign_expiry_is_one_hour() {
        assert_eq!(PRESIGN_EXPIRY.as_secs(), 3600);
    }
}
