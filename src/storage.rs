use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Presigned upload URLs stay valid for ten minutes.
const UPLOAD_URL_TTL: Duration = Duration::from_secs(600);

/// StorageService
///
/// The contract for the object storage layer. Post images, avatars, show art,
/// episode and podcast audio, and banner images are all uploaded by the client
/// directly to storage through presigned URLs; the API only hands out the URL
/// and the resulting key.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Ensures the configured bucket exists. Used in `Env::Local` to provision
    /// the MinIO bucket at startup.
    async fn ensure_bucket_exists(&self);

    /// Generates a signed PUT URL for `key`, constrained to `content_type`.
    async fn get_presigned_upload_url(&self, key: &str, content_type: &str) -> AppResult<String>;
}

/// S3StorageClient
///
/// The AWS SDK implementation. Works against MinIO locally and the Supabase
/// Storage S3 gateway in production; both need path-style addressing.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
}

impl S3StorageClient {
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // CreateBucket fails harmlessly when the bucket is already there.
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!(bucket = %self.bucket_name, error = %e, "create_bucket skipped");
        }
    }

    async fn get_presigned_upload_url(&self, key: &str, content_type: &str) -> AppResult<String> {
        let presigning = PresigningConfig::expires_in(UPLOAD_URL_TTL)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            // The uploader must send exactly this Content-Type.
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Internal(format!("presign failed: {e}")))?;

        Ok(presigned.uri().to_string())
    }
}

/// sanitize_key
///
/// Drops empty, `.` and `..` segments so a key can never climb out of its prefix.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// MockStorageService
///
/// Deterministic `StorageService` for tests. Returns a local-style URL, or an
/// error when built with `new_failing`.
#[derive(Clone, Default)]
pub struct MockStorageService {
    pub should_fail: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn get_presigned_upload_url(&self, key: &str, _content_type: &str) -> AppResult<String> {
        if self.should_fail {
            return Err(AppError::Internal("mock storage failure".to_string()));
        }
        Ok(format!(
            "http://localhost:9000/mock-bucket/{}?signature=fake",
            sanitize_key(key)
        ))
    }
}

/// StorageState
///
/// The shared handle to the storage service held in `AppState`.
pub type StorageState = Arc<dyn StorageService>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_traversal() {
        assert_eq!(sanitize_key("../../etc/passwd"), "etc/passwd");
        assert_eq!(sanitize_key("posts//./a.png"), "posts/a.png");
    }

    #[tokio::test]
    async fn mock_failure_is_internal() {
        let err = MockStorageService::new_failing()
            .get_presigned_upload_url("posts/a.png", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
