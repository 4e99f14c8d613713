use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use super::Storage;
use crate::config::Config;

const KEY_PREFIX: &str = "uploads";
/// How long the parser has to fetch the uploaded file.
const PRESIGN_TTL: Duration = Duration::from_secs(60 * 60);

/// S3 / MinIO backed storage. The returned reference is a presigned GET URL.
#[derive(Clone)]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Constructs a client configured for MinIO (local) or AWS (production).
    pub async fn from_config(config: &Config) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "cv-pipeline-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.s3_region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.s3_endpoint)
            .load()
            .await;

        Self::new(aws_sdk_s3::Client::new(&s3_config), config.s3_bucket.clone())
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(&self, local_path: &Path, destination_name: &str) -> Result<Option<String>> {
        let key = format!("{KEY_PREFIX}/{destination_name}");
        let body = ByteStream::from_path(local_path)
            .await
            .with_context(|| format!("reading {}", local_path.display()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        info!("Uploaded {} to s3://{}/{}", local_path.display(), self.bucket, key);

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .presigned(PresigningConfig::expires_in(PRESIGN_TTL)?)
            .await
            .map_err(|e| anyhow::anyhow!("S3 presign failed: {e}"))?;

        Ok(Some(presigned.uri().to_string()))
    }
}
