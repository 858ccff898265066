//! AWS S3 client wrapper

use aws_config::BehaviorVersion;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::error::{AdderError, Result};

/// Connection overrides for the S3 client
///
/// Everything left as `None` falls back to the SDK's own resolution
/// (environment variables, shared config files, instance metadata).
#[derive(Debug, Clone, Default)]
pub struct S3ClientConfig {
    /// Named profile from the shared AWS files
    pub profile: Option<String>,
    /// Custom endpoint, e.g. a MinIO server
    pub endpoint_url: Option<String>,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    pub force_path_style: bool,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Custom credentials source, takes precedence over the static keys
    pub credentials_provider: Option<SharedCredentialsProvider>,
}

/// S3 client wrapper with the handful of operations the adder needs
#[derive(Debug, Clone)]
pub struct S3Client {
    client: Client,
    credentials: Option<SharedCredentialsProvider>,
}

impl S3Client {
    /// Create a new S3 client for the given profile
    pub async fn new(profile_name: Option<&str>) -> Result<Self> {
        Self::with_config(S3ClientConfig {
            profile: profile_name.map(|p| p.to_string()),
            ..Default::default()
        })
        .await
    }

    /// Create a client with explicit connection overrides
    pub async fn with_config(config: S3ClientConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(provider) = &config.credentials_provider {
            loader = loader.credentials_provider(provider.clone());
        } else if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "s3-adder-static",
            ));
        }

        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        tracing::debug!(
            "Created S3 client: profile={:?}, region={:?}, endpoint={:?}",
            config.profile,
            sdk_config.region(),
            config.endpoint_url
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            credentials: sdk_config.credentials_provider(),
        })
    }

    /// Credentials provider the client signs requests with, if any
    pub fn credentials_provider(&self) -> Option<&SharedCredentialsProvider> {
        self.credentials.as_ref()
    }

    /// Create a bucket
    pub async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.client
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| transfer_error(bucket, "", e))?;
        Ok(())
    }

    /// Check whether an object exists
    pub async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|s| s.is_not_found()) => Ok(false),
            Err(e) => Err(transfer_error(bucket, key, e)),
        }
    }

    /// Download an object to bytes
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| transfer_error(bucket, key, e))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| AdderError::transfer(bucket, key, "failed to read object body", e))?;
        Ok(data.into_bytes().to_vec())
    }

    /// Upload bytes as an object
    pub async fn put_object(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(data.into())
            .send()
            .await
            .map_err(|e| transfer_error(bucket, key, e))?;

        Ok(())
    }

    /// Stream an object into a local file, returning the number of bytes written
    pub async fn download_to_file(&self, bucket: &str, key: &str, path: &Path) -> Result<u64> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| transfer_error(bucket, key, e))?;

        let mut file = tokio::fs::File::create(path).await?;
        let mut body = response.body.into_async_read();
        let written = tokio::io::copy(&mut body, &mut file)
            .await
            .map_err(|e| AdderError::transfer(bucket, key, "failed to read object body", e))?;
        file.flush().await?;

        Ok(written)
    }

    /// Upload a local file as an object
    pub async fn upload_from_file(&self, path: &Path, bucket: &str, key: &str) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| AdderError::transfer(bucket, key, "failed to open local file", e))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| transfer_error(bucket, key, e))?;

        Ok(())
    }
}

/// Turn an SDK failure into a transfer error with a short reason
fn transfer_error<E, R>(bucket: &str, key: &str, err: SdkError<E, R>) -> AdderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let reason = match err.code() {
        Some("NoSuchKey") | Some("NotFound") => "object not found".to_string(),
        Some("NoSuchBucket") => "bucket not found".to_string(),
        Some("AccessDenied") | Some("Forbidden") => "access denied".to_string(),
        _ => DisplayErrorContext(&err).to_string(),
    };
    AdderError::transfer(bucket, key, reason, err)
}
