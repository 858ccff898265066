//! Prefix-scoped access to a single bucket
//!
//! Reads go under the input prefix, writes under the output prefix. Callers
//! only ever supply the relative part of a key, which is validated before
//! anything touches the network.

use std::path::Path;

use crate::config::Config;
use crate::error::{AdderError, Result};
use crate::s3::client::S3Client;
use crate::s3::credentials::{self, ProfileCatalog};
use crate::s3::keys::{compose_key, S3Url};

/// Reads and writes objects of one bucket under two fixed prefixes
#[derive(Debug, Clone)]
pub struct StorageAccessor {
    client: S3Client,
    bucket: String,
    input_prefix: String,
    output_prefix: String,
}

impl StorageAccessor {
    pub fn new(
        client: S3Client,
        bucket: impl Into<String>,
        input_prefix: impl Into<String>,
        output_prefix: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            input_prefix: input_prefix.into(),
            output_prefix: output_prefix.into(),
        }
    }

    /// Build an accessor for `config`, using its profile when one is set
    pub async fn connect(config: &Config) -> Result<Self> {
        if let Some(profile) = &config.profile {
            ProfileCatalog::load()?.require(profile)?;
            tracing::info!("Using AWS profile '{}'", profile);
        }

        let client = S3Client::new(config.profile.as_deref()).await?;
        Ok(Self::new(
            client,
            config.bucket.as_str(),
            config.input_prefix.as_str(),
            config.output_prefix.as_str(),
        ))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn input_prefix(&self) -> &str {
        &self.input_prefix
    }

    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    /// Download `input_prefix + relative_key` to `local_path`
    pub async fn fetch(&self, relative_key: &str, local_path: &Path) -> Result<()> {
        let source = compose_key(&self.input_prefix, relative_key)?;
        let url = S3Url::new(&self.bucket, &source);

        credentials::ensure_credentials(self.client.credentials_provider()).await?;

        match self.client.download_to_file(&self.bucket, &source, local_path).await {
            Ok(bytes) => {
                tracing::info!("Downloaded {} to {} ({} bytes)", url, local_path.display(), bytes);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error downloading {}: {}", url, e);
                Err(e)
            }
        }
    }

    /// Upload `local_path` to `output_prefix + relative_key`
    pub async fn store(&self, local_path: &Path, relative_key: &str) -> Result<()> {
        let destination = compose_key(&self.output_prefix, relative_key)?;

        if !tokio::fs::try_exists(local_path).await.unwrap_or(false) {
            tracing::error!("The file was not found: {}", local_path.display());
            return Err(AdderError::LocalFileMissing(local_path.to_path_buf()));
        }

        let url = S3Url::new(&self.bucket, &destination);

        credentials::ensure_credentials(self.client.credentials_provider()).await?;

        match self.client.upload_from_file(local_path, &self.bucket, &destination).await {
            Ok(()) => {
                tracing::info!("Uploaded {} to {}", local_path.display(), url);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error uploading {} to {}: {}", local_path.display(), url, e);
                Err(e)
            }
        }
    }
}
