//! Error types for the adder run

use std::path::PathBuf;
use thiserror::Error;

/// Every way a run can abort
#[derive(Debug, Error)]
pub enum AdderError {
    /// One or more required environment variables are unset or empty
    #[error("Missing required environment variables: {}", .missing.join(", "))]
    Config { missing: Vec<&'static str> },

    /// A relative key tried to climb out of its prefix
    #[error("Invalid S3 key '{key}': path traversal sequences ('..') are not allowed")]
    InvalidKey { key: String },

    /// No usable AWS credentials could be resolved
    #[error("AWS credentials not available: {0}")]
    Credentials(String),

    /// The object could not be moved to or from the bucket
    #[error("Transfer failed for s3://{bucket}/{key}: {reason}")]
    Transfer {
        bucket: String,
        key: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The local file to upload does not exist
    #[error("The file was not found: {}", .0.display())]
    LocalFileMissing(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AdderError>;

impl AdderError {
    pub(crate) fn transfer(
        bucket: &str,
        key: &str,
        reason: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AdderError::Transfer {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }
}
