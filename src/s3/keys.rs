//! Object key helpers

use std::fmt;

use crate::error::{AdderError, Result};

/// Reject relative keys that contain a `..` traversal sequence
pub fn validate_key(key: &str) -> Result<()> {
    if key.contains("..") {
        return Err(AdderError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Validate `relative_key` and prepend `prefix` to it
///
/// The prefix is joined verbatim, so a prefix meant as a folder should end
/// with `/`.
pub fn compose_key(prefix: &str, relative_key: &str) -> Result<String> {
    validate_key(relative_key)?;
    Ok(format!("{}{}", prefix, relative_key))
}

/// Fully qualified object location, used for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Url {
    pub bucket: String,
    pub key: String,
}

impl S3Url {
    pub fn new(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }
}

impl fmt::Display for S3Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "s3://{}", self.bucket)
        } else {
            write!(f, "s3://{}/{}", self.bucket, self.key)
        }
    }
}
