//! S3 access module
//!
//! This module provides the object storage side of the adder:
//! - [`client::S3Client`] - Thin wrapper around the AWS SDK client
//! - [`accessor::StorageAccessor`] - Prefix-scoped fetch/store for one bucket
//! - [`credentials`] - Profile lookup and credential preflight
//! - [`keys`] - Relative key validation and composition

pub mod accessor;
pub mod client;
pub mod credentials;
pub mod keys;

// Re-export commonly used types
pub use accessor::StorageAccessor;
pub use client::{S3Client, S3ClientConfig};
pub use credentials::ProfileCatalog;
pub use keys::{compose_key, validate_key, S3Url};
