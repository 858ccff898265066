//! Run configuration
//!
//! Everything the adder needs is read from the process environment once at
//! startup:
//! - `BUCKET_NAME`: bucket to operate on
//! - `INPUT_PREFIX`: key prefix the addend file is read from
//! - `OUTPUT_PREFIX`: key prefix the sum is written to
//! - `AWS_PROFILE` (optional): named profile, otherwise the default chain

use crate::error::{AdderError, Result};

pub const BUCKET_NAME: &str = "BUCKET_NAME";
pub const INPUT_PREFIX: &str = "INPUT_PREFIX";
pub const OUTPUT_PREFIX: &str = "OUTPUT_PREFIX";
pub const AWS_PROFILE: &str = "AWS_PROFILE";

/// Immutable settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bucket: String,
    pub input_prefix: String,
    pub output_prefix: String,
    pub profile: Option<String>,
}

impl Config {
    /// Load the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup
    ///
    /// Empty values count as missing. All missing required names are
    /// reported together.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let bucket = get(BUCKET_NAME);
        let input_prefix = get(INPUT_PREFIX);
        let output_prefix = get(OUTPUT_PREFIX);

        match (bucket, input_prefix, output_prefix) {
            (Some(bucket), Some(input_prefix), Some(output_prefix)) => {
                let config = Self {
                    bucket,
                    input_prefix,
                    output_prefix,
                    profile: get(AWS_PROFILE),
                };
                tracing::debug!(
                    "Loaded config: bucket={}, input_prefix={}, output_prefix={}, profile={:?}",
                    config.bucket,
                    config.input_prefix,
                    config.output_prefix,
                    config.profile
                );
                Ok(config)
            }
            (bucket, input_prefix, output_prefix) => {
                let missing = [
                    (BUCKET_NAME, bucket.is_none()),
                    (INPUT_PREFIX, input_prefix.is_none()),
                    (OUTPUT_PREFIX, output_prefix.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(AdderError::Config { missing })
            }
        }
    }
}
