//! AWS credential checks
//!
//! Credentials themselves are always resolved by the AWS SDK (environment
//! variables, shared config/credentials files, SSO, instance roles). This
//! module only answers two questions up front, so failures surface as a
//! clear credentials error instead of an opaque transport error:
//! - does the named profile exist in `~/.aws/config` or `~/.aws/credentials`?
//! - does the configured provider actually yield credentials?

use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_s3::error::DisplayErrorContext;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{AdderError, Result};

/// Profile names declared in the shared AWS files
#[derive(Debug, Default)]
pub struct ProfileCatalog {
    names: BTreeSet<String>,
}

impl ProfileCatalog {
    /// Load profile names from the shared config and credentials files
    ///
    /// Honors `AWS_CONFIG_FILE` and `AWS_SHARED_CREDENTIALS_FILE`. Missing
    /// files are not an error.
    pub fn load() -> Result<Self> {
        let mut catalog = Self::default();
        if let Some(content) = read_optional(&config_file_path())? {
            catalog.add_config_file(&content);
        }
        if let Some(content) = read_optional(&credentials_file_path())? {
            catalog.add_credentials_file(&content);
        }
        Ok(catalog)
    }

    /// Add the profiles of a config file (`[default]`, `[profile name]`)
    pub fn add_config_file(&mut self, content: &str) {
        for section in sections(content) {
            if section == "default" {
                self.names.insert("default".to_string());
            } else if let Some(name) = section.strip_prefix("profile ") {
                self.names.insert(name.trim().to_string());
            }
            // sso-session and services sections are not profiles
        }
    }

    /// Add the profiles of a credentials file (`[name]`)
    pub fn add_credentials_file(&mut self, content: &str) {
        for section in sections(content) {
            self.names.insert(section.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Fail with a credentials error when `name` is not declared anywhere
    pub fn require(&self, name: &str) -> Result<()> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(AdderError::Credentials(format!(
                "profile '{}' not found in {} or {}",
                name,
                config_file_path().display(),
                credentials_file_path().display()
            )))
        }
    }
}

/// Ask the provider for credentials once, mapping any failure to
/// [`AdderError::Credentials`]
pub async fn ensure_credentials(provider: Option<&SharedCredentialsProvider>) -> Result<()> {
    let provider = provider.ok_or_else(|| {
        tracing::error!("AWS credentials not available: no credentials provider configured");
        AdderError::Credentials("no credentials provider configured".to_string())
    })?;

    provider.provide_credentials().await.map_err(|e| {
        tracing::error!("AWS credentials not available");
        AdderError::Credentials(DisplayErrorContext(&e).to_string())
    })?;

    Ok(())
}

/// Section headers of an INI-style AWS file, trimmed, in file order
fn sections(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter_map(|line| {
        let line = line.trim();
        line.strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn aws_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".aws"))
        .unwrap_or_else(|| PathBuf::from(".aws"))
}

fn config_file_path() -> PathBuf {
    std::env::var_os("AWS_CONFIG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| aws_dir().join("config"))
}

fn credentials_file_path() -> PathBuf {
    std::env::var_os("AWS_SHARED_CREDENTIALS_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| aws_dir().join("credentials"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use aws_credential_types::provider::error::CredentialsError;
    use aws_credential_types::provider::future;
    use aws_credential_types::Credentials;

    /// Provider that never yields credentials
    #[derive(Debug)]
    pub(crate) struct NoCredentials;

    impl ProvideCredentials for NoCredentials {
        fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
        where
            Self: 'a,
        {
            future::ProvideCredentials::ready(Err(CredentialsError::not_loaded(
                "no credentials in this environment",
            )))
        }
    }

    const CONFIG: &str = r#"
[default]
region = us-east-1

[profile analytics]
role_arn = arn:aws:iam::123456789012:role/Analytics
source_profile = default

# comment
[sso-session corp]
sso_start_url = https://corp.awsapps.com/start

[profile  spaced ]
region = eu-west-1
"#;

    const CREDENTIALS: &str = r#"
[default]
aws_access_key_id = AKIAEXAMPLE
aws_secret_access_key = secret

[ci]
aws_access_key_id = AKIAEXAMPLE2
aws_secret_access_key = secret2
"#;

    #[test]
    fn test_config_file_profiles() {
        let mut catalog = ProfileCatalog::default();
        catalog.add_config_file(CONFIG);

        assert!(catalog.contains("default"));
        assert!(catalog.contains("analytics"));
        assert!(catalog.contains("spaced"));
        assert!(!catalog.contains("corp"));
        assert!(!catalog.contains("sso-session corp"));
    }

    #[test]
    fn test_credentials_file_profiles() {
        let mut catalog = ProfileCatalog::default();
        catalog.add_credentials_file(CREDENTIALS);

        assert!(catalog.contains("default"));
        assert!(catalog.contains("ci"));
    }

    #[test]
    fn test_require_unknown_profile() {
        let mut catalog = ProfileCatalog::default();
        catalog.add_credentials_file(CREDENTIALS);

        assert!(catalog.require("ci").is_ok());
        match catalog.require("nope") {
            Err(AdderError::Credentials(msg)) => assert!(msg.contains("'nope'")),
            other => panic!("expected a credentials error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ensure_credentials_without_provider() {
        let result = ensure_credentials(None).await;
        assert!(matches!(result, Err(AdderError::Credentials(_))));
    }

    #[tokio::test]
    async fn test_ensure_credentials_provider_failure() {
        let provider = SharedCredentialsProvider::new(NoCredentials);
        match ensure_credentials(Some(&provider)).await {
            Err(AdderError::Credentials(msg)) => {
                assert!(msg.contains("no credentials in this environment"))
            }
            other => panic!("expected a credentials error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ensure_credentials_static() {
        let provider =
            SharedCredentialsProvider::new(Credentials::new("key", "secret", None, None, "test"));
        assert!(ensure_credentials(Some(&provider)).await.is_ok());
    }
}
