//! Tests for the adder run against an in-memory object store
//!
//! These cover the run's sequencing and workspace cleanup without needing
//! S3. The real accessor is exercised in `s3_integration.rs`.

use s3_adder::job::{self, ObjectTransfer, ADDENDS_KEY, SUM_KEY};
use s3_adder::s3::validate_key;
use s3_adder::{AdderError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Object store keyed by relative key, recording the local paths it saw
#[derive(Default)]
struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    seen_paths: Mutex<Vec<PathBuf>>,
    lose_upload_file: bool,
    calls: Mutex<Vec<String>>,
}

impl MemoryStorage {
    fn with_addends(contents: &str) -> Self {
        let storage = Self::default();
        storage
            .objects
            .lock()
            .unwrap()
            .insert(ADDENDS_KEY.to_string(), contents.as_bytes().to_vec());
        storage
    }

    fn object(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|b| String::from_utf8_lossy(b).to_string())
    }
}

impl ObjectTransfer for MemoryStorage {
    async fn fetch(&self, relative_key: &str, local_path: &Path) -> Result<()> {
        validate_key(relative_key)?;
        self.calls.lock().unwrap().push(format!("fetch {}", relative_key));
        self.seen_paths.lock().unwrap().push(local_path.to_path_buf());

        let data = self.objects.lock().unwrap().get(relative_key).cloned();
        match data {
            Some(data) => {
                std::fs::write(local_path, data)?;
                Ok(())
            }
            None => Err(AdderError::Transfer {
                bucket: "memory".to_string(),
                key: relative_key.to_string(),
                reason: "object not found".to_string(),
                source: None,
            }),
        }
    }

    async fn store(&self, local_path: &Path, relative_key: &str) -> Result<()> {
        validate_key(relative_key)?;
        self.calls.lock().unwrap().push(format!("store {}", relative_key));
        self.seen_paths.lock().unwrap().push(local_path.to_path_buf());

        if self.lose_upload_file {
            std::fs::remove_file(local_path)?;
        }
        if !local_path.exists() {
            return Err(AdderError::LocalFileMissing(local_path.to_path_buf()));
        }

        let data = std::fs::read(local_path)?;
        self.objects
            .lock()
            .unwrap()
            .insert(relative_key.to_string(), data);
        Ok(())
    }
}

fn assert_empty(dir: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(dir).unwrap().collect();
    assert!(leftovers.is_empty(), "workspace not removed: {:?}", leftovers);
}

#[tokio::test]
async fn test_run_sums_and_uploads() {
    let root = TempDir::new().unwrap();
    let storage = MemoryStorage::with_addends("1\n2\n3\n");

    let total = job::run_under(&storage, root.path()).await.unwrap();

    assert_eq!(total, 6.0);
    assert_eq!(storage.object(SUM_KEY).as_deref(), Some("6.0"));
    assert_eq!(
        *storage.calls.lock().unwrap(),
        vec!["fetch addends.txt".to_string(), "store sum.txt".to_string()]
    );
    assert_empty(root.path());
}

#[tokio::test]
async fn test_run_skips_invalid_lines() {
    let root = TempDir::new().unwrap();
    let storage = MemoryStorage::with_addends("1\nabc\n3\n");

    let total = job::run_under(&storage, root.path()).await.unwrap();

    assert_eq!(total, 4.0);
    assert_eq!(storage.object(SUM_KEY).as_deref(), Some("4.0"));
}

#[tokio::test]
async fn test_run_empty_input() {
    let root = TempDir::new().unwrap();
    let storage = MemoryStorage::with_addends("");

    let total = job::run_under(&storage, root.path()).await.unwrap();

    assert_eq!(total, 0.0);
    assert_eq!(storage.object(SUM_KEY).as_deref(), Some("0.0"));
}

#[tokio::test]
async fn test_run_uses_one_workspace() {
    let root = TempDir::new().unwrap();
    let storage = MemoryStorage::with_addends("5\n");

    job::run_under(&storage, root.path()).await.unwrap();

    let paths = storage.seen_paths.lock().unwrap().clone();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].file_name().unwrap(), ADDENDS_KEY);
    assert_eq!(paths[1].file_name().unwrap(), SUM_KEY);
    assert_eq!(paths[0].parent(), paths[1].parent());
    assert!(paths[0].starts_with(root.path()));
    assert!(!paths[0].parent().unwrap().exists());
}

#[tokio::test]
async fn test_workspace_removed_when_fetch_fails() {
    let root = TempDir::new().unwrap();
    let storage = MemoryStorage::default();

    let result = job::run_under(&storage, root.path()).await;

    assert!(matches!(result, Err(AdderError::Transfer { .. })));
    assert!(storage.object(SUM_KEY).is_none());
    assert_eq!(storage.calls.lock().unwrap().len(), 1);
    assert_empty(root.path());
}

#[tokio::test]
async fn test_workspace_removed_when_upload_file_missing() {
    let root = TempDir::new().unwrap();
    let storage = MemoryStorage {
        lose_upload_file: true,
        ..MemoryStorage::with_addends("1\n2\n")
    };

    let result = job::run_under(&storage, root.path()).await;

    match result {
        Err(AdderError::LocalFileMissing(path)) => {
            assert_eq!(path.file_name().unwrap(), SUM_KEY);
        }
        other => panic!("expected LocalFileMissing, got {:?}", other),
    }
    assert!(storage.object(SUM_KEY).is_none());
    assert_empty(root.path());
}

#[tokio::test]
async fn test_run_in_system_temp_dir() {
    let storage = MemoryStorage::with_addends("0.5\n0.25\n");

    let total = job::run(&storage).await.unwrap();

    assert_eq!(total, 0.75);
    let workspace = storage.seen_paths.lock().unwrap()[0]
        .parent()
        .unwrap()
        .to_path_buf();
    assert!(!workspace.exists());
}
