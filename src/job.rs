//! One adder run: fetch the addends, sum them, store the sum
//!
//! All local files live in a temporary workspace that is removed when the
//! run ends, whether it succeeded or not.

use std::path::Path;
use tempfile::TempDir;

use crate::error::Result;
use crate::s3::StorageAccessor;
use crate::sum::SumTask;

/// Relative key of the input object
pub const ADDENDS_KEY: &str = "addends.txt";
/// Relative key of the output object
pub const SUM_KEY: &str = "sum.txt";

/// Moves files between the local workspace and object storage
#[allow(async_fn_in_trait)]
pub trait ObjectTransfer {
    async fn fetch(&self, relative_key: &str, local_path: &Path) -> Result<()>;
    async fn store(&self, local_path: &Path, relative_key: &str) -> Result<()>;
}

impl ObjectTransfer for StorageAccessor {
    async fn fetch(&self, relative_key: &str, local_path: &Path) -> Result<()> {
        StorageAccessor::fetch(self, relative_key, local_path).await
    }

    async fn store(&self, local_path: &Path, relative_key: &str) -> Result<()> {
        StorageAccessor::store(self, local_path, relative_key).await
    }
}

/// Run the job with a workspace under the system temp directory
pub async fn run<T: ObjectTransfer>(storage: &T) -> Result<f64> {
    let workspace = tempfile::Builder::new().prefix("s3-adder-").tempdir()?;
    run_in(storage, workspace).await
}

/// Run the job with a workspace created under `root`
pub async fn run_under<T: ObjectTransfer>(storage: &T, root: &Path) -> Result<f64> {
    let workspace = tempfile::Builder::new().prefix("s3-adder-").tempdir_in(root)?;
    run_in(storage, workspace).await
}

async fn run_in<T: ObjectTransfer>(storage: &T, workspace: TempDir) -> Result<f64> {
    tracing::info!("Created temporary directory {}", workspace.path().display());

    let input_path = workspace.path().join(ADDENDS_KEY);
    storage.fetch(ADDENDS_KEY, &input_path).await?;

    let output_path = workspace.path().join(SUM_KEY);
    let total = SumTask::new(&input_path, &output_path).run()?;

    storage.store(&output_path, SUM_KEY).await?;

    // Dropping the TempDir removes it on the error paths above as well
    let path = workspace.path().to_path_buf();
    if let Err(e) = workspace.close() {
        tracing::warn!("Failed to remove temporary directory {}: {}", path.display(), e);
    }

    Ok(total)
}
