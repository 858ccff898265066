//! S3 Adder
//!
//! Sums the numbers in `<INPUT_PREFIX>addends.txt` and writes the result to
//! `<OUTPUT_PREFIX>sum.txt` in the bucket named by `BUCKET_NAME`.

use anyhow::{Context, Result};
use s3_adder::{job, s3::StorageAccessor, Config};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting S3 Adder v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(total) => {
            tracing::info!("Done, sum is {}", s3_adder::sum::format_sum(total));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<f64> {
    let storage = StorageAccessor::connect(config)
        .await
        .context("Failed to create S3 client")?;

    let total = job::run(&storage)
        .await
        .with_context(|| format!("Adder run failed for bucket {}", config.bucket))?;

    Ok(total)
}
