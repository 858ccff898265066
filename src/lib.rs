//! S3 Adder Library
//!
//! Downloads a file of numbers from S3, sums the numeric lines and uploads
//! the result back to S3. The binary wires these modules to the process
//! environment; the library is public for testing and reuse.

pub mod config;
pub mod error;
pub mod job;
pub mod s3;
pub mod sum;

pub use config::Config;
pub use error::{AdderError, Result};
