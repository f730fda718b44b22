//! CLI command implementations
//!
//! Each command returns `anyhow::Result<i32>` carrying the process exit code.

pub mod export;
pub mod init;
pub mod status;
pub mod validate;
pub mod validate_artifacts;
