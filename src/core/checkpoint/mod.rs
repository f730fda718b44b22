//! Durable export progress
//!
//! - [`model`] - The [`Checkpoint`] record and its [`Batch`] entries
//! - [`storage`] - Atomic whole-record persistence
//! - [`manager`] - Load, plan once, select next, mark completed

pub mod manager;
pub mod model;
pub mod storage;

pub use manager::CheckpointManager;
pub use model::{Batch, Checkpoint, SCHEMA_VERSION};
pub use storage::{CheckpointStorage, FileCheckpointStorage};
