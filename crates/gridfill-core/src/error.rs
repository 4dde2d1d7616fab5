//! Error types for Gridfill core.

use gridfill_engine::EngineError;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur in the Gridfill core
#[derive(Error, Debug)]
pub enum GridfillError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {0}")]
    UnsupportedSnapshotVersion(u64),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Formula error: {0}")]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, GridfillError>;
