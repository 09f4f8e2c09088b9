//! Tagged error kinds for each concern, escalated to the CLI via `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the FS port (enumerate/read/write/hash-stream).
#[derive(Error, Debug)]
pub enum FsError {
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("access denied: {0}")]
    AccessDenied(PathBuf),

    #[error("I/O failure at {path}: {cause}")]
    IoFailure { path: PathBuf, cause: std::io::Error },
}

/// Errors surfaced by the hasher. A hash failure is dropped from grouping
/// output rather than aborting the whole call — see [`crate::grouper`].
#[derive(Error, Debug)]
pub enum HashError {
    #[error("failed to hash {path}: {cause}")]
    HashFailed { path: PathBuf, cause: std::io::Error },
}

/// Errors surfaced by the similarity scorer and iterative orchestrator.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("need at least two versions to merge, found {found}")]
    NotEnoughVersions { found: usize },

    #[error("{which} port failed: {cause}")]
    PortError { which: &'static str, cause: anyhow::Error },
}

/// Errors surfaced by a malformed batch definition, checked synchronously
/// before phase 1 begins.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("batch has no patterns")]
    EmptyPatterns,

    #[error("search path does not exist or is unreadable: {0}")]
    UnreadableSearchPath(PathBuf),
}

/// Errors surfaced by the config/persistence store.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {cause}")]
    ReadFailed { path: PathBuf, cause: std::io::Error },

    #[error("failed to write config at {path}: {cause}")]
    WriteFailed { path: PathBuf, cause: std::io::Error },

    #[error("malformed config at {path}: {cause}")]
    Malformed { path: PathBuf, cause: serde_json::Error },
}
