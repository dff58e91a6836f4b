//! Error types for the watcher crate

use std::path::PathBuf;
use thiserror::Error;

use crate::session::SessionState;

/// Errors that can occur while configuring or running a watch session.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Cannot watch {path}: {source}")]
    InvalidRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid suppression pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Native event source failed: {0}")]
    Backend(#[from] notify::Error),

    #[error("Session is {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },

    #[error("Ancestor walk requires a root-relative path, got {0}")]
    AbsoluteAncestry(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for watcher operations
pub type Result<T> = std::result::Result<T, WatchError>;
