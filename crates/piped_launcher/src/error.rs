//! Error types for the launcher module.

use thiserror::Error;

/// Result type alias for launcher operations.
pub type LauncherResult<T> = Result<T, LauncherError>;

/// Errors that can occur while supervising a binary.
#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to signal process {pid}: {message}")]
    Signal { pid: u32, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
