//! Error types for templating dispatch.

use std::path::PathBuf;
use thiserror::Error;

use crate::method::TemplatingMethod;

/// Result type alias for templating operations.
pub type TemplatingResult<T> = Result<T, TemplatingError>;

/// Errors that can occur while producing manifests for an application.
#[derive(Error, Debug)]
pub enum TemplatingError {
    #[error("No templating backend registered for {0}")]
    BackendUnavailable(TemplatingMethod),

    #[error("Templating backend {method} failed: {message}")]
    BackendFailed {
        method: TemplatingMethod,
        message: String,
    },

    #[error("Invalid deployment configuration in {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Manifest error: {0}")]
    Manifest(#[from] piped_manifest::ManifestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
