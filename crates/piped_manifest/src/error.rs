//! Error types for manifest handling.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that can occur while loading, identifying or mutating manifests.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Invalid manifest document: {0}")]
    Parse(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed resource key: {0}")]
    MalformedKey(String),

    #[error("Cannot traverse {path}: {message}")]
    Traversal { path: String, message: String },

    #[error("Failed to load manifest at {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: Box<ManifestError>,
    },

    #[error("Failed to list directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ManifestError {
    /// Wrap an error with the path of the file being loaded.
    pub fn at_path(path: impl Into<PathBuf>, source: ManifestError) -> Self {
        Self::Load {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, skipping any file-path wrappers.
    pub fn root_cause(&self) -> &ManifestError {
        match self {
            Self::Load { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True for syntax or document-shape failures.
    pub fn is_parse(&self) -> bool {
        matches!(self.root_cause(), Self::Parse(_) | Self::Yaml(_))
    }

    /// True for missing or unreadable files and directories.
    pub fn is_io(&self) -> bool {
        matches!(self.root_cause(), Self::Io(_) | Self::Walk(_))
    }
}
