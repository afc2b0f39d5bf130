//! Error types for initialization operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for initialization operations.
pub type InitResult<T> = Result<T, InitError>;

/// Errors that can occur while writing `.showcase/`.
#[derive(Debug, Error)]
pub enum InitError {
    /// The .showcase directory already exists and force flag was not set.
    #[error(".showcase directory already exists at {0:?}. Use --force to overwrite.")]
    DirectoryExists(PathBuf),

    #[error("Template file not found: {0}")]
    TemplateNotFound(String),

    #[error("Failed to create directory {path:?}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path:?}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}
