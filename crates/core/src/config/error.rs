//! Error types for configuration loading.
//!
//! Every variant carries the path of the offending file. For the embedded
//! default catalog the path is the template's relative path.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading `.showcase/`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk.
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse `config.toml`.
    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to parse a process definition.
    #[error("Failed to parse YAML file at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Failed to parse the front matter of a stage content file.
    #[error("Failed to parse Markdown front matter in {path}: {reason}")]
    MarkdownParse { path: PathBuf, reason: String },

    #[error("Failed to traverse directory {path}: {source}")]
    DirectoryWalk {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// The catalog is structurally invalid (no processes, duplicate ids,
    /// unknown default process).
    #[error("Invalid configuration in {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },
}

/// Type alias for Result with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
