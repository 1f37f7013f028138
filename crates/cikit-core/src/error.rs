//! Error types for cikit-core

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from reading a `pyproject.toml`.
///
/// A missing file is not an error; callers get `None` and fall back to
/// their defaults.
#[derive(Error, Debug)]
pub enum PyprojectError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path that failed.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        source: Box<toml::de::Error>,
    },
}

/// Result type alias using [`PyprojectError`].
pub type PyprojectResult<T> = Result<T, PyprojectError>;

/// Errors from appending `key=value` lines to an output sink.
#[derive(Error, Debug)]
#[error("failed to write outputs to {path}: {source}")]
pub struct OutputError {
    /// Sink path.
    pub path: Utf8PathBuf,
    /// Underlying I/O error.
    pub source: std::io::Error,
}
