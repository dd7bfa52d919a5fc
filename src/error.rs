// src/error.rs

//! Error types for rpmdeps

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while listing package dependencies
#[derive(Error, Debug)]
pub enum Error {
    /// I/O failure on a specific path
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The package manifest could not be extracted
    #[error("Failed to extract manifest: {0}")]
    Manifest(String),

    /// A manifest listing line could not be parsed
    #[error("Malformed manifest line {line}: {reason}")]
    ManifestLine { line: usize, reason: String },

    /// Invalid run configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for rpmdeps operations
pub type Result<T> = std::result::Result<T, Error>;
