//! Error types for the analyzer
//!
//! Only whole-operation failures live here. Problems with a single document
//! inside a file are counted by the parser and never surface as an
//! [`AnalyzerError`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a parse, discovery, or configuration operation
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The requested file or discovery root does not exist
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Reading a file failed
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid JSON
    #[error("Invalid JSON content: {0}")]
    Json(#[from] serde_json::Error),

    /// The file content is not valid YAML
    #[error("Invalid YAML content: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A discovery glob pattern could not be compiled
    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Reason reported by the glob compiler
        message: String,
    },

    /// A configuration file could not be parsed or written
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalyzerError {
    /// Wrap an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;
