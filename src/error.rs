use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors that can end an ingestion run.
///
/// Corrupted images are reported as data by the integrity checker, never as
/// an `IngestError`.
#[derive(Debug, Error)]
pub enum IngestError {
    /// At least one class has no images. The report was still written.
    #[error(
        "data validation failed (no images for: {}); see {}",
        .empty_classes.join(", "),
        .report_path.display()
    )]
    ValidationFailed {
        /// Where the validation report was saved.
        report_path: PathBuf,
        /// Classes that came up empty, in configured order.
        empty_classes: Vec<String>,
    },

    /// Filesystem read or write failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Directory traversal failed (permissions, symlink loops).
    #[error("failed to walk dataset directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A report could not be serialized.
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for `IngestConfig`.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The config parsed but breaks an invariant.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl IngestError {
    /// Wraps an `std::io::Error` with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the structural-absence failure reported by validation.
    #[must_use]
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }
}
