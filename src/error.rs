/// Error types for Scout-Edge operations.
///
/// Every fallible operation in the crate returns `ScoutResult<T>`. Read paths
/// that must always yield a usable store (`TrendStore::load` and friends)
/// swallow these errors after logging them; write paths hand them back so the
/// caller sees the failure branch explicitly.
use std::path::PathBuf;

use thiserror::Error;

use crate::sources::SourceKind;

/// The main error type for Scout-Edge operations.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Reading or writing a file failed
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// The file or directory involved
        path: PathBuf,
        /// The underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Serialization error when converting data to/from JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A timestamp string did not match any accepted format
    #[error("Invalid timestamp '{value}'")]
    InvalidTimestamp {
        /// The offending input
        value: String,
    },

    /// Invalid data format or structure
    #[error("Invalid data: {reason}")]
    InvalidData {
        /// Description of why the data is invalid
        reason: String,
    },

    /// The storage location itself cannot be accessed
    #[error("Storage location '{}' unavailable: {reason}", path.display())]
    StorageUnavailable {
        /// The storage directory
        path: PathBuf,
        /// Why it could not be used
        reason: String,
    },

    /// An analysis was asked to work on an empty batch
    #[error("No {what} found for analysis")]
    EmptyBatch {
        /// What kind of item was missing ("repositories", "papers", ...)
        what: &'static str,
    },

    /// A source adapter failed to produce items
    #[error("{kind} source failed: {reason}")]
    Source {
        /// The adapter that failed
        kind: SourceKind,
        /// Adapter-provided failure description
        reason: String,
    },

    /// No adapter is registered for the requested source
    #[error("No adapter registered for source {kind}")]
    SourceNotRegistered {
        /// The missing source
        kind: SourceKind,
    },
}

impl ScoutError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for Scout-Edge operations.
pub type ScoutResult<T> = Result<T, ScoutError>;
