//! Error types for pdt-core

use std::fmt;
use std::path::PathBuf;

/// Result type for pdt-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pdt-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required configuration item is missing or blank
    #[error("config item {key:?} not found")]
    Configuration { key: String },

    /// The configuration file could not be located or parsed
    #[error("invalid configuration at {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    /// A fetched document does not exist remotely
    #[error("document {path:?} does not exist")]
    NotFound { path: String },

    /// Add of an already-present identifier without force mode
    #[error("{item:?} already exists in {collection}")]
    Duplicate { collection: String, item: String },

    /// Blank item, unreachable URL, or malformed input
    #[error("{item:?} is not valid: {reason}")]
    Validation { item: String, reason: String },

    /// The store client could not be initialized
    #[error("failed to connect to the document store: {reason}")]
    Connection { reason: String },

    /// Some writes of a commit batch persisted and others did not
    #[error(
        "partial commit to {collection}: {succeeded} written, {} failed: {}",
        .failures.len(),
        .failures.join("; ")
    )]
    PartialCommit {
        collection: String,
        succeeded: usize,
        failures: Vec<String>,
    },

    /// A lifecycle transition that the state machine does not define
    #[error("invalid lifecycle transition for {record}: {from} -> {to}")]
    InvalidTransition {
        record: String,
        from: String,
        to: String,
    },

    /// A single remote operation failed
    #[error("store error on {path:?}: {message}")]
    Store { path: String, message: String },

    /// One or more collections failed during a fan-out operation
    #[error("{}", CollectionFailures(.0))]
    Collections(Vec<CollectionError>),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// HTTP transport error
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// A failure attributed to one named collection
#[derive(Debug)]
pub struct CollectionError {
    pub collection: String,
    pub error: Error,
}

struct CollectionFailures<'a>(&'a [CollectionError]);

impl fmt::Display for CollectionFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} collection(s) failed", self.0.len())?;
        for failure in self.0 {
            write!(f, "\n  {}: {}", failure.collection, failure.error)?;
        }
        Ok(())
    }
}

impl Error {
    /// Build a store error for `path`
    pub fn store(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Store {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Build a validation error for `item`
    pub fn validation(item: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Validation {
            item: item.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether nothing downstream can proceed after this error
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Collections(failures) => failures.iter().any(|f| f.error.is_fatal()),
            _ => false,
        }
    }

    /// Whether this is a duplicate add that callers may skip
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}
