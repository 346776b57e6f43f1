//! Document store abstraction
//!
//! Collections talk to the remote database only through [`DocumentStore`].
//! The orchestrator creates one store per process through a [`Connect`]
//! implementation and passes it by reference into every collection.
//!
//! Backends:
//! - [`FirestoreStore`]: Firestore REST API
//! - [`MemoryStore`]: in-process map with an operation log
//! - [`DryRunStore`]: wraps another store and only pretends to write

mod dry_run;
mod firestore;
mod memory;
pub mod value;

pub use dry_run::DryRunStore;
pub use firestore::{FirestoreConnector, FirestoreStore};
pub use memory::{MemoryStore, StoreOp};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{Error, Result};

/// Location of a single document: `collection/doc[/collection/doc...]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: String,
    id: String,
}

impl DocumentPath {
    /// Parse a slash-separated document path
    ///
    /// `key` names the configuration item the path came from and is used in
    /// the error when the path is malformed.
    pub fn parse(raw: &str, key: &str) -> Result<Self> {
        let malformed = || Error::Configuration {
            key: key.to_string(),
        };

        let segments: Vec<&str> = raw.trim().trim_matches('/').split('/').collect();
        if segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty()) {
            return Err(malformed());
        }

        let Some((id, collection)) = segments.split_last() else {
            return Err(malformed());
        };
        Ok(Self {
            collection: collection.join("/"),
            id: (*id).to_string(),
        })
    }

    /// Build a path from a collection path and a document id
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Path of the collection holding this document
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Document id (last path segment)
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Acknowledgment of a completed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteAck {
    /// The document that was written or deleted
    pub path: DocumentPath,
    /// Server-side update time, when the backend reports one
    pub update_time: Option<DateTime<Utc>>,
}

/// A document as returned by a collection listing
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    pub id: String,
    pub data: Value,
}

/// Operations the reconciliation engine needs from a document database
///
/// Implementations must be safe to share between concurrent fetches and
/// commits of different collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document; `Ok(None)` when it does not exist
    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>>;

    /// Create or overwrite the document at `path`
    async fn set(&self, path: &DocumentPath, data: &Value) -> Result<WriteAck>;

    /// Create a document with a store-assigned id
    async fn create(&self, collection: &str, data: &Value) -> Result<WriteAck>;

    /// Delete the document at `path`
    async fn delete(&self, path: &DocumentPath) -> Result<WriteAck>;

    /// List every document directly under `collection`
    async fn list_documents(&self, collection: &str) -> Result<Vec<RemoteDocument>>;

    /// Release the connection
    async fn close(&self) -> Result<()>;
}

/// Factory for the process-wide store client
///
/// Called at most once per orchestrator. A failure here is a
/// [`Error::Connection`] and nothing downstream can proceed.
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("meta/repositories", "meta", "repositories")]
    #[case("/meta/repositories/", "meta", "repositories")]
    #[case("a/b/c/d", "a/b/c", "d")]
    fn parse_valid_paths(#[case] raw: &str, #[case] collection: &str, #[case] id: &str) {
        let path = DocumentPath::parse(raw, "key").unwrap();
        assert_eq!(path.collection(), collection);
        assert_eq!(path.id(), id);
    }

    #[rstest]
    #[case("")]
    #[case("meta")]
    #[case("a/b/c")]
    #[case("a//b")]
    fn parse_rejects_malformed_paths(#[case] raw: &str) {
        let err = DocumentPath::parse(raw, "firebase.collections.meta.toolinfo").unwrap_err();
        assert!(matches!(err, Error::Configuration { ref key } if key == "firebase.collections.meta.toolinfo"));
    }

    #[test]
    fn display_joins_collection_and_id() {
        assert_eq!(DocumentPath::new("mods", "abc").to_string(), "mods/abc");
    }
}
