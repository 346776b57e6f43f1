//! In-process document store

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::{Connect, DocumentPath, DocumentStore, RemoteDocument, WriteAck};
use crate::{Error, Result};

/// A store operation, as recorded by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Get(String),
    Set(String),
    Create(String),
    Delete(String),
    List(String),
    Close,
}

impl StoreOp {
    /// Whether the operation modifies remote state
    pub fn is_write(&self) -> bool {
        matches!(self, StoreOp::Set(_) | StoreOp::Create(_) | StoreOp::Delete(_))
    }
}

#[derive(Debug, Default)]
struct Inner {
    // keyed by collection path, then document id
    documents: BTreeMap<String, BTreeMap<String, Value>>,
    ops: Vec<StoreOp>,
    failing: Vec<String>,
}

/// Document store held entirely in memory
///
/// Every call is appended to an operation log so tests can assert exactly
/// which remote calls a commit issued. Paths registered with
/// [`MemoryStore::fail_on`] make writes to them fail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without recording an operation
    pub fn insert(&self, path: &DocumentPath, data: Value) {
        self.lock()
            .documents
            .entry(path.collection().to_string())
            .or_default()
            .insert(path.id().to_string(), data);
    }

    /// Current content of a document, without recording an operation
    pub fn document(&self, path: &DocumentPath) -> Option<Value> {
        self.lock()
            .documents
            .get(path.collection())
            .and_then(|docs| docs.get(path.id()))
            .cloned()
    }

    /// Number of documents under `collection`
    pub fn len(&self, collection: &str) -> usize {
        self.lock()
            .documents
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Make writes whose path starts with `prefix` fail
    pub fn fail_on(&self, prefix: impl Into<String>) {
        self.lock().failing.push(prefix.into());
    }

    /// Every operation recorded so far
    pub fn operations(&self) -> Vec<StoreOp> {
        self.lock().ops.clone()
    }

    /// Only the write operations recorded so far
    pub fn writes(&self) -> Vec<StoreOp> {
        self.lock()
            .ops
            .iter()
            .filter(|op| op.is_write())
            .cloned()
            .collect()
    }

    /// Forget the operation log
    pub fn clear_operations(&self) {
        self.lock().ops.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // a poisoned lock only means another test thread panicked
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn check_failing(&self, path: &str) -> Result<()> {
        if self.failing.iter().any(|prefix| path.starts_with(prefix)) {
            return Err(Error::store(path, "write rejected"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>> {
        let mut inner = self.lock();
        inner.ops.push(StoreOp::Get(path.to_string()));
        Ok(inner
            .documents
            .get(path.collection())
            .and_then(|docs| docs.get(path.id()))
            .cloned())
    }

    async fn set(&self, path: &DocumentPath, data: &Value) -> Result<WriteAck> {
        let mut inner = self.lock();
        inner.ops.push(StoreOp::Set(path.to_string()));
        inner.check_failing(&path.to_string())?;
        inner
            .documents
            .entry(path.collection().to_string())
            .or_default()
            .insert(path.id().to_string(), data.clone());
        Ok(WriteAck {
            path: path.clone(),
            update_time: Some(Utc::now()),
        })
    }

    async fn create(&self, collection: &str, data: &Value) -> Result<WriteAck> {
        let path = DocumentPath::new(collection, Uuid::new_v4().simple().to_string());
        let mut inner = self.lock();
        inner.ops.push(StoreOp::Create(collection.to_string()));
        inner.check_failing(&path.to_string())?;
        inner
            .documents
            .entry(collection.to_string())
            .or_default()
            .insert(path.id().to_string(), data.clone());
        Ok(WriteAck {
            path,
            update_time: Some(Utc::now()),
        })
    }

    async fn delete(&self, path: &DocumentPath) -> Result<WriteAck> {
        let mut inner = self.lock();
        inner.ops.push(StoreOp::Delete(path.to_string()));
        inner.check_failing(&path.to_string())?;
        if let Some(docs) = inner.documents.get_mut(path.collection()) {
            docs.remove(path.id());
        }
        Ok(WriteAck {
            path: path.clone(),
            update_time: Some(Utc::now()),
        })
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<RemoteDocument>> {
        let mut inner = self.lock();
        inner.ops.push(StoreOp::List(collection.to_string()));
        Ok(inner
            .documents
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| RemoteDocument {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn close(&self) -> Result<()> {
        self.lock().ops.push(StoreOp::Close);
        Ok(())
    }
}

#[async_trait]
impl Connect for Arc<MemoryStore> {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>> {
        let store: Arc<dyn DocumentStore> = self.clone();
        Ok(store)
    }
}
