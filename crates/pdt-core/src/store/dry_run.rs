//! Store wrapper that never writes

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{DocumentPath, DocumentStore, RemoteDocument, WriteAck};
use crate::Result;

/// Passes reads through to the wrapped store and acknowledges writes
/// without performing them
pub struct DryRunStore {
    inner: Arc<dyn DocumentStore>,
}

impl DryRunStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DocumentStore for DryRunStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>> {
        self.inner.get(path).await
    }

    async fn set(&self, path: &DocumentPath, _data: &Value) -> Result<WriteAck> {
        tracing::info!(%path, "[dry-run] would write document");
        Ok(WriteAck {
            path: path.clone(),
            update_time: None,
        })
    }

    async fn create(&self, collection: &str, _data: &Value) -> Result<WriteAck> {
        let path = DocumentPath::new(collection, format!("dry-run-{}", Uuid::new_v4().simple()));
        tracing::info!(collection, "[dry-run] would create document");
        Ok(WriteAck {
            path,
            update_time: None,
        })
    }

    async fn delete(&self, path: &DocumentPath) -> Result<WriteAck> {
        tracing::info!(%path, "[dry-run] would delete document");
        Ok(WriteAck {
            path: path.clone(),
            update_time: None,
        })
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<RemoteDocument>> {
        self.inner.list_documents(collection).await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreOp};
    use serde_json::json;

    #[tokio::test]
    async fn writes_never_reach_the_inner_store() {
        let memory = Arc::new(MemoryStore::new());
        let store = DryRunStore::new(memory.clone());
        let path = DocumentPath::new("meta", "repositories");

        store.set(&path, &json!({"list": []})).await.unwrap();
        let created = store.create("mods", &json!({})).await.unwrap();
        store.delete(&path).await.unwrap();

        assert!(created.path.id().starts_with("dry-run-"));
        assert!(memory.writes().is_empty());
    }

    #[tokio::test]
    async fn reads_pass_through() {
        let memory = Arc::new(MemoryStore::new());
        let path = DocumentPath::new("meta", "toolinfo");
        memory.insert(&path, json!({"list": ["x"]}));
        let store = DryRunStore::new(memory.clone());

        assert_eq!(store.get(&path).await.unwrap(), Some(json!({"list": ["x"]})));
        store.close().await.unwrap();
        assert_eq!(
            memory.operations(),
            vec![StoreOp::Get("meta/toolinfo".to_string()), StoreOp::Close]
        );
    }
}
