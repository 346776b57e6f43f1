//! Store fixtures.

use std::sync::Arc;

use async_trait::async_trait;
use pdt_core::{Connect, DocumentPath, DocumentStore, Error, ListKind, MemoryStore, ModRecord, Result};
use serde_json::json;

/// A [`Connect`] whose connection attempt always fails.
#[derive(Debug, Clone)]
pub struct FailingConnector {
    reason: String,
}

impl FailingConnector {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Connect for FailingConnector {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>> {
        Err(Error::Connection {
            reason: self.reason.clone(),
        })
    }
}

/// A [`MemoryStore`] laid out the way [`test_config`](crate::test_config)
/// expects.
///
/// Every identifier list document exists (empty unless given in `lists`);
/// `mods` are stored under `mods/` with ids `mod-0`, `mod-1`, ...
pub fn seeded_store(lists: &[(ListKind, &[&str])], mods: &[ModRecord]) -> Arc<MemoryStore> {
    let store = MemoryStore::new();

    for kind in ListKind::ALL {
        let items: Vec<&str> = lists
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, items)| items.to_vec())
            .unwrap_or_default();
        store.insert(&DocumentPath::new("meta", kind.name()), json!({ "list": items }));
    }

    for (i, record) in mods.iter().enumerate() {
        store.insert(
            &DocumentPath::new("mods", format!("mod-{i}")),
            record.to_document().unwrap(),
        );
    }

    Arc::new(store)
}
