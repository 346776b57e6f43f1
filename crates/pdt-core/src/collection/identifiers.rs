//! Identifier lists: unique URLs stored in one document
//!
//! The remote document holds a single ordered array:
//!
//! ```json
//! { "list": ["https://...", "https://..."] }
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CacheState, Collection, CommitReport, render_json, write_listing};
use crate::store::{DocumentPath, DocumentStore};
use crate::web::UrlVerifier;
use crate::{Error, Result};

/// The identifier lists the tool knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Repositories,
    ModInfo,
    ToolInfo,
}

impl ListKind {
    pub const ALL: [ListKind; 3] = [ListKind::Repositories, ListKind::ModInfo, ListKind::ToolInfo];

    /// Configuration and JSON name of the list
    pub fn name(self) -> &'static str {
        match self {
            ListKind::Repositories => "repositories",
            ListKind::ModInfo => "modinfo",
            ListKind::ToolInfo => "toolinfo",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ListKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "repositories" | "repos" | "repo" => Ok(ListKind::Repositories),
            "modinfo" => Ok(ListKind::ModInfo),
            "toolinfo" => Ok(ListKind::ToolInfo),
            other => Err(Error::validation(other, "unknown list")),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ListDocument {
    #[serde(default)]
    list: Vec<String>,
}

/// An insertion-ordered list of unique identifiers backed by one document
pub struct IdentifierList {
    kind: ListKind,
    path: Option<DocumentPath>,
    items: Vec<String>,
    dirty: bool,
    cache: CacheState,
    force: bool,
    verifier: Arc<dyn UrlVerifier>,
}

impl IdentifierList {
    /// Create an empty, unfetched list
    ///
    /// `path` is the configured remote document; `None` makes fetch and
    /// commit fail with a configuration error.
    pub fn new(kind: ListKind, path: Option<DocumentPath>, verifier: Arc<dyn UrlVerifier>) -> Self {
        Self {
            kind,
            path,
            items: Vec::new(),
            dirty: false,
            cache: CacheState::NotFetched,
            force: false,
            verifier,
        }
    }

    /// Replace duplicates on add instead of rejecting them
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    fn path(&self) -> Result<&DocumentPath> {
        self.path.as_ref().ok_or_else(|| Error::Configuration {
            key: format!("firebase.collections.meta.{}", self.kind.name()),
        })
    }

    async fn load(store: &dyn DocumentStore, path: &DocumentPath) -> Result<Vec<String>> {
        let data = store.get(path).await?.ok_or_else(|| Error::NotFound {
            path: path.to_string(),
        })?;
        let document: ListDocument = serde_json::from_value(data)?;

        let mut items: Vec<String> = Vec::with_capacity(document.list.len());
        for item in document.list {
            if !items.contains(&item) {
                items.push(item);
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl Collection for IdentifierList {
    type Item = String;

    fn name(&self) -> &str {
        self.kind.name()
    }

    fn cache_state(&self) -> CacheState {
        self.cache
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn count(&self) -> usize {
        self.items.len()
    }

    async fn fetch(&mut self, store: &dyn DocumentStore) -> Result<()> {
        if self.cache == CacheState::Fetched {
            tracing::info!(list = %self.kind, "using cached data");
            return Ok(());
        }

        let path = self.path()?.clone();
        tracing::info!(list = %self.kind, %path, "fetching document");

        self.cache = CacheState::Fetching;
        match Self::load(store, &path).await {
            Ok(items) => {
                self.items = items;
                self.cache = CacheState::Fetched;
                tracing::info!(list = %self.kind, count = self.items.len(), "retrieved list");
                Ok(())
            }
            Err(e) => {
                self.cache = CacheState::NotFetched;
                Err(e)
            }
        }
    }

    async fn add(&mut self, item: String) -> Result<()> {
        let item = item.trim().to_string();
        if item.is_empty() {
            return Err(Error::validation(item, "item cannot be blank"));
        }

        self.verifier.verify(&item).await.into_result(&item)?;

        if self.contains(&item) {
            if !self.force {
                tracing::warn!(list = %self.kind, %item, "already exists");
                return Err(Error::Duplicate {
                    collection: self.kind.name().to_string(),
                    item,
                });
            }
            tracing::info!(list = %self.kind, %item, "replacing existing entry");
            self.items.retain(|i| *i != item);
        }

        tracing::info!(list = %self.kind, %item, "adding");
        self.items.push(item);
        self.dirty = true;
        Ok(())
    }

    fn remove(&mut self, item: &String) -> Result<()> {
        let item = item.trim();
        if item.is_empty() {
            return Err(Error::validation(item, "item cannot be blank"));
        }

        let before = self.items.len();
        self.items.retain(|i| i != item);
        if self.items.len() == before {
            tracing::warn!(list = %self.kind, item, "not present; nothing to remove");
            return Ok(());
        }

        tracing::info!(list = %self.kind, item, "removed");
        self.dirty = true;
        Ok(())
    }

    async fn commit(&mut self, store: &dyn DocumentStore) -> Result<CommitReport> {
        if !self.dirty {
            return Ok(CommitReport::default());
        }

        let path = self.path()?;
        tracing::info!(list = %self.kind, %path, "committing changes");

        let data = serde_json::to_value(ListDocument {
            list: self.items.clone(),
        })?;
        let ack = store.set(path, &data).await?;

        self.dirty = false;
        Ok(CommitReport {
            updated: 1,
            acks: vec![ack],
            ..CommitReport::default()
        })
    }

    fn to_json(&self) -> Result<String> {
        render_json(self.kind.name(), &self.items)
    }
}

impl fmt::Display for IdentifierList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_listing(f, &self.items)
    }
}
