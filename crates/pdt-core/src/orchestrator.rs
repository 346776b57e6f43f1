//! Drives fetch and commit across every named collection
//!
//! The orchestrator owns the store connection. It is created lazily by the
//! first operation that needs it, shared by reference with every
//! collection, and closed exactly once.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::collection::{Collection, CommitReport, IdentifierList, ListKind, RecordCollection};
use crate::config::Config;
use crate::error::CollectionError;
use crate::store::{Connect, DocumentStore, DryRunStore};
use crate::web::{ModInfoSource, UrlVerifier};
use crate::{Error, Result};

/// Every collection the tool manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionName {
    Repositories,
    ModInfo,
    ToolInfo,
    Mods,
}

impl CollectionName {
    pub const ALL: [CollectionName; 4] = [
        CollectionName::Repositories,
        CollectionName::ModInfo,
        CollectionName::ToolInfo,
        CollectionName::Mods,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionName::Repositories => "repositories",
            CollectionName::ModInfo => "modinfo",
            CollectionName::ToolInfo => "toolinfo",
            CollectionName::Mods => "mods",
        }
    }

    /// The identifier list this name refers to, if any
    pub fn list_kind(self) -> Option<ListKind> {
        match self {
            CollectionName::Repositories => Some(ListKind::Repositories),
            CollectionName::ModInfo => Some(ListKind::ModInfo),
            CollectionName::ToolInfo => Some(ListKind::ToolInfo),
            CollectionName::Mods => None,
        }
    }
}

impl From<ListKind> for CollectionName {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::Repositories => CollectionName::Repositories,
            ListKind::ModInfo => CollectionName::ModInfo,
            ListKind::ToolInfo => CollectionName::ToolInfo,
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mods" | "mod" => Ok(CollectionName::Mods),
            other => other.parse::<ListKind>().map(CollectionName::from),
        }
    }
}

/// Outcome of reloading every modinfo document
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Modinfo documents read successfully
    pub documents: usize,
    /// Records added or changed across all documents
    pub applied: usize,
    /// URLs that could not be loaded, with the reason
    pub failures: Vec<(String, Error)>,
}

/// Owns the store connection and the four named collections
pub struct Orchestrator {
    connector: Box<dyn Connect>,
    store: OnceCell<Arc<dyn DocumentStore>>,
    closed: bool,
    dry_run: bool,
    repositories: IdentifierList,
    modinfo: IdentifierList,
    toolinfo: IdentifierList,
    mods: RecordCollection,
}

impl Orchestrator {
    /// Build the collections described by `config`
    ///
    /// Nothing is fetched and no connection is made until the first fetch or
    /// commit. Missing collection paths surface as configuration errors from
    /// the collection that needs them.
    pub fn new(connector: Box<dyn Connect>, config: &Config, verifier: Arc<dyn UrlVerifier>) -> Self {
        let list = |kind: ListKind| {
            IdentifierList::new(kind, config.meta_path(kind).ok(), verifier.clone())
                .with_force(config.force)
        };

        Self {
            connector,
            store: OnceCell::new(),
            closed: false,
            dry_run: config.dry_run,
            repositories: list(ListKind::Repositories),
            modinfo: list(ListKind::ModInfo),
            toolinfo: list(ListKind::ToolInfo),
            mods: RecordCollection::new(config.mods_path().ok()),
        }
    }

    /// Log writes instead of performing them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn list(&self, kind: ListKind) -> &IdentifierList {
        match kind {
            ListKind::Repositories => &self.repositories,
            ListKind::ModInfo => &self.modinfo,
            ListKind::ToolInfo => &self.toolinfo,
        }
    }

    pub fn list_mut(&mut self, kind: ListKind) -> &mut IdentifierList {
        match kind {
            ListKind::Repositories => &mut self.repositories,
            ListKind::ModInfo => &mut self.modinfo,
            ListKind::ToolInfo => &mut self.toolinfo,
        }
    }

    pub fn mods(&self) -> &RecordCollection {
        &self.mods
    }

    pub fn mods_mut(&mut self) -> &mut RecordCollection {
        &mut self.mods
    }

    /// Whether any collection has uncommitted changes
    pub fn is_dirty(&self) -> bool {
        self.repositories.is_dirty()
            || self.modinfo.is_dirty()
            || self.toolinfo.is_dirty()
            || self.mods.is_dirty()
    }

    /// The shared store, connecting on first use
    ///
    /// # Errors
    ///
    /// Any failure is reported as [`Error::Connection`].
    async fn store(&self) -> Result<Arc<dyn DocumentStore>> {
        if self.closed {
            return Err(Error::Connection {
                reason: "the store connection was already closed".to_string(),
            });
        }

        let store = self.store.get_or_try_init(|| self.connect()).await?;
        Ok(store.clone())
    }

    async fn connect(&self) -> Result<Arc<dyn DocumentStore>> {
        let store = self.connector.connect().await.map_err(|e| match e {
            Error::Connection { .. } => e,
            other => Error::Connection {
                reason: other.to_string(),
            },
        })?;

        if !self.dry_run {
            return Ok(store);
        }
        tracing::info!("dry run: writes will be logged, not performed");
        let wrapped: Arc<dyn DocumentStore> = Arc::new(DryRunStore::new(store));
        Ok(wrapped)
    }

    /// Fetch every collection concurrently
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the store cannot be reached, or
    /// [`Error::Collections`] naming every collection that failed. A failing
    /// collection does not stop the others.
    pub async fn fetch_all(&mut self) -> Result<()> {
        let store = self.store().await?;
        let store = store.as_ref();

        let (repositories, modinfo, toolinfo, mods) = tokio::join!(
            self.repositories.fetch(store),
            self.modinfo.fetch(store),
            self.toolinfo.fetch(store),
            self.mods.fetch(store),
        );

        gather(vec![
            (CollectionName::Repositories, repositories),
            (CollectionName::ModInfo, modinfo),
            (CollectionName::ToolInfo, toolinfo),
            (CollectionName::Mods, mods),
        ])
        .map(|_| ())
    }

    /// Fetch a single collection
    pub async fn fetch_one(&mut self, name: CollectionName) -> Result<()> {
        let store = self.store().await?;
        match name.list_kind() {
            Some(kind) => self.list_mut(kind).fetch(store.as_ref()).await,
            None => self.mods.fetch(store.as_ref()).await,
        }
    }

    /// Commit every collection concurrently, then close the store
    ///
    /// The store is closed even when commits fail. When nothing is dirty no
    /// connection is made.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Collections`] naming every collection whose commit
    /// failed, or the close error if only closing failed.
    pub async fn commit_all(&mut self) -> Result<Vec<(CollectionName, CommitReport)>> {
        let committed = self.commit_collections().await;
        let closed = self.close().await;
        let reports = committed?;
        closed?;
        Ok(reports)
    }

    async fn commit_collections(&mut self) -> Result<Vec<(CollectionName, CommitReport)>> {
        if !self.is_dirty() {
            tracing::info!("nothing to commit");
            return Ok(Vec::new());
        }

        let store = self.store().await?;
        let store = store.as_ref();

        let (repositories, modinfo, toolinfo, mods) = tokio::join!(
            self.repositories.commit(store),
            self.modinfo.commit(store),
            self.toolinfo.commit(store),
            self.mods.commit(store),
        );

        gather(vec![
            (CollectionName::Repositories, repositories),
            (CollectionName::ModInfo, modinfo),
            (CollectionName::ToolInfo, toolinfo),
            (CollectionName::Mods, mods),
        ])
    }

    /// Close the store connection if one was made
    ///
    /// Only the first call reaches the store.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match self.store.get() {
            Some(store) => {
                tracing::debug!("closing store connection");
                store.close().await
            }
            None => Ok(()),
        }
    }

    /// Reload the mods of every modinfo document
    ///
    /// Fetches the modinfo list and the mod collection first. A document that
    /// cannot be loaded is recorded in the report and the rest continue.
    pub async fn sync_modinfo(&mut self, source: &dyn ModInfoSource) -> Result<SyncReport> {
        self.fetch_one(CollectionName::ModInfo).await?;
        self.fetch_one(CollectionName::Mods).await?;

        let mut report = SyncReport::default();
        for url in self.modinfo.items().to_vec() {
            match self.mods.load_modinfo(source, &url).await {
                Ok(applied) => {
                    report.documents += 1;
                    report.applied += applied;
                }
                Err(e) => {
                    tracing::warn!(%url, error = %e, "could not load modinfo");
                    report.failures.push((url, e));
                }
            }
        }
        Ok(report)
    }
}

/// Split per-collection results into successes and one aggregated error
fn gather<T>(results: Vec<(CollectionName, Result<T>)>) -> Result<Vec<(CollectionName, T)>> {
    let mut done = Vec::with_capacity(results.len());
    let mut failures = Vec::new();

    for (name, result) in results {
        match result {
            Ok(value) => done.push((name, value)),
            Err(error) => {
                tracing::error!(collection = %name, %error, "collection failed");
                failures.push(CollectionError {
                    collection: name.to_string(),
                    error,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(done)
    } else {
        Err(Error::Collections(failures))
    }
}
