//! Mod record collection: one document per record

use std::fmt;

use async_trait::async_trait;

use super::{CacheState, Collection, CommitReport, render_json, write_listing};
use crate::lifecycle::Lifecycle;
use crate::record::ModRecord;
use crate::store::{DocumentPath, DocumentStore, WriteAck};
use crate::web::ModInfoSource;
use crate::{Error, Result};

const DEFAULT_NAME: &str = "mods";

/// Which write a commit issued for one record
enum Written {
    Created,
    Updated,
    Deleted,
}

/// Mod records reconciled field by field against the store
pub struct RecordCollection {
    path: Option<String>,
    items: Vec<ModRecord>,
    dirty: bool,
    cache: CacheState,
}

impl RecordCollection {
    /// Create an empty, unfetched collection stored under `path`
    pub fn new(path: Option<String>) -> Self {
        Self {
            path,
            items: Vec::new(),
            dirty: false,
            cache: CacheState::NotFetched,
        }
    }

    /// Every record, including those pending deletion
    pub fn records(&self) -> &[ModRecord] {
        &self.items
    }

    /// Records that still exist locally (not pending deletion)
    pub fn live(&self) -> impl Iterator<Item = &ModRecord> {
        self.items
            .iter()
            .filter(|record| record.state() != Lifecycle::Deleted)
    }

    /// Find a live record by name and author
    pub fn find(&self, name: &str, author: &str) -> Option<&ModRecord> {
        self.live()
            .find(|record| record.name == name && record.author == author)
    }

    fn position(&self, candidate: &ModRecord) -> Option<usize> {
        self.items
            .iter()
            .position(|record| record.state() != Lifecycle::Deleted && record.same_key(candidate))
    }

    fn path(&self) -> Result<&str> {
        self.path.as_deref().ok_or_else(|| Error::Configuration {
            key: "firebase.collections.mods".to_string(),
        })
    }

    async fn load(store: &dyn DocumentStore, collection: &str) -> Result<Vec<ModRecord>> {
        let documents = store.list_documents(collection).await?;
        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            let mut record = ModRecord::from_document(document.id, document.data)?;
            record.clean();
            record.transition(Lifecycle::fetched)?;
            records.push(record);
        }
        Ok(records)
    }

    /// Issue the write a record's state calls for
    async fn write(
        store: &dyn DocumentStore,
        collection: &str,
        record: &mut ModRecord,
    ) -> Result<Option<(Written, WriteAck)>> {
        match record.state() {
            Lifecycle::Unmodified => Ok(None),
            Lifecycle::New | Lifecycle::Updated if record.id().is_empty() => {
                let ack = store.create(collection, &record.to_document()?).await?;
                record.set_id(ack.path.id());
                record.transition(Lifecycle::committed)?;
                Ok(Some((Written::Created, ack)))
            }
            Lifecycle::New | Lifecycle::Updated => {
                let path = DocumentPath::new(collection, record.id());
                let ack = store.set(&path, &record.to_document()?).await?;
                record.transition(Lifecycle::committed)?;
                Ok(Some((Written::Updated, ack)))
            }
            Lifecycle::Deleted => {
                let path = DocumentPath::new(collection, record.id());
                let ack = store.delete(&path).await?;
                Ok(Some((Written::Deleted, ack)))
            }
            Lifecycle::Fresh => Err(Error::InvalidTransition {
                record: record.to_string(),
                from: Lifecycle::Fresh.to_string(),
                to: Lifecycle::Unmodified.to_string(),
            }),
        }
    }

    /// Load every mod listed by the modinfo document at `url`
    ///
    /// Records that fail validation are skipped with a warning. Returns the
    /// number of records added or updated.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the document cannot be retrieved or
    /// parsed.
    pub async fn load_modinfo(&mut self, source: &dyn ModInfoSource, url: &str) -> Result<usize> {
        let mods = source.fetch_mods(url).await?;
        tracing::info!(url, count = mods.len(), "loading mods from modinfo");

        let mut applied = 0;
        for record in mods {
            let label = record.to_string();
            let was_dirty = self.dirty;
            self.dirty = false;
            match self.add(record).await {
                Ok(()) if self.dirty => applied += 1,
                Ok(()) => {}
                Err(e) => tracing::warn!(url, record = %label, error = %e, "skipping mod"),
            }
            self.dirty |= was_dirty;
        }
        Ok(applied)
    }
}

#[async_trait]
impl Collection for RecordCollection {
    type Item = ModRecord;

    fn name(&self) -> &str {
        self.path.as_deref().unwrap_or(DEFAULT_NAME)
    }

    fn cache_state(&self) -> CacheState {
        self.cache
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn count(&self) -> usize {
        self.live().count()
    }

    async fn fetch(&mut self, store: &dyn DocumentStore) -> Result<()> {
        if self.cache == CacheState::Fetched {
            tracing::info!(collection = self.name(), "using cached data");
            return Ok(());
        }

        let collection = self.path()?.to_string();
        tracing::info!(%collection, "fetching documents");

        self.cache = CacheState::Fetching;
        match Self::load(store, &collection).await {
            Ok(records) => {
                self.items = records;
                self.cache = CacheState::Fetched;
                tracing::info!(%collection, count = self.items.len(), "retrieved records");
                Ok(())
            }
            Err(e) => {
                self.cache = CacheState::NotFetched;
                Err(e)
            }
        }
    }

    async fn add(&mut self, mut candidate: ModRecord) -> Result<()> {
        candidate.name = candidate.name.trim().to_string();
        candidate.author = candidate.author.trim().to_string();
        if candidate.name.is_empty() {
            return Err(Error::validation(candidate.to_string(), "mod name cannot be blank"));
        }
        candidate.clean();

        let Some(index) = self.position(&candidate) else {
            tracing::info!(record = %candidate, "adding");
            candidate.transition(Lifecycle::created)?;
            self.items.push(candidate);
            self.dirty = true;
            return Ok(());
        };

        let existing = &mut self.items[index];
        if existing.same_fields(&candidate) {
            tracing::debug!(record = %existing, "unchanged");
            existing.transition(Lifecycle::unchanged)?;
            return Ok(());
        }

        tracing::info!(from = %existing, to = %candidate, "updating");
        existing.transition(Lifecycle::edited)?;
        existing.overwrite_from(candidate);
        self.dirty = true;
        Ok(())
    }

    fn remove(&mut self, candidate: &ModRecord) -> Result<()> {
        if candidate.name.trim().is_empty() {
            return Err(Error::validation(candidate.to_string(), "mod name cannot be blank"));
        }

        let Some(index) = self.position(candidate) else {
            tracing::warn!(record = %candidate, "not present; nothing to remove");
            return Ok(());
        };

        if self.items[index].id().is_empty() {
            let dropped = self.items.remove(index);
            tracing::info!(record = %dropped, "dropped unsaved record");
        } else {
            let record = &mut self.items[index];
            record.transition(Lifecycle::removed)?;
            tracing::info!(record = %record, "marked for deletion");
        }
        self.dirty = true;
        Ok(())
    }

    async fn commit(&mut self, store: &dyn DocumentStore) -> Result<CommitReport> {
        if !self.dirty {
            return Ok(CommitReport::default());
        }

        let collection = self.path()?.to_string();
        tracing::info!(%collection, "committing changes");

        let mut report = CommitReport::default();
        let mut failures = Vec::new();
        let mut deleted = Vec::new();

        for (index, record) in self.items.iter_mut().enumerate() {
            match Self::write(store, &collection, record).await {
                Ok(None) => {}
                Ok(Some((written, ack))) => {
                    match written {
                        Written::Created => report.created += 1,
                        Written::Updated => report.updated += 1,
                        Written::Deleted => {
                            report.deleted += 1;
                            deleted.push(index);
                        }
                    }
                    report.acks.push(ack);
                }
                Err(e) => {
                    tracing::error!(record = %record, error = %e, "write failed");
                    failures.push(format!("{record}: {e}"));
                }
            }
        }

        for index in deleted.into_iter().rev() {
            self.items.remove(index);
        }

        if failures.is_empty() {
            self.dirty = false;
            return Ok(report);
        }

        Err(Error::PartialCommit {
            collection,
            succeeded: report.acks.len(),
            failures,
        })
    }

    fn to_json(&self) -> Result<String> {
        let live: Vec<&ModRecord> = self.live().collect();
        render_json(self.name(), &live)
    }
}

impl fmt::Display for RecordCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_listing(f, self.live())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreOp};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn seeded(store: &MemoryStore) {
        store.insert(
            &DocumentPath::new("mods", "foo-1"),
            json!({"name": "Foo", "author": "Bar", "version": "1.0"}),
        );
    }

    async fn fetched(store: &MemoryStore) -> RecordCollection {
        let mut mods = RecordCollection::new(Some("mods".to_string()));
        mods.fetch(store).await.unwrap();
        store.clear_operations();
        mods
    }

    #[tokio::test]
    async fn fetch_marks_records_unmodified() {
        let store = MemoryStore::new();
        seeded(&store);

        let mods = fetched(&store).await;

        assert_eq!(mods.count(), 1);
        assert_eq!(mods.records()[0].id(), "foo-1");
        assert_eq!(mods.records()[0].state(), Lifecycle::Unmodified);
        assert!(!mods.is_dirty());
    }

    #[tokio::test]
    async fn changed_version_updates_in_place() {
        let store = MemoryStore::new();
        seeded(&store);
        let mut mods = fetched(&store).await;

        mods.add(ModRecord::new("Foo", "Bar").with_version("2.0"))
            .await
            .unwrap();

        assert_eq!(mods.count(), 1);
        assert_eq!(mods.records()[0].version, "2.0");
        assert_eq!(mods.records()[0].state(), Lifecycle::Updated);

        let report = mods.commit(&store).await.unwrap();
        assert_eq!((report.created, report.updated, report.deleted), (0, 1, 0));
        assert_eq!(store.writes(), vec![StoreOp::Set("mods/foo-1".to_string())]);
        assert_eq!(mods.records()[0].state(), Lifecycle::Unmodified);
        assert!(!mods.is_dirty());
    }

    #[tokio::test]
    async fn identical_add_writes_nothing() {
        let store = MemoryStore::new();
        seeded(&store);
        let mut mods = fetched(&store).await;

        mods.add(ModRecord::new("Foo", "Bar").with_version("1.0"))
            .await
            .unwrap();

        assert_eq!(mods.records()[0].state(), Lifecycle::Unmodified);
        assert!(!mods.is_dirty());
        assert!(mods.commit(&store).await.unwrap().is_empty());
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn new_record_is_created_and_gets_an_id() {
        let store = MemoryStore::new();
        let mut mods = fetched(&store).await;

        mods.add(ModRecord::new("Baz", "Qux")).await.unwrap();
        assert_eq!(mods.records()[0].state(), Lifecycle::New);

        let report = mods.commit(&store).await.unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(store.writes(), vec![StoreOp::Create("mods".to_string())]);
        assert!(!mods.records()[0].id().is_empty());
        assert_eq!(store.len("mods"), 1);
    }

    #[tokio::test]
    async fn edited_new_record_is_still_created() {
        let store = MemoryStore::new();
        let mut mods = fetched(&store).await;

        mods.add(ModRecord::new("Baz", "Qux")).await.unwrap();
        mods.add(ModRecord::new("Baz", "Qux").with_version("0.2"))
            .await
            .unwrap();
        assert_eq!(mods.records()[0].state(), Lifecycle::Updated);

        mods.commit(&store).await.unwrap();
        assert_eq!(store.writes(), vec![StoreOp::Create("mods".to_string())]);
    }

    #[tokio::test]
    async fn remove_deletes_persisted_records() {
        let store = MemoryStore::new();
        seeded(&store);
        let mut mods = fetched(&store).await;

        mods.remove(&ModRecord::new("Foo", "Bar")).unwrap();
        assert_eq!(mods.count(), 0);
        assert_eq!(mods.records()[0].state(), Lifecycle::Deleted);

        let report = mods.commit(&store).await.unwrap();
        assert_eq!(report.deleted, 1);
        assert!(mods.records().is_empty());
        assert_eq!(store.len("mods"), 0);
    }

    #[tokio::test]
    async fn remove_of_unsaved_record_drops_it() {
        let store = MemoryStore::new();
        let mut mods = fetched(&store).await;

        mods.add(ModRecord::new("Baz", "Qux")).await.unwrap();
        mods.remove(&ModRecord::new("Baz", "Qux")).unwrap();

        assert!(mods.records().is_empty());
        mods.commit(&store).await.unwrap();
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let mut mods = RecordCollection::new(Some("mods".to_string()));
        let err = mods.add(ModRecord::new("  ", "Bar")).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(!mods.is_dirty());
    }

    #[tokio::test]
    async fn removing_a_blank_name_is_rejected() {
        let store = MemoryStore::new();
        seeded(&store);
        let mut mods = fetched(&store).await;

        let err = mods.remove(&ModRecord::new(" ", "Bar")).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(mods.count(), 1);
        assert!(!mods.is_dirty());
    }

    #[tokio::test]
    async fn failed_writes_do_not_stop_the_batch() {
        let store = MemoryStore::new();
        seeded(&store);
        store.insert(
            &DocumentPath::new("mods", "zed-1"),
            json!({"name": "Zed", "author": "Bar", "version": "1.0"}),
        );
        store.fail_on("mods/foo-1");
        let mut mods = fetched(&store).await;

        mods.add(ModRecord::new("Foo", "Bar").with_version("2.0"))
            .await
            .unwrap();
        mods.add(ModRecord::new("Zed", "Bar").with_version("2.0"))
            .await
            .unwrap();

        match mods.commit(&store).await.unwrap_err() {
            Error::PartialCommit {
                succeeded, failures, ..
            } => {
                assert_eq!(succeeded, 1);
                assert_eq!(failures.len(), 1);
            }
            other => panic!("expected a partial commit, got {other:?}"),
        }
        assert!(mods.is_dirty());

        let foo = mods.find("Foo", "Bar").unwrap();
        let zed = mods.find("Zed", "Bar").unwrap();
        assert_eq!(foo.state(), Lifecycle::Updated);
        assert_eq!(zed.state(), Lifecycle::Unmodified);
    }

    #[tokio::test]
    async fn fetched_urls_are_cleaned() {
        let store = MemoryStore::new();
        store.insert(
            &DocumentPath::new("mods", "foo-1"),
            json!({
                "name": "Foo",
                "author": "Bar",
                "files": {"pak": "https://example.com/foo.pak?raw=true"}
            }),
        );
        let mut mods = fetched(&store).await;

        mods.add(ModRecord::new("Foo", "Bar").with_pak("https://example.com/foo.pak/"))
            .await
            .unwrap();

        assert_eq!(mods.records()[0].state(), Lifecycle::Unmodified);
    }

    #[test]
    fn display_and_json_skip_deleted_records() {
        let mut mods = RecordCollection::new(None);
        let mut gone = ModRecord::new("Gone", "Bar");
        gone.set_id("g");
        gone.transition(Lifecycle::fetched).unwrap();
        gone.transition(Lifecycle::removed).unwrap();
        mods.items.push(gone);
        let mut kept = ModRecord::new("Kept", "Bar").with_version("1.0");
        kept.transition(Lifecycle::created).unwrap();
        mods.items.push(kept);

        assert_eq!(mods.name(), "mods");
        assert_eq!(mods.to_string(), "0001: Kept v1.0 by Bar");
        let json = mods.to_json().unwrap();
        assert!(json.contains("Kept"));
        assert!(!json.contains("Gone"));
    }
}
