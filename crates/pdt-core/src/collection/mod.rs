//! Collections synchronized with the document store
//!
//! Two collection types share one contract ([`Collection`]):
//!
//! - [`IdentifierList`]: unique URLs stored together in a single document
//! - [`RecordCollection`]: mod records stored one document each
//!
//! Every collection is fetched at most once per process run, mutated
//! locally, and committed back with the minimal set of writes.

mod identifiers;
mod records;

pub use identifiers::{IdentifierList, ListKind};
pub use records::RecordCollection;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::store::{DocumentStore, WriteAck};
use crate::{Error, Result};

/// Whether a collection's items reflect the store yet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheState {
    #[default]
    NotFetched,
    Fetching,
    Fetched,
}

/// Writes issued by one commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Acknowledgments in the order the writes completed
    pub acks: Vec<WriteAck>,
}

impl CommitReport {
    /// Whether the commit wrote nothing
    pub fn is_empty(&self) -> bool {
        self.acks.is_empty()
    }
}

/// The shared contract of every synchronized collection
#[async_trait]
pub trait Collection: fmt::Display + Send {
    type Item: Send + Sync;

    /// Name used as the JSON key and in log messages
    fn name(&self) -> &str;

    fn cache_state(&self) -> CacheState;

    /// Whether there are local mutations not yet committed
    fn is_dirty(&self) -> bool;

    fn count(&self) -> usize;

    /// Load the collection from the store unless already fetched
    async fn fetch(&mut self, store: &dyn DocumentStore) -> Result<()>;

    async fn add(&mut self, item: Self::Item) -> Result<()>;

    fn remove(&mut self, item: &Self::Item) -> Result<()>;

    /// Write pending changes; a clean collection issues no writes
    async fn commit(&mut self, store: &dyn DocumentStore) -> Result<CommitReport>;

    /// `{"<name>": [ ...items ]}`, pretty-printed
    fn to_json(&self) -> Result<String>;
}

/// Render items as `{"<name>": [...]}` with two-space indentation
pub fn render_json<T: Serialize>(name: &str, items: &[T]) -> Result<String> {
    let mut object = Map::new();
    object.insert(name.to_string(), serde_json::to_value(items)?);
    Ok(serde_json::to_string_pretty(&Value::Object(object))?)
}

/// Parse the output of [`render_json`] back into items
pub fn decode_listing<T: DeserializeOwned>(name: &str, json: &str) -> Result<Vec<T>> {
    let mut value: Value = serde_json::from_str(json)?;
    let items = value
        .get_mut(name)
        .map(Value::take)
        .ok_or_else(|| Error::validation(name, "listing has no entry for this collection"))?;
    Ok(serde_json::from_value(items)?)
}

/// Write a `NNNN: item` listing, one item per line
pub(crate) fn write_listing<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str("\n")?;
        }
        write!(f, "{:04}: {}", i + 1, item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_json_is_keyed_and_indented() {
        let json = render_json("toolinfo", &["a", "b"]).unwrap();
        assert_eq!(json, "{\n  \"toolinfo\": [\n    \"a\",\n    \"b\"\n  ]\n}");
    }

    #[test]
    fn empty_listing_renders_empty_array() {
        let json = render_json::<String>("mods", &[]).unwrap();
        assert_eq!(json, "{\n  \"mods\": []\n}");
    }

    #[test]
    fn decode_listing_round_trips() {
        let json = render_json("repositories", &["a", "b"]).unwrap();
        let items: Vec<String> = decode_listing("repositories", &json).unwrap();
        assert_eq!(items, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn decode_listing_requires_the_named_key() {
        let err = decode_listing::<String>("modinfo", "{\"toolinfo\": []}").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
