//! Mod records
//!
//! A [`ModRecord`] is one entry of the mods collection. It is stored as an
//! individual document and also appears, without its `meta` block, in the
//! `mods` array of a modinfo document:
//!
//! ```json
//! {
//!   "name": "First Mod Name",
//!   "author": "whatever name you want as the Author",
//!   "version": "1.0",
//!   "compatibility": "w57",
//!   "description": "A description of what your mod does",
//!   "files": { "pak": "https://...", "exmodz": "https://..." },
//!   "imageURL": "https://...",
//!   "readmeURL": "https://..."
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lifecycle::Lifecycle;
use crate::{Error, Result};

/// Download locations for a mod's files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModFiles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pak: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exmodz: Option<String>,
}

/// Validation messages attached to a mod
///
/// The remote schema expects both arrays to be present, even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModStatus {
    #[serde(rename = "Errors", default)]
    pub errors: Vec<String>,
    #[serde(rename = "Warnings", default)]
    pub warnings: Vec<String>,
}

/// Bookkeeping block stored alongside the mod fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModMeta {
    #[serde(default)]
    pub status: ModStatus,
}

/// A single mod entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModRecord {
    /// Remote document id, empty until the first successful create
    #[serde(skip)]
    id: String,

    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub compatibility: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "readmeURL", default, skip_serializing_if = "Option::is_none")]
    pub readme_url: Option<String>,
    #[serde(default)]
    pub files: ModFiles,
    #[serde(default)]
    pub meta: ModMeta,

    #[serde(skip)]
    state: Lifecycle,
}

impl ModRecord {
    /// Create a record with the given match key and no other fields
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_compatibility(mut self, compatibility: impl Into<String>) -> Self {
        self.compatibility = compatibility.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_readme_url(mut self, url: impl Into<String>) -> Self {
        self.readme_url = Some(url.into());
        self
    }

    pub fn with_pak(mut self, url: impl Into<String>) -> Self {
        self.files.pak = Some(url.into());
        self
    }

    pub fn with_exmodz(mut self, url: impl Into<String>) -> Self {
        self.files.exmodz = Some(url.into());
        self
    }

    /// Build a record from a raw store document
    pub fn from_document(id: impl Into<String>, data: serde_json::Value) -> Result<Self> {
        let mut record: ModRecord = serde_json::from_value(data)?;
        record.id = id.into();
        Ok(record)
    }

    /// Render the document written to the store
    pub fn to_document(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Remote document id; empty if the record was never created remotely
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Current lifecycle state
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Apply a lifecycle transition, naming this record on failure
    pub(crate) fn transition(&mut self, step: fn(Lifecycle) -> Result<Lifecycle>) -> Result<()> {
        match step(self.state) {
            Ok(next) => {
                self.state = next;
                Ok(())
            }
            Err(Error::InvalidTransition { from, to, .. }) => Err(Error::InvalidTransition {
                record: self.to_string(),
                from,
                to,
            }),
            Err(other) => Err(other),
        }
    }

    /// Whether `other` is the same logical mod (same name and author)
    pub fn same_key(&self, other: &ModRecord) -> bool {
        self.name == other.name && self.author == other.author
    }

    /// Whether every compared field of `other` matches this record
    ///
    /// Status messages, the remote id, and the lifecycle state are not
    /// compared.
    pub fn same_fields(&self, other: &ModRecord) -> bool {
        self.same_key(other)
            && self.version == other.version
            && self.compatibility == other.compatibility
            && self.description == other.description
            && self.image_url == other.image_url
            && self.readme_url == other.readme_url
            && self.files == other.files
    }

    /// Copy the compared fields and status of `other` into this record
    ///
    /// The remote id and lifecycle state are kept.
    pub(crate) fn overwrite_from(&mut self, other: ModRecord) {
        let ModRecord {
            name,
            author,
            version,
            compatibility,
            description,
            image_url,
            readme_url,
            files,
            meta,
            ..
        } = other;
        self.name = name;
        self.author = author;
        self.version = version;
        self.compatibility = compatibility;
        self.description = description;
        self.image_url = image_url;
        self.readme_url = readme_url;
        self.files = files;
        self.meta = meta;
    }

    /// Normalize every URL field
    ///
    /// Query strings and trailing slashes are dropped; blank URLs become
    /// absent.
    pub fn clean(&mut self) {
        for url in [
            &mut self.image_url,
            &mut self.readme_url,
            &mut self.files.pak,
            &mut self.files.exmodz,
        ] {
            *url = url.take().and_then(|raw| clean_url(&raw));
        }
    }
}

impl fmt::Display for ModRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{} by {}", self.name, self.version, self.author)
    }
}

/// Strip the query string, fragment and trailing path slashes from a URL
///
/// Values that do not parse as a URL are cut at the first `?` or `#`.
/// Returns `None` when nothing is left.
pub fn clean_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let stripped = match url::Url::parse(raw) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            String::from(parsed)
        }
        Err(_) => raw.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    let cleaned = stripped.trim_end_matches('/');
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
