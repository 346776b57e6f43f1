//! Offline web collaborators.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use pdt_core::{Error, ModInfoSource, ModRecord, Result, UrlVerifier, Verdict};

/// A [`UrlVerifier`] that answers from a fixed table.
///
/// Every URL is reachable unless registered with
/// [`StaticVerifier::with_unreachable`]. Checked URLs are recorded.
#[derive(Debug, Default)]
pub struct StaticVerifier {
    unreachable: HashMap<String, u16>,
    checked: Mutex<Vec<String>>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `url` answer with a failing `status`.
    pub fn with_unreachable(mut self, url: impl Into<String>, status: u16) -> Self {
        self.unreachable.insert(url.into(), status);
        self
    }

    /// URLs checked so far, in order.
    pub fn checked(&self) -> Vec<String> {
        self.checked.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlVerifier for StaticVerifier {
    async fn verify(&self, url: &str) -> Verdict {
        self.checked.lock().unwrap().push(url.to_string());
        match self.unreachable.get(url) {
            Some(&status) => Verdict::unreachable(Some(status), "static failure"),
            None => Verdict::reachable(200),
        }
    }
}

/// A [`ModInfoSource`] serving canned documents.
///
/// Unknown URLs fail with [`Error::NotFound`].
#[derive(Debug, Default)]
pub struct StaticModInfo {
    documents: HashMap<String, Vec<ModRecord>>,
}

impl StaticModInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, mods: Vec<ModRecord>) -> Self {
        self.documents.insert(url.into(), mods);
        self
    }
}

#[async_trait]
impl ModInfoSource for StaticModInfo {
    async fn fetch_mods(&self, url: &str) -> Result<Vec<ModRecord>> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                path: url.to_string(),
            })
    }
}
