//! Tool configuration
//!
//! Configuration is read from a JSON or TOML file, then overridden by
//! environment variables. Lookup order when no explicit path is given:
//!
//! 1. `~/.pdtconfig.json`
//! 2. `~/.pdtconfig.toml`
//! 3. `<config_dir>/pdt/config.toml` (e.g. `~/.config/pdt/config.toml`)
//!
//! ```json
//! {
//!   "firebase": {
//!     "credentials": { "project_id": "daedalus", "access_token": "..." },
//!     "collections": {
//!       "meta": {
//!         "repositories": "meta/repositories",
//!         "modinfo": "meta/modinfo",
//!         "toolinfo": "meta/toolinfo"
//!       },
//!       "mods": "mods"
//!     }
//!   },
//!   "force": false
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::collection::ListKind;
use crate::store::DocumentPath;
use crate::{Error, Result};

const META_KEY: &str = "firebase.collections.meta";
const MODS_KEY: &str = "firebase.collections.mods";

/// Store credentials
///
/// Service-account fields present in the file are ignored; the tool only
/// needs a project id and an OAuth access token (or an emulator host).
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub emulator_host: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            access_token: None,
            emulator_host: None,
            database: default_database(),
        }
    }
}

fn default_database() -> String {
    "(default)".to_string()
}

/// Remote locations of every collection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionPaths {
    /// Identifier list documents, keyed by list name
    #[serde(default)]
    pub meta: HashMap<String, String>,
    /// Collection path holding one document per mod
    #[serde(default)]
    pub mods: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FirebaseConfig {
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub collections: CollectionPaths,
}

/// Complete tool configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub firebase: FirebaseConfig,

    /// Replace duplicates on add instead of rejecting them
    #[serde(default)]
    pub force: bool,

    /// Log writes instead of performing them
    #[serde(default, alias = "dryrun")]
    pub dry_run: bool,
}

impl Config {
    /// Load configuration from `path`, or from the first default location
    /// that exists, then apply environment overrides
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigFile`] if no file is found or it cannot be
    /// parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_locations()
                .into_iter()
                .find(|candidate| candidate.is_file())
                .ok_or_else(|| Error::ConfigFile {
                    path: PathBuf::from("~/.pdtconfig.json"),
                    reason: "unable to find a config file; this is a required file".to_string(),
                })?,
        };

        let mut config = Self::from_file(&path)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse a configuration file, choosing the format from its extension
    ///
    /// Files without a `.toml` extension are read as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "reading config");
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| e.to_string()),
            _ => serde_json::from_str(&content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|reason| Error::ConfigFile {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Apply environment overrides through `lookup`
    ///
    /// Recognized variables: `PDT_PROJECT_ID`, `PDT_ACCESS_TOKEN`,
    /// `FIRESTORE_EMULATOR_HOST`, `PDT_FORCE`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let credentials = &mut self.firebase.credentials;
        if let Some(project_id) = lookup("PDT_PROJECT_ID") {
            credentials.project_id = project_id;
        }
        if let Some(token) = lookup("PDT_ACCESS_TOKEN") {
            credentials.access_token = Some(token);
        }
        if let Some(host) = lookup("FIRESTORE_EMULATOR_HOST") {
            credentials.emulator_host = Some(host);
        }
        if let Some(force) = lookup("PDT_FORCE") {
            self.force = matches!(force.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Remote document holding the identifier list `kind`
    pub fn meta_path(&self, kind: ListKind) -> Result<DocumentPath> {
        let key = format!("{}.{}", META_KEY, kind.name());
        let raw = self
            .firebase
            .collections
            .meta
            .get(kind.name())
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::Configuration { key: key.clone() })?;
        DocumentPath::parse(raw, &key)
    }

    /// Remote collection holding one document per mod
    pub fn mods_path(&self) -> Result<String> {
        self.firebase
            .collections
            .mods
            .as_deref()
            .map(|p| p.trim().trim_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::Configuration {
                key: MODS_KEY.to_string(),
            })
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".pdtconfig.json"));
        locations.push(home.join(".pdtconfig.toml"));
    }
    if let Some(config) = dirs::config_dir() {
        locations.push(config.join("pdt").join("config.toml"));
    }
    locations
}
