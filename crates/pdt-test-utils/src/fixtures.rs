//! Record and configuration fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use pdt_core::{Config, ModRecord};
use serde_json::{Value, json};
use tempfile::TempDir;

/// A mod with the given key and version and plausible other fields.
pub fn sample_mod(name: &str, author: &str, version: &str) -> ModRecord {
    let slug = name.to_lowercase().replace(' ', "-");
    ModRecord::new(name, author)
        .with_version(version)
        .with_compatibility("w57")
        .with_description(format!("{name} for testing"))
        .with_pak(format!("https://example.com/{slug}.pak"))
}

/// Raw JSON of the configuration used across tests.
///
/// Lists live at `meta/<name>`, mods under `mods`.
pub fn test_config_json() -> Value {
    json!({
        "firebase": {
            "credentials": {
                "project_id": "pdt-test",
                "access_token": "test-token"
            },
            "collections": {
                "meta": {
                    "repositories": "meta/repositories",
                    "modinfo": "meta/modinfo",
                    "toolinfo": "meta/toolinfo"
                },
                "mods": "mods"
            }
        }
    })
}

pub fn test_config() -> Config {
    serde_json::from_value(test_config_json()).unwrap()
}

/// A configuration file written to a temporary directory.
///
/// The directory is removed when the value is dropped.
pub struct ConfigFile {
    dir: TempDir,
    path: PathBuf,
}

impl ConfigFile {
    /// Write `content` as `.pdtconfig.json`.
    pub fn json(content: &Value) -> Self {
        Self::write(".pdtconfig.json", &serde_json::to_string_pretty(content).unwrap())
    }

    /// Write raw `content` under `file_name`.
    pub fn write(file_name: &str, content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(file_name);
        fs::write(&path, content).unwrap();
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the file, usable as a fake home directory.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
