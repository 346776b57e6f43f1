//! Per-invocation context
//!
//! Loads the configuration, applies command-line overrides and builds the
//! orchestrator every command runs against.

use std::path::Path;
use std::sync::Arc;

use pdt_core::{Config, FirestoreConnector, Orchestrator, WebClient};

use crate::cli::Cli;
use crate::error::{CliError, Result};

pub struct Context {
    pub orchestrator: Orchestrator,
    pub web: Arc<WebClient>,
    /// Print the affected listing after a change
    pub show_listing: bool,
}

impl Context {
    /// Build the context for the parsed command line
    pub fn load(cli: &Cli) -> Result<Self> {
        let config = load_config(cli.config.as_deref(), cli.force, cli.dry_run)?;
        let web = Arc::new(WebClient::new());
        let connector = FirestoreConnector::new(config.firebase.credentials.clone());
        let orchestrator = Orchestrator::new(Box::new(connector), &config, web.clone());

        Ok(Self {
            orchestrator,
            web,
            show_listing: cli.verbose > 0,
        })
    }
}

/// Load the config file and apply `--force` / `--dry-run`
///
/// Flags only ever switch options on; they never override a config file
/// that already enables them.
pub fn load_config(path: Option<&Path>, force: bool, dry_run: bool) -> Result<Config> {
    if let Some(path) = path {
        if !path.is_file() {
            return Err(CliError::user(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
    }

    let mut config = Config::load(path)?;
    config.force |= force;
    config.dry_run |= dry_run;
    tracing::debug!(force = config.force, dry_run = config.dry_run, "configuration loaded");
    Ok(config)
}
