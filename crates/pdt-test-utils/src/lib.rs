//! Shared test utilities for the pdt workspace.
//!
//! Stand-ins for every collaborator the engine talks to, so collection and
//! orchestrator tests never reach the network. A dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`web`]: [`StaticVerifier`] and [`StaticModInfo`]
//! - [`store`]: [`FailingConnector`] and seeded [`MemoryStore`] builders
//! - [`fixtures`]: records, configs and on-disk config files
//!
//! [`MemoryStore`]: pdt_core::MemoryStore

pub mod fixtures;
pub mod store;
pub mod web;

pub use fixtures::{ConfigFile, sample_mod, test_config};
pub use store::{FailingConnector, seeded_store};
pub use web::{StaticModInfo, StaticVerifier};
