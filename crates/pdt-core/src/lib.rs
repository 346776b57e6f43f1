//! Reconciliation engine for the ProjectDaedalus database tool
//!
//! Keeps the ProjectDaedalus collections in sync with a remote document
//! database:
//!
//! - **Identifier lists**: repository, modinfo and toolinfo URLs, one
//!   document each
//! - **Mod records**: one document per mod, reconciled field by field
//! - **Lifecycle**: per-record state deciding which write a commit issues
//! - **Orchestrator**: lazy store connection, concurrent fetch and commit
//!
//! # Architecture
//!
//! ```text
//!               pdt (CLI)
//!                   |
//!              Orchestrator
//!                   |
//!     +-------------+--------------+
//!     |                            |
//! IdentifierList x3        RecordCollection
//!     |                            |
//!     +------- DocumentStore ------+
//!                   |
//!    FirestoreStore / MemoryStore / DryRunStore
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pdt_core::{Config, FirestoreConnector, Orchestrator, WebClient};
//!
//! async fn example() -> pdt_core::Result<()> {
//!     let config = Config::load(None)?;
//!     let connector = FirestoreConnector::new(config.firebase.credentials.clone());
//!     let mut orchestrator =
//!         Orchestrator::new(Box::new(connector), &config, Arc::new(WebClient::new()));
//!     orchestrator.fetch_all().await?;
//!     orchestrator.commit_all().await?;
//!     Ok(())
//! }
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod record;
pub mod store;
pub mod web;

pub use collection::{
    CacheState, Collection, CommitReport, IdentifierList, ListKind, RecordCollection,
    decode_listing, render_json,
};
pub use config::{Config, Credentials};
pub use error::{CollectionError, Error, Result};
pub use lifecycle::Lifecycle;
pub use orchestrator::{CollectionName, Orchestrator, SyncReport};
pub use record::{ModFiles, ModRecord, clean_url};
pub use store::{
    Connect, DocumentPath, DocumentStore, DryRunStore, FirestoreConnector, FirestoreStore,
    MemoryStore, StoreOp, WriteAck,
};
pub use web::{ModInfoSource, UrlVerifier, Verdict, WebClient};
