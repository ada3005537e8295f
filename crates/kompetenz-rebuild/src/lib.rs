//! Rebuild Orchestrator for Kompetenz.
//!
//! Manages named snapshots of the competency graph: builds new ones in the
//! background, adds entries to the active one, and switches which one is
//! served. Snapshot state lives in a JSON [`catalog::Catalog`].

// Native `async fn` in trait impls; the futures are checked to be `Send`.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod error;
pub mod orchestrator;
pub mod progress;

pub use catalog::{BuildStatus, Catalog, SnapshotEntry};
pub use error::{Error, Result};
pub use orchestrator::{HttpOracleFactory, OracleFactory, Orchestrator, RebuildConfig, Run};
