//! Ingestion Pipeline for Kompetenz.
//!
//! Turns rows of publication metadata into competency-graph writes against
//! any [`kompetenz_core::store::CompetencyStore`], asking a
//! [`RelevancyOracle`] which competencies each abstract shows.

// Native `async fn` in traits; the returned futures are declared `Send`.
#![allow(async_fn_in_trait)]

pub mod authors;
pub mod error;
pub mod incremental;
pub mod language;
pub mod oracle;
pub mod pipeline;
pub mod source;

pub use error::{Error, OracleError, Result};
pub use language::{LanguageDetector, WhatlangDetector};
pub use oracle::{HttpOracle, RelevancyOracle};
pub use pipeline::{IngestReport, Ingestor, Progress, RowOutcome, SkipReason};
pub use source::SourceRow;
