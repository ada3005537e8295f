//! The per-row ingestion algorithm and the batch loop around it.
//!
//! For one row, writes happen in this order: competency upserts with their
//! `derived_from` and `has_category` edges, then authors with their
//! `written_by` and `has_competency` edges, then the abstract row itself.
//! Snapshots do not enforce foreign keys, so the abstract can come last.
//!
//! A batch aborts at the first unexpected error. Rows committed before the
//! failure stay in the snapshot.

use std::{fmt, future::Future, sync::Arc};

use kompetenz_core::{
  model::{AbstractRecord, Status},
  store::CompetencyStore,
};

use crate::{
  Error, Result,
  language::LanguageDetector,
  oracle::RelevancyOracle,
  source::SourceRow,
};

/// Status given to every author/competency edge discovered by ingestion.
pub const DEFAULT_STATUS: Status = Status::Unvalidated;

// ─── Progress ────────────────────────────────────────────────────────────────

/// Sink for the two monotonic build counters.
pub trait Progress: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Announce `n` more rows to process.
  fn advance_total(&self, n: u64) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Record `n` more rows attempted.
  fn advance_progress(&self, n: u64) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Why a row was passed over. Skips are routine, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  MissingField(&'static str),
  NotEnglish,
}

impl fmt::Display for SkipReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::MissingField(column) => write!(f, "missing {column}"),
      Self::NotEnglish => f.write_str("not english"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
  Ingested {
    abstract_id:  i64,
    competencies: usize,
    authors:      usize,
  },
  Skipped(SkipReason),
}

/// Summary of a completed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
  pub attempted: u64,
  pub ingested:  u64,
  pub skipped:   u64,
}

// ─── Ingestor ────────────────────────────────────────────────────────────────

/// Writes source rows into one snapshot.
pub struct Ingestor<S, O, L> {
  store:    Arc<S>,
  oracle:   O,
  language: L,
}

impl<S, O, L> Ingestor<S, O, L>
where
  S: CompetencyStore,
  O: RelevancyOracle,
  L: LanguageDetector,
{
  pub fn new(store: Arc<S>, oracle: O, language: L) -> Self {
    Self { store, oracle, language }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Ingest one row.
  pub async fn ingest_row(&self, row: &SourceRow) -> Result<RowOutcome> {
    let valid = match row.validate() {
      Ok(valid) => valid,
      Err(column) => return Ok(RowOutcome::Skipped(SkipReason::MissingField(column))),
    };
    if !self.language.is_english(valid.abstract_text) {
      return Ok(RowOutcome::Skipped(SkipReason::NotEnglish));
    }

    let store = &*self.store;
    let abstract_id = store.first_available_abstract_id().await.map_err(Error::store)?;

    let found = self
      .oracle
      .competencies(valid.abstract_text)
      .await
      .map_err(Error::oracle)?;

    let mut competency_ids = Vec::with_capacity(found.len());
    for (name, relevancy) in &found {
      let competency_id = store.upsert_competency(name).await.map_err(Error::store)?;
      let category_id = self.oracle.category_of(name).await.map_err(Error::oracle)?;
      store
        .insert_derived_from(competency_id, abstract_id, *relevancy)
        .await
        .map_err(Error::store)?;
      store
        .insert_has_category(category_id, competency_id)
        .await
        .map_err(Error::store)?;
      competency_ids.push(competency_id);
    }

    for author in &valid.authors {
      let author_id = store
        .upsert_author(&author.first_name, &author.last_name)
        .await
        .map_err(Error::store)?;
      store
        .insert_written_by(abstract_id, author_id)
        .await
        .map_err(Error::store)?;
      for &competency_id in &competency_ids {
        store
          .insert_has_competency(author_id, competency_id, DEFAULT_STATUS)
          .await
          .map_err(Error::store)?;
      }
    }

    store
      .insert_abstract(AbstractRecord {
        abstract_id,
        year: valid.year,
        title: valid.title.to_owned(),
        content: valid.abstract_text.to_owned(),
        doctype: valid.doctype.to_owned(),
        institution: valid.institution.to_owned(),
      })
      .await
      .map_err(Error::store)?;

    Ok(RowOutcome::Ingested {
      abstract_id,
      competencies: competency_ids.len(),
      authors: valid.authors.len(),
    })
  }

  /// Ingest `rows` in order, reporting every row to `progress` before it is
  /// attempted. The first error aborts the remaining rows and is returned as
  /// [`Error::Aborted`], carrying how many leading rows were finished.
  pub async fn ingest_all<P>(&self, rows: &[SourceRow], progress: &P) -> Result<IngestReport>
  where
    P: Progress,
  {
    progress
      .advance_total(rows.len() as u64)
      .await
      .map_err(Error::progress)?;

    let mut report = IngestReport::default();
    for (index, row) in rows.iter().enumerate() {
      let aborted = move |source: Error| Error::Aborted {
        completed: index,
        source:    Box::new(source),
      };
      progress
        .advance_progress(1)
        .await
        .map_err(|e| aborted(Error::progress(e)))?;
      report.attempted += 1;

      match self.ingest_row(row).await {
        Ok(RowOutcome::Ingested { abstract_id, competencies, .. }) => {
          tracing::debug!(row = index, abstract_id, competencies, "row ingested");
          report.ingested += 1;
        }
        Ok(RowOutcome::Skipped(reason)) => {
          tracing::debug!(row = index, %reason, "row skipped");
          report.skipped += 1;
        }
        Err(e) => {
          tracing::error!(row = index, error = %e, "ingestion aborted");
          return Err(aborted(e));
        }
      }
    }

    Ok(report)
  }
}
