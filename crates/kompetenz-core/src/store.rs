//! The `CompetencyStore` trait.
//!
//! One implementation instance is bound to exactly one snapshot. Higher layers
//! (ingestion, ranking, HTTP) depend on this abstraction, not on any concrete
//! backend.
//!
//! Reads follow a uniform "empty means absent" convention: a missing entity is
//! `None`, a query with no matches is an empty `Vec`. Errors are reserved for
//! genuine storage failures.

use std::future::Future;

use crate::model::{
  AbstractCompetency, AbstractRecord, Author, AuthorAbstract,
  AuthorCompetency, AuthorWithCompetency, Category, Competency,
  CompetencyEvidence, Relevancy, Status, StoreStats,
};

/// Abstraction over one snapshot of the competency graph.
///
/// Abstract, author, competency and relation rows are never deleted; the only
/// update in place is [`CompetencyStore::change_competency_status`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CompetencyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Upserts ───────────────────────────────────────────────────────────

  /// Return the id of the author with exactly this `(first, last)` name,
  /// creating the author if absent. The first insertion wins the id.
  fn upsert_author<'a>(
    &'a self,
    first_name: &'a str,
    last_name: &'a str,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;

  /// Return the id of the competency with exactly this name, creating it if
  /// absent.
  fn upsert_competency<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;

  /// The smallest non-negative integer not yet used as an abstract id.
  fn first_available_abstract_id(
    &self,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  // ── Append-only inserts ───────────────────────────────────────────────
  //
  // Relation inserts return `false` when the row violated a constraint (for
  // example a duplicate key) and was therefore not written.

  fn insert_abstract(
    &self,
    record: AbstractRecord,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn insert_written_by(
    &self,
    abstract_id: i64,
    author_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn insert_derived_from(
    &self,
    competency_id: i64,
    abstract_id: i64,
    relevancy: Relevancy,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn insert_has_category(
    &self,
    category_id: i64,
    competency_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Insert-or-ignore: an existing `(author, competency)` edge keeps its
  /// status. Returns `true` only if a new edge was created.
  fn insert_has_competency(
    &self,
    author_id: i64,
    competency_id: i64,
    status: Status,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Update ────────────────────────────────────────────────────────────

  /// Set the curation status of an existing edge. Returns `false` (and
  /// changes nothing) when the edge does not exist.
  fn change_competency_status(
    &self,
    author_id: i64,
    competency_id: i64,
    status: Status,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn abstract_by_id(
    &self,
    abstract_id: i64,
  ) -> impl Future<Output = Result<Option<AbstractRecord>, Self::Error>> + Send + '_;

  fn authors_by_abstract(
    &self,
    abstract_id: i64,
  ) -> impl Future<Output = Result<Vec<Author>, Self::Error>> + Send + '_;

  fn competencies_by_abstract(
    &self,
    abstract_id: i64,
  ) -> impl Future<Output = Result<Vec<AbstractCompetency>, Self::Error>> + Send + '_;

  fn competencies_by_author(
    &self,
    author_id: i64,
  ) -> impl Future<Output = Result<Vec<AuthorCompetency>, Self::Error>> + Send + '_;

  fn competencies_by_category(
    &self,
    category_id: i64,
  ) -> impl Future<Output = Result<Vec<Competency>, Self::Error>> + Send + '_;

  /// One row per (author holding the competency, abstract of theirs that
  /// evidences it). This is the per-author relevancy input of ranking.
  fn authors_by_competency(
    &self,
    competency_id: i64,
  ) -> impl Future<Output = Result<Vec<CompetencyEvidence>, Self::Error>> + Send + '_;

  fn authors_with_competency<'a>(
    &'a self,
    competency_name: &'a str,
  ) -> impl Future<Output = Result<Vec<AuthorWithCompetency>, Self::Error>> + Send + 'a;

  /// Abstracts written by any author with exactly this name.
  fn abstracts_by_author_name<'a>(
    &'a self,
    first_name: &'a str,
    last_name: &'a str,
  ) -> impl Future<Output = Result<Vec<AuthorAbstract>, Self::Error>> + Send + 'a;

  /// Ids of the abstracts of `author_id` that are linked to `competency_id`.
  fn abstracts_with_competency(
    &self,
    competency_id: i64,
    author_id: i64,
  ) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + '_;

  /// Relevancies of `competency_id` across the abstracts of `author_id`.
  fn relevancies(
    &self,
    competency_id: i64,
    author_id: i64,
  ) -> impl Future<Output = Result<Vec<Relevancy>, Self::Error>> + Send + '_;

  fn all_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  fn all_competencies(
    &self,
  ) -> impl Future<Output = Result<Vec<Competency>, Self::Error>> + Send + '_;

  fn all_authors(
    &self,
  ) -> impl Future<Output = Result<Vec<Author>, Self::Error>> + Send + '_;

  fn category_name(
    &self,
    category_id: i64,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  fn competency_name(
    &self,
    competency_id: i64,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  fn competency_id_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + 'a;

  fn author_by_id(
    &self,
    author_id: i64,
  ) -> impl Future<Output = Result<Option<Author>, Self::Error>> + Send + '_;

  /// Look up an author by `"First Last"`.
  fn author_id_by_full_name<'a>(
    &'a self,
    full_name: &'a str,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + 'a;

  fn stats(&self) -> impl Future<Output = Result<StoreStats, Self::Error>> + Send + '_;
}
