//! Entities and query row types of the competency graph.
//!
//! Every read query has its own named-field row struct so that reordering a
//! query's selected columns cannot silently corrupt a consumer. Field order in
//! each struct documents the column order of the underlying query.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{Error, Result};

// ─── Relevancy ───────────────────────────────────────────────────────────────

/// The oracle's confidence that a competency is present in an abstract.
///
/// Some oracles cannot produce a real score; they report the wire sentinel
/// `-1`, which is decoded into [`Relevancy::Unscored`]. The sentinel is still
/// what gets stored and serialised, so existing consumers keep working.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum Relevancy {
  Scored(f64),
  Unscored,
}

impl Relevancy {
  /// Wire value meaning "relevancy not computable by this oracle".
  pub const SENTINEL: f64 = -1.0;

  pub fn from_wire(value: f64) -> Self {
    if value == Self::SENTINEL {
      Self::Unscored
    } else {
      Self::Scored(value)
    }
  }

  pub fn to_wire(self) -> f64 {
    match self {
      Self::Scored(v) => v,
      Self::Unscored => Self::SENTINEL,
    }
  }

  pub fn score(self) -> Option<f64> {
    match self {
      Self::Scored(v) => Some(v),
      Self::Unscored => None,
    }
  }
}

impl From<f64> for Relevancy {
  fn from(value: f64) -> Self { Self::from_wire(value) }
}

impl From<Relevancy> for f64 {
  fn from(r: Relevancy) -> Self { r.to_wire() }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Human curation state of the claim "this author has this competency".
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumString,
  EnumIter,
)]
pub enum Status {
  Hidden,
  #[default]
  Unvalidated,
  Validated,
}

impl Status {
  /// Parse the stored/wire spelling (`Hidden`, `Unvalidated`, `Validated`).
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownStatus(s.to_owned()))
  }
}

// ─── Entities ────────────────────────────────────────────────────────────────

/// One scientific publication, the unit of ingestion. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstractRecord {
  pub abstract_id: i64,
  pub year:        i64,
  pub title:       String,
  pub content:     String,
  pub doctype:     String,
  pub institution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
  pub author_id:  i64,
  pub first_name: String,
  pub last_name:  String,
}

impl Author {
  /// `"First Last"`, the form matched by author-id-by-full-name lookups.
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competency {
  pub competency_id:   i64,
  pub competency_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub category_id: i64,
  pub name:        String,
}

// ─── Query rows ──────────────────────────────────────────────────────────────

/// Row of competencies-by-author-id: `(competency_id, competency_name, status)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCompetency {
  pub competency_id:   i64,
  pub competency_name: String,
  pub status:          Status,
}

/// Row of competencies-by-abstract-id:
/// `(competency_id, competency_name, relevancy)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstractCompetency {
  pub competency_id:   i64,
  pub competency_name: String,
  pub relevancy:       Relevancy,
}

/// Row of authors-by-competency-id: one row per (author, evidencing abstract).
///
/// Column order: `(author_id, first_name, last_name, abstract_id, relevancy,
/// status)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyEvidence {
  pub author_id:   i64,
  pub first_name:  String,
  pub last_name:   String,
  pub abstract_id: i64,
  pub relevancy:   Relevancy,
  pub status:      Status,
}

/// Row of authors-with-competency (by competency name):
/// `(author_id, first_name, last_name, relevancy, status)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorWithCompetency {
  pub author_id:  i64,
  pub first_name: String,
  pub last_name:  String,
  pub relevancy:  Relevancy,
  pub status:     Status,
}

/// Row of abstracts-by-author-name:
/// `(abstract_id, year, title, content, institution)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorAbstract {
  pub abstract_id: i64,
  pub year:        i64,
  pub title:       String,
  pub content:     String,
  pub institution: String,
}

/// Row counts per table of one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
  pub abstracts:       u64,
  pub authors:         u64,
  pub competencies:    u64,
  pub categories:      u64,
  pub written_by:      u64,
  pub derived_from:    u64,
  pub has_competency:  u64,
  pub has_category:    u64,
}
