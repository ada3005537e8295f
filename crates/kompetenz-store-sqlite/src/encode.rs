//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Statuses are stored as their canonical spelling (`Hidden`, `Unvalidated`,
//! `Validated`). Relevancies are stored as REAL with `-1` for unscored.

use kompetenz_core::model::{
  AuthorCompetency, AuthorWithCompetency, CompetencyEvidence, Relevancy, Status,
};

use crate::Result;

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn encode_status(status: Status) -> &'static str {
  match status {
    Status::Hidden => "Hidden",
    Status::Unvalidated => "Unvalidated",
    Status::Validated => "Validated",
  }
}

pub fn decode_status(s: &str) -> Result<Status> { Ok(Status::parse(s)?) }

// ─── Relevancy ───────────────────────────────────────────────────────────────

pub fn encode_relevancy(r: Relevancy) -> f64 { r.to_wire() }

pub fn decode_relevancy(v: f64) -> Relevancy { Relevancy::from_wire(v) }

// ─── Constraint handling ─────────────────────────────────────────────────────

/// Turn a constraint violation into `Ok(false)`; other errors pass through.
/// Successful statements report whether a row was written.
pub fn tolerate_constraint(result: rusqlite::Result<usize>) -> rusqlite::Result<bool> {
  match result {
    Ok(changed) => Ok(changed > 0),
    Err(rusqlite::Error::SqliteFailure(e, _))
      if e.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      Ok(false)
    }
    Err(e) => Err(e),
  }
}

// ─── Raw row types (pre-decode) ──────────────────────────────────────────────

/// Row of `competencies_by_author` before status decoding.
pub struct RawAuthorCompetency {
  pub competency_id:   i64,
  pub competency_name: String,
  pub status:          String,
}

impl RawAuthorCompetency {
  pub fn decode(self) -> Result<AuthorCompetency> {
    Ok(AuthorCompetency {
      competency_id:   self.competency_id,
      competency_name: self.competency_name,
      status:          decode_status(&self.status)?,
    })
  }
}

/// Row of `authors_by_competency` before status decoding.
pub struct RawCompetencyEvidence {
  pub author_id:   i64,
  pub first_name:  String,
  pub last_name:   String,
  pub abstract_id: i64,
  pub relevancy:   f64,
  pub status:      String,
}

impl RawCompetencyEvidence {
  pub fn decode(self) -> Result<CompetencyEvidence> {
    Ok(CompetencyEvidence {
      author_id:   self.author_id,
      first_name:  self.first_name,
      last_name:   self.last_name,
      abstract_id: self.abstract_id,
      relevancy:   decode_relevancy(self.relevancy),
      status:      decode_status(&self.status)?,
    })
  }
}

/// Row of `authors_with_competency` before status decoding.
pub struct RawAuthorWithCompetency {
  pub author_id:  i64,
  pub first_name: String,
  pub last_name:  String,
  pub relevancy:  f64,
  pub status:     String,
}

impl RawAuthorWithCompetency {
  pub fn decode(self) -> Result<AuthorWithCompetency> {
    Ok(AuthorWithCompetency {
      author_id:  self.author_id,
      first_name: self.first_name,
      last_name:  self.last_name,
      relevancy:  decode_relevancy(self.relevancy),
      status:     decode_status(&self.status)?,
    })
  }
}
