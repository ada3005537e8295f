//! Tabular publication metadata: the rows ingestion consumes.
//!
//! Required columns are `Abstract, Title, Doc-Type, Authors, Year,
//! Institutions`; other columns are ignored on read and not written back.

use std::{fs::File, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  authors::{AuthorName, parse_authors},
};

/// Columns every source file must carry.
pub const REQUIRED_COLUMNS: [&str; 6] =
  ["Abstract", "Title", "Doc-Type", "Authors", "Year", "Institutions"];

/// One raw row. Every field is optional until [`SourceRow::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRow {
  #[serde(rename = "Abstract")]
  pub abstract_text: Option<String>,
  #[serde(rename = "Title")]
  pub title:         Option<String>,
  #[serde(rename = "Doc-Type")]
  pub doctype:       Option<String>,
  #[serde(rename = "Authors")]
  pub authors:       Option<String>,
  #[serde(rename = "Year")]
  pub year:          Option<String>,
  #[serde(rename = "Institutions")]
  pub institutions:  Option<String>,
}

/// A fully populated row, ready for ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRow<'a> {
  pub abstract_text: &'a str,
  pub title:         &'a str,
  pub doctype:       &'a str,
  pub authors:       Vec<AuthorName>,
  pub year:          i64,
  pub institution:   &'a str,
}

impl SourceRow {
  /// Check that every required field is present and non-blank, and that
  /// `Authors` names at least one author.
  ///
  /// Returns the name of the first missing column otherwise.
  pub fn validate(&self) -> Result<ValidRow<'_>, &'static str> {
    let abstract_text = present(&self.abstract_text).ok_or("Abstract")?;
    let title = present(&self.title).ok_or("Title")?;
    let doctype = present(&self.doctype).ok_or("Doc-Type")?;
    let authors = present(&self.authors)
      .map(parse_authors)
      .filter(|names| !names.is_empty())
      .ok_or("Authors")?;
    let year = present(&self.year).and_then(parse_year).ok_or("Year")?;
    let institution = present(&self.institutions).ok_or("Institutions")?;

    Ok(ValidRow {
      abstract_text,
      title,
      doctype,
      authors,
      year,
      institution,
    })
  }
}

fn present(field: &Option<String>) -> Option<&str> {
  field.as_deref().filter(|s| !s.trim().is_empty())
}

/// Integers, also in the float spelling spreadsheet exports produce
/// (`2019.0`).
fn parse_year(s: &str) -> Option<i64> {
  let s = s.trim();
  if let Ok(year) = s.parse::<i64>() {
    return Some(year);
  }
  let year = s.parse::<f64>().ok()?;
  (year.is_finite() && year.fract() == 0.0).then_some(year as i64)
}

// ─── CSV I/O ─────────────────────────────────────────────────────────────────

/// Read every row from CSV text. The header line must name every one of
/// [`REQUIRED_COLUMNS`].
pub fn read_rows(reader: impl io::Read) -> Result<Vec<SourceRow>> {
  let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

  let headers = csv.headers()?;
  let missing: Vec<&'static str> = REQUIRED_COLUMNS
    .into_iter()
    .filter(|column| !headers.iter().any(|h| h.trim() == *column))
    .collect();
  if !missing.is_empty() {
    return Err(Error::MissingColumns(missing));
  }

  let rows = csv.deserialize().collect::<Result<Vec<SourceRow>, _>>()?;
  Ok(rows)
}

/// Read every row from the CSV file at `path`.
pub fn read_rows_from_path(path: impl AsRef<Path>) -> Result<Vec<SourceRow>> {
  read_rows(File::open(path)?)
}

/// Write `rows` with a header line, replacing `path`. The header is written
/// even when `rows` is empty, so the file always reads back.
pub fn write_rows_to_path(path: impl AsRef<Path>, rows: &[SourceRow]) -> Result<()> {
  let mut csv = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
  csv.write_record(REQUIRED_COLUMNS)?;
  for row in rows {
    csv.serialize(row)?;
  }
  csv.flush()?;
  Ok(())
}

#[cfg(test)]
pub(crate) fn row(abstract_text: &str, authors: &str) -> SourceRow {
  SourceRow {
    abstract_text: Some(abstract_text.to_owned()),
    title:         Some("A title".to_owned()),
    doctype:       Some("Article".to_owned()),
    authors:       Some(authors.to_owned()),
    year:          Some("2021".to_owned()),
    institutions:  Some("Karlsruhe Institute of Technology".to_owned()),
  }
}
