//! Incremental additions: rows submitted after a build are diffed against the
//! rows already ingested and only the new ones reach the pipeline.
//!
//! The staging directory holds two files: `last_added.csv`, the most recent
//! submission verbatim, and `current.csv`, every row ingested so far.

use std::{
  collections::HashSet,
  fs, io,
  path::{Path, PathBuf},
};

use crate::{
  Result,
  source::{SourceRow, read_rows_from_path, write_rows_to_path},
};

pub const CURRENT_FILE: &str = "current.csv";
pub const LAST_ADDED_FILE: &str = "last_added.csv";

/// Rows of `added` whose abstract text appears in no row of `current`.
pub fn new_entries(added: &[SourceRow], current: &[SourceRow]) -> Vec<SourceRow> {
  let known: HashSet<Option<&str>> =
    current.iter().map(|r| r.abstract_text.as_deref()).collect();
  added
    .iter()
    .filter(|r| !known.contains(&r.abstract_text.as_deref()))
    .cloned()
    .collect()
}

/// Directory holding the incremental staging files.
#[derive(Debug, Clone)]
pub struct Staging {
  dir: PathBuf,
}

impl Staging {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }

  pub fn current_path(&self) -> PathBuf { self.dir.join(CURRENT_FILE) }

  pub fn last_added_path(&self) -> PathBuf { self.dir.join(LAST_ADDED_FILE) }

  /// Store a submission as `last_added.csv`, replacing the previous one.
  pub fn write_last_added(&self, csv_text: &str) -> Result<()> {
    fs::create_dir_all(&self.dir)?;
    fs::write(self.last_added_path(), csv_text)?;
    Ok(())
  }

  pub fn read_last_added(&self) -> Result<Vec<SourceRow>> {
    read_rows_from_path(self.last_added_path())
  }

  /// Rows ingested so far. A missing `current.csv` means none.
  pub fn read_current(&self) -> Result<Vec<SourceRow>> {
    match read_rows_from_path(self.current_path()) {
      Err(crate::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
      other => other,
    }
  }

  /// The rows of the latest submission not yet in `current.csv`.
  pub fn pending(&self) -> Result<Vec<SourceRow>> {
    Ok(new_entries(&self.read_last_added()?, &self.read_current()?))
  }

  /// Append `ingested` to `current.csv`.
  pub fn record_ingested(&self, ingested: &[SourceRow]) -> Result<()> {
    let mut current = self.read_current()?;
    current.extend_from_slice(ingested);
    fs::create_dir_all(&self.dir)?;
    write_rows_to_path(self.current_path(), &current)
  }
}
