//! Parsing of the `Authors` column.
//!
//! The field is a `;`-separated list of `Last, First` entries as exported by
//! the library search portal. Entries may carry trailing numeric footnote
//! markers, and a truncated list ends in an entry containing `... mehr`.

/// Entry text meaning "more authors omitted"; such entries are dropped.
pub const TRUNCATION_MARKER: &str = "... mehr";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName {
  pub first_name: String,
  pub last_name:  String,
}

/// Split a raw `Authors` field into names, in field order.
pub fn parse_authors(raw: &str) -> Vec<AuthorName> {
  raw
    .split(';')
    .filter(|entry| !entry.contains(TRUNCATION_MARKER))
    .map(strip_footnote)
    .filter(|entry| !entry.trim().is_empty())
    .map(parse_name)
    .collect()
}

/// Everything before the first digit.
fn strip_footnote(entry: &str) -> &str {
  match entry.find(|c: char| c.is_ascii_digit()) {
    Some(i) => &entry[..i],
    None => entry,
  }
}

/// `Last, First[, ...]` or a bare last name.
fn parse_name(entry: &str) -> AuthorName {
  let mut parts = entry.split(',');
  match (parts.next(), parts.next()) {
    (Some(last), Some(first)) => AuthorName {
      first_name: first.trim().to_owned(),
      last_name:  last.trim().to_owned(),
    },
    _ => AuthorName {
      first_name: String::new(),
      last_name:  entry.trim().to_owned(),
    },
  }
}
