//! The closed list of top-level subject categories.
//!
//! Category ids are the positions in [`CATEGORIES`]; every snapshot seeds the
//! same 32 rows at creation and never changes them afterwards.

use crate::{Error, Result, model::Category};

pub const CATEGORY_COUNT: usize = 32;

pub const CATEGORIES: [&str; CATEGORY_COUNT] = [
  "Mathematics",
  "Computer and Informations Sciences",
  "Physical Sciences",
  "Chemical Sciences",
  "Environmental Sciences",
  "Earth Sciences",
  "Biological Sciences",
  "Civil Engineering",
  "Electrical Engineering",
  "Mechanical Engineering",
  "Chemical Engineering",
  "Materials Engineering",
  "Medical Engineering",
  "Nano-technology",
  "Medicine",
  "Health Sciences",
  "Agriculture, Forestry, and Fisheries",
  "Animal and Dairy Sciences",
  "Veterinary Sciences",
  "Agricultural Engineering",
  "Psychology",
  "Economics and Business",
  "Educational Sciences",
  "Sociology",
  "Law",
  "Political Sciences",
  "Geography",
  "Media and Communication",
  "History and Archeology",
  "Languages and Literature",
  "Philosophy",
  "Ethics and Religion",
];

/// All categories as `(id, name)` rows, in id order.
pub fn seed() -> impl Iterator<Item = Category> {
  CATEGORIES.iter().enumerate().map(|(id, name)| Category {
    category_id: id as i64,
    name:        (*name).to_owned(),
  })
}

/// Check that `id` references a member of the closed category set.
pub fn validate_id(id: i64) -> Result<i64> {
  if (0..CATEGORY_COUNT as i64).contains(&id) {
    Ok(id)
  } else {
    Err(Error::CategoryOutOfRange(id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seed_covers_every_id_once() {
    let rows: Vec<_> = seed().collect();
    assert_eq!(rows.len(), 32);
    assert_eq!(rows[0].name, "Mathematics");
    assert_eq!(rows[31].category_id, 31);
    assert_eq!(rows[31].name, "Ethics and Religion");
  }

  #[test]
  fn ids_outside_the_list_are_rejected() {
    assert_eq!(validate_id(0).unwrap(), 0);
    assert_eq!(validate_id(31).unwrap(), 31);
    assert!(validate_id(32).is_err());
    assert!(validate_id(-1).is_err());
  }
}
