//! The fixed enumeration of oracle models a rebuild can be run with.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// A language model exposed by the Relevancy Oracle.
///
/// Names match case-insensitively (`keybert`, `KeyBERT`, `KEYBERT`); an
/// unrecognised name is an error, never a silent default.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum OracleModel {
  #[strum(serialize = "KEYBERT")]
  #[serde(rename = "KEYBERT")]
  KeyBert,
  #[strum(serialize = "XLNET")]
  #[serde(rename = "XLNET")]
  XlNet,
  Bloom,
  Galactica,
  GptNeo,
}

impl OracleModel {
  pub fn parse(name: &str) -> Result<Self> {
    Self::from_str(name.trim()).map_err(|_| Error::UnknownModel(name.to_owned()))
  }

  /// The canonical upper-case name stored in the snapshot catalog.
  pub fn name(self) -> &'static str { self.into() }

  /// Path segments of the competency endpoint, before the abstract text.
  pub fn endpoint(self) -> &'static str {
    match self {
      Self::KeyBert => "ask_keybert",
      Self::XlNet => "ask_xlnet",
      Self::Bloom => "ask_bloom",
      Self::Galactica => "ask_galactica",
      Self::GptNeo => "ask_gpt_neo",
    }
  }

  /// Trailing path segments after the abstract text, if the endpoint takes
  /// any. Bloom expects a generation method; `0` selects greedy decoding.
  pub fn endpoint_suffix(self) -> &'static [&'static str] {
    match self {
      Self::Bloom => &["0"],
      _ => &[],
    }
  }
}
