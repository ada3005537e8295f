//! Language filter applied before an abstract reaches the oracle.

use whatlang::Lang;

/// Decides whether abstract text is English.
pub trait LanguageDetector: Send + Sync {
  /// Ambiguous or undetectable text is not English.
  fn is_english(&self, text: &str) -> bool;
}

/// Trigram-based detection through [`whatlang`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
  fn is_english(&self, text: &str) -> bool {
    whatlang::detect(text).is_some_and(|info| info.lang() == Lang::Eng)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detects_english_prose() {
    let text = "We present a novel method for training deep neural networks on \
                small datasets and evaluate it on several benchmark tasks.";
    assert!(WhatlangDetector.is_english(text));
  }

  #[test]
  fn rejects_german_prose() {
    let text = "Wir stellen ein neues Verfahren zur Herstellung von \
                Verbundwerkstoffen vor und untersuchen deren Eigenschaften.";
    assert!(!WhatlangDetector.is_english(text));
  }

  #[test]
  fn undetectable_text_is_not_english() {
    assert!(!WhatlangDetector.is_english(""));
    assert!(!WhatlangDetector.is_english("1234 5678"));
  }
}
