//! Ranking Engine: how strongly a competency is evidenced for an author.
//!
//! The score is the mean relevancy of the competency across the author's
//! abstracts plus a bonus proportional to the share of the author's output
//! that shows the competency:
//!
//! ```text
//! mean       = mean(relevancies)
//! proportion = abstracts_with_competency / total_abstracts
//! bonus      = 0                          if both counts are 1
//!            = proportion * (1 - mean)    otherwise
//! score      = mean + bonus
//! ```
//!
//! The result is an ordinal sort key, not a probability: it can exceed 1.
//!
//! Author resolution goes through the author's name, so two distinct authors
//! sharing an identical first and last name pool their abstract counts. This
//! is a known limitation of name-based identity and is kept as is.

use std::{cmp::Ordering, collections::HashSet};

use serde::{Deserialize, Serialize};

use crate::{
  model::{Relevancy, Status},
  store::CompetencyStore,
};

/// Score returned whenever the evidence is missing or unusable.
pub const FAILURE_SCORE: f64 = 0.0;

/// Inputs of the ranking formula for one (author, competency) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Evidence {
  pub relevancies:               Vec<Relevancy>,
  pub total_abstracts:           usize,
  pub abstracts_with_competency: usize,
}

/// Apply the ranking formula.
///
/// Returns [`FAILURE_SCORE`] if there are no relevancies, if any of them is
/// [`Relevancy::Unscored`], or if either abstract count is zero.
pub fn score(evidence: &Evidence) -> f64 {
  let Some(scores) = evidence
    .relevancies
    .iter()
    .map(|r| r.score())
    .collect::<Option<Vec<f64>>>()
  else {
    return FAILURE_SCORE;
  };

  let total = evidence.total_abstracts;
  let with_competency = evidence.abstracts_with_competency;
  if scores.is_empty() || total == 0 || with_competency == 0 {
    return FAILURE_SCORE;
  }

  let proportion = with_competency as f64 / total as f64;
  let mean = scores.iter().sum::<f64>() / scores.len() as f64;

  // The author's only publication is the only evidence: nothing to reward.
  let bonus = if with_competency == 1 && total == 1 {
    0.0
  } else {
    proportion * (1.0 - mean)
  };

  mean + bonus
}

/// Gather the evidence for `(author_id, competency_id)` from `store` and
/// score it.
pub async fn ranking_score<S>(
  store: &S,
  author_id: i64,
  competency_id: i64,
) -> Result<f64, S::Error>
where
  S: CompetencyStore,
{
  let relevancies = store.relevancies(competency_id, author_id).await?;
  if relevancies.is_empty() || relevancies.contains(&Relevancy::Unscored) {
    return Ok(FAILURE_SCORE);
  }

  let Some(author) = store.author_by_id(author_id).await? else {
    return Ok(FAILURE_SCORE);
  };

  let total_abstracts = store
    .abstracts_by_author_name(&author.first_name, &author.last_name)
    .await?
    .len();
  if total_abstracts == 0 {
    return Ok(FAILURE_SCORE);
  }

  let abstracts_with_competency = store
    .abstracts_with_competency(competency_id, author_id)
    .await?
    .len();
  if abstracts_with_competency == 0 {
    return Ok(FAILURE_SCORE);
  }

  Ok(score(&Evidence {
    relevancies,
    total_abstracts,
    abstracts_with_competency,
  }))
}

// ─── Ranked views ────────────────────────────────────────────────────────────

/// An author holding a competency, with their ranking score for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAuthor {
  pub author_id:     i64,
  pub first_name:    String,
  pub last_name:     String,
  pub status:        Status,
  pub ranking_score: f64,
}

/// A competency of an author, with the author's ranking score for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCompetency {
  pub competency_id:   i64,
  pub competency_name: String,
  pub status:          Status,
  pub ranking_score:   f64,
}

fn descending(a: f64, b: f64) -> Ordering { b.total_cmp(&a) }

/// Every author evidencing `competency_id`, best-ranked first. Ties keep the
/// order in which the store returned the authors.
pub async fn rank_authors<S>(
  store: &S,
  competency_id: i64,
) -> Result<Vec<RankedAuthor>, S::Error>
where
  S: CompetencyStore,
{
  let rows = store.authors_by_competency(competency_id).await?;

  let mut seen = HashSet::new();
  let mut ranked = Vec::new();
  for row in rows {
    if !seen.insert(row.author_id) {
      continue;
    }
    let ranking_score = ranking_score(store, row.author_id, competency_id).await?;
    ranked.push(RankedAuthor {
      author_id: row.author_id,
      first_name: row.first_name,
      last_name: row.last_name,
      status: row.status,
      ranking_score,
    });
  }

  ranked.sort_by(|a, b| descending(a.ranking_score, b.ranking_score));
  Ok(ranked)
}

/// Every competency of `author_id`, best-ranked first.
pub async fn rank_competencies<S>(
  store: &S,
  author_id: i64,
) -> Result<Vec<RankedCompetency>, S::Error>
where
  S: CompetencyStore,
{
  let rows = store.competencies_by_author(author_id).await?;

  let mut ranked = Vec::with_capacity(rows.len());
  for row in rows {
    let ranking_score = ranking_score(store, author_id, row.competency_id).await?;
    ranked.push(RankedCompetency {
      competency_id: row.competency_id,
      competency_name: row.competency_name,
      status: row.status,
      ranking_score,
    });
  }

  ranked.sort_by(|a, b| descending(a.ranking_score, b.ranking_score));
  Ok(ranked)
}
