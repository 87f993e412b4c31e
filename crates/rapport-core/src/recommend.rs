//! Affinity scoring and the [`RecommendationEngine`].
//!
//! A candidate's total is the sum of four weighted parts:
//!
//! | Part | Weight |
//! |------|--------|
//! | Jaccard similarity of skills | 0.5 |
//! | Jaccard similarity of interests | 0.3 |
//! | Different department | 0.2 |
//! | Different career stage | 0.1 |
//!
//! so totals range over `[0.0, 1.1]`. Recommendations are recomputed on every
//! call and never cached.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Result,
  resolver::Directory,
  user::{UserDetails, UserId, UserSummary},
};

pub const SKILL_WEIGHT: f64 = 0.5;
pub const INTEREST_WEIGHT: f64 = 0.3;
pub const CROSS_DEPARTMENT_BONUS: f64 = 0.2;
pub const CAREER_DIVERSITY_BONUS: f64 = 0.1;

/// Highest total any candidate can reach.
pub const MAX_SCORE: f64 =
  SKILL_WEIGHT + INTEREST_WEIGHT + CROSS_DEPARTMENT_BONUS + CAREER_DIVERSITY_BONUS;

pub const DEFAULT_LIMIT: usize = 10;

// ─── Scoring ─────────────────────────────────────────────────────────────────

/// `|a ∩ b| / |a ∪ b|`, or `0.0` when either set is empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
  if a.is_empty() || b.is_empty() {
    return 0.0;
  }
  let shared = a.intersection(b).count();
  let union = a.len() + b.len() - shared;
  shared as f64 / union as f64
}

/// The weighted parts of a candidate's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
  pub skills:      f64,
  pub interests:   f64,
  pub department:  f64,
  pub career:      f64,
}

impl ScoreBreakdown {
  pub fn total(&self) -> f64 { self.skills + self.interests + self.department + self.career }
}

/// Score `candidate` from the point of view of `user`.
pub fn score(user: &UserDetails, candidate: &UserDetails) -> ScoreBreakdown {
  ScoreBreakdown {
    skills:     jaccard(&user.skills, &candidate.skills) * SKILL_WEIGHT,
    interests:  jaccard(&user.interests, &candidate.interests) * INTEREST_WEIGHT,
    department: if user.department != candidate.department {
      CROSS_DEPARTMENT_BONUS
    } else {
      0.0
    },
    career:     if user.career_stage != candidate.career_stage {
      CAREER_DIVERSITY_BONUS
    } else {
      0.0
    },
  }
}

// ─── Recommendation ──────────────────────────────────────────────────────────

/// A scored candidate with the overlap that produced its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
  pub user:               UserSummary,
  pub score:              f64,
  pub breakdown:          ScoreBreakdown,
  pub matching_skills:    BTreeSet<String>,
  pub matching_interests: BTreeSet<String>,
}

/// Rank `population` for `user`, best first, keeping at most `limit` entries.
///
/// `user` itself is skipped. Equal totals keep their population order.
pub fn rank<'a>(
  user: &UserDetails,
  population: impl IntoIterator<Item = &'a UserDetails>,
  limit: usize,
) -> Vec<Recommendation> {
  if limit == 0 {
    return Vec::new();
  }

  let mut ranked: Vec<Recommendation> = population
    .into_iter()
    .filter(|candidate| candidate.id != user.id)
    .map(|candidate| {
      let breakdown = score(user, candidate);
      Recommendation {
        user: candidate.summary(),
        score: breakdown.total(),
        breakdown,
        matching_skills: user.skills.intersection(&candidate.skills).cloned().collect(),
        matching_interests: user
          .interests
          .intersection(&candidate.interests)
          .cloned()
          .collect(),
      }
    })
    .collect();

  // `sort_by` is stable, which is what keeps ties in population order.
  ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
  ranked.truncate(limit);
  ranked
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Ranks the known population for a user resolved through a [`Directory`].
pub struct RecommendationEngine<D> {
  directory: D,
}

impl<D: Directory> RecommendationEngine<D> {
  pub fn new(directory: D) -> Self { Self { directory } }

  pub fn directory(&self) -> &D { &self.directory }

  /// Up to `limit` recommendations for `user_id`.
  ///
  /// Fails only when `user_id` cannot be resolved; an empty population yields
  /// an empty list.
  pub async fn recommend(&self, user_id: UserId, limit: usize) -> Result<Vec<Recommendation>> {
    let user = self.directory.resolve(user_id).await?;
    self.recommend_for(&user, limit).await
  }

  /// As [`Self::recommend`], for a user the caller has already resolved.
  pub async fn recommend_for(&self, user: &UserDetails, limit: usize) -> Result<Vec<Recommendation>> {
    if limit == 0 {
      return Ok(Vec::new());
    }
    let population = self.directory.population().await?;
    let ranked = rank(user, &population, limit);
    debug!(
      user_id = %user.id,
      population = population.len(),
      returned = ranked.len(),
      "computed recommendations"
    );
    Ok(ranked)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    Error,
    memory::MemoryStore,
    resolver::UserDetailsResolver,
    store::ProfileStore,
    testing::{Lookups, details, set},
  };

  const EPS: f64 = 1e-9;

  #[test]
  fn jaccard_is_zero_for_empty_or_disjoint() {
    assert_eq!(jaccard(&set(&[]), &set(&["a"])), 0.0);
    assert_eq!(jaccard(&set(&["a"]), &set(&[])), 0.0);
    assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
    assert_eq!(jaccard(&set(&["a"]), &set(&["b"])), 0.0);
  }

  #[test]
  fn jaccard_is_one_for_identical_sets() {
    assert_eq!(jaccard(&set(&["a", "b"]), &set(&["b", "a"])), 1.0);
  }

  #[test]
  fn jaccard_is_symmetric() {
    let samples = [
      set(&["go", "rust"]),
      set(&["go", "python"]),
      set(&["rust"]),
      set(&[]),
      set(&["a", "b", "c", "d"]),
    ];
    for a in &samples {
      for b in &samples {
        assert_eq!(jaccard(a, b), jaccard(b, a));
      }
    }
  }

  #[test]
  fn worked_example_scores_point_three_six_seven() {
    let u = details(1, "Eng", &["go", "rust"], &["chess"], "senior");
    let p = details(2, "Sales", &["go", "python"], &["hiking"], "senior");
    let s = score(&u, &p);

    assert!((s.skills - (1.0 / 3.0) * 0.5).abs() < EPS);
    assert_eq!(s.interests, 0.0);
    assert_eq!(s.department, 0.2);
    assert_eq!(s.career, 0.0);
    assert!((s.total() - 0.366_666_666_7).abs() < 1e-6);
  }

  #[test]
  fn maximum_total_is_one_point_one() {
    let u = details(1, "Eng", &["rust"], &["chess"], "senior");
    let p = details(2, "Sales", &["rust"], &["chess"], "junior");
    assert!((score(&u, &p).total() - 1.1).abs() < EPS);
    assert!((MAX_SCORE - 1.1).abs() < EPS);
  }

  #[test]
  fn rank_orders_descending_and_skips_self() {
    let u = details(1, "Eng", &["rust"], &[], "senior");
    let population = vec![
      u.clone(),
      details(2, "Eng", &[], &[], "senior"),
      details(3, "Sales", &["rust"], &[], "senior"),
      details(4, "Eng", &["rust"], &[], "senior"),
    ];

    let ranked = rank(&u, &population, DEFAULT_LIMIT);
    let ids: Vec<_> = ranked.iter().map(|r| r.user.id.0).collect();
    assert_eq!(ids, vec![3, 4, 2]);
    assert_eq!(ranked[0].matching_skills, set(&["rust"]));
  }

  #[test]
  fn rank_keeps_population_order_on_ties() {
    let u = details(1, "Eng", &[], &[], "senior");
    let population = vec![
      details(7, "Eng", &[], &[], "senior"),
      details(3, "Eng", &[], &[], "senior"),
      details(5, "Eng", &[], &[], "senior"),
    ];
    let ids: Vec<_> = rank(&u, &population, 10).iter().map(|r| r.user.id.0).collect();
    assert_eq!(ids, vec![7, 3, 5]);
  }

  #[test]
  fn rank_truncates_and_handles_zero_limit() {
    let u = details(1, "Eng", &[], &[], "senior");
    let population: Vec<_> = (2..20).map(|i| details(i, "Ops", &[], &[], "junior")).collect();
    assert_eq!(rank(&u, &population, 5).len(), 5);
    assert!(rank(&u, &population, 0).is_empty());
    assert!(rank(&u, &[u.clone()], 10).is_empty());
  }

  #[test]
  fn recommendation_reports_interest_overlap() {
    let u = details(1, "Eng", &[], &["chess", "go"], "senior");
    let p = details(2, "Eng", &[], &["go", "hiking"], "senior");
    let ranked = rank(&u, [&p], 10);
    assert_eq!(ranked[0].matching_interests, set(&["go"]));
    assert!((ranked[0].score - 0.1).abs() < EPS);
  }

  #[tokio::test]
  async fn engine_ranks_cached_population() {
    let lookups = Lookups::default();
    lookups.add(details(1, "Eng", &["rust"], &[], "senior"));
    let cache = MemoryStore::new();
    cache.put_profile(details(2, "Sales", &["rust"], &[], "junior")).await.unwrap();
    cache.put_profile(details(3, "Eng", &[], &[], "senior")).await.unwrap();

    let engine =
      RecommendationEngine::new(UserDetailsResolver::new(lookups.clone(), lookups, cache));
    let recs = engine.recommend(UserId(1), DEFAULT_LIMIT).await.unwrap();

    // The requesting user is cached by the resolution but never recommended.
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].user.id, UserId(2));
    assert!((recs[0].score - 0.8).abs() < EPS);
  }

  #[tokio::test]
  async fn engine_returns_empty_for_lonely_population() {
    let lookups = Lookups::default();
    lookups.add(details(1, "Eng", &["rust"], &[], "senior"));
    let engine = RecommendationEngine::new(UserDetailsResolver::new(
      lookups.clone(),
      lookups,
      MemoryStore::new(),
    ));
    assert!(engine.recommend(UserId(1), 10).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn engine_propagates_resolution_failure() {
    let lookups = Lookups::default();
    lookups.set_failing(true);
    let engine = RecommendationEngine::new(UserDetailsResolver::new(
      lookups.clone(),
      lookups,
      MemoryStore::new(),
    ));
    let err = engine.recommend(UserId(1), 10).await.unwrap_err();
    assert!(matches!(err, Error::UpstreamUnavailable(UserId(1))));
  }
}
