//! Handler for `/recommendations`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/recommendations` | Optional `?limit=N` (default 10); negative limits yield an empty list, non-numeric ones a 400 |

use std::sync::Arc;

use axum::{Json, extract::State};
use rapport_core::{
  lifecycle::MatchLifecycle,
  recommend::{DEFAULT_LIMIT, Recommendation},
  resolver::Directory,
  store::MatchStore,
};
use serde::Deserialize;

use crate::{actor::ActingUser, error::ApiError, extract::ApiQuery};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit: Option<i64>,
}

impl ListParams {
  fn limit(&self) -> usize {
    self
      .limit
      .map_or(DEFAULT_LIMIT, |n| usize::try_from(n).unwrap_or(0))
  }
}

/// `GET /recommendations[?limit=<n>]`
pub async fn list<D, M>(
  State(lifecycle): State<Arc<MatchLifecycle<D, M>>>,
  ActingUser(user): ActingUser,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Recommendation>>, ApiError>
where
  D: Directory + 'static,
  M: MatchStore + 'static,
{
  let ranked = lifecycle.engine().recommend(user, params.limit()).await?;
  Ok(Json(ranked))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn limit_defaults_and_clamps() {
    assert_eq!(ListParams { limit: None }.limit(), DEFAULT_LIMIT);
    assert_eq!(ListParams { limit: Some(3) }.limit(), 3);
    assert_eq!(ListParams { limit: Some(0) }.limit(), 0);
    assert_eq!(ListParams { limit: Some(-5) }.limit(), 0);
  }
}
