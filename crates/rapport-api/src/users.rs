//! Handler for `/users/{id}`: the resolver's view of one user, served from the
//! cache when the upstream services are unreachable.

use std::sync::Arc;

use axum::{Json, extract::State};
use rapport_core::{
  lifecycle::MatchLifecycle,
  resolver::Directory,
  store::MatchStore,
  user::{UserDetails, UserId},
};

use crate::{error::ApiError, extract::ApiPath};

/// `GET /users/{id}`
pub async fn get_one<D, M>(
  State(lifecycle): State<Arc<MatchLifecycle<D, M>>>,
  ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserDetails>, ApiError>
where
  D: Directory + 'static,
  M: MatchStore + 'static,
{
  let details = lifecycle.engine().directory().resolve(UserId(id)).await?;
  Ok(Json(details))
}
