//! Handlers for `/matches` endpoints. Every response embeds a summary of both
//! parties.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/matches/request` | Body: `{"target_user_id":7}`; returns the existing row for a known pair |
//! | `PUT`  | `/matches/{id}/accept` | Target only; also accepts the reverse pair |
//! | `PUT`  | `/matches/{id}/reject` | Target only |
//! | `GET`  | `/matches/outgoing` | Pending, sent by the caller |
//! | `GET`  | `/matches/incoming` | Pending, addressed to the caller |
//! | `GET`  | `/matches/connections` | Accepted, either direction |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use rapport_core::{
  lifecycle::MatchLifecycle,
  matching::MatchView,
  resolver::Directory,
  store::MatchStore,
  user::UserId,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  actor::ActingUser,
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

type Lifecycle<D, M> = State<Arc<MatchLifecycle<D, M>>>;

// ─── Request ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RequestBody {
  pub target_user_id: UserId,
}

/// `POST /matches/request`
pub async fn request<D, M>(
  State(lifecycle): Lifecycle<D, M>,
  ActingUser(user): ActingUser,
  ApiJson(body): ApiJson<RequestBody>,
) -> Result<impl IntoResponse, ApiError>
where
  D: Directory + 'static,
  M: MatchStore + 'static,
{
  let view = lifecycle.request_match_view(user, body.target_user_id).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

// ─── Transitions ─────────────────────────────────────────────────────────────

/// `PUT /matches/{id}/accept`
pub async fn accept<D, M>(
  State(lifecycle): Lifecycle<D, M>,
  ActingUser(user): ActingUser,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MatchView>, ApiError>
where
  D: Directory + 'static,
  M: MatchStore + 'static,
{
  Ok(Json(lifecycle.accept_match_view(user, id).await?))
}

/// `PUT /matches/{id}/reject`
pub async fn reject<D, M>(
  State(lifecycle): Lifecycle<D, M>,
  ActingUser(user): ActingUser,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MatchView>, ApiError>
where
  D: Directory + 'static,
  M: MatchStore + 'static,
{
  Ok(Json(lifecycle.reject_match_view(user, id).await?))
}

// ─── Listings ────────────────────────────────────────────────────────────────

/// `GET /matches/outgoing`
pub async fn outgoing<D, M>(
  State(lifecycle): Lifecycle<D, M>,
  ActingUser(user): ActingUser,
) -> Result<Json<Vec<MatchView>>, ApiError>
where
  D: Directory + 'static,
  M: MatchStore + 'static,
{
  let matches = lifecycle.outgoing_pending(user).await?;
  Ok(Json(lifecycle.describe_all(&matches).await?))
}

/// `GET /matches/incoming`
pub async fn incoming<D, M>(
  State(lifecycle): Lifecycle<D, M>,
  ActingUser(user): ActingUser,
) -> Result<Json<Vec<MatchView>>, ApiError>
where
  D: Directory + 'static,
  M: MatchStore + 'static,
{
  let matches = lifecycle.incoming_pending(user).await?;
  Ok(Json(lifecycle.describe_all(&matches).await?))
}

/// `GET /matches/connections`
pub async fn connections<D, M>(
  State(lifecycle): Lifecycle<D, M>,
  ActingUser(user): ActingUser,
) -> Result<Json<Vec<MatchView>>, ApiError>
where
  D: Directory + 'static,
  M: MatchStore + 'static,
{
  let matches = lifecycle.connections(user).await?;
  Ok(Json(lifecycle.describe_all(&matches).await?))
}
