//! JSON REST API for Rapport.
//!
//! Exposes an axum [`Router`] over a [`MatchLifecycle`]. The caller is
//! identified by the `X-User-ID` header; authentication, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rapport_api::api_router(lifecycle.clone()))
//! ```

pub mod actor;
pub mod error;
pub mod extract;
pub mod matches;
pub mod recommendations;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use rapport_core::{lifecycle::MatchLifecycle, resolver::Directory, store::MatchStore};

pub use actor::ActingUser;
pub use error::ApiError;

/// Build a fully-materialised API router for `lifecycle`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<D, M>(lifecycle: Arc<MatchLifecycle<D, M>>) -> Router<()>
where
  D: Directory + 'static,
  M: MatchStore + 'static,
{
  Router::new()
    .route("/recommendations", get(recommendations::list::<D, M>))
    // Matches
    .route("/matches/request", post(matches::request::<D, M>))
    .route("/matches/{id}/accept", put(matches::accept::<D, M>))
    .route("/matches/{id}/reject", put(matches::reject::<D, M>))
    .route("/matches/outgoing", get(matches::outgoing::<D, M>))
    .route("/matches/incoming", get(matches::incoming::<D, M>))
    .route("/matches/connections", get(matches::connections::<D, M>))
    // Users
    .route("/users/{id}", get(users::get_one::<D, M>))
    .with_state(lifecycle)
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use rapport_core::{
    memory::MemoryStore,
    recommend::RecommendationEngine,
    user::{UserDetails, UserId},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  /// Directory over a fixed set of users; anyone else is unavailable.
  struct Fixed {
    users:       BTreeMap<UserId, UserDetails>,
    /// Fail population reads as if the backing store were down.
    broken_list: bool,
  }

  impl Directory for Fixed {
    async fn resolve(&self, id: UserId) -> rapport_core::Result<UserDetails> {
      self
        .users
        .get(&id)
        .cloned()
        .ok_or(rapport_core::Error::UpstreamUnavailable(id))
    }

    async fn population(&self) -> rapport_core::Result<Vec<UserDetails>> {
      if self.broken_list {
        return Err(rapport_core::Error::store(std::io::Error::other("disk unavailable")));
      }
      Ok(self.users.values().cloned().collect())
    }
  }

  fn user(id: i64, department: &str, skills: &[&str], interests: &[&str], stage: &str) -> UserDetails {
    UserDetails {
      id:           UserId(id),
      name:         format!("user-{id}"),
      department:   department.into(),
      skills:       skills.iter().map(|s| s.to_string()).collect(),
      interests:    interests.iter().map(|s| s.to_string()).collect(),
      career_stage: stage.into(),
    }
  }

  fn app() -> Router { app_with(false) }

  fn app_with(broken_list: bool) -> Router {
    let users = [
      user(1, "Eng", &["rust", "go"], &["chess"], "senior"),
      user(2, "Sales", &["rust"], &["chess"], "junior"),
      user(3, "Eng", &["python"], &[], "senior"),
    ];
    let directory = Fixed { users: users.into_iter().map(|u| (u.id, u)).collect(), broken_list };
    let lifecycle = MatchLifecycle::new(RecommendationEngine::new(directory), MemoryStore::new());
    api_router(Arc::new(lifecycle))
  }

  async fn call(
    app:    &Router,
    method: &str,
    uri:    &str,
    actor:  Option<i64>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = actor {
      builder = builder.header("X-User-ID", id.to_string());
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  async fn request(app: &Router, source: i64, target: i64) -> Value {
    let (status, body) = call(
      app,
      "POST",
      "/matches/request",
      Some(source),
      Some(json!({ "target_user_id": target })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
  }

  // ── Recommendations ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn recommendations_rank_best_first() {
    let app = app();
    let (status, body) = call(&app, "GET", "/recommendations", Some(1), None).await;
    assert_eq!(status, StatusCode::OK);

    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["user"]["id"], 2);
    assert!((list[0]["score"].as_f64().unwrap() - 0.85).abs() < 1e-9);
    assert_eq!(list[0]["matching_skills"], json!(["rust"]));
    assert_eq!(list[1]["user"]["id"], 3);
  }

  #[tokio::test]
  async fn recommendations_honour_limit() {
    let app = app();
    let (_, body) = call(&app, "GET", "/recommendations?limit=1", Some(1), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = call(&app, "GET", "/recommendations?limit=-1", Some(1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
  }

  #[tokio::test]
  async fn missing_actor_header_is_400() {
    let app = app();
    let (status, body) = call(&app, "GET", "/recommendations", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");
  }

  #[tokio::test]
  async fn unknown_requester_is_503() {
    let app = app();
    let (status, body) = call(&app, "GET", "/recommendations", Some(99), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "upstream_unavailable");
  }

  #[tokio::test]
  async fn non_numeric_limit_is_400_json() {
    let app = app();
    let (status, body) = call(&app, "GET", "/recommendations?limit=abc", Some(1), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn store_failure_is_500_internal() {
    let app = app_with(true);
    let (status, body) = call(&app, "GET", "/recommendations", Some(1), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "internal");
  }

  // ── Match lifecycle ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn request_embeds_both_parties() {
    let app = app();
    let body = request(&app, 1, 2).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["source_user"]["name"], "user-1");
    assert_eq!(body["target_user"]["department"], "Sales");
    assert!((body["score"].as_f64().unwrap() - 0.85).abs() < 1e-9);

    // Repeating the request returns the same row.
    let again = request(&app, 1, 2).await;
    assert_eq!(again["match_id"], body["match_id"]);
  }

  #[tokio::test]
  async fn self_request_is_400() {
    let app = app();
    let (status, body) = call(
      &app,
      "POST",
      "/matches/request",
      Some(1),
      Some(json!({ "target_user_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");
  }

  #[tokio::test]
  async fn mistyped_body_is_400_json() {
    let app = app();
    let (status, body) = call(
      &app,
      "POST",
      "/matches/request",
      Some(1),
      Some(json!({ "target_user_id": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");

    let (status, body) = call(&app, "POST", "/matches/request", Some(1), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");
  }

  #[tokio::test]
  async fn malformed_match_id_is_400_json() {
    let app = app();
    let (status, body) = call(&app, "PUT", "/matches/not-a-uuid/accept", Some(2), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");
  }

  #[tokio::test]
  async fn unresolvable_target_stores_nothing() {
    let app = app();
    let (status, body) = call(
      &app,
      "POST",
      "/matches/request",
      Some(1),
      Some(json!({ "target_user_id": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "upstream_unavailable");

    let (status, body) = call(&app, "GET", "/matches/outgoing", Some(1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
  }

  #[tokio::test]
  async fn accept_connects_both_sides() {
    let app = app();
    let id = request(&app, 1, 2).await["match_id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, "GET", "/matches/incoming", Some(2), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = call(&app, "PUT", &format!("/matches/{id}/accept"), Some(2), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");

    for who in [1, 2] {
      let (_, body) = call(&app, "GET", "/matches/connections", Some(who), None).await;
      assert_eq!(body.as_array().unwrap().len(), 2, "connections for {who}");
    }
    let (_, body) = call(&app, "GET", "/matches/incoming", Some(2), None).await;
    assert_eq!(body, json!([]));
  }

  #[tokio::test]
  async fn only_target_may_accept() {
    let app = app();
    let id = request(&app, 1, 2).await["match_id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, "PUT", &format!("/matches/{id}/accept"), Some(1), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");
  }

  #[tokio::test]
  async fn second_transition_is_409() {
    let app = app();
    let id = request(&app, 1, 3).await["match_id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, "PUT", &format!("/matches/{id}/reject"), Some(3), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");

    let (status, body) = call(&app, "PUT", &format!("/matches/{id}/accept"), Some(3), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_state");
  }

  #[tokio::test]
  async fn unknown_match_is_404() {
    let app = app();
    let id = uuid::Uuid::new_v4();
    let (status, body) = call(&app, "PUT", &format!("/matches/{id}/reject"), Some(2), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
  }

  #[tokio::test]
  async fn outgoing_lists_pending_requests() {
    let app = app();
    request(&app, 1, 2).await;
    request(&app, 1, 3).await;

    let (_, body) = call(&app, "GET", "/matches/outgoing", Some(1), None).await;
    let targets: Vec<_> = body
      .as_array()
      .unwrap()
      .iter()
      .map(|m| m["target_user"]["id"].as_i64().unwrap())
      .collect();
    assert_eq!(targets, vec![2, 3]);
  }

  // ── Users ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn user_lookup() {
    let app = app();
    let (status, body) = call(&app, "GET", "/users/3", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["skills"], json!(["python"]));

    let (status, _) = call(&app, "GET", "/users/404", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  }
}
