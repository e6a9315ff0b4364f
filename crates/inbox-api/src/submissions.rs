//! Handlers for `/submissions` endpoints.
//!
//! | Method   | Path | Access | Notes |
//! |----------|------|--------|-------|
//! | `POST`   | `/submissions` | public | Body: create input; 201 |
//! | `GET`    | `/submissions` | operator | Optional `?status=&category=&tag=&q=` |
//! | `GET`    | `/submissions/stats` | operator | Aggregates |
//! | `GET`    | `/submissions/:id` | operator | 404 if not found |
//! | `PATCH`  | `/submissions/:id` | operator | Body: `{"status":"read","notes":..,"tags":[..]}` |
//! | `DELETE` | `/submissions/:id` | operator | 404 if not found |
//!
//! Operator routes take [`Operator`] as their first extractor so that the
//! credential is checked before the path or body is looked at.

use axum::{
  Json,
  extract::{FromRequest, Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use inbox_core::{
  stats::Stats,
  store::{SubmissionFilter, SubmissionStore},
  submission::{Category, NewSubmission, Status, Submission, SubmissionPatch},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  ApiState,
  auth::Operator,
  error::{ApiError, store_err},
};

/// Unparseable ids are reported exactly like unknown ones.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw)
    .map_err(|_| ApiError::NotFound(format!("submission {raw} not found")))
}

/// `Json` whose rejections answer in the API's own error format.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /submissions`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<NewSubmission>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubmissionStore,
{
  let submission = state.store.create(body).await.map_err(store_err)?;
  tracing::info!(
    id = %submission.id,
    category = %submission.category,
    priority = submission.priority,
    "submission received"
  );
  Ok((StatusCode::CREATED, Json(submission)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub status:   Option<Status>,
  pub category: Option<Category>,
  pub tag:      Option<String>,
  /// Free-text filter over name, email, subject and message.
  pub q:        Option<String>,
}

impl From<ListParams> for SubmissionFilter {
  fn from(p: ListParams) -> Self {
    Self {
      status:   p.status,
      category: p.category,
      tag:      p.tag.filter(|t| !t.trim().is_empty()),
      text:     p.q.filter(|q| !q.trim().is_empty()),
    }
  }
}

/// `GET /submissions[?status=..][&category=..][&tag=..][&q=..]`
pub async fn list<S>(
  _op: Operator,
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Submission>>, ApiError>
where
  S: SubmissionStore,
{
  let all = state.store.list_all().await.map_err(store_err)?;
  Ok(Json(SubmissionFilter::from(params).apply(all)))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /submissions/stats`
pub async fn stats<S>(
  _op: Operator,
  State(state): State<ApiState<S>>,
) -> Result<Json<Stats>, ApiError>
where
  S: SubmissionStore,
{
  let stats = state.store.stats().await.map_err(store_err)?;
  Ok(Json(stats))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /submissions/:id`
pub async fn get_one<S>(
  _op: Operator,
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Submission>, ApiError>
where
  S: SubmissionStore,
{
  let id = parse_id(&id)?;
  let submission = state
    .store
    .get(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("submission {id} not found")))?;
  Ok(Json(submission))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /submissions/:id`
pub async fn update<S>(
  _op: Operator,
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  JsonBody(patch): JsonBody<SubmissionPatch>,
) -> Result<Json<Submission>, ApiError>
where
  S: SubmissionStore,
{
  let id = parse_id(&id)?;
  let submission = state.store.update(id, patch).await.map_err(store_err)?;
  tracing::debug!(id = %submission.id, status = %submission.status, "submission updated");
  Ok(Json(submission))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /submissions/:id`
pub async fn delete_one<S>(
  _op: Operator,
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubmissionStore,
{
  let id = parse_id(&id)?;
  if !state.store.delete(id).await.map_err(store_err)? {
    return Err(ApiError::NotFound(format!("submission {id} not found")));
  }
  tracing::debug!(%id, "submission deleted");
  Ok(Json(json!({ "deleted": true, "id": id })))
}
