//! The `SubmissionStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `inbox-store-json`).
//! The API layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::Utc;
use uuid::Uuid;

use crate::{
  stats::Stats,
  submission::{Category, NewSubmission, Status, Submission, SubmissionPatch},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Dashboard-side filtering over [`SubmissionStore::list_all`].
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
  pub status:   Option<Status>,
  pub category: Option<Category>,
  /// Exact (case-insensitive) tag match.
  pub tag:      Option<String>,
  /// Case-insensitive substring over name, email, subject and message.
  pub text:     Option<String>,
}

impl SubmissionFilter {
  pub fn matches(&self, s: &Submission) -> bool {
    if self.status.is_some_and(|st| st != s.status) {
      return false;
    }
    if self.category.is_some_and(|c| c != s.category) {
      return false;
    }
    if let Some(tag) = &self.tag
      && !s.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    {
      return false;
    }
    if let Some(text) = &self.text {
      let needle = text.to_lowercase();
      let hit = [&s.name, &s.email, &s.subject, &s.message]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle));
      if !hit {
        return false;
      }
    }
    true
  }

  /// Keep matching submissions, newest first.
  pub fn apply(&self, submissions: Vec<Submission>) -> Vec<Submission> {
    let mut out: Vec<_> =
      submissions.into_iter().filter(|s| self.matches(s)).collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a submission store backend.
///
/// Writes (`create`, `update`, `delete`) must be mutually exclusive so that
/// concurrent callers never lose each other's changes. Reads may run
/// alongside writes and observe either the state before or after a write,
/// never a partial one.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SubmissionStore: Send + Sync {
  /// Backend error; convertible into [`crate::Error`] so callers can tell
  /// validation, not-found and persistence failures apart.
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Every stored submission, in no particular order. A store that has never
  /// been written is empty, not an error.
  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// Look up a single submission. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Validate `input` and persist a new submission with a fresh id,
  /// `status = new`, and both timestamps set to now.
  fn create(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Merge `patch` into the submission with `id`. Fails with a not-found
  /// error for an unknown id.
  fn update(
    &self,
    id: Uuid,
    patch: SubmissionPatch,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Remove the submission with `id`. Returns whether anything was removed.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Aggregates computed fresh from [`Self::list_all`] on every call.
  fn stats(
    &self,
  ) -> impl Future<Output = Result<Stats, Self::Error>> + Send + '_ {
    async move {
      let all = self.list_all().await?;
      Ok(Stats::compute(&all, Utc::now()))
    }
  }
}
