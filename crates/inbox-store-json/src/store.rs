//! [`JsonFileStore`] — the JSON-file implementation of [`SubmissionStore`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use inbox_core::{
  store::SubmissionStore,
  submission::{NewSubmission, Submission, SubmissionPatch},
};

use crate::{Result, file};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A submission store backed by a single JSON file.
///
/// Cloning is cheap — clones share the path and the write lock. Writes are
/// serialised only among handles derived from the same `open` call; two
/// independent stores (or processes) pointed at one file are not
/// coordinated.
#[derive(Clone)]
pub struct JsonFileStore {
  inner: Arc<Inner>,
}

struct Inner {
  path:  PathBuf,
  /// Held for the full read-modify-write cycle of every mutation.
  write: Mutex<()>,
}

/// Result of a mutation closure: whether the collection must be rewritten.
enum Outcome<T> {
  Changed(T),
  Unchanged(T),
}

impl JsonFileStore {
  /// Open a store at `path`. The file need not exist yet; if it does, it
  /// must decode, so that a corrupt file is reported at startup rather than
  /// on the first request.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let existing = file::load(&path).await?;
    tracing::debug!(path = ?path, count = existing.len(), "opened submission store");

    Ok(Self {
      inner: Arc::new(Inner {
        path,
        write: Mutex::new(()),
      }),
    })
  }

  pub fn path(&self) -> &Path { &self.inner.path }

  /// Run `op` against a freshly loaded collection while holding the write
  /// lock, persisting the result if `op` reports a change.
  async fn mutate<T, F>(&self, op: F) -> Result<T>
  where
    F: FnOnce(&mut Vec<Submission>) -> Result<Outcome<T>>,
  {
    let _guard = self.inner.write.lock().await;
    let mut all = file::load(&self.inner.path).await?;

    match op(&mut all)? {
      Outcome::Unchanged(value) => Ok(value),
      Outcome::Changed(value) => {
        file::save(&self.inner.path, &all).await?;
        tracing::debug!(
          path = ?self.inner.path,
          count = all.len(),
          "rewrote submission store"
        );
        Ok(value)
      }
    }
  }
}

// ─── SubmissionStore impl ────────────────────────────────────────────────────

impl SubmissionStore for JsonFileStore {
  type Error = crate::Error;

  async fn list_all(&self) -> Result<Vec<Submission>> {
    file::load(&self.inner.path).await
  }

  async fn get(&self, id: Uuid) -> Result<Option<Submission>> {
    let all = file::load(&self.inner.path).await?;
    Ok(all.into_iter().find(|s| s.id == id))
  }

  async fn create(&self, input: NewSubmission) -> Result<Submission> {
    let valid = input.validate()?;

    self
      .mutate(move |all| {
        // Ids are unique across the collection.
        let mut id = Uuid::new_v4();
        while all.iter().any(|s| s.id == id) {
          id = Uuid::new_v4();
        }

        let submission = Submission::new(valid, id, Utc::now());
        all.push(submission.clone());
        Ok(Outcome::Changed(submission))
      })
      .await
  }

  async fn update(&self, id: Uuid, patch: SubmissionPatch) -> Result<Submission> {
    self
      .mutate(move |all| {
        let submission = all
          .iter_mut()
          .find(|s| s.id == id)
          .ok_or(inbox_core::Error::NotFound(id))?;
        submission.apply(patch, Utc::now());
        Ok(Outcome::Changed(submission.clone()))
      })
      .await
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    self
      .mutate(move |all| {
        let before = all.len();
        all.retain(|s| s.id != id);
        if all.len() == before {
          Ok(Outcome::Unchanged(false))
        } else {
          Ok(Outcome::Changed(true))
        }
      })
      .await
  }
}
