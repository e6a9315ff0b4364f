//! Whole-file load and atomic replace for the submission collection.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use inbox_core::submission::Submission;
use tokio::{fs, io::AsyncWriteExt as _};
use uuid::Uuid;

use crate::{Error, Result};

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
  move |source| Error::Io {
    path: path.to_path_buf(),
    source,
  }
}

/// Read and decode the collection at `path`.
///
/// A missing or blank file is an empty collection.
pub async fn load(path: &Path) -> Result<Vec<Submission>> {
  let bytes = match fs::read(path).await {
    Ok(bytes) => bytes,
    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
    Err(e) => return Err(io_err(path)(e)),
  };

  if bytes.iter().all(u8::is_ascii_whitespace) {
    return Ok(Vec::new());
  }

  serde_json::from_slice(&bytes).map_err(|source| Error::Json {
    path: path.to_path_buf(),
    source,
  })
}

/// Sibling path for a write in progress. Unique per call so that an
/// abandoned temp file never collides with a later write.
fn temp_path(path: &Path) -> PathBuf {
  path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()))
}

/// Encode `submissions` and atomically replace the file at `path`.
///
/// The payload is written and synced to a temporary file in the same
/// directory and then renamed over `path`, so concurrent readers see either
/// the old or the new collection.
pub async fn save(path: &Path, submissions: &[Submission]) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).await.map_err(io_err(parent))?;
  }

  let payload =
    serde_json::to_vec_pretty(submissions).map_err(|source| Error::Json {
      path: path.to_path_buf(),
      source,
    })?;

  let tmp = temp_path(path);
  if let Err(e) = write_synced(&tmp, &payload).await {
    discard(&tmp).await;
    return Err(e);
  }

  if let Err(e) = fs::rename(&tmp, path).await {
    discard(&tmp).await;
    return Err(io_err(path)(e));
  }

  Ok(())
}

async fn write_synced(path: &Path, payload: &[u8]) -> Result<()> {
  let mut file = fs::File::create(path).await.map_err(io_err(path))?;
  file.write_all(payload).await.map_err(io_err(path))?;
  file.sync_all().await.map_err(io_err(path))?;
  Ok(())
}

async fn discard(tmp: &Path) {
  if let Err(e) = fs::remove_file(tmp).await
    && e.kind() != ErrorKind::NotFound
  {
    tracing::warn!(path = ?tmp, error = %e, "failed to remove temporary store file");
  }
}
