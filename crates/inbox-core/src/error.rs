//! Error types for `inbox-core`.

use thiserror::Error;
use uuid::Uuid;

/// Why a create input was rejected. The message is safe to show to the
/// submitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{0} is required")]
  Missing(&'static str),

  #[error("email address is not valid")]
  InvalidEmail,
}

/// Backend-independent classification of store failures.
///
/// Every [`SubmissionStore`](crate::store::SubmissionStore) error converts
/// into this type, which is what the API layer maps onto status codes.
#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(#[from] ValidationError),

  #[error("submission not found: {0}")]
  NotFound(Uuid),

  #[error("persistence failure: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
