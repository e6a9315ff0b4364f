//! Operator shared-secret extractor and standalone verifier.
//!
//! The secret may be presented as `X-Admin-Secret: <secret>`,
//! `Authorization: Bearer <secret>`, or a `?secret=<secret>` query
//! parameter. It is accepted only on an exact match.

use std::fmt;

use axum::{
  extract::{FromRequestParts, Query},
  http::{HeaderMap, Uri, request::Parts},
};
use inbox_core::store::SubmissionStore;
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

pub const SECRET_HEADER: &str = "x-admin-secret";

/// The configured operator credential. Never empty.
#[derive(Clone)]
pub struct OperatorSecret(String);

impl OperatorSecret {
  /// Returns `None` for an empty (or whitespace-only) secret, which would
  /// otherwise match a blank header.
  pub fn new(secret: impl Into<String>) -> Option<Self> {
    let secret = secret.into();
    (!secret.trim().is_empty()).then_some(Self(secret))
  }

  pub fn matches(&self, candidate: &str) -> bool { self.0 == candidate }
}

impl fmt::Debug for OperatorSecret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("OperatorSecret(<redacted>)")
  }
}

/// Zero-size marker: present in the handler means the request carried the
/// operator secret.
pub struct Operator;

#[derive(Deserialize)]
struct SecretParam {
  secret: Option<String>,
}

fn presented(headers: &HeaderMap, uri: &Uri) -> Option<String> {
  if let Some(v) = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok()) {
    return Some(v.to_owned());
  }

  let bearer = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "));
  if let Some(token) = bearer {
    return Some(token.to_owned());
  }

  Query::<SecretParam>::try_from_uri(uri)
    .ok()
    .and_then(|Query(p)| p.secret)
}

/// Verify the operator secret from request headers or query string.
pub fn verify_secret(
  headers: &HeaderMap,
  uri: &Uri,
  secret: &OperatorSecret,
) -> Result<(), ApiError> {
  match presented(headers, uri) {
    Some(candidate) if secret.matches(&candidate) => Ok(()),
    Some(_) => {
      tracing::debug!(path = uri.path(), "rejected incorrect operator secret");
      Err(ApiError::Unauthorized)
    }
    None => {
      tracing::debug!(path = uri.path(), "rejected request without operator secret");
      Err(ApiError::Unauthorized)
    }
  }
}

impl<S> FromRequestParts<ApiState<S>> for Operator
where
  S: SubmissionStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_secret(&parts.headers, &parts.uri, &state.secret)?;
    Ok(Operator)
  }
}

#[cfg(test)]
mod tests {
  use axum::http::{HeaderValue, header};

  use super::*;

  fn secret() -> OperatorSecret { OperatorSecret::new("s3cret").unwrap() }

  fn uri(s: &str) -> Uri { s.parse().unwrap() }

  #[test]
  fn empty_secret_is_refused() {
    assert!(OperatorSecret::new("").is_none());
    assert!(OperatorSecret::new("   ").is_none());
  }

  #[test]
  fn debug_does_not_leak() {
    assert!(!format!("{:?}", secret()).contains("s3cret"));
  }

  #[test]
  fn header_secret() {
    let mut h = HeaderMap::new();
    h.insert(SECRET_HEADER, HeaderValue::from_static("s3cret"));
    assert!(verify_secret(&h, &uri("/submissions"), &secret()).is_ok());

    h.insert(SECRET_HEADER, HeaderValue::from_static("s3cret "));
    assert!(matches!(
      verify_secret(&h, &uri("/submissions"), &secret()),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn bearer_secret() {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer s3cret"));
    assert!(verify_secret(&h, &uri("/submissions"), &secret()).is_ok());

    h.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic s3cret"));
    assert!(verify_secret(&h, &uri("/submissions"), &secret()).is_err());
  }

  #[test]
  fn query_secret() {
    let h = HeaderMap::new();
    assert!(verify_secret(&h, &uri("/submissions?status=new&secret=s3cret"), &secret()).is_ok());
    assert!(verify_secret(&h, &uri("/submissions?secret=nope"), &secret()).is_err());
  }

  #[test]
  fn missing_secret() {
    let h = HeaderMap::new();
    assert!(matches!(
      verify_secret(&h, &uri("/submissions"), &secret()),
      Err(ApiError::Unauthorized)
    ));
  }
}
