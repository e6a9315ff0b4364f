//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Body text for failures whose details stay in the logs.
pub const GENERIC_FAILURE: &str = "could not process your request";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<inbox_core::Error> for ApiError {
  fn from(e: inbox_core::Error) -> Self {
    match e {
      inbox_core::Error::Validation(v) => Self::BadRequest(v.to_string()),
      inbox_core::Error::NotFound(id) => {
        Self::NotFound(format!("submission {id} not found"))
      }
      inbox_core::Error::Persistence(e) => Self::Store(e),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    let message = match rejection {
      JsonRejection::MissingJsonContentType(_) => {
        "request body must be JSON (Content-Type: application/json)"
      }
      JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
      JsonRejection::JsonDataError(_) => {
        "request body has a field of the wrong type"
      }
      _ => "could not read request body",
    };
    Self::BadRequest(message.to_owned())
  }
}

/// Classify any backend error. Used as `.map_err(store_err)`.
pub fn store_err<E: Into<inbox_core::Error>>(e: E) -> ApiError {
  ApiError::from(e.into())
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "unauthorized".to_owned())
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => {
        tracing::debug!(reason = %m, "rejected invalid request");
        (StatusCode::BAD_REQUEST, m.clone())
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, source = ?e, "submission store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_owned())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"inbox\""),
      );
    }
    res
  }
}
