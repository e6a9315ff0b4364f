//! JSON REST API for the contact inbox.
//!
//! Exposes an axum [`Router`] backed by any
//! [`inbox_core::store::SubmissionStore`]. Creating a submission is public;
//! every other route requires the operator secret (see [`auth`]).
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(inbox_api::api_router(ApiState::new(store, secret)))
//! ```

pub mod auth;
pub mod error;
pub mod submissions;

use std::sync::Arc;

use axum::{Router, routing::get};
use inbox_core::store::SubmissionStore;

pub use auth::{Operator, OperatorSecret};
pub use error::ApiError;

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:  Arc<S>,
  pub secret: Arc<OperatorSecret>,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, secret: OperatorSecret) -> Self {
    Self {
      store,
      secret: Arc::new(secret),
    }
  }
}

// Manual impl: cloning only bumps the `Arc`s, so `S` need not be `Clone`.
impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      secret: Arc::clone(&self.secret),
    }
  }
}

/// Build the fully-materialised API router.
///
/// The returned `Router<()>` can be merged or nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: SubmissionStore + 'static,
{
  Router::new()
    .route(
      "/submissions",
      get(submissions::list::<S>).post(submissions::create::<S>),
    )
    .route("/submissions/stats", get(submissions::stats::<S>))
    .route(
      "/submissions/{id}",
      get(submissions::get_one::<S>)
        .patch(submissions::update::<S>)
        .delete(submissions::delete_one::<S>),
    )
    .with_state(state)
}
