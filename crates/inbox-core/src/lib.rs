//! Core types and trait definitions for the contact inbox.
//!
//! This crate is deliberately free of HTTP and storage dependencies. The
//! storage backends and the API layer depend on it; it depends on nothing
//! proprietary.

pub mod error;
pub mod stats;
pub mod store;
pub mod submission;
pub mod validate;

pub use error::{Error, Result, ValidationError};
