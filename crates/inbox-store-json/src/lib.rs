//! JSON-file backend for the contact inbox.
//!
//! The whole collection lives in one JSON array on disk. Every operation
//! reads it in full; every mutation rewrites it in full through a temporary
//! file that is renamed over the original.

mod file;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::JsonFileStore;
