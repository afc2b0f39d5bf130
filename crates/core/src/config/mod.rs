//! Configuration loading and management.
//!
//! Loads the `.showcase/` directory structure, or the embedded default
//! catalog when a project has none.

pub mod error;
pub mod loader;
pub mod models;
