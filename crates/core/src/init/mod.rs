//! Initialization of a `.showcase/` directory.
//!
//! Writes the embedded default catalog to disk so it can be edited:
//! - Global configuration (`config.toml`)
//! - Process definitions (`processes/*.yaml`)
//! - Stage content (`content/<process>/<stage>.md`)

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_showcase_structure, InitOptions};
pub use templates::{get_template, list_templates};
