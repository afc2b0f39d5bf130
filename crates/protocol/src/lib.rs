//! # ps-protocol
//!
//! Core protocol definitions and data models for pipeline-showcase.
//!
//! This crate defines all shared data structures used for:
//! - Catalog files (YAML processes, TOML config, Markdown stage content)
//! - The simulation state published by the simulator
//! - Communication between views and the core
//!
//! ## Modules
//!
//! - [`catalog_models`]: Processes and their ordered stages
//! - [`content_models`]: Code samples displayed per stage
//! - [`config_models`]: Global configuration from config.toml
//! - [`simulation_models`]: Simulation state, reveal progress, stage status
//! - [`ipc`]: Operations and Events between views and the core
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, ts-rs, uuid and chrono
//! - TypeScript generation: All types derive `TS` for web clients
//! - Independent compilation: No dependencies on other pipeline-showcase crates

pub mod catalog_models;
pub mod config_models;
pub mod content_models;
pub mod ipc;
pub mod simulation_models;

// Re-export all public types for convenience
pub use catalog_models::*;
pub use config_models::*;
pub use content_models::*;
pub use ipc::*;
pub use simulation_models::*;
