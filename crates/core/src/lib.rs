//! # ps-core
//!
//! Catalog loading and the pipeline simulation engine for pipeline-showcase.
//!
//! This crate provides:
//! - Configuration loading from the `.showcase/` directory (or the embedded
//!   default catalog)
//! - Stage content lookup and clipboard sinks
//! - The time-driven pipeline simulator and its state machine
//! - Operation dispatch for views
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`content`]: Stage content provider
//! - [`clipboard`]: Clipboard sinks for copying code samples
//! - [`engine`]: Pipeline simulator
//! - [`state`]: State transitions and operation dispatch
//! - [`init`]: `.showcase/` scaffolding

pub mod clipboard;
pub mod config;
pub mod content;
pub mod engine;
pub mod init;
pub mod state;
