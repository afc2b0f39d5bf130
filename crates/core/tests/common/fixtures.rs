//! Test fixtures for catalogs, simulators and temporary projects.

use ps_core::config::loader::load_embedded;
use ps_core::config::models::AppConfig;
use ps_core::engine::PipelineSimulator;
use ps_protocol::config_models::TimingConfig;
use ps_protocol::ipc::Event;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Stage ids of the built-in CI/CD process, in order.
#[allow(dead_code)]
pub const CICD_STAGES: [&str; 5] = ["source", "build", "security", "deploy", "monitor"];

/// The embedded default configuration.
pub fn default_config() -> AppConfig {
    load_embedded().expect("embedded catalog should load")
}

/// A simulator over the embedded catalog with default timing, showing
/// `process_id`.
#[allow(dead_code)]
pub fn create_simulator(process_id: &str) -> (PipelineSimulator, mpsc::UnboundedReceiver<Event>) {
    create_simulator_with_timing(process_id, default_config().timing())
}

#[allow(dead_code)]
pub fn create_simulator_with_timing(
    process_id: &str,
    timing: TimingConfig,
) -> (PipelineSimulator, mpsc::UnboundedReceiver<Event>) {
    let config = default_config();
    let (tx, rx) = mpsc::unbounded_channel();
    let simulator = PipelineSimulator::new(
        config.catalog.clone(),
        config.content.clone(),
        timing,
        Some(process_id),
        tx,
    )
    .expect("process should exist");
    (simulator, rx)
}

/// A temporary project with a two-stage process and no content.
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let showcase_dir = temp_dir.path().join(".showcase");

    std::fs::create_dir_all(showcase_dir.join("processes"))?;
    std::fs::write(
        showcase_dir.join("config.toml"),
        "[timing]\nstage-dwell-ms = 200\nsettle-ms = 50\n",
    )?;
    std::fs::write(
        showcase_dir.join("processes/hotfix.yaml"),
        r#"id: hotfix
title: Hotfix
stages:
  - id: patch
    name: Patch
  - id: release
    name: Release
"#,
    )?;

    Ok(temp_dir)
}
