//! Global configuration models for `.showcase/config.toml`.
//!
//! This module defines the settings file that picks the starting process
//! and tunes the simulation's pacing.

use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;
use ts_rs::TS;

/// Pacing of a simulated run, in milliseconds.
///
/// # Example
///
/// ```toml
/// [timing]
/// stage-dwell-ms = 3000
/// settle-ms = 1000
/// reveal-start-ms = 500
/// reveal-line-ms = 100
/// copy-feedback-ms = 2000
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case", default)]
pub struct TimingConfig {
    /// Time each stage spends "executing" before it is marked passed.
    pub stage_dwell_ms: u64,

    /// Delay between the last stage passing and the run ending.
    pub settle_ms: u64,

    /// Delay before the first line of a stage is revealed.
    pub reveal_start_ms: u64,

    /// Delay between two revealed lines.
    pub reveal_line_ms: u64,

    /// How long the "Copied!" indicator stays up after a copy.
    pub copy_feedback_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            stage_dwell_ms: 3000,
            settle_ms: 1000,
            reveal_start_ms: 500,
            reveal_line_ms: 100,
            copy_feedback_ms: 2000,
        }
    }
}

impl TimingConfig {
    pub fn stage_dwell(&self) -> Duration {
        Duration::from_millis(self.stage_dwell_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn reveal_start(&self) -> Duration {
        Duration::from_millis(self.reveal_start_ms)
    }

    pub fn reveal_line(&self) -> Duration {
        Duration::from_millis(self.reveal_line_ms)
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }

    /// Speed the simulation up by `factor`. Non-positive factors leave the
    /// timing unchanged.
    pub fn scaled(&self, factor: f64) -> Self {
        if factor.is_nan() || factor <= 0.0 {
            return *self;
        }
        let scale = |ms: u64| (ms as f64 / factor).round() as u64;
        Self {
            stage_dwell_ms: scale(self.stage_dwell_ms),
            settle_ms: scale(self.settle_ms),
            reveal_start_ms: scale(self.reveal_start_ms),
            reveal_line_ms: scale(self.reveal_line_ms),
            copy_feedback_ms: self.copy_feedback_ms,
        }
    }
}

/// Represents global settings from `.showcase/config.toml`.
///
/// # Example
///
/// ```toml
/// # .showcase/config.toml
/// default-process = "cicd"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Process shown on start. Falls back to the first catalog process.
    #[serde(default)]
    pub default_process: Option<String>,

    #[serde(default)]
    pub timing: TimingConfig,
}
