//! Runtime simulation state models.
//!
//! This module defines the state published by the simulator and read by
//! any number of views. The simulator is its only writer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Progress of the line-by-line reveal of the stage currently executing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct RevealState {
    /// Stage whose source text is being revealed.
    pub stage_id: String,

    /// Number of lines revealed so far. Line `revealed_lines` (zero-based)
    /// is the one "executing" next.
    pub revealed_lines: usize,

    /// Total number of lines in the stage's source text.
    pub total_lines: usize,

    /// Set one tick after the last line was revealed.
    pub finished: bool,
}

impl RevealState {
    pub fn new(stage_id: impl Into<String>, total_lines: usize) -> Self {
        Self {
            stage_id: stage_id.into(),
            revealed_lines: 0,
            total_lines,
            finished: false,
        }
    }

    /// Whether the line at `index` has already been revealed.
    pub fn is_revealed(&self, index: usize) -> bool {
        index < self.revealed_lines
    }

    /// Whether the line at `index` is the one currently being revealed.
    pub fn is_current(&self, index: usize) -> bool {
        !self.finished && index == self.revealed_lines
    }
}

/// How a stage card should be drawn, derived from [`SimulationState`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    /// Nothing is happening with this stage.
    Idle,

    /// Picked by the user while no run is in progress.
    Selected,

    /// The stage the current run is dwelling on.
    Executing,

    /// Finished in the current (or last) run.
    Passed,
}

/// The state of the simulation, owned by the simulator.
///
/// Invariants maintained by the simulator:
/// - `selected_stage` is `None` whenever `running` is true.
/// - `cursor` and `run_id` are `Some` exactly when `running` is true.
/// - `completed` only grows during a run and is reset at run start and
///   on process switch.
/// - `reveal` is `None` outside a run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct SimulationState {
    /// Process currently shown.
    pub active_process: String,

    /// Stage picked by the user outside of a run.
    pub selected_stage: Option<String>,

    pub running: bool,

    /// Index into the active process's stages while running. A value equal
    /// to the stage count means every stage passed and the run is settling.
    pub cursor: Option<usize>,

    /// Stage ids finished in the current run, in completion order.
    pub completed: Vec<String>,

    /// Identity of the current run.
    #[ts(type = "string | null")]
    pub run_id: Option<Uuid>,

    pub run_started_at: Option<DateTime<Utc>>,

    pub reveal: Option<RevealState>,
}

impl SimulationState {
    /// Initial state for a freshly mounted simulator.
    pub fn new(active_process: impl Into<String>) -> Self {
        Self {
            active_process: active_process.into(),
            selected_stage: None,
            running: false,
            cursor: None,
            completed: Vec::new(),
            run_id: None,
            run_started_at: None,
            reveal: None,
        }
    }

    pub fn is_completed(&self, stage_id: &str) -> bool {
        self.completed.iter().any(|s| s == stage_id)
    }

    /// Status of the stage at `index` with id `stage_id`.
    ///
    /// Executing wins over selected, which wins over passed.
    pub fn stage_status(&self, index: usize, stage_id: &str) -> StageStatus {
        if self.running && self.cursor == Some(index) {
            StageStatus::Executing
        } else if !self.running && self.selected_stage.as_deref() == Some(stage_id) {
            StageStatus::Selected
        } else if self.is_completed(stage_id) {
            StageStatus::Passed
        } else {
            StageStatus::Idle
        }
    }

    /// Whether the connector between stage `index` and the next one is lit.
    pub fn connector_lit(&self, index: usize, stage_id: &str, next_stage_id: &str) -> bool {
        if self.running && self.cursor.is_some_and(|c| c > index) {
            return true;
        }
        self.is_completed(stage_id) && self.is_completed(next_stage_id)
    }
}
