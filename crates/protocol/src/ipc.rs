//! Communication protocol between the view and the simulator.
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: user intents sent from a view to the core
//! - `Event`: notifications sent from the core as the simulation moves
//!
//! Views read the authoritative [`SimulationState`](crate::SimulationState)
//! from the simulator's watch channel; events describe how it got there and
//! feed activity logs and headless output.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Operations sent from a view to the core.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "selectStage",
///   "payload": { "stage_id": "build" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Switch to another process tab.
    ///
    /// Cancels a run in progress on the current process.
    SelectProcess { process_id: String },

    /// Toggle the manual selection of a stage. Ignored while running.
    SelectStage { stage_id: String },

    /// Start a run of the active process. Ignored while running.
    StartRun,

    /// Stop the current run, keeping the stages that already passed.
    CancelRun,

    /// Dismiss the code viewer: cancels a run, or clears the selection.
    CloseViewer,

    /// Stop the core loop and every scheduled step.
    Shutdown,
}

/// Events sent from the core to views.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "stageCompleted",
///   "payload": { "run_id": "uuid-here", "stage_id": "build", "index": 1 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// The active process changed.
    ProcessSelected { process_id: String },

    /// The manual stage selection changed. `None` means cleared.
    StageSelected { stage_id: Option<String> },

    /// A run started on the active process.
    RunStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        process_id: String,
        stage_count: usize,
    },

    /// The run moved onto a stage.
    StageStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        stage_id: String,
        index: usize,
    },

    /// One more line of the executing stage was revealed.
    RevealProgress {
        #[ts(type = "string")]
        run_id: Uuid,
        stage_id: String,
        revealed_lines: usize,
        total_lines: usize,
    },

    /// Every line of the executing stage has been revealed.
    RevealFinished {
        #[ts(type = "string")]
        run_id: Uuid,
        stage_id: String,
    },

    /// A stage passed and was appended to the completed list.
    StageCompleted {
        #[ts(type = "string")]
        run_id: Uuid,
        stage_id: String,
        index: usize,
    },

    /// Every stage passed and the run ended.
    RunCompleted {
        #[ts(type = "string")]
        run_id: Uuid,
    },

    /// The run was stopped before finishing.
    RunCancelled {
        #[ts(type = "string")]
        run_id: Uuid,
        completed: Vec<String>,
    },

    /// An operation referenced something outside the catalog.
    OpRejected { reason: String },
}

impl Event {
    /// Run the event belongs to, if any.
    pub fn run_id(&self) -> Option<Uuid> {
        match self {
            Event::RunStarted { run_id, .. }
            | Event::StageStarted { run_id, .. }
            | Event::RevealProgress { run_id, .. }
            | Event::RevealFinished { run_id, .. }
            | Event::StageCompleted { run_id, .. }
            | Event::RunCompleted { run_id }
            | Event::RunCancelled { run_id, .. } => Some(*run_id),
            Event::ProcessSelected { .. }
            | Event::StageSelected { .. }
            | Event::OpRejected { .. } => None,
        }
    }
}
