//! Simulation state machine transitions.
//!
//! Each function mutates a [`SimulationState`] and returns the events that
//! describe the change. An empty list means the transition did not apply
//! and the state was left untouched; the simulator relies on this to skip
//! notifying watchers.
//!
//! Transitions driven by timers take the `run_id` they were scheduled for
//! and do nothing once the state has moved on to another run (or none).

use chrono::{DateTime, Utc};
use ps_protocol::ipc::Event;
use ps_protocol::simulation_models::{RevealState, SimulationState};
use uuid::Uuid;

/// Switch the active process.
///
/// Cancels a run in progress, then clears the completed list and the
/// manual selection. Selecting the active process again does nothing.
pub fn switch_process(state: &mut SimulationState, process_id: &str) -> Vec<Event> {
    if state.active_process == process_id {
        return Vec::new();
    }

    let mut events = cancel_run(state);
    state.completed.clear();
    state.selected_stage = None;
    state.active_process = process_id.to_string();

    events.push(Event::ProcessSelected {
        process_id: process_id.to_string(),
    });
    events
}

/// Toggle the manual selection of a stage. Ignored while running.
pub fn toggle_stage(state: &mut SimulationState, stage_id: &str) -> Vec<Event> {
    if state.running {
        return Vec::new();
    }

    state.selected_stage = match state.selected_stage.as_deref() {
        Some(current) if current == stage_id => None,
        _ => Some(stage_id.to_string()),
    };

    vec![Event::StageSelected {
        stage_id: state.selected_stage.clone(),
    }]
}

/// Enter running mode at the first stage. Ignored while running.
pub fn begin_run(
    state: &mut SimulationState,
    run_id: Uuid,
    started_at: DateTime<Utc>,
    stage_count: usize,
) -> Vec<Event> {
    if state.running {
        return Vec::new();
    }

    state.running = true;
    state.selected_stage = None;
    state.completed.clear();
    state.cursor = Some(0);
    state.run_id = Some(run_id);
    state.run_started_at = Some(started_at);
    state.reveal = None;

    vec![Event::RunStarted {
        run_id,
        process_id: state.active_process.clone(),
        stage_count,
    }]
}

/// Announce the stage at `index` and reset the reveal for it.
///
/// `total_lines` is `None` when the stage has no content, in which case
/// nothing is revealed.
pub fn enter_stage(
    state: &mut SimulationState,
    run_id: Uuid,
    index: usize,
    stage_id: &str,
    total_lines: Option<usize>,
) -> Vec<Event> {
    if state.run_id != Some(run_id) || state.cursor != Some(index) {
        return Vec::new();
    }

    state.reveal = total_lines.map(|total| RevealState::new(stage_id, total));

    vec![Event::StageStarted {
        run_id,
        stage_id: stage_id.to_string(),
        index,
    }]
}

/// Reveal one more line of `stage_id`, or mark the reveal finished when
/// every line is already shown.
pub fn advance_reveal(state: &mut SimulationState, run_id: Uuid, stage_id: &str) -> Vec<Event> {
    if state.run_id != Some(run_id) {
        return Vec::new();
    }
    let Some(reveal) = state
        .reveal
        .as_mut()
        .filter(|r| r.stage_id == stage_id && !r.finished)
    else {
        return Vec::new();
    };

    if reveal.revealed_lines < reveal.total_lines {
        reveal.revealed_lines += 1;
        vec![Event::RevealProgress {
            run_id,
            stage_id: stage_id.to_string(),
            revealed_lines: reveal.revealed_lines,
            total_lines: reveal.total_lines,
        }]
    } else {
        reveal.finished = true;
        vec![Event::RevealFinished {
            run_id,
            stage_id: stage_id.to_string(),
        }]
    }
}

/// Mark the stage at `index` passed and move the cursor past it.
pub fn complete_stage(
    state: &mut SimulationState,
    run_id: Uuid,
    index: usize,
    stage_id: &str,
) -> Vec<Event> {
    if state.run_id != Some(run_id) || state.cursor != Some(index) {
        return Vec::new();
    }

    state.completed.push(stage_id.to_string());
    state.cursor = Some(index + 1);
    state.reveal = None;

    vec![Event::StageCompleted {
        run_id,
        stage_id: stage_id.to_string(),
        index,
    }]
}

/// Leave running mode after every stage passed.
pub fn finish_run(state: &mut SimulationState, run_id: Uuid) -> Vec<Event> {
    if state.run_id != Some(run_id) {
        return Vec::new();
    }

    clear_run(state);

    vec![Event::RunCompleted { run_id }]
}

/// Stop the current run, keeping the stages that already passed.
pub fn cancel_run(state: &mut SimulationState) -> Vec<Event> {
    let Some(run_id) = state.run_id else {
        return Vec::new();
    };

    clear_run(state);

    vec![Event::RunCancelled {
        run_id,
        completed: state.completed.clone(),
    }]
}

/// Dismiss the code viewer: cancels a run, otherwise clears the selection.
pub fn close_viewer(state: &mut SimulationState) -> Vec<Event> {
    if state.running {
        return cancel_run(state);
    }

    match state.selected_stage.take() {
        Some(_) => vec![Event::StageSelected { stage_id: None }],
        None => Vec::new(),
    }
}

fn clear_run(state: &mut SimulationState) {
    state.running = false;
    state.cursor = None;
    state.run_id = None;
    state.run_started_at = None;
    state.reveal = None;
}
