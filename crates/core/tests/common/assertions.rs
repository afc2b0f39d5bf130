//! Assertion helpers for simulator events and state.

use ps_protocol::ipc::Event;
use ps_protocol::simulation_models::SimulationState;
use tokio::sync::mpsc;

/// Everything currently queued on the event channel.
#[allow(dead_code)]
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Stage ids of every `StageCompleted` event, in order.
#[allow(dead_code)]
pub fn completed_stage_ids(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::StageCompleted { stage_id, .. } => Some(stage_id.clone()),
            _ => None,
        })
        .collect()
}

/// Assert the idle-state invariants: no cursor, no run, no reveal.
#[allow(dead_code)]
pub fn assert_idle(state: &SimulationState) {
    assert!(!state.running, "expected idle state, got {:?}", state);
    assert_eq!(state.cursor, None);
    assert_eq!(state.run_id, None);
    assert_eq!(state.reveal, None);
}

/// Assert the running-state invariants.
#[allow(dead_code)]
pub fn assert_running(state: &SimulationState) {
    assert!(state.running, "expected running state, got {:?}", state);
    assert!(state.cursor.is_some());
    assert!(state.run_id.is_some());
    assert_eq!(state.selected_stage, None);
}
