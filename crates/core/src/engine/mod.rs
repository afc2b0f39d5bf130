//! Pipeline simulation engine.
//!
//! The [`PipelineSimulator`] owns the [`SimulationState`] and the timers
//! that advance it. It is the only writer of the state; views read it
//! through [`PipelineSimulator::subscribe`] and follow [`Event`]s for
//! activity feeds.
//!
//! Every run owns a [`CancellationToken`]. Cancelling a run, switching
//! process, or shutting down cancels the token so sleeping steps wake up
//! and exit. Independently, each scheduled step re-checks the run id
//! inside the same critical section that mutates the state, so a step
//! that already woke up cannot touch a run that has been reset.

mod error;
mod reveal;

pub use error::SimulatorError;

use crate::content::ContentProvider;
use crate::state::transitions;
use chrono::Utc;
use ps_protocol::catalog_models::{Catalog, ProcessDef};
use ps_protocol::config_models::TimingConfig;
use ps_protocol::ipc::Event;
use ps_protocol::simulation_models::SimulationState;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// State shared between the simulator and its scheduled tasks.
pub(crate) struct Shared {
    catalog: Arc<Catalog>,
    content: Arc<dyn ContentProvider>,
    timing: TimingConfig,
    state_tx: watch::Sender<SimulationState>,
    events_tx: mpsc::UnboundedSender<Event>,
}

impl Shared {
    /// Applies a transition and publishes its events atomically.
    ///
    /// Watchers are only notified when the transition produced events.
    fn apply<F>(&self, transition: F) -> Vec<Event>
    where
        F: FnOnce(&mut SimulationState) -> Vec<Event>,
    {
        let mut emitted = Vec::new();
        self.state_tx.send_if_modified(|state| {
            emitted = transition(state);
            for event in &emitted {
                // A closed receiver only means nobody is listening.
                let _ = self.events_tx.send(event.clone());
            }
            !emitted.is_empty()
        });
        emitted
    }
}

/// Time-driven simulator of a process run.
///
/// Must be used from within a Tokio runtime: starting a run spawns tasks.
///
/// # Example
///
/// ```rust,no_run
/// use ps_core::content::ContentStore;
/// use ps_core::engine::PipelineSimulator;
/// use ps_protocol::{Catalog, TimingConfig};
/// use std::sync::Arc;
/// use tokio::sync::mpsc;
///
/// # async fn example(catalog: Catalog) -> Result<(), Box<dyn std::error::Error>> {
/// let (events_tx, _events_rx) = mpsc::unbounded_channel();
/// let simulator = PipelineSimulator::new(
///     Arc::new(catalog),
///     Arc::new(ContentStore::new()),
///     TimingConfig::default(),
///     None,
///     events_tx,
/// )?;
///
/// simulator.start_run();
/// let mut state_rx = simulator.subscribe();
/// state_rx.wait_for(|state| !state.running).await?;
/// # Ok(())
/// # }
/// ```
pub struct PipelineSimulator {
    shared: Arc<Shared>,
    /// Parent of every run token; cancelled on shutdown.
    root: CancellationToken,
    run_token: Mutex<Option<CancellationToken>>,
}

impl PipelineSimulator {
    /// Creates a simulator showing `initial_process`, or the first process
    /// of the catalog when `None`.
    pub fn new(
        catalog: Arc<Catalog>,
        content: Arc<dyn ContentProvider>,
        timing: TimingConfig,
        initial_process: Option<&str>,
        events_tx: mpsc::UnboundedSender<Event>,
    ) -> Result<Self, SimulatorError> {
        let active = match initial_process {
            Some(id) => catalog
                .process(id)
                .ok_or_else(|| SimulatorError::UnknownProcess(id.to_string()))?,
            None => catalog.first().ok_or(SimulatorError::EmptyCatalog)?,
        };

        let (state_tx, _) = watch::channel(SimulationState::new(active.id.clone()));

        Ok(Self {
            shared: Arc::new(Shared {
                catalog,
                content,
                timing,
                state_tx,
                events_tx,
            }),
            root: CancellationToken::new(),
            run_token: Mutex::new(None),
        })
    }

    /// A receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<SimulationState> {
        self.shared.state_tx.subscribe()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> SimulationState {
        self.shared.state_tx.borrow().clone()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.shared.catalog
    }

    pub fn timing(&self) -> TimingConfig {
        self.shared.timing
    }

    /// Switches to `process_id`, cancelling any run in progress.
    pub fn select_process(&self, process_id: &str) -> Result<(), SimulatorError> {
        if !self.shared.catalog.contains(process_id) {
            return Err(SimulatorError::UnknownProcess(process_id.to_string()));
        }

        let events = self
            .shared
            .apply(|state| transitions::switch_process(state, process_id));

        if !events.is_empty() {
            self.cancel_scheduled();
            info!(process_id, "Process selected");
        }
        Ok(())
    }

    /// Toggles the manual selection of a stage of the active process.
    ///
    /// Ignored while running. Unknown stages are rejected even then.
    pub fn select_stage(&self, stage_id: &str) -> Result<(), SimulatorError> {
        let catalog = &self.shared.catalog;
        let mut unknown = None;

        self.shared.apply(|state| {
            let known = catalog
                .process(&state.active_process)
                .is_some_and(|p| p.stage(stage_id).is_some());
            if known {
                transitions::toggle_stage(state, stage_id)
            } else {
                unknown = Some(state.active_process.clone());
                Vec::new()
            }
        });

        match unknown {
            Some(process_id) => Err(SimulatorError::UnknownStage {
                process_id,
                stage_id: stage_id.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Starts a run of the active process. Ignored while running.
    pub fn start_run(&self) {
        if self.root.is_cancelled() {
            debug!("Simulator shut down, start ignored");
            return;
        }

        let run_id = Uuid::new_v4();
        let catalog = &self.shared.catalog;
        let mut process: Option<ProcessDef> = None;

        let events = self.shared.apply(|state| {
            let Some(def) = catalog.process(&state.active_process) else {
                return Vec::new();
            };
            process = Some(def.clone());
            transitions::begin_run(state, run_id, Utc::now(), def.stage_count())
        });

        let Some(process) = process.filter(|_| !events.is_empty()) else {
            debug!("Run already in progress, start ignored");
            return;
        };

        info!(%run_id, process_id = %process.id, stages = process.stage_count(), "Run started");

        let token = self.root.child_token();
        if let Some(previous) = self.replace_run_token(Some(token.clone())) {
            previous.cancel();
        }
        tokio::spawn(drive_run(Arc::clone(&self.shared), run_id, process, token));
    }

    /// Stops the current run, keeping the stages that already passed.
    pub fn cancel_run(&self) {
        let events = self.shared.apply(transitions::cancel_run);
        if !events.is_empty() {
            self.cancel_scheduled();
            info!("Run cancelled");
        }
    }

    /// Dismisses the code viewer: cancels a run, or clears the selection.
    pub fn close_viewer(&self) {
        let events = self.shared.apply(transitions::close_viewer);
        if events
            .iter()
            .any(|e| matches!(e, Event::RunCancelled { .. }))
        {
            self.cancel_scheduled();
            info!("Run cancelled");
        }
    }

    /// Cancels every scheduled step. The simulator ignores runs afterwards.
    pub fn shutdown(&self) {
        self.shared.apply(transitions::cancel_run);
        self.root.cancel();
        debug!("Simulator shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }

    fn cancel_scheduled(&self) {
        if let Some(token) = self.replace_run_token(None) {
            token.cancel();
        }
    }

    fn replace_run_token(&self, token: Option<CancellationToken>) -> Option<CancellationToken> {
        let mut guard = self
            .run_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, token)
    }
}

impl Drop for PipelineSimulator {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

/// Walks the stages of `process` in order, then settles and ends the run.
async fn drive_run(shared: Arc<Shared>, run_id: Uuid, process: ProcessDef, token: CancellationToken) {
    for (index, stage) in process.stages.iter().enumerate() {
        let total_lines = shared
            .content
            .lookup(&process.id, &stage.id)
            .map(|content| content.line_count());

        let entered = shared.apply(|state| {
            transitions::enter_stage(state, run_id, index, &stage.id, total_lines)
        });
        if entered.is_empty() {
            return;
        }
        debug!(%run_id, stage_id = %stage.id, index, "Stage started");

        let reveal_token = token.child_token();
        if total_lines.is_some() {
            tokio::spawn(reveal::reveal_loop(
                Arc::clone(&shared),
                run_id,
                stage.id.clone(),
                reveal_token.clone(),
            ));
        }

        let dwelled = tokio::select! {
            _ = token.cancelled() => false,
            _ = tokio::time::sleep(shared.timing.stage_dwell()) => true,
        };
        reveal_token.cancel();
        if !dwelled {
            return;
        }

        let completed = shared.apply(|state| {
            transitions::complete_stage(state, run_id, index, &stage.id)
        });
        if completed.is_empty() {
            return;
        }
        debug!(%run_id, stage_id = %stage.id, index, "Stage passed");
    }

    tokio::select! {
        _ = token.cancelled() => return,
        _ = tokio::time::sleep(shared.timing.settle()) => {}
    }

    if !shared.apply(|state| transitions::finish_run(state, run_id)).is_empty() {
        info!(%run_id, process_id = %process.id, "Run completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentStore;
    use ps_protocol::catalog_models::StageDef;
    use ps_protocol::content_models::StageContent;
    use std::time::Duration;

    fn create_test_catalog() -> Catalog {
        let stage = |id: &str| StageDef {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: String::new(),
        };
        Catalog::new(vec![
            ProcessDef {
                id: "deploy".to_string(),
                title: "Deploy".to_string(),
                description: String::new(),
                color: "blue".to_string(),
                order: 1,
                stages: vec![stage("build"), stage("ship")],
            },
            ProcessDef {
                id: "empty".to_string(),
                title: "Empty".to_string(),
                description: String::new(),
                color: String::new(),
                order: 2,
                stages: Vec::new(),
            },
        ])
    }

    fn create_test_simulator() -> (PipelineSimulator, mpsc::UnboundedReceiver<Event>) {
        let mut content = ContentStore::new();
        content.insert(
            "deploy",
            "build",
            StageContent {
                title: "Build".to_string(),
                description: String::new(),
                language: "bash".to_string(),
                tools: Vec::new(),
                source_text: "make\nmake test".to_string(),
            },
        );
        let (tx, rx) = mpsc::unbounded_channel();
        let simulator = PipelineSimulator::new(
            Arc::new(create_test_catalog()),
            Arc::new(content),
            TimingConfig::default(),
            None,
            tx,
        )
        .unwrap();
        (simulator, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_new_defaults_to_first_process() {
        let (simulator, _rx) = create_test_simulator();
        let state = simulator.snapshot();

        assert_eq!(state.active_process, "deploy");
        assert!(!state.running);
        assert_eq!(state.cursor, None);
        assert!(state.completed.is_empty());
    }

    #[test]
    fn test_new_rejects_unknown_or_empty() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = PipelineSimulator::new(
            Arc::new(create_test_catalog()),
            Arc::new(ContentStore::new()),
            TimingConfig::default(),
            Some("nope"),
            tx.clone(),
        );
        assert_eq!(
            result.err(),
            Some(SimulatorError::UnknownProcess("nope".to_string()))
        );

        let result = PipelineSimulator::new(
            Arc::new(Catalog::default()),
            Arc::new(ContentStore::new()),
            TimingConfig::default(),
            None,
            tx,
        );
        assert_eq!(result.err(), Some(SimulatorError::EmptyCatalog));
    }

    #[test]
    fn test_select_unknown_ids() {
        let (simulator, mut rx) = create_test_simulator();

        assert!(matches!(
            simulator.select_process("nope"),
            Err(SimulatorError::UnknownProcess(_))
        ));
        assert!(matches!(
            simulator.select_stage("nope"),
            Err(SimulatorError::UnknownStage { .. })
        ));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_event_sequence() {
        let (simulator, mut rx) = create_test_simulator();
        let mut state_rx = simulator.subscribe();

        simulator.start_run();
        state_rx.wait_for(|s| !s.running).await.unwrap();

        let events = drain(&mut rx);
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                Event::RunStarted { .. } => "run",
                Event::StageStarted { .. } => "start",
                Event::RevealProgress { .. } => "line",
                Event::RevealFinished { .. } => "revealed",
                Event::StageCompleted { .. } => "pass",
                Event::RunCompleted { .. } => "done",
                _ => "other",
            })
            .collect();

        assert_eq!(
            kinds,
            vec!["run", "start", "line", "line", "revealed", "pass", "start", "pass", "done"]
        );

        let run_id = events[0].run_id();
        assert!(events.iter().all(|e| e.run_id() == run_id));
        assert_eq!(simulator.snapshot().completed, vec!["build", "ship"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_is_skipped_without_content() {
        let (simulator, _rx) = create_test_simulator();

        simulator.start_run();
        // second stage "ship" has no content
        tokio::time::sleep(Duration::from_millis(3500)).await;

        let state = simulator.snapshot();
        assert_eq!(state.cursor, Some(1));
        assert_eq!(state.reveal, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_process_completes_after_settle() {
        let (simulator, mut rx) = create_test_simulator();
        simulator.select_process("empty").unwrap();
        drain(&mut rx);

        simulator.start_run();
        assert_eq!(simulator.snapshot().cursor, Some(0));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(simulator.snapshot().running);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let state = simulator.snapshot();
        assert!(!state.running);
        assert!(state.completed.is_empty());
        assert!(matches!(
            drain(&mut rx).last(),
            Some(Event::RunCompleted { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_everything() {
        let (simulator, mut rx) = create_test_simulator();
        simulator.start_run();
        tokio::time::sleep(Duration::from_millis(1000)).await;

        simulator.shutdown();
        let after_shutdown = simulator.snapshot();
        assert!(!after_shutdown.running);
        drain(&mut rx);

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(simulator.snapshot(), after_shutdown);
        assert!(drain(&mut rx).is_empty());

        simulator.start_run();
        assert!(!simulator.snapshot().running);
        assert!(simulator.is_shut_down());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_scheduled_steps() {
        let (simulator, mut rx) = create_test_simulator();
        let state_rx = simulator.subscribe();
        simulator.start_run();
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(simulator);
        drain(&mut rx);

        tokio::time::sleep(Duration::from_millis(10_000)).await;

        // the run task held a clone of the sender; it is gone now
        assert!(drain(&mut rx).is_empty());
        assert!(state_rx.has_changed().is_err());
    }
}
