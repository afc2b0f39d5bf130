//! State manager dispatching view operations to the simulator.
//!
//! The StateManager is the single entry point for user intents. It applies
//! [`Op`]s in arrival order and reports rejected ones as
//! [`Event::OpRejected`] without stopping.

use crate::config::models::AppConfig;
use crate::content::ContentProvider;
use crate::engine::{PipelineSimulator, SimulatorError};
use ps_protocol::config_models::TimingConfig;
use ps_protocol::ipc::{Event, Op};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Applies operations to a [`PipelineSimulator`].
pub struct StateManager {
    simulator: Arc<PipelineSimulator>,

    /// Channel for reporting rejected operations.
    events_tx: mpsc::UnboundedSender<Event>,
}

impl StateManager {
    pub fn new(simulator: Arc<PipelineSimulator>, events_tx: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            simulator,
            events_tx,
        }
    }

    pub fn simulator(&self) -> &Arc<PipelineSimulator> {
        &self.simulator
    }

    /// Applies one operation. Breaks on [`Op::Shutdown`].
    pub fn handle(&self, op: Op) -> ControlFlow<()> {
        debug!(?op, "Handling operation");

        let result = match op {
            Op::SelectProcess { process_id } => self.simulator.select_process(&process_id),
            Op::SelectStage { stage_id } => self.simulator.select_stage(&stage_id),
            Op::StartRun => {
                self.simulator.start_run();
                Ok(())
            }
            Op::CancelRun => {
                self.simulator.cancel_run();
                Ok(())
            }
            Op::CloseViewer => {
                self.simulator.close_viewer();
                Ok(())
            }
            Op::Shutdown => return ControlFlow::Break(()),
        };

        if let Err(e) = result {
            self.reject(e);
        }
        ControlFlow::Continue(())
    }

    fn reject(&self, error: SimulatorError) {
        warn!(error = %error, "Operation rejected");
        let _ = self.events_tx.send(Event::OpRejected {
            reason: error.to_string(),
        });
    }

    /// Consumes operations until [`Op::Shutdown`] or until every sender is
    /// dropped, then shuts the simulator down.
    pub async fn run(self, mut op_rx: mpsc::UnboundedReceiver<Op>) {
        while let Some(op) = op_rx.recv().await {
            if self.handle(op).is_break() {
                break;
            }
        }
        self.simulator.shutdown();
        debug!("State manager stopped");
    }
}

/// A running simulator together with the channels a view talks through.
pub struct Session {
    pub simulator: Arc<PipelineSimulator>,
    pub op_tx: mpsc::UnboundedSender<Op>,
    pub event_rx: mpsc::UnboundedReceiver<Event>,
    /// The [`StateManager::run`] task.
    pub task: JoinHandle<()>,
}

/// Builds a simulator for `config` and spawns its state manager.
///
/// `timing` overrides the configured timing (e.g. a sped-up headless run).
pub fn start_session(config: &AppConfig, timing: TimingConfig) -> Result<Session, SimulatorError> {
    let (events_tx, event_rx) = mpsc::unbounded_channel();
    let (op_tx, op_rx) = mpsc::unbounded_channel();

    let content: Arc<dyn ContentProvider> = config.content.clone();
    let simulator = Arc::new(PipelineSimulator::new(
        Arc::clone(&config.catalog),
        content,
        timing,
        config.initial_process().map(|p| p.id.as_str()),
        events_tx.clone(),
    )?);

    let manager = StateManager::new(Arc::clone(&simulator), events_tx);
    let task = tokio::spawn(manager.run(op_rx));

    Ok(Session {
        simulator,
        op_tx,
        event_rx,
        task,
    })
}
