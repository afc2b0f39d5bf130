//! TUI application state and event loop.
//!
//! `App` reads the simulation state from the simulator's watch channel and
//! never mutates it: every user intent that changes the simulation is sent
//! to the core as an [`Op`]. View-only state (stage highlight, viewer tab,
//! scroll offset, copy feedback, activity log) lives here.

use anyhow::Result;
use crossterm::event::KeyEvent;
use ps_core::clipboard::ClipboardSink;
use ps_core::config::models::AppConfig;
use ps_core::content::ContentProvider;
use ps_protocol::catalog_models::{Catalog, ProcessDef, StageDef};
use ps_protocol::config_models::TimingConfig;
use ps_protocol::ipc::{Event, Op};
use ps_protocol::simulation_models::SimulationState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::sync::Arc;
use tokio::select;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::event::Action;
use crate::event_handler;
use crate::tui::{Tui, TuiEvent};
use crate::widgets::activity_log::ActivityLog;
use crate::widgets::code_viewer::ViewerContext;
use crate::widgets::pipeline_view::render_pipeline;
use crate::widgets::process_tabs::render_process_tabs;
use crate::widgets::CodeViewer;

/// Lines moved by PageUp/PageDown.
const PAGE_SIZE: usize = 10;

const HELP: &str =
    "Tab/1-9 process  ←/→ stage  Enter view  r run  Esc close  c copy  t tab  j/k scroll  q quit";

/// Main TUI application state.
pub struct App {
    catalog: Arc<Catalog>,
    content: Arc<dyn ContentProvider>,
    /// `None` when no clipboard tool is available.
    clipboard: Option<Arc<dyn ClipboardSink>>,
    timing: TimingConfig,
    state_rx: watch::Receiver<SimulationState>,
    op_tx: UnboundedSender<Op>,
    event_rx: UnboundedReceiver<Event>,
    pub activity: ActivityLog,
    /// Index of the stage card under the keyboard cursor.
    pub highlighted: usize,
    pub viewer: CodeViewer,
    copied_until: Option<Instant>,
    shown_process: String,
    shown_stage: Option<String>,
    pub should_exit: bool,
}

impl App {
    pub fn new(
        config: &AppConfig,
        state_rx: watch::Receiver<SimulationState>,
        op_tx: UnboundedSender<Op>,
        event_rx: UnboundedReceiver<Event>,
        clipboard: Option<Arc<dyn ClipboardSink>>,
    ) -> Self {
        let shown_process = state_rx.borrow().active_process.clone();
        let content: Arc<dyn ContentProvider> = config.content.clone();
        Self {
            catalog: Arc::clone(&config.catalog),
            content,
            clipboard,
            timing: config.timing(),
            state_rx,
            op_tx,
            event_rx,
            activity: ActivityLog::new(),
            highlighted: 0,
            viewer: CodeViewer::new(),
            copied_until: None,
            shown_process,
            shown_stage: None,
            should_exit: false,
        }
    }

    /// Main event loop.
    ///
    /// Redraws are requested whenever the simulation state changes, a core
    /// event arrives or a key is pressed; the frame scheduler coalesces them.
    pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
        let mut tui_events = tui.event_stream();
        let frames = tui.frame_requester();
        frames.schedule_frame();

        while !self.should_exit {
            select! {
                Some(event) = self.event_rx.recv() => {
                    self.handle_core_event(&event);
                    frames.schedule_frame();
                }
                Ok(()) = self.state_rx.changed() => {
                    self.sync_state();
                    frames.schedule_frame();
                }
                Some(tui_event) = tui_events.next() => match tui_event {
                    TuiEvent::Key(key_event) => {
                        if self.handle_key_event(key_event) == Some(Action::CopyCode)
                            && self.is_copied()
                        {
                            // clear the indicator once it expires
                            frames.schedule_frame_in(self.timing.copy_feedback());
                        }
                        frames.schedule_frame();
                    }
                    TuiEvent::Draw => tui.draw(|frame| self.render(frame))?,
                },
                else => break,
            }
        }

        Ok(())
    }

    fn state(&self) -> SimulationState {
        self.state_rx.borrow().clone()
    }

    fn process_of<'a>(&'a self, state: &SimulationState) -> Option<&'a ProcessDef> {
        self.catalog.process(&state.active_process)
    }

    /// The stage whose code the viewer shows, and whether it is executing.
    ///
    /// While running this is the stage under the cursor (the last revealed
    /// stage while the run settles); otherwise the user's selection.
    fn displayed_stage<'a>(
        process: &'a ProcessDef,
        state: &SimulationState,
    ) -> Option<(&'a StageDef, bool)> {
        if state.running {
            let by_cursor = state.cursor.and_then(|c| process.stages.get(c));
            let by_reveal = || {
                state
                    .reveal
                    .as_ref()
                    .and_then(|r| process.stage(&r.stage_id))
            };
            by_cursor.or_else(by_reveal).map(|stage| (stage, true))
        } else {
            state
                .selected_stage
                .as_deref()
                .and_then(|id| process.stage(id))
                .map(|stage| (stage, false))
        }
    }

    /// Reconcile view state with a new simulation state.
    pub fn sync_state(&mut self) {
        let state = self.state();

        if state.active_process != self.shown_process {
            debug!(process_id = %state.active_process, "Active process changed");
            self.shown_process = state.active_process.clone();
            self.highlighted = 0;
            self.viewer.reset();
        }

        let stage_id = self
            .process_of(&state)
            .and_then(|p| Self::displayed_stage(p, &state))
            .map(|(stage, _)| stage.id.clone());
        if stage_id != self.shown_stage {
            self.shown_stage = stage_id;
            self.viewer.scroll_offset = 0;
        }
    }

    pub fn handle_core_event(&mut self, event: &Event) {
        if let Some(line) = event_handler::describe_event(&self.catalog, event) {
            self.activity.push(line);
        }
    }

    /// Decode and apply a key press. Returns the action it mapped to.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> Option<Action> {
        let action = event_handler::map_key(key_event)?;
        self.handle_action(action);
        Some(action)
    }

    pub fn handle_action(&mut self, action: Action) {
        let state = self.state();
        let stage_count = self.process_of(&state).map_or(0, ProcessDef::stage_count);

        match action {
            Action::NextProcess => self.switch_process_by(&state, 1),
            Action::PrevProcess => self.switch_process_by(&state, -1),
            Action::JumpToProcess(index) => {
                if let Some(process) = self.catalog.processes.get(index) {
                    if process.id != state.active_process {
                        self.send(Op::SelectProcess {
                            process_id: process.id.clone(),
                        });
                    }
                }
            }
            Action::HighlightNext => {
                self.highlighted = (self.highlighted + 1).min(stage_count.saturating_sub(1));
            }
            Action::HighlightPrev => {
                self.highlighted = self.highlighted.saturating_sub(1);
            }
            Action::SelectHighlighted => {
                let stage_id = self
                    .process_of(&state)
                    .and_then(|p| p.stages.get(self.highlighted))
                    .map(|s| s.id.clone());
                if let Some(stage_id) = stage_id {
                    self.send(Op::SelectStage { stage_id });
                }
            }
            Action::StartRun => self.send(Op::StartRun),
            Action::CloseViewer => self.send(Op::CloseViewer),
            Action::CopyCode => self.copy_code(&state),
            Action::ToggleTab => self.viewer.tab = self.viewer.tab.toggle(),
            Action::ScrollUp => self.viewer.scroll_up(),
            Action::ScrollDown => self.viewer.scroll_down(self.max_scroll(&state)),
            Action::PageUp => self.viewer.page_up(PAGE_SIZE),
            Action::PageDown => self
                .viewer
                .page_down(PAGE_SIZE, self.max_scroll(&state)),
            Action::Quit => {
                self.send(Op::Shutdown);
                self.should_exit = true;
            }
        }
    }

    fn switch_process_by(&self, state: &SimulationState, step: isize) {
        let count = self.catalog.len();
        if count < 2 {
            return;
        }
        let current = self.catalog.position(&state.active_process).unwrap_or(0);
        let next = (current as isize + step).rem_euclid(count as isize) as usize;
        if let Some(process) = self.catalog.processes.get(next) {
            self.send(Op::SelectProcess {
                process_id: process.id.clone(),
            });
        }
    }

    fn send(&self, op: Op) {
        if self.op_tx.send(op).is_err() {
            warn!("Core loop has stopped; operation dropped");
        }
    }

    fn max_scroll(&self, state: &SimulationState) -> usize {
        self.process_of(state)
            .and_then(|p| Self::displayed_stage(p, state))
            .and_then(|(stage, _)| self.content.lookup(&state.active_process, &stage.id))
            .map_or(0, |c| c.line_count().saturating_sub(1))
    }

    /// Copy the selected stage's code. Only offered outside a run; failures
    /// are logged and otherwise ignored.
    fn copy_code(&mut self, state: &SimulationState) {
        if state.running {
            return;
        }
        let Some(stage_id) = state.selected_stage.as_deref() else {
            return;
        };
        let Some(content) = self.content.lookup(&state.active_process, stage_id) else {
            return;
        };
        let Some(clipboard) = &self.clipboard else {
            warn!("No clipboard tool available");
            return;
        };

        match clipboard.copy(&content.source_text) {
            Ok(()) => {
                info!(stage_id, "Copied stage code");
                self.copied_until = Some(Instant::now() + self.timing.copy_feedback());
            }
            Err(e) => warn!(error = %e, "Failed to copy stage code"),
        }
    }

    /// Whether the "Copied!" indicator is up.
    pub fn is_copied(&self) -> bool {
        self.copied_until.is_some_and(|until| Instant::now() < until)
    }

    pub fn render(&self, frame: &mut Frame) {
        let state = self.state();
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // process tabs
                Constraint::Length(7), // pipeline
                Constraint::Min(8),    // viewer + activity
                Constraint::Length(1), // help
            ])
            .split(area);

        render_process_tabs(frame, chunks[0], &self.catalog, &state.active_process);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
            .split(chunks[2]);

        match self.process_of(&state) {
            Some(process) => {
                render_pipeline(frame, chunks[1], process, &state, self.highlighted);
                self.render_viewer(frame, body[0], process, &state);
            }
            None => {
                let missing = Paragraph::new(format!("Unknown process {}", state.active_process))
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(missing, chunks[1]);
            }
        }

        self.activity.render(frame, body[1]);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray)))),
            chunks[3],
        );
    }

    fn render_viewer(&self, frame: &mut Frame, area: Rect, process: &ProcessDef, state: &SimulationState) {
        let Some((stage, executing)) = Self::displayed_stage(process, state) else {
            let hint = Paragraph::new(
                "Select a stage with ←/→ and Enter to view its code, or press r to run the pipeline.",
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Code"));
            frame.render_widget(hint, area);
            return;
        };

        let ctx = self
            .content
            .lookup(&process.id, &stage.id)
            .map(|content| ViewerContext {
                stage,
                content,
                reveal: state.reveal.as_ref().filter(|r| r.stage_id == stage.id),
                executing,
                copied: !executing && self.is_copied(),
            });
        self.viewer.render(frame, area, ctx);
    }
}
