//! # ps-tui
//!
//! Terminal User Interface for pipeline-showcase.
//!
//! This crate draws the process tabs, the stage pipeline and the code
//! viewer of a showcase. It reads the simulation state published by
//! `ps-core` and sends user intents back as `Op`s from `ps-protocol`.

pub mod app;
pub mod event;
pub mod event_handler;
pub mod tui;
pub mod widgets;

pub use app::App;
pub use tui::Tui;

use anyhow::Result;
use ps_core::clipboard::{ClipboardSink, SystemClipboard};
use ps_core::config::models::AppConfig;
use ps_core::state::manager::{start_session, Session};
use std::sync::Arc;
use tracing::{info, warn};

/// Run the interactive showcase until the user quits.
///
/// Starts a simulator session for `config`, takes over the terminal, and
/// shuts the session down on the way out, also when the UI fails.
pub async fn run_app(config: AppConfig) -> Result<()> {
    let Session {
        simulator,
        op_tx,
        event_rx,
        task,
    } = start_session(&config, config.timing())?;

    let clipboard: Option<Arc<dyn ClipboardSink>> = match SystemClipboard::detect() {
        Ok(clipboard) => {
            info!(?clipboard, "Clipboard tool found");
            Some(Arc::new(clipboard))
        }
        Err(e) => {
            warn!(error = %e, "Copying is disabled");
            None
        }
    };

    let mut app = App::new(&config, simulator.subscribe(), op_tx, event_rx, clipboard);

    let result = match Tui::init() {
        Ok(mut tui) => {
            let result = app.run(&mut tui).await;
            let restored = tui.restore();
            result.and(restored)
        }
        Err(e) => Err(e),
    };

    // dropping the app closes the op channel, which also ends the session
    drop(app);
    simulator.shutdown();
    task.await?;

    result
}
