//! Terminal setup, input streaming and frame scheduling.
//!
//! `Tui` owns the ratatui terminal. Draws are never issued directly by the
//! application: it asks a [`FrameRequester`] for a frame and the scheduler
//! task coalesces every request due at or before the earliest deadline into
//! a single [`TuiEvent::Draw`].

use anyhow::Result;
use crossterm::event::Event;
use crossterm::event::KeyEvent;
use crossterm::execute;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::stdout;
use std::io::Stdout;
use std::pin::Pin;
use std::time::Duration;
use tokio::select;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_stream::Stream;
use tokio_stream::StreamExt;

pub type TerminalBackend = CrosstermBackend<Stdout>;

/// Input and redraw events delivered to the application loop.
#[derive(Debug)]
pub enum TuiEvent {
    Key(KeyEvent),
    /// A scheduled frame is due, or the terminal was resized.
    Draw,
}

pub struct Tui {
    terminal: Terminal<TerminalBackend>,
    frame_schedule_tx: mpsc::UnboundedSender<Instant>,
    draw_tx: broadcast::Sender<()>,
}

impl Tui {
    /// Switch the terminal to raw mode on the alternate screen and start the
    /// frame scheduler.
    pub fn init() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen)?;

        set_panic_hook();

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        let (frame_schedule_tx, frame_schedule_rx) = mpsc::unbounded_channel();
        let (draw_tx, _) = broadcast::channel(1);

        tokio::spawn(schedule_frames(frame_schedule_rx, draw_tx.clone()));

        Ok(Self {
            terminal,
            frame_schedule_tx,
            draw_tx,
        })
    }

    pub fn restore(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(stdout(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    pub fn frame_requester(&self) -> FrameRequester {
        FrameRequester {
            frame_schedule_tx: self.frame_schedule_tx.clone(),
        }
    }

    /// Merge key presses, resizes and scheduled frames into one stream.
    pub fn event_stream(&self) -> Pin<Box<dyn Stream<Item = TuiEvent> + Send + 'static>> {
        let mut crossterm_events = crossterm::event::EventStream::new();
        let mut draw_rx = self.draw_tx.subscribe();

        let event_stream = async_stream::stream! {
            loop {
                select! {
                    Some(Ok(event)) = crossterm_events.next() => {
                        match event {
                            Event::Key(key_event) => yield TuiEvent::Key(key_event),
                            Event::Resize(_, _) => yield TuiEvent::Draw,
                            _ => {}
                        }
                    }
                    result = draw_rx.recv() => {
                        match result {
                            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                                yield TuiEvent::Draw;
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }
            }
        };

        Box::pin(event_stream)
    }

    pub fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Coalesce frame requests: keep only the earliest pending deadline and
/// emit one draw when it passes.
async fn schedule_frames(mut rx: mpsc::UnboundedReceiver<Instant>, draw_tx: broadcast::Sender<()>) {
    let mut next_deadline: Option<Instant> = None;

    loop {
        let target = next_deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));
        let sleep = tokio::time::sleep_until(target);
        tokio::pin!(sleep);

        select! {
            recv = rx.recv() => match recv {
                Some(at) => {
                    if next_deadline.map_or(true, |current| at < current) {
                        next_deadline = Some(at);
                    }
                }
                None => break,
            },
            _ = &mut sleep => {
                if next_deadline.take().is_some() {
                    let _ = draw_tx.send(());
                }
            }
        }
    }
}

/// Handle for asking the scheduler for a redraw.
#[derive(Clone, Debug)]
pub struct FrameRequester {
    frame_schedule_tx: mpsc::UnboundedSender<Instant>,
}

impl FrameRequester {
    pub fn schedule_frame(&self) {
        let _ = self.frame_schedule_tx.send(Instant::now());
    }

    pub fn schedule_frame_in(&self, dur: Duration) {
        let _ = self.frame_schedule_tx.send(Instant::now() + dur);
    }
}

/// Restore the terminal before the default panic output is printed.
fn set_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}
