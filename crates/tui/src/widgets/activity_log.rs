//! Activity log of recent simulator events.

use chrono::{DateTime, Local};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use std::collections::VecDeque;

/// Lines kept before the oldest is dropped.
const CAPACITY: usize = 200;

/// Timestamped, bounded list of activity lines, newest last.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<(DateTime<Local>, String)>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.entries.len() == CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back((Local::now(), line.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, line)| line.as_str())
    }

    /// Renders the most recent entries that fit in `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Activity");
        let visible = usize::from(block.inner(area).height);

        let skip = self.entries.len().saturating_sub(visible);
        let lines: Vec<Line> = self
            .entries
            .iter()
            .skip(skip)
            .map(|(at, line)| {
                Line::from(vec![
                    Span::styled(
                        at.format("%H:%M:%S ").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(line.as_str()),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_capacity_drops_oldest() {
        let mut log = ActivityLog::new();
        for i in 0..CAPACITY + 5 {
            log.push(format!("event {i}"));
        }

        assert_eq!(log.len(), CAPACITY);
        assert_eq!(log.messages().next(), Some("event 5"));
    }

    #[test]
    fn test_render_shows_newest_entries() {
        let mut log = ActivityLog::new();
        for i in 0..10 {
            log.push(format!("event {i}"));
        }

        let backend = TestBackend::new(40, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| log.render(frame, frame.area())).unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains("Activity"));
        assert!(content.contains("event 9"));
        assert!(content.contains("event 7"));
        assert!(!content.contains("event 6"));
    }
}
