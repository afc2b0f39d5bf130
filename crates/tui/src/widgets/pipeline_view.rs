//! Stage pipeline for the active process.
//!
//! Stages are drawn left to right as cards joined by connectors. Card
//! styling follows [`StageStatus`]; a connector lights up once the run has
//! moved past it or both of its stages passed.

use super::process_color;
use ps_protocol::catalog_models::ProcessDef;
use ps_protocol::simulation_models::{SimulationState, StageStatus};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::Frame;

const CONNECTOR_WIDTH: u16 = 3;

/// Card border color and status label for a stage.
fn status_style(status: StageStatus, accent: Color) -> (Style, &'static str) {
    match status {
        StageStatus::Executing => (
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            "RUNNING",
        ),
        StageStatus::Selected => (
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
            "VIEWING",
        ),
        StageStatus::Passed => (Style::default().fg(Color::Green), "PASSED"),
        StageStatus::Idle => (Style::default().fg(Color::DarkGray), ""),
    }
}

/// Renders the stages of `process` with their current status.
///
/// `highlighted` is the keyboard cursor; it is drawn with a thick border.
pub fn render_pipeline(
    frame: &mut Frame,
    area: Rect,
    process: &ProcessDef,
    state: &SimulationState,
    highlighted: usize,
) {
    let accent = process_color(&process.color);
    let title = if state.running {
        format!("{} - running", process.title)
    } else {
        process.title.clone()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if process.stages.is_empty() {
        frame.render_widget(
            Paragraph::new("This process has no stages.").alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let mut constraints = Vec::with_capacity(process.stages.len() * 2);
    for i in 0..process.stages.len() {
        if i > 0 {
            constraints.push(Constraint::Length(CONNECTOR_WIDTH));
        }
        constraints.push(Constraint::Fill(1));
    }
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(inner);

    for (i, stage) in process.stages.iter().enumerate() {
        let (style, label) = status_style(state.stage_status(i, &stage.id), accent);
        let border_type = if i == highlighted {
            BorderType::Thick
        } else {
            BorderType::Rounded
        };

        let mut lines = vec![Line::from(Span::styled(
            stage.name.clone(),
            style.add_modifier(Modifier::BOLD),
        ))];
        if !label.is_empty() {
            lines.push(Line::from(Span::styled(label, style)));
        }

        let card = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(border_type)
                    .border_style(style)
                    .title(format!("{}", i + 1)),
            );
        frame.render_widget(card, cells[i * 2]);

        if let Some(next) = process.stages.get(i + 1) {
            let lit = state.connector_lit(i, &stage.id, &next.id);
            let color = if lit { Color::Green } else { Color::DarkGray };
            let connector_area = cells[i * 2 + 1];
            let mid = connector_area.height / 2;
            let mut connector = vec![Line::default(); usize::from(mid)];
            connector.push(Line::from(Span::styled("─▶", Style::default().fg(color))));
            frame.render_widget(
                Paragraph::new(connector).alignment(Alignment::Center),
                connector_area,
            );
        }
    }
}
