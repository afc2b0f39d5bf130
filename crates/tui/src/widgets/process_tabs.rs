//! Process tab bar.

use super::process_color;
use ps_protocol::catalog_models::Catalog;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Tabs};
use ratatui::Frame;

/// Renders one tab per process, numbered for the `1`-`9` shortcuts, with
/// `active_process` highlighted in its own color.
pub fn render_process_tabs(frame: &mut Frame, area: Rect, catalog: &Catalog, active_process: &str) {
    let titles: Vec<Line> = catalog
        .processes
        .iter()
        .enumerate()
        .map(|(i, p)| Line::from(format!(" {} {} ", i + 1, p.title)))
        .collect();

    let selected = catalog.position(active_process).unwrap_or(0);
    let accent = catalog
        .process(active_process)
        .map_or(Color::Cyan, |p| process_color(&p.color));

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("DevOps Pipelines"),
        )
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(accent)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}
