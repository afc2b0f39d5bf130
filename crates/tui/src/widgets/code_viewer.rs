//! Code viewer for the displayed stage.
//!
//! Shows a stage's code sample with its reveal progress while it executes,
//! or the plain sample with a copy action when the user picked the stage.
//! A second tab lists the tools the stage uses. Stages without content
//! render nothing.

use ps_protocol::catalog_models::StageDef;
use ps_protocol::content_models::StageContent;
use ps_protocol::simulation_models::RevealState;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Tabs, Wrap,
};
use ratatui::Frame;

/// Viewer tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewerTab {
    #[default]
    Code,
    Tools,
}

impl ViewerTab {
    pub fn toggle(self) -> Self {
        match self {
            ViewerTab::Code => ViewerTab::Tools,
            ViewerTab::Tools => ViewerTab::Code,
        }
    }

    fn index(self) -> usize {
        match self {
            ViewerTab::Code => 0,
            ViewerTab::Tools => 1,
        }
    }
}

/// What the viewer is showing this frame.
#[derive(Debug, Clone, Copy)]
pub struct ViewerContext<'a> {
    pub stage: &'a StageDef,
    pub content: &'a StageContent,
    /// Reveal progress, when it refers to `stage`.
    pub reveal: Option<&'a RevealState>,
    /// The stage is executing in a run rather than picked by the user.
    pub executing: bool,
    /// The "Copied!" indicator is up.
    pub copied: bool,
}

/// Viewer state kept by the application between frames.
#[derive(Debug, Clone, Default)]
pub struct CodeViewer {
    pub tab: ViewerTab,
    /// Current scroll offset (number of lines scrolled from the top).
    pub scroll_offset: usize,
}

impl CodeViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the code tab, scrolled to the top.
    pub fn reset(&mut self) {
        self.tab = ViewerTab::Code;
        self.scroll_offset = 0;
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Scroll down by one line, up to `max`.
    pub fn scroll_down(&mut self, max: usize) {
        self.scroll_offset = (self.scroll_offset + 1).min(max);
    }

    pub fn page_up(&mut self, page_size: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(page_size);
    }

    pub fn page_down(&mut self, page_size: usize, max: usize) {
        self.scroll_offset = (self.scroll_offset + page_size).min(max);
    }

    /// Scroll offset to draw with. While a stage executes the view follows
    /// the line being revealed instead of the manual offset; `lead` is the
    /// number of rows drawn above the first source line.
    fn effective_offset(&self, ctx: &ViewerContext<'_>, visible: usize, lead: usize) -> usize {
        match ctx.reveal {
            Some(reveal) if ctx.executing => {
                let follow = lead + reveal.revealed_lines + 1;
                follow.saturating_sub(visible)
            }
            _ => self.scroll_offset,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, ctx: Option<ViewerContext<'_>>) {
        let Some(ctx) = ctx else {
            return;
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} - {}", ctx.stage.name, ctx.content.title))
            .border_style(Style::default().fg(if ctx.executing {
                Color::Yellow
            } else {
                Color::White
            }));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // tabs + actions
                Constraint::Length(1), // description / execution status
                Constraint::Min(0),
            ])
            .split(inner);

        self.render_header(frame, chunks[0], &ctx);
        frame.render_widget(Paragraph::new(status_line(&ctx)), chunks[1]);

        match self.tab {
            ViewerTab::Code => self.render_code(frame, chunks[2], &ctx),
            ViewerTab::Tools => render_tools(frame, chunks[2], ctx.content),
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, ctx: &ViewerContext<'_>) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(22)])
            .split(area);

        let tabs = Tabs::new(vec!["Code", "Tools & Technologies"])
            .select(self.tab.index())
            .style(Style::default().fg(Color::DarkGray))
            .highlight_style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            );
        frame.render_widget(tabs, halves[0]);

        // copying is offered for picked stages only
        let action = if ctx.executing {
            Line::default()
        } else if ctx.copied {
            Line::from(Span::styled(
                "✓ Copied!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled("[c] Copy Code", Style::default().fg(Color::Gray)))
        };
        frame.render_widget(Paragraph::new(action.right_aligned()), halves[1]);
    }

    fn render_code(&self, frame: &mut Frame, area: Rect, ctx: &ViewerContext<'_>) {
        let source_lines = ctx.content.lines();
        let reveal = ctx.reveal.filter(|_| ctx.executing);

        let mut lines: Vec<Line> = Vec::with_capacity(source_lines.len() + 2);
        if !ctx.content.language.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("[{}]", ctx.content.language),
                Style::default().fg(Color::Gray),
            )));
        }
        let lead = lines.len();
        for (index, text) in source_lines.iter().enumerate() {
            lines.push(code_line(index, text, reveal));
        }
        if reveal.is_some_and(|r| r.finished) {
            lines.push(Line::from(Span::styled(
                "✓ Execution completed successfully!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
        }

        let total = lines.len();
        let visible = usize::from(area.height);
        let offset = self.effective_offset(ctx, visible, lead);

        let paragraph = Paragraph::new(lines).scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0));
        frame.render_widget(paragraph, area);

        if total > visible {
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(total)
                .viewport_content_length(visible)
                .position(offset);
            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));
            frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
        }
    }
}

fn status_line<'a>(ctx: &ViewerContext<'a>) -> Line<'a> {
    if !ctx.executing {
        return Line::from(Span::styled(
            ctx.content.description.as_str(),
            Style::default().fg(Color::Gray),
        ));
    }
    let text = if ctx.reveal.is_some_and(|r| r.finished) {
        format!("● {} - COMPLETED", ctx.stage.name)
    } else {
        format!("● Executing {}...", ctx.stage.name)
    };
    Line::from(Span::styled(text, Style::default().fg(Color::Green)))
}

/// One source line, styled by reveal progress: revealed lines are green,
/// the line being revealed is marked yellow.
fn code_line<'a>(index: usize, text: &'a str, reveal: Option<&RevealState>) -> Line<'a> {
    match reveal {
        Some(r) if r.is_revealed(index) => Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(text, Style::default().fg(Color::LightGreen)),
        ]),
        Some(r) if r.is_current(index) => Line::from(vec![
            Span::styled("▶ ", Style::default().fg(Color::Yellow)),
            Span::styled(
                text,
                Style::default()
                    .fg(Color::LightYellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        _ => Line::from(vec![Span::raw("  "), Span::raw(text)]),
    }
}

fn render_tools(frame: &mut Frame, area: Rect, content: &StageContent) {
    let lines: Vec<Line> = if content.tools.is_empty() {
        vec![Line::from(Span::styled(
            "No tools listed.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        content
            .tools
            .iter()
            .map(|tool| {
                Line::from(vec![
                    Span::styled("● ", Style::default().fg(Color::Cyan)),
                    Span::styled(tool.as_str(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(
                        "  Production-ready configuration",
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}
