//! TUI widgets module.
//!
//! This module contains the widgets composing the showcase screen.

pub mod activity_log;
pub mod code_viewer;
pub mod pipeline_view;
pub mod process_tabs;

pub use code_viewer::{CodeViewer, ViewerTab};

use ratatui::style::Color;

/// Terminal color for a process's `color` hint. Unknown names fall back to
/// cyan.
pub fn process_color(name: &str) -> Color {
    match name.to_ascii_lowercase().as_str() {
        "blue" => Color::Blue,
        "green" => Color::Green,
        "magenta" | "purple" => Color::Magenta,
        "red" => Color::Red,
        "yellow" | "orange" => Color::Yellow,
        "white" => Color::White,
        _ => Color::Cyan,
    }
}
