//! Event handling utilities for the TUI.
//!
//! - Keyboard events are decoded into [`Action`]s
//! - Core events are rendered as activity log lines

use crate::event::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ps_protocol::catalog_models::Catalog;
use ps_protocol::ipc::Event;

/// Decode a key press. Releases, repeats and unbound keys yield `None`.
pub fn map_key(key_event: KeyEvent) -> Option<Action> {
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    let action = match key_event.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Tab => Action::NextProcess,
        KeyCode::BackTab => Action::PrevProcess,
        KeyCode::Char(c @ '1'..='9') => {
            Action::JumpToProcess(c.to_digit(10).map_or(0, |d| d as usize - 1))
        }
        KeyCode::Right | KeyCode::Char('l') => Action::HighlightNext,
        KeyCode::Left | KeyCode::Char('h') => Action::HighlightPrev,
        KeyCode::Enter | KeyCode::Char(' ') => Action::SelectHighlighted,
        KeyCode::Char('r') => Action::StartRun,
        KeyCode::Esc | KeyCode::Char('x') => Action::CloseViewer,
        KeyCode::Char('c') => Action::CopyCode,
        KeyCode::Char('t') => Action::ToggleTab,
        KeyCode::Up | KeyCode::Char('k') => Action::ScrollUp,
        KeyCode::Down | KeyCode::Char('j') => Action::ScrollDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        _ => return None,
    };
    Some(action)
}

/// One activity log line for a core event.
///
/// Per-line reveal progress is too chatty for the log and yields `None`.
pub fn describe_event(catalog: &Catalog, event: &Event) -> Option<String> {
    let stage_name = |stage_id: &str| {
        catalog
            .processes
            .iter()
            .find_map(|p| p.stage(stage_id))
            .map_or_else(|| stage_id.to_string(), |s| s.name.clone())
    };

    let line = match event {
        Event::ProcessSelected { process_id } => {
            let title = catalog
                .process(process_id)
                .map_or(process_id.as_str(), |p| p.title.as_str());
            format!("Switched to {title}")
        }
        Event::StageSelected {
            stage_id: Some(stage_id),
        } => format!("Viewing {}", stage_name(stage_id)),
        Event::StageSelected { stage_id: None } => "Viewer closed".to_string(),
        Event::RunStarted {
            process_id,
            stage_count,
            ..
        } => format!("Run started: {process_id} ({stage_count} stages)"),
        Event::StageStarted {
            stage_id, index, ..
        } => format!("[{}] Executing {}...", index + 1, stage_name(stage_id)),
        Event::RevealProgress { .. } => return None,
        Event::RevealFinished { stage_id, .. } => {
            format!("{} - COMPLETED", stage_name(stage_id))
        }
        Event::StageCompleted { stage_id, .. } => format!("✓ {} passed", stage_name(stage_id)),
        Event::RunCompleted { .. } => "Pipeline finished".to_string(),
        Event::RunCancelled { completed, .. } => {
            format!("Run cancelled after {} stage(s)", completed.len())
        }
        Event::OpRejected { reason } => format!("Rejected: {reason}"),
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use ps_protocol::catalog_models::{ProcessDef, StageDef};
    use uuid::Uuid;

    fn catalog() -> Catalog {
        Catalog::new(vec![ProcessDef {
            id: "cicd".to_string(),
            title: "CI/CD Pipeline".to_string(),
            description: String::new(),
            color: "blue".to_string(),
            order: 1,
            stages: vec![StageDef {
                id: "build".to_string(),
                name: "Build & Test".to_string(),
                description: String::new(),
            }],
        }])
    }

    #[test]
    fn test_map_key_bindings() {
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Tab)), Some(Action::NextProcess));
        assert_eq!(map_key(KeyEvent::from(KeyCode::BackTab)), Some(Action::PrevProcess));
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('1'))),
            Some(Action::JumpToProcess(0))
        );
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('3'))),
            Some(Action::JumpToProcess(2))
        );
        assert_eq!(map_key(KeyEvent::from(KeyCode::Enter)), Some(Action::SelectHighlighted));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('r'))), Some(Action::StartRun));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Esc)), Some(Action::CloseViewer));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('c'))), Some(Action::CopyCode));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('0'))), None);
        assert_eq!(map_key(KeyEvent::from(KeyCode::F(5))), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key), Some(Action::Quit));
    }

    #[test]
    fn test_key_release_is_ignored() {
        let key = KeyEvent::new_with_kind_and_state(
            KeyCode::Char('r'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert_eq!(map_key(key), None);
    }

    #[test]
    fn test_describe_event_uses_display_names() {
        let catalog = catalog();
        let run_id = Uuid::new_v4();

        assert_eq!(
            describe_event(
                &catalog,
                &Event::ProcessSelected {
                    process_id: "cicd".to_string()
                }
            )
            .as_deref(),
            Some("Switched to CI/CD Pipeline")
        );
        assert_eq!(
            describe_event(
                &catalog,
                &Event::StageStarted {
                    run_id,
                    stage_id: "build".to_string(),
                    index: 1,
                }
            )
            .as_deref(),
            Some("[2] Executing Build & Test...")
        );
        assert_eq!(
            describe_event(
                &catalog,
                &Event::RunCancelled {
                    run_id,
                    completed: vec!["source".to_string()],
                }
            )
            .as_deref(),
            Some("Run cancelled after 1 stage(s)")
        );
    }

    #[test]
    fn test_reveal_progress_is_not_logged() {
        let event = Event::RevealProgress {
            run_id: Uuid::new_v4(),
            stage_id: "build".to_string(),
            revealed_lines: 3,
            total_lines: 10,
        };
        assert_eq!(describe_event(&catalog(), &event), None);
    }
}
