//! User intents decoded from key presses.
//!
//! Keys are mapped to an [`Action`] first; the [`App`](crate::app::App)
//! then decides which of them become simulator operations and which only
//! touch view state.

/// Something the user asked the view to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Show the next process tab, wrapping around.
    NextProcess,
    PrevProcess,
    /// Show the process at a zero-based tab position.
    JumpToProcess(usize),
    /// Move the stage highlight right.
    HighlightNext,
    HighlightPrev,
    /// Toggle the manual selection of the highlighted stage.
    SelectHighlighted,
    StartRun,
    /// Close the code viewer, cancelling a run in progress.
    CloseViewer,
    CopyCode,
    /// Switch between the code and tools tabs of the viewer.
    ToggleTab,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_equality() {
        assert_eq!(Action::JumpToProcess(2), Action::JumpToProcess(2));
        assert_ne!(Action::JumpToProcess(0), Action::JumpToProcess(1));
        assert_ne!(Action::StartRun, Action::CloseViewer);
    }
}
