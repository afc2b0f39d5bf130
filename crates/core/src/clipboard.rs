//! Clipboard sinks for the "copy code" action.
//!
//! [`SystemClipboard`] pipes text into the first platform clipboard tool
//! found on `PATH`. [`MemoryClipboard`] keeps copies in memory for tests.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::debug;

/// Errors returned by a [`ClipboardSink`].
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("No clipboard tool found (tried {0})")]
    NoTool(String),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Failed to write to {program}: {source}")]
    Write {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: ExitStatus },
}

/// Destination for copied text.
pub trait ClipboardSink: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard tools in lookup order, with the arguments that make them read
/// the clipboard contents from stdin.
const CANDIDATES: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
    ("clip.exe", &[]),
];

/// Clipboard backed by a platform command-line tool.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    program: PathBuf,
    args: Vec<String>,
}

impl SystemClipboard {
    /// Locates the first available clipboard tool.
    pub fn detect() -> Result<Self, ClipboardError> {
        for (name, args) in CANDIDATES {
            if let Ok(program) = which::which(name) {
                debug!(program = %program.display(), "Using clipboard tool");
                return Ok(Self {
                    program,
                    args: args.iter().map(|a| a.to_string()).collect(),
                });
            }
        }

        let tried: Vec<&str> = CANDIDATES.iter().map(|(name, _)| *name).collect();
        Err(ClipboardError::NoTool(tried.join(", ")))
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ClipboardError::Spawn {
                program: self.program_name(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|source| ClipboardError::Write {
                    program: self.program_name(),
                    source,
                })?;
        }

        let status = child.wait().map_err(|source| ClipboardError::Spawn {
            program: self.program_name(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::ExitStatus {
                program: self.program_name(),
                status,
            })
        }
    }
}

/// In-memory clipboard that records every copy.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    copies: Mutex<Vec<String>>,
    fail: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose every copy fails.
    pub fn failing() -> Self {
        Self {
            copies: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Everything copied so far, oldest first.
    pub fn copies(&self) -> Vec<String> {
        self.copies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.copies().pop()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::NoTool("memory clipboard disabled".to_string()));
        }
        self.copies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_records_copies() {
        let clipboard = MemoryClipboard::new();
        clipboard.copy("first").unwrap();
        clipboard.copy("second").unwrap();

        assert_eq!(clipboard.copies(), vec!["first", "second"]);
        assert_eq!(clipboard.last().as_deref(), Some("second"));
    }

    #[test]
    fn test_failing_clipboard() {
        let clipboard = MemoryClipboard::failing();

        let result = clipboard.copy("text");

        assert!(matches!(result, Err(ClipboardError::NoTool(_))));
        assert!(clipboard.copies().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_clipboard_pipes_stdin() {
        // `cat` stands in for a clipboard tool: it reads stdin and exits 0.
        let Ok(program) = which::which("cat") else {
            return;
        };
        let clipboard = SystemClipboard {
            program,
            args: Vec::new(),
        };

        assert!(clipboard.copy("hello").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_clipboard_reports_exit_status() {
        let Ok(program) = which::which("false") else {
            return;
        };
        let clipboard = SystemClipboard {
            program,
            args: Vec::new(),
        };

        let result = clipboard.copy("hello");

        // `false` may exit before reading, so the write can fail first.
        assert!(matches!(
            result,
            Err(ClipboardError::ExitStatus { .. } | ClipboardError::Write { .. })
        ));
    }
}
