//! Structured diagnostic messages.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A diagnostic message with severity and optional footnotes.
///
/// The core operates on an in-memory design database rather than source
/// text, so diagnostics carry no source locations; the subject of a
/// message (a pattern, a module name) is embedded in the message itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The main diagnostic message.
    pub message: String,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    /// Creates a new informational note.
    pub fn note(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    /// Appends a footnote to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_constructor() {
        let d = Diagnostic::warning("pattern matched nothing");
        assert_eq!(d.severity, Severity::Warning);
        assert!(d.notes.is_empty());
    }

    #[test]
    fn with_note_appends() {
        let d = Diagnostic::error("bad selection").with_note("see select syntax");
        assert_eq!(d.notes.len(), 1);
    }

    #[test]
    fn display_format() {
        let d = Diagnostic::warning("w").with_note("n");
        assert_eq!(format!("{d}"), "warning: w\n  note: n");
    }

    #[test]
    fn serde_roundtrip() {
        let d = Diagnostic::note("hello");
        let json = serde_json::to_string(&d).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }
}
