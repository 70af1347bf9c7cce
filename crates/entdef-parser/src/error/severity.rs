//! Severity levels for diagnostics.

use std::fmt;

/// The severity level of a diagnostic.
///
/// - [`Severity::Error`] marks a structural failure or a skipped file
/// - [`Severity::Warning`] marks an advisory issue the parser recovered from
/// - [`Severity::Debug`] marks a note that is only interesting when tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// A problem that aborted parsing or dropped part of the input.
    Error,

    /// A recoverable issue.
    ///
    /// The parser picked a documented fallback and continued.
    Warning,

    /// A diagnostic note.
    Debug,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }

    /// Returns `true` if this is a debug severity.
    pub fn is_debug(&self) -> bool {
        matches!(self, Severity::Debug)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Debug => write!(f, "debug"),
        }
    }
}
