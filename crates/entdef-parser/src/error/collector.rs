//! Collector for accumulating diagnostics during parsing.
//!
//! The [`DiagnosticCollector`] is the sink handed to every parser. Issues the
//! parser recovers from are recorded here and parsing continues; only
//! structural failures abort with a [`ParseError`].

use entdef_core::location::Location;
use log::{debug, trace, warn};

use crate::error::{Diagnostic, ParseError, Severity};

/// A collector for accumulating diagnostics.
///
/// # Example
///
/// ```
/// # use entdef_core::location::Location;
/// # use entdef_parser::error::{Diagnostic, DiagnosticCollector, ErrorCode};
///
/// let mut collector = DiagnosticCollector::new();
///
/// collector.warn(Location::new(4, 1), "class `light` is declared again later");
/// collector.emit(
///     Diagnostic::error("skipping recursively included file `base.fgd`")
///         .with_code(ErrorCode::E300)
///         .with_location(Location::new(1, 1)),
/// );
///
/// assert_eq!(collector.warning_count(), 1);
/// assert_eq!(collector.error_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a debug note at `location`.
    pub fn debug(&mut self, location: Location, message: impl Into<String>) {
        self.emit(Diagnostic::debug(message).with_location(location));
    }

    /// Record a warning at `location`.
    pub fn warn(&mut self, location: Location, message: impl Into<String>) {
        self.emit(Diagnostic::warning(message).with_location(location));
    }

    /// Record an error at `location`.
    pub fn error(&mut self, location: Location, message: impl Into<String>) {
        self.emit(Diagnostic::error(message).with_location(location));
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Error | Severity::Warning => {
                let code = diagnostic.code();
                warn!(code:?; "{diagnostic}");
            }
            Severity::Debug => trace!("{diagnostic}"),
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn debug_count(&self) -> usize {
        self.count(Severity::Debug)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// All diagnostics in the order they were emitted.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Finish collection and return a result.
    ///
    /// - If there are errors, returns `Err(ParseError)` with all diagnostics.
    /// - Otherwise returns the warnings and debug notes.
    pub fn finish(self) -> Result<Vec<Diagnostic>, ParseError> {
        if self.has_errors() {
            debug!(errors = self.error_count(); "Diagnostics contain errors");
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity() == severity)
            .count()
    }
}
