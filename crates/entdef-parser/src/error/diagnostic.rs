//! The core diagnostic type.
//!
//! A [`Diagnostic`] represents a single error, warning or debug note with an
//! optional error code, its position in a definition file, labeled source
//! spans, and help text.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use entdef_core::location::Location;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A rich diagnostic message with source location information.
///
/// # Example
///
/// ```text
/// warning[E201]: duplicate attribute `angle` at line 12, column 5 in base.fgd
///   --> base.fgd:12:5
///    |
/// 12 |     angle(integer) : "Direction"
///    |     ^^^^^ ignored declaration
///    |
///   --> base.fgd:9:5
///    |
///  9 |     angle(float) : "Angle"
///    |     ----- first declared here
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    location: Option<Location>,
    file: Option<PathBuf>,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use entdef_parser::error::{Diagnostic, ErrorCode};
    /// # use entdef_parser::Span;
    ///
    /// let diag = Diagnostic::error("unexpected token `]`")
    ///     .with_code(ErrorCode::E100)
    ///     .with_label(Span::new(10..11), "expected `=`")
    ///     .with_help("class headers end with `= name`");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create a debug diagnostic.
    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(Severity::Debug, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Line and column the diagnostic points at, if known.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// The file the diagnostic belongs to, if it was not the in-memory root document.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the line and column.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the file the diagnostic was raised in.
    ///
    /// Does nothing when `file` is `None`, so callers can pass their optional
    /// origin path straight through.
    pub fn with_file<P: AsRef<Path>>(mut self, file: Option<P>) -> Self {
        if let Some(file) = file {
            self.file = Some(file.as_ref().to_path_buf());
        }
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Moves a diagnostic raised over a detached piece of text, such as an
    /// unescaped XML attribute value, to where that text sits in the document.
    ///
    /// Labels of the detached text are replaced by one covering `span`.
    pub(crate) fn relocated(mut self, location: Location, span: Span) -> Self {
        self.location = Some(location);
        self.labels = vec![Label::primary(span, "in this value")];
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            location: None,
            file: None,
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message at line 1, column 2 in file.fgd"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(location) = self.location {
            write!(f, " at {}", location)?;
        }
        if let Some(file) = &self.file {
            write!(f, " in {}", file.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(Severity::Error, "test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.location().is_none());
        assert!(diag.file().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_with_secondary_label() {
        let diag = Diagnostic::warning("duplicate attribute")
            .with_label(Span::new(10..20), "ignored declaration")
            .with_secondary_label(Span::new(5..15), "first declared here");

        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(diag.labels()[1].is_secondary());
    }

    #[test]
    fn test_diagnostic_with_file_none_keeps_file_unset() {
        let diag = Diagnostic::warning("w").with_file(None::<&Path>);
        assert!(diag.file().is_none());

        let diag = Diagnostic::warning("w").with_file(Some("defs/base.fgd"));
        assert_eq!(diag.file(), Some(Path::new("defs/base.fgd")));
    }

    #[test]
    fn test_diagnostic_display_without_location() {
        let diag = Diagnostic::new(Severity::Warning, "unknown option");

        assert_eq!(diag.to_string(), "warning: unknown option");
    }

    #[test]
    fn test_diagnostic_display_with_code_and_location() {
        let diag = Diagnostic::error("unexpected token")
            .with_code(ErrorCode::E100)
            .with_location(Location::new(3, 7))
            .with_file(Some("quake.fgd"));

        assert_eq!(
            diag.to_string(),
            "error[E100]: unexpected token at line 3, column 7 in quake.fgd"
        );
    }
}
