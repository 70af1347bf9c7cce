//! Error and diagnostic system for the entity definition parsers.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Source locations and labeled byte spans for rich error context
//! - Severity levels
//! - Diagnostic collector accumulating warnings next to the parse result
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error, warning or debug note with an optional error code, a
//! line/column location, labeled spans and help text. Structural failures are
//! returned as a [`ParseError`]; recoverable issues go to a
//! [`DiagnosticCollector`] and parsing continues.
//!
//! # Example
//!
//! ```
//! # use entdef_core::location::Location;
//! # use entdef_parser::error::{Diagnostic, ErrorCode};
//! # use entdef_parser::Span;
//!
//! let diag = Diagnostic::warning("duplicate attribute `angle`")
//!     .with_code(ErrorCode::E201)
//!     .with_location(Location::new(12, 5))
//!     .with_label(Span::new(140..145), "ignored declaration")
//!     .with_secondary_label(Span::new(90..95), "first declared here")
//!     .with_help("remove one of the declarations");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;

pub(crate) use parse_error::Result;
