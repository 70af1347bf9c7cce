//! Error codes for the entity definition diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Semantic warnings
//! - `E3xx` - File inclusion errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated construct.
    ///
    /// A string, comment, definition block or element was opened but the
    /// input ended before it was closed.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that is not valid in this context.
    E002,

    /// Invalid character reference.
    ///
    /// An XML entity or numeric character reference could not be decoded.
    E003,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended unexpectedly before a complete construct was parsed.
    E101,

    /// Unknown directive.
    ///
    /// An `@` directive in an FGD file is not a known class or file directive.
    E102,

    /// Malformed document structure.
    ///
    /// XML tags are mismatched or the document root is not `<classes>`.
    E103,

    // =========================================================================
    // Semantic Warnings (E2xx)
    // =========================================================================
    /// Duplicate declaration.
    ///
    /// An attribute or class header field was declared more than once.
    E201,

    /// Invalid default value.
    ///
    /// A numeric attribute's default is not a number; the attribute is kept
    /// untyped with the literal default.
    E202,

    /// Deprecated legacy model syntax.
    ///
    /// A model definition uses the pre-expression syntax and was translated.
    E203,

    /// Unknown option.
    ///
    /// A class header option or definition block item is not recognized and
    /// was skipped.
    E204,

    /// Redundant class declaration.
    ///
    /// A class of the same kind and name is declared later and replaces this one.
    E205,

    /// Unknown superclass.
    ///
    /// A `base(...)` reference names no declared base class.
    E206,

    /// Cyclic inheritance.
    ///
    /// A base class inherits from itself through its superclasses.
    E207,

    /// Missing required value.
    ///
    /// An element lacks the attribute that names it, such as `name` or `key`.
    E208,

    /// Unexpected element.
    ///
    /// An element is not valid at this position and was skipped.
    E209,

    /// Invalid value.
    ///
    /// A color, box or bit value could not be read.
    E210,

    // =========================================================================
    // File Inclusion Errors (E3xx)
    // =========================================================================
    /// Recursive inclusion.
    ///
    /// A file includes itself, directly or through other files.
    E300,

    /// Unreadable include.
    ///
    /// An included file could not be opened.
    E301,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            // Parser errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            // Semantic warnings
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            ErrorCode::E207 => "E207",
            ErrorCode::E208 => "E208",
            ErrorCode::E209 => "E209",
            ErrorCode::E210 => "E210",
            // Inclusion errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "unterminated construct",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid character reference",
            // Parser errors
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "unknown directive",
            ErrorCode::E103 => "malformed document structure",
            // Semantic warnings
            ErrorCode::E201 => "duplicate declaration",
            ErrorCode::E202 => "invalid default value",
            ErrorCode::E203 => "deprecated legacy model syntax",
            ErrorCode::E204 => "unknown option",
            ErrorCode::E205 => "redundant class declaration",
            ErrorCode::E206 => "unknown superclass",
            ErrorCode::E207 => "cyclic inheritance",
            ErrorCode::E208 => "missing required value",
            ErrorCode::E209 => "unexpected element",
            ErrorCode::E210 => "invalid value",
            // Inclusion errors
            ErrorCode::E300 => "recursive inclusion",
            ErrorCode::E301 => "unreadable include",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
