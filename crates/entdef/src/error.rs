//! Error types for loading entity definitions.

use std::{io, path::PathBuf};

use thiserror::Error;

use entdef_core::color::ColorError;
use entdef_parser::{FileSystemError, error::ParseError};

/// The main error type for loader operations.
///
/// `Parse` and `DeniedWarnings` carry the root document text so the
/// diagnostics can be rendered against it.
#[derive(Debug, Error)]
pub enum EntdefError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    #[error("unsupported definition file `{}`: expected a .fgd, .def or .ent extension", .0.display())]
    UnknownFormat(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(#[from] ColorError),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("warnings are denied: {err}")]
    DeniedWarnings { err: ParseError, src: String },
}

impl EntdefError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
