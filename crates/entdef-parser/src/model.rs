//! Model definitions shared by all formats.
//!
//! A model definition is parsed as an expression first. If that fails the
//! legacy syntax is tried from the same position; when it succeeds the
//! translated expression is used and a deprecation warning shows the
//! equivalent expression. When both fail the expression error is reported,
//! since it describes the current syntax.

use std::path::Path;

use log::trace;

use entdef_core::model::ModelDefinition;

use crate::{
    cursor::Snapshot,
    el::{self, Termination},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, Result},
    legacy_model::parse_legacy_model,
};

/// A parsed model definition and the position right after it.
#[derive(Debug)]
pub(crate) struct ParsedModel {
    pub definition: ModelDefinition,
    pub end: Snapshot,
}

pub(crate) fn parse_model_definition(
    source: &str,
    start: Snapshot,
    termination: Termination,
    file: Option<&Path>,
    diagnostics: &mut DiagnosticCollector,
) -> Result<ParsedModel> {
    let expression_error = match el::parse_expression(source, start, termination) {
        Ok((expression, end)) => {
            return Ok(ParsedModel {
                definition: ModelDefinition::new(expression.optimize()),
                end,
            });
        }
        Err(error) => error,
    };

    match parse_legacy_model(source, start, termination) {
        Ok((expression, end)) => {
            diagnostics.emit(
                Diagnostic::warning(format!(
                    "legacy model syntax is deprecated, the equivalent expression is `{expression}`"
                ))
                .with_code(ErrorCode::E203)
                .with_location(start.location())
                .with_file(file)
                .with_help("replace the model definition with the expression"),
            );
            Ok(ParsedModel {
                definition: ModelDefinition::new(expression),
                end,
            })
        }
        Err(legacy_error) => {
            trace!("Legacy model syntax did not match either: {legacy_error}");
            Err(expression_error)
        }
    }
}
