//! The embedded expression language used by model definitions.
//!
//! Expressions appear inside `model(...)` options of FGD and DEF files and in
//! the `model` attribute of ENT elements:
//!
//! ```text
//! {{ spawnflags == 1 -> ":progs/armor.mdl", { "path": ":progs/armor.mdl", "skin": 2 } }}
//! ```

mod lexer;
mod parser;

use entdef_core::expression::Expression;

use crate::{cursor::Snapshot, error::Result};

/// Where an expression ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Termination {
    /// Stop before the first `)` that closes no bracket opened by the expression.
    Embedded,
    /// The expression spans the rest of the source.
    Document,
}

/// Parses one expression starting at `start`.
///
/// Returns the expression and the position right after its last token.
pub(crate) fn parse_expression(
    source: &str,
    start: Snapshot,
    termination: Termination,
) -> Result<(Expression, Snapshot)> {
    let (tokens, end) = lexer::tokenize(source, start, termination)?;
    let expression = parser::build_expression(&tokens, end)?;
    Ok((expression, end))
}

#[cfg(test)]
mod tests {
    use entdef_core::{
        expression::{ExpressionKind, Value},
        location::Location,
    };

    use super::*;
    use crate::cursor::Cursor;

    fn parse(source: &str) -> Expression {
        parse_expression(source, Snapshot::start(), Termination::Document)
            .unwrap()
            .0
    }

    #[test]
    fn test_embedded_stops_before_closing_paren() {
        let source = r#"model({ "path": "a.mdl", "scale": (1 + 1) }) = next"#;
        let mut cursor = Cursor::new(source);
        cursor.eat_str("model(");

        let (expression, end) =
            parse_expression(source, cursor.snapshot(), Termination::Embedded).unwrap();
        assert_eq!(
            expression.optimize().to_string(),
            "{ \"path\": \"a.mdl\", \"scale\": 2 }"
        );

        cursor.restore(end);
        assert!(cursor.rest().starts_with(") = next"));
    }

    #[test]
    fn test_locations_follow_the_document() {
        let source = "model(\n  \"a.mdl\")";
        let mut cursor = Cursor::new(source);
        cursor.eat_str("model(");
        let (expression, _) =
            parse_expression(source, cursor.snapshot(), Termination::Embedded).unwrap();
        assert_eq!(expression.location(), Location::new(2, 3));
    }

    #[test]
    fn test_switch_with_cases() {
        let expression = parse(r#"{{ spawnflags == 1 -> "a.mdl", "b.mdl" }}"#);
        let ExpressionKind::Switch(cases) = expression.kind() else {
            panic!("expected switch, got {expression:?}");
        };
        assert_eq!(cases.len(), 2);
        assert!(matches!(cases[0].kind(), ExpressionKind::Case(..)));
        assert_eq!(
            cases[1].as_literal(),
            Some(&Value::String("b.mdl".to_string()))
        );
    }

    #[test]
    fn test_document_rejects_trailing_tokens() {
        let error = parse_expression("\"a\" \"b\"", Snapshot::start(), Termination::Document)
            .unwrap_err();
        assert!(error.severity().is_error());
    }
}
