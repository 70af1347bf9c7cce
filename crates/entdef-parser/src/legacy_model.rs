//! The pre-expression model syntax.
//!
//! ```text
//! model(":progs/armor.mdl" 0 0 spawnflags = 1, ":progs/armor.mdl" 1)
//! ```
//!
//! Each comma separated entry names a model path, an optional skin and frame,
//! and an optional `key = value` condition. Entries are translated into a
//! switch of map expressions so the rest of the pipeline only deals with
//! expressions.

use entdef_core::expression::{BinaryOperator, Expression, ExpressionKind, Value};

use crate::{
    cursor::Snapshot,
    el::Termination,
    error::{Diagnostic, ErrorCode, Result},
    fgd::lexer::{FgdLexer, FgdToken, FgdTokenKind},
};

/// Parses a legacy model list starting at `start`.
///
/// Returns the translated switch and the position right after the last
/// entry. With [`Termination::Embedded`] the list must be followed by `)`,
/// which is left unconsumed.
pub(crate) fn parse_legacy_model(
    source: &str,
    start: Snapshot,
    termination: Termination,
) -> Result<(Expression, Snapshot)> {
    let mut lexer = FgdLexer::at(source, start);
    let mut cases = Vec::new();

    loop {
        cases.push(static_model(&mut lexer)?);
        if lexer.peek_token()?.kind != FgdTokenKind::Comma {
            break;
        }
        lexer.next_token()?;
    }

    let next = lexer.peek_token()?;
    let expected = match termination {
        Termination::Embedded => FgdTokenKind::CloseParen,
        Termination::Document => FgdTokenKind::Eof,
    };
    if next.kind != expected {
        return Err(unexpected(&next, &expected.to_string()));
    }

    let location = cases
        .first()
        .map(Expression::location)
        .unwrap_or_else(|| start.location());
    Ok((
        Expression::new(ExpressionKind::Switch(cases), location),
        lexer.snapshot(),
    ))
}

/// Parse one `"path" [skin [frame]] [key = value]` entry
fn static_model(lexer: &mut FgdLexer<'_>) -> Result<Expression> {
    let path = lexer.next_token()?;
    if path.kind != FgdTokenKind::String {
        return Err(unexpected(&path, "model path"));
    }

    let mut entries = vec![(
        "path".to_string(),
        Expression::literal(Value::String(path.text.to_string()), path.location),
    )];
    for key in ["skin", "frame"] {
        let token = lexer.peek_token()?;
        if token.kind != FgdTokenKind::Integer {
            break;
        }
        lexer.next_token()?;
        entries.push((key.to_string(), number(&token)?));
    }

    let map = Expression::new(ExpressionKind::Map(entries), path.location);
    match condition(lexer)? {
        Some(condition) => Ok(Expression::new(
            ExpressionKind::Case(Box::new(condition), Box::new(map)),
            path.location,
        )),
        None => Ok(map),
    }
}

/// Parse an optional `key = value` condition into `key == value`
fn condition(lexer: &mut FgdLexer<'_>) -> Result<Option<Expression>> {
    let start = lexer.snapshot();
    let key = lexer.next_token()?;
    if key.kind != FgdTokenKind::Word || lexer.next_token()?.kind != FgdTokenKind::Equals {
        lexer.restore(start);
        return Ok(None);
    }

    let value = lexer.next_token()?;
    let value = match value.kind {
        FgdTokenKind::Integer | FgdTokenKind::Decimal => number(&value)?,
        FgdTokenKind::String | FgdTokenKind::Word => {
            Expression::literal(Value::String(value.text.to_string()), value.location)
        }
        _ => return Err(unexpected(&value, "condition value")),
    };

    let variable = Expression::new(ExpressionKind::Variable(key.text.to_string()), key.location);
    Ok(Some(Expression::new(
        ExpressionKind::Binary(BinaryOperator::Equal, Box::new(variable), Box::new(value)),
        key.location,
    )))
}

fn number(token: &FgdToken<'_>) -> Result<Expression> {
    let value: f64 = token
        .text
        .parse()
        .map_err(|_| unexpected(token, "number"))?;
    Ok(Expression::literal(Value::Number(value), token.location))
}

fn unexpected(token: &FgdToken<'_>, expected: &str) -> Diagnostic {
    let code = match token.kind {
        FgdTokenKind::Eof => ErrorCode::E101,
        _ => ErrorCode::E100,
    };
    Diagnostic::error(format!(
        "expected {expected} in legacy model, found {}",
        token.kind
    ))
    .with_code(code)
    .with_location(token.location)
    .with_label(token.span, code.description())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Cursor;

    fn translate(source: &str) -> String {
        parse_legacy_model(source, Snapshot::start(), Termination::Document)
            .unwrap()
            .0
            .to_string()
    }

    #[test]
    fn test_conditional_entries() {
        assert_eq!(
            translate(r#"":progs/armor.mdl" 0 0 spawnflags = 1, ":progs/armor.mdl" 2"#),
            r#"{{ spawnflags == 1 -> { "path": ":progs/armor.mdl", "skin": 0, "frame": 0 }, { "path": ":progs/armor.mdl", "skin": 2 } }}"#
        );
    }

    #[test]
    fn test_string_condition() {
        assert_eq!(
            translate(r#""a.mdl" style = "fast""#),
            r#"{{ style == "fast" -> { "path": "a.mdl" } }}"#
        );
    }

    #[test]
    fn test_embedded_stops_before_paren() {
        let source = r#"model("a.mdl" 1) = x"#;
        let mut cursor = Cursor::new(source);
        cursor.eat_str("model(");

        let (_, end) =
            parse_legacy_model(source, cursor.snapshot(), Termination::Embedded).unwrap();
        cursor.restore(end);
        assert!(cursor.rest().starts_with(") = x"));
    }

    #[test]
    fn test_rejects_missing_path() {
        let error =
            parse_legacy_model("spawnflags = 1", Snapshot::start(), Termination::Document)
                .unwrap_err();
        assert_eq!(error.code(), Some(ErrorCode::E100));
    }
}
