//! Parser for expression tokens.
//!
//! Precedence, from loosest to tightest binding:
//!
//! | level | operators            |
//! |-------|----------------------|
//! | 1     | `\|\|`               |
//! | 2     | `&&`                 |
//! | 3     | `\|`                 |
//! | 4     | `^`                  |
//! | 5     | `&`                  |
//! | 6     | `==` `!=`            |
//! | 7     | `<` `<=` `>` `>=`    |
//! | 8     | `<<` `>>`            |
//! | 9     | `+` `-`              |
//! | 10    | `*` `/` `%`          |
//!
//! followed by unary `+ - ! ~`, subscripts `a[b]` and primary expressions.
//! Case arrows `cond -> value` are only valid directly inside a switch.

use winnow::{
    Parser,
    combinator::{alt, opt, separated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use entdef_core::expression::{
    BinaryOperator, Expression, ExpressionKind, UnaryOperator, Value,
};

use crate::{
    cursor::Snapshot,
    el::lexer::{ElToken, ElTokenKind},
    error::{Diagnostic, ErrorCode},
    span::Span,
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    StartOffset(usize),
}

type Input<'src> = TokenSlice<'src, ElToken<'src>>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

/// Tightest binary operator precedence.
const MAX_PRECEDENCE: u8 = 10;

fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

/// Matches a single token of `kind`.
fn token<'src>(
    kind: ElTokenKind,
    label: &'static str,
) -> impl Parser<Input<'src>, &'src ElToken<'src>, ErrMode<ContextError<Context>>> {
    any.verify(move |token: &ElToken<'_>| token.kind == kind)
        .context(Context::Label(label))
}

fn binary_operator_for(kind: ElTokenKind) -> Option<BinaryOperator> {
    Some(match kind {
        ElTokenKind::Star => BinaryOperator::Multiply,
        ElTokenKind::Slash => BinaryOperator::Divide,
        ElTokenKind::Percent => BinaryOperator::Modulo,
        ElTokenKind::Plus => BinaryOperator::Add,
        ElTokenKind::Minus => BinaryOperator::Subtract,
        ElTokenKind::Less => BinaryOperator::Less,
        ElTokenKind::LessOrEqual => BinaryOperator::LessOrEqual,
        ElTokenKind::Greater => BinaryOperator::Greater,
        ElTokenKind::GreaterOrEqual => BinaryOperator::GreaterOrEqual,
        ElTokenKind::Equal => BinaryOperator::Equal,
        ElTokenKind::NotEqual => BinaryOperator::NotEqual,
        ElTokenKind::ShiftLeft => BinaryOperator::ShiftLeft,
        ElTokenKind::ShiftRight => BinaryOperator::ShiftRight,
        ElTokenKind::Ampersand => BinaryOperator::BitwiseAnd,
        ElTokenKind::Caret => BinaryOperator::BitwiseXor,
        ElTokenKind::Pipe => BinaryOperator::BitwiseOr,
        ElTokenKind::And => BinaryOperator::And,
        ElTokenKind::Or => BinaryOperator::Or,
        _ => return None,
    })
}

fn unary_operator_for(kind: ElTokenKind) -> Option<UnaryOperator> {
    match kind {
        ElTokenKind::Plus => Some(UnaryOperator::Plus),
        ElTokenKind::Minus => Some(UnaryOperator::Minus),
        ElTokenKind::Not => Some(UnaryOperator::Not),
        ElTokenKind::Tilde => Some(UnaryOperator::BitwiseNot),
        _ => None,
    }
}

fn expression<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    binary(input, 1)
}

/// Parse a left-associative chain of operators of precedence `level`
fn binary<'src>(input: &mut Input<'src>, level: u8) -> IResult<Expression> {
    if level > MAX_PRECEDENCE {
        return unary(input);
    }

    let mut lhs = binary(input, level + 1)?;
    while let Some(operator) = opt(|input: &mut Input<'src>| binary_operator(input, level))
        .parse_next(input)?
    {
        let rhs = cut_err(input, |input| binary(input, level + 1))?;
        let location = lhs.location();
        lhs = Expression::new(
            ExpressionKind::Binary(operator, Box::new(lhs), Box::new(rhs)),
            location,
        );
    }
    Ok(lhs)
}

fn binary_operator<'src>(input: &mut Input<'src>, level: u8) -> IResult<BinaryOperator> {
    any.verify_map(|token: &ElToken<'_>| {
        binary_operator_for(token.kind).filter(|operator| operator.precedence() == level)
    })
    .parse_next(input)
}

fn unary<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    let operator = opt(any.verify_map(|token: &ElToken<'_>| {
        unary_operator_for(token.kind).map(|operator| (operator, token.location))
    }))
    .parse_next(input)?;

    match operator {
        Some((operator, location)) => {
            let operand = cut_err(input, unary)?;
            Ok(Expression::new(
                ExpressionKind::Unary(operator, Box::new(operand)),
                location,
            ))
        }
        None => postfix(input),
    }
}

/// Parse a primary expression followed by any number of `[index]` subscripts
fn postfix<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    let mut target = primary(input)?;
    while opt(token(ElTokenKind::OpenBracket, "`[`"))
        .parse_next(input)?
        .is_some()
    {
        let index = cut_err(input, |input| {
            let index = expression(input)?;
            token(ElTokenKind::CloseBracket, "`]`").parse_next(input)?;
            Ok(index)
        })?;
        let location = target.location();
        target = Expression::new(
            ExpressionKind::Subscript(Box::new(target), Box::new(index)),
            location,
        );
    }
    Ok(target)
}

fn primary<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    alt((literal, variable, group, array, switch, map))
        .context(Context::Label("expression"))
        .parse_next(input)
}

fn literal<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    any.verify_map(|token: &ElToken<'_>| {
        let value = match token.kind {
            ElTokenKind::String => Value::String(token.text.to_string()),
            ElTokenKind::Number => Value::Number(token.text.parse().ok()?),
            ElTokenKind::True => Value::Boolean(true),
            ElTokenKind::False => Value::Boolean(false),
            ElTokenKind::Null => Value::Null,
            _ => return None,
        };
        Some(Expression::literal(value, token.location))
    })
    .parse_next(input)
}

fn variable<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    any.verify_map(|token: &ElToken<'_>| match token.kind {
        ElTokenKind::Name => Some(Expression::new(
            ExpressionKind::Variable(token.text.to_string()),
            token.location,
        )),
        _ => None,
    })
    .parse_next(input)
}

/// Parse a parenthesized expression
///
/// Grouping leaves no node behind; precedence is restored by `Display`.
fn group<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    token(ElTokenKind::OpenParen, "`(`").parse_next(input)?;
    cut_err(input, |input| {
        let inner = expression(input)?;
        token(ElTokenKind::CloseParen, "`)`").parse_next(input)?;
        Ok(inner)
    })
}

/// Parse an array literal
///
/// Syntax: `[ expr, ... ]`
fn array<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    let open = token(ElTokenKind::OpenBracket, "`[`").parse_next(input)?;
    cut_err(input, |input| {
        let items: Vec<Expression> =
            separated(0.., expression, token(ElTokenKind::Comma, "`,`")).parse_next(input)?;
        token(ElTokenKind::CloseBracket, "`]`").parse_next(input)?;
        Ok(Expression::new(ExpressionKind::Array(items), open.location))
    })
}

/// Parse a map literal
///
/// Syntax: `{ "key": expr, ... }`
fn map<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    let open = token(ElTokenKind::OpenBrace, "`{`").parse_next(input)?;
    cut_err(input, |input| {
        let entries: Vec<(String, Expression)> =
            separated(0.., map_entry, token(ElTokenKind::Comma, "`,`")).parse_next(input)?;
        token(ElTokenKind::CloseBrace, "`}`").parse_next(input)?;
        Ok(Expression::new(ExpressionKind::Map(entries), open.location))
    })
}

fn map_entry<'src>(input: &mut Input<'src>) -> IResult<(String, Expression)> {
    let key = any
        .verify_map(|token: &ElToken<'_>| {
            matches!(token.kind, ElTokenKind::String | ElTokenKind::Name)
                .then(|| token.text.to_string())
        })
        .context(Context::Label("map key"))
        .parse_next(input)?;
    token(ElTokenKind::Colon, "`:`").parse_next(input)?;
    let value = expression(input)?;
    Ok((key, value))
}

/// Parse a switch
///
/// Syntax: `{{ case, ... }}` where a case is `condition -> value` or a plain value
fn switch<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    let open = token(ElTokenKind::OpenSwitch, "`{{`").parse_next(input)?;
    cut_err(input, |input| {
        let cases: Vec<Expression> =
            separated(0.., case, token(ElTokenKind::Comma, "`,`")).parse_next(input)?;
        token(ElTokenKind::CloseSwitch, "`}}`").parse_next(input)?;
        Ok(Expression::new(ExpressionKind::Switch(cases), open.location))
    })
}

fn case<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    let condition = expression(input)?;
    if opt(token(ElTokenKind::Arrow, "`->`"))
        .parse_next(input)?
        .is_none()
    {
        return Ok(condition);
    }

    let value = cut_err(input, expression)?;
    let location = condition.location();
    Ok(Expression::new(
        ExpressionKind::Case(Box::new(condition), Box::new(value)),
        location,
    ))
}

/// Convert a winnow error into a diagnostic pointing at the offending token
///
/// `end` is the position after the last token, used when the input ran out.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[ElToken<'_>],
    current_remaining: usize,
    end: Snapshot,
) -> Diagnostic {
    let position = tokens.len() - current_remaining;
    let end_span = Span::new(end.offset()..end.offset());

    let (location, found_span, found) = match tokens.get(position) {
        Some(token) => (token.location, token.span, format!("`{}`", token.text)),
        None => (end.location(), end_span, "end of expression".to_string()),
    };

    let context = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    let start_span = context
        .context()
        .find_map(|ctx| match ctx {
            Context::StartOffset(n) => tokens.get(tokens.len() - *n).map(|token| token.span),
            Context::Label(_) => None,
        })
        .unwrap_or(found_span);

    let expected: Vec<&str> = context
        .context()
        .filter_map(|ctx| match ctx {
            Context::Label(label) => Some(*label),
            Context::StartOffset(_) => None,
        })
        .collect();

    // The innermost label names the token that was missing.
    let message = match expected.first() {
        Some(label) => format!("expected {label} in expression, found {found}"),
        None => format!("unexpected {found} in expression"),
    };
    let code = if position < tokens.len() {
        ErrorCode::E100
    } else {
        ErrorCode::E101
    };

    Diagnostic::error(message)
        .with_code(code)
        .with_location(location)
        .with_label(start_span.union(found_span), code.description())
}

/// Builds an expression from all `tokens`.
///
/// `end` is the position right after the last token.
pub(super) fn build_expression<'src>(
    tokens: &'src [ElToken<'src>],
    end: Snapshot,
) -> Result<Expression, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    let result = expression.parse_next(&mut token_slice).and_then(|expression| {
        if token_slice.eof_offset() == 0 {
            Ok(expression)
        } else {
            let mut e = ContextError::new();
            e.push(Context::Label("end of expression"));
            Err(ErrMode::Cut(e))
        }
    });

    result.map_err(|e| convert_error(e, tokens, token_slice.eof_offset(), end))
}

#[cfg(test)]
mod tests {
    use entdef_core::location::Location;

    use super::*;
    use crate::el::{Termination, lexer::tokenize};

    fn parse(source: &str) -> Result<Expression, Diagnostic> {
        let (tokens, end) = tokenize(source, Snapshot::start(), Termination::Document)?;
        build_expression(&tokens, end)
    }

    fn canonical(source: &str) -> String {
        parse(source).unwrap().to_string()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(canonical("1 + 2 * 3"), "1 + 2 * 3");
        assert_eq!(canonical("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(canonical("a == 1 && b != 2 || !c"), "a == 1 && b != 2 || !c");
        assert_eq!(canonical("a - (b - c)"), "a - (b - c)");
    }

    #[test]
    fn test_bitwise_precedence() {
        assert_eq!(canonical("spawnflags & 1 == 1"), "spawnflags & 1 == 1");
        assert_eq!(canonical("(spawnflags & 3) == 1"), "(spawnflags & 3) == 1");
        assert_eq!(canonical("a | b ^ c & d"), "a | b ^ c & d");
        assert_eq!(canonical("(a | b) & ~c"), "(a | b) & ~c");
        assert_eq!(canonical("a & 1 && b | 2"), "a & 1 && b | 2");
        assert_eq!(
            parse("1 << 2 + 1").unwrap().optimize().as_literal(),
            Some(&Value::Number(8.0))
        );
        assert_eq!(
            parse("6 & 3 | 8 >> 1").unwrap().optimize().as_literal(),
            Some(&Value::Number(6.0))
        );
    }

    #[test]
    fn test_switch_on_flag_bits() {
        let expression = parse(
            "{{ spawnflags & 1 -> \":maps/b_bh10.bsp\", spawnflags & 2 -> \":maps/b_bh100.bsp\", \":maps/b_bh25.bsp\" }}",
        )
        .unwrap();
        let ExpressionKind::Switch(cases) = expression.kind() else {
            panic!("expected switch, got {expression:?}");
        };
        assert_eq!(cases.len(), 3);
        let ExpressionKind::Case(condition, _) = cases[0].kind() else {
            panic!("expected case, got {:?}", cases[0]);
        };
        assert!(matches!(
            condition.kind(),
            ExpressionKind::Binary(BinaryOperator::BitwiseAnd, ..)
        ));
    }

    #[test]
    fn test_binary_is_left_associative() {
        let expression = parse("8 - 4 - 2").unwrap();
        assert_eq!(expression.optimize().as_literal(), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_subscript_and_unary() {
        assert_eq!(canonical("-values[1]"), "-values[1]");
        assert_eq!(
            parse("[1, 2, 3][2]").unwrap().optimize().as_literal(),
            Some(&Value::Number(3.0))
        );
    }

    #[test]
    fn test_map_keys_may_be_names() {
        assert_eq!(
            canonical("{ path: \"a.mdl\", \"skin\": skin }"),
            "{ \"path\": \"a.mdl\", \"skin\": skin }"
        );
    }

    #[test]
    fn test_switch_cases() {
        assert_eq!(
            canonical("{{ spawnflags == 1 -> \"a.mdl\", (skin > 2) -> \"b.mdl\", \"c.mdl\" }}"),
            "{{ spawnflags == 1 -> \"a.mdl\", skin > 2 -> \"b.mdl\", \"c.mdl\" }}"
        );
    }

    #[test]
    fn test_empty_collections() {
        assert_eq!(canonical("[]"), "[]");
        assert_eq!(canonical("{}"), "{}");
        assert_eq!(canonical("{{}}"), "{{}}");
    }

    #[test]
    fn test_missing_operand_reports_end() {
        let error = parse("1 +").unwrap_err();
        assert_eq!(error.code(), Some(ErrorCode::E101));
    }

    #[test]
    fn test_unclosed_map_reports_expected_token() {
        let error = parse("{ \"path\": \"a.mdl\" \"skin\" }").unwrap_err();
        assert_eq!(error.code(), Some(ErrorCode::E100));
        assert_eq!(error.location(), Some(Location::new(1, 19)));
        assert!(error.message().contains("`}`"), "{}", error.message());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let error = parse("").unwrap_err();
        assert_eq!(error.code(), Some(ErrorCode::E101));
    }
}
