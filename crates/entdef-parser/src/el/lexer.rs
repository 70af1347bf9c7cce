//! Tokenizer for expressions.

use std::fmt;

use crate::{
    cursor::{Cursor, Snapshot},
    el::Termination,
    error::{Diagnostic, ErrorCode, Result},
    token::Token,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ElTokenKind {
    String,
    Number,
    Name,
    True,
    False,
    Null,
    OpenSwitch,
    CloseSwitch,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Comma,
    Colon,
    Arrow,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Not,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    ShiftLeft,
    ShiftRight,
    Ampersand,
    Caret,
    Pipe,
    Tilde,
    And,
    Or,
}

impl fmt::Display for ElTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElTokenKind::String => "string",
            ElTokenKind::Number => "number",
            ElTokenKind::Name => "name",
            ElTokenKind::True => "`true`",
            ElTokenKind::False => "`false`",
            ElTokenKind::Null => "`null`",
            ElTokenKind::OpenSwitch => "`{{`",
            ElTokenKind::CloseSwitch => "`}}`",
            ElTokenKind::OpenBrace => "`{`",
            ElTokenKind::CloseBrace => "`}`",
            ElTokenKind::OpenBracket => "`[`",
            ElTokenKind::CloseBracket => "`]`",
            ElTokenKind::OpenParen => "`(`",
            ElTokenKind::CloseParen => "`)`",
            ElTokenKind::Comma => "`,`",
            ElTokenKind::Colon => "`:`",
            ElTokenKind::Arrow => "`->`",
            ElTokenKind::Plus => "`+`",
            ElTokenKind::Minus => "`-`",
            ElTokenKind::Star => "`*`",
            ElTokenKind::Slash => "`/`",
            ElTokenKind::Percent => "`%`",
            ElTokenKind::Not => "`!`",
            ElTokenKind::Equal => "`==`",
            ElTokenKind::NotEqual => "`!=`",
            ElTokenKind::Less => "`<`",
            ElTokenKind::LessOrEqual => "`<=`",
            ElTokenKind::Greater => "`>`",
            ElTokenKind::GreaterOrEqual => "`>=`",
            ElTokenKind::ShiftLeft => "`<<`",
            ElTokenKind::ShiftRight => "`>>`",
            ElTokenKind::Ampersand => "`&`",
            ElTokenKind::Caret => "`^`",
            ElTokenKind::Pipe => "`|`",
            ElTokenKind::Tilde => "`~`",
            ElTokenKind::And => "`&&`",
            ElTokenKind::Or => "`||`",
        })
    }
}

pub(super) type ElToken<'src> = Token<'src, ElTokenKind>;

/// Tokenizes an expression starting at `start`.
///
/// Returns the tokens and the position after the last one. In
/// [`Termination::Embedded`] mode the lexer stops in front of the first `)`
/// that does not close a bracket opened by the expression.
pub(super) fn tokenize<'src>(
    source: &'src str,
    start: Snapshot,
    termination: Termination,
) -> Result<(Vec<ElToken<'src>>, Snapshot)> {
    let mut cursor = Cursor::at(source, start);
    let mut tokens = Vec::new();
    // Open brackets, innermost last.
    let mut open = Vec::new();

    loop {
        let end = cursor.snapshot();
        cursor.skip_whitespace_and_comments();
        let Some(c) = cursor.peek() else {
            return Ok((tokens, end));
        };
        if c == ')' && open.is_empty() && termination == Termination::Embedded {
            return Ok((tokens, end));
        }

        let token = next_token(&mut cursor, &open)?;
        match token.kind {
            ElTokenKind::OpenSwitch
            | ElTokenKind::OpenBrace
            | ElTokenKind::OpenBracket
            | ElTokenKind::OpenParen => open.push(token.kind),
            ElTokenKind::CloseSwitch
            | ElTokenKind::CloseBrace
            | ElTokenKind::CloseBracket
            | ElTokenKind::CloseParen => {
                open.pop();
            }
            _ => {}
        }
        tokens.push(token);
    }
}

fn next_token<'src>(cursor: &mut Cursor<'src>, open: &[ElTokenKind]) -> Result<ElToken<'src>> {
    let start = cursor.snapshot();
    let Some(c) = cursor.advance() else {
        return Err(Diagnostic::error("unexpected end of expression")
            .with_code(ErrorCode::E101)
            .with_location(start.location()));
    };

    let kind = match c {
        '"' => return string(cursor, start),
        c if c.is_ascii_digit() => {
            cursor.advance_while(|c| c.is_ascii_digit());
            if cursor.peek() == Some('.') && cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
            {
                cursor.advance();
                cursor.advance_while(|c| c.is_ascii_digit());
            }
            ElTokenKind::Number
        }
        c if c.is_alphabetic() || c == '_' => {
            cursor.advance_while(|c| c.is_alphanumeric() || c == '_');
            match cursor.slice_from(start) {
                "true" => ElTokenKind::True,
                "false" => ElTokenKind::False,
                "null" => ElTokenKind::Null,
                _ => ElTokenKind::Name,
            }
        }
        '{' if cursor.eat('{') => ElTokenKind::OpenSwitch,
        '{' => ElTokenKind::OpenBrace,
        // `}}` only closes a switch; nested maps end with two single braces.
        '}' if open.last() == Some(&ElTokenKind::OpenSwitch) && cursor.eat('}') => {
            ElTokenKind::CloseSwitch
        }
        '}' => ElTokenKind::CloseBrace,
        '[' => ElTokenKind::OpenBracket,
        ']' => ElTokenKind::CloseBracket,
        '(' => ElTokenKind::OpenParen,
        ')' => ElTokenKind::CloseParen,
        ',' => ElTokenKind::Comma,
        ':' => ElTokenKind::Colon,
        '-' if cursor.eat('>') => ElTokenKind::Arrow,
        '-' => ElTokenKind::Minus,
        '+' => ElTokenKind::Plus,
        '*' => ElTokenKind::Star,
        '/' => ElTokenKind::Slash,
        '%' => ElTokenKind::Percent,
        '=' if cursor.eat('=') => ElTokenKind::Equal,
        '!' if cursor.eat('=') => ElTokenKind::NotEqual,
        '!' => ElTokenKind::Not,
        '<' if cursor.eat('<') => ElTokenKind::ShiftLeft,
        '<' if cursor.eat('=') => ElTokenKind::LessOrEqual,
        '<' => ElTokenKind::Less,
        '>' if cursor.eat('>') => ElTokenKind::ShiftRight,
        '>' if cursor.eat('=') => ElTokenKind::GreaterOrEqual,
        '>' => ElTokenKind::Greater,
        '&' if cursor.eat('&') => ElTokenKind::And,
        '&' => ElTokenKind::Ampersand,
        '|' if cursor.eat('|') => ElTokenKind::Or,
        '|' => ElTokenKind::Pipe,
        '^' => ElTokenKind::Caret,
        '~' => ElTokenKind::Tilde,
        c => {
            return Err(Diagnostic::error(format!(
                "unexpected character `{c}` in expression"
            ))
            .with_code(ErrorCode::E002)
            .with_location(start.location())
            .with_label(cursor.span_from(start), ErrorCode::E002.description()));
        }
    };

    Ok(Token::new(
        kind,
        cursor.slice_from(start),
        cursor.span_from(start),
        start.location(),
    ))
}

fn string<'src>(cursor: &mut Cursor<'src>, start: Snapshot) -> Result<ElToken<'src>> {
    let content_start = cursor.snapshot();
    cursor.advance_while(|c| c != '"');
    let content = cursor.slice_from(content_start);
    if !cursor.eat('"') {
        return Err(Diagnostic::error("unterminated string in expression")
            .with_code(ErrorCode::E001)
            .with_location(start.location())
            .with_label(cursor.span_from(start), "string starts here"));
    }
    Ok(Token::new(
        ElTokenKind::String,
        content,
        cursor.span_from(start),
        start.location(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<ElTokenKind> {
        tokenize(source, Snapshot::start(), Termination::Document)
            .unwrap()
            .0
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a -> -b == !c != d <= e >= f && g || h"),
            vec![
                ElTokenKind::Name,
                ElTokenKind::Arrow,
                ElTokenKind::Minus,
                ElTokenKind::Name,
                ElTokenKind::Equal,
                ElTokenKind::Not,
                ElTokenKind::Name,
                ElTokenKind::NotEqual,
                ElTokenKind::Name,
                ElTokenKind::LessOrEqual,
                ElTokenKind::Name,
                ElTokenKind::GreaterOrEqual,
                ElTokenKind::Name,
                ElTokenKind::And,
                ElTokenKind::Name,
                ElTokenKind::Or,
                ElTokenKind::Name,
            ]
        );
    }

    #[test]
    fn test_bitwise_operators() {
        assert_eq!(
            kinds("a & 1 | b ^ ~c << 2 >> d"),
            vec![
                ElTokenKind::Name,
                ElTokenKind::Ampersand,
                ElTokenKind::Number,
                ElTokenKind::Pipe,
                ElTokenKind::Name,
                ElTokenKind::Caret,
                ElTokenKind::Tilde,
                ElTokenKind::Name,
                ElTokenKind::ShiftLeft,
                ElTokenKind::Number,
                ElTokenKind::ShiftRight,
                ElTokenKind::Name,
            ]
        );
    }

    #[test]
    fn test_nested_map_closing_inside_switch() {
        assert_eq!(
            kinds("{{ { \"a\": 1 }}}"),
            vec![
                ElTokenKind::OpenSwitch,
                ElTokenKind::OpenBrace,
                ElTokenKind::String,
                ElTokenKind::Colon,
                ElTokenKind::Number,
                ElTokenKind::CloseBrace,
                ElTokenKind::CloseSwitch,
            ]
        );
    }

    #[test]
    fn test_keywords_and_numbers() {
        assert_eq!(
            kinds("true false null 1.5 2"),
            vec![
                ElTokenKind::True,
                ElTokenKind::False,
                ElTokenKind::Null,
                ElTokenKind::Number,
                ElTokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_embedded_tracks_nesting() {
        let (tokens, end) =
            tokenize("(1) + [2]) tail", Snapshot::start(), Termination::Embedded).unwrap();
        assert_eq!(tokens.len(), 7);
        assert_eq!(end.offset(), 9);
    }

    #[test]
    fn test_lone_equals_is_rejected() {
        let error = tokenize("a = b", Snapshot::start(), Termination::Document).unwrap_err();
        assert_eq!(error.code(), Some(ErrorCode::E002));
    }
}
