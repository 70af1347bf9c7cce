//! Tokenizer for `/*QUAKED` comments.

use std::fmt;

use crate::{
    cursor::{Cursor, Snapshot},
    error::{Diagnostic, ErrorCode, Result},
    token::{NumberKind, Token, classify_number},
};

const DEFINITION_START: &str = "/*QUAKED";
const DEFINITION_END: &str = "*/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DefTokenKind {
    Integer,
    Decimal,
    Word,
    String,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Semicolon,
    Comma,
    Question,
    Newline,
    EndDefinition,
    Eof,
}

impl fmt::Display for DefTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DefTokenKind::Integer => "integer",
            DefTokenKind::Decimal => "decimal",
            DefTokenKind::Word => "word",
            DefTokenKind::String => "string",
            DefTokenKind::OpenParen => "`(`",
            DefTokenKind::CloseParen => "`)`",
            DefTokenKind::OpenBrace => "`{`",
            DefTokenKind::CloseBrace => "`}`",
            DefTokenKind::Semicolon => "`;`",
            DefTokenKind::Comma => "`,`",
            DefTokenKind::Question => "`?`",
            DefTokenKind::Newline => "end of line",
            DefTokenKind::EndDefinition => "`*/`",
            DefTokenKind::Eof => "end of input",
        })
    }
}

pub(super) type DefToken<'src> = Token<'src, DefTokenKind>;

/// Whether line breaks are reported as tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Newlines {
    /// The header line ends at the first line break.
    Significant,
    Skipped,
}

#[derive(Debug, Clone)]
pub(super) struct DefLexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> DefLexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    pub fn source(&self) -> &'src str {
        self.cursor.source()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.cursor.snapshot()
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.cursor.restore(snapshot);
    }

    /// Moves past the next `/*QUAKED` marker.
    ///
    /// Returns the position of the marker, or `None` when no definition
    /// follows.
    pub fn skip_to_definition(&mut self) -> Option<Snapshot> {
        self.cursor.advance_until(DEFINITION_START)?;
        let start = self.cursor.snapshot();
        self.cursor.eat_str(DEFINITION_START);
        Some(start)
    }

    /// Skips whitespace and reports whether a `{` block follows.
    pub fn at_block_start(&mut self) -> bool {
        self.cursor.advance_while(char::is_whitespace);
        self.cursor.peek() == Some('{')
    }

    /// Consumes the free text up to and including `*/` and returns it.
    pub fn read_description(&mut self) -> Result<&'src str> {
        let start = self.cursor.snapshot();
        let Some(text) = self.cursor.advance_until(DEFINITION_END) else {
            return Err(Diagnostic::error("unterminated definition comment")
                .with_code(ErrorCode::E001)
                .with_location(start.location())
                .with_help("close the definition with `*/`"));
        };
        self.cursor.eat_str(DEFINITION_END);
        Ok(text)
    }

    pub fn peek_token(&mut self, newlines: Newlines) -> Result<DefToken<'src>> {
        let snapshot = self.snapshot();
        let token = self.next_token(newlines);
        self.restore(snapshot);
        token
    }

    pub fn next_token(&mut self, newlines: Newlines) -> Result<DefToken<'src>> {
        match newlines {
            Newlines::Significant => {
                self.cursor.advance_while(|c| c.is_whitespace() && c != '\n');
            }
            Newlines::Skipped => {
                self.cursor.advance_while(char::is_whitespace);
            }
        }

        let start = self.cursor.snapshot();
        if self.cursor.eat_str(DEFINITION_END) {
            return Ok(self.token(DefTokenKind::EndDefinition, start));
        }
        let Some(c) = self.cursor.peek() else {
            return Ok(self.token(DefTokenKind::Eof, start));
        };

        let kind = match c {
            '\n' => DefTokenKind::Newline,
            '(' => DefTokenKind::OpenParen,
            ')' => DefTokenKind::CloseParen,
            '{' => DefTokenKind::OpenBrace,
            '}' => DefTokenKind::CloseBrace,
            ';' => DefTokenKind::Semicolon,
            ',' => DefTokenKind::Comma,
            '?' => DefTokenKind::Question,
            '"' => return self.string(start),
            c if c.is_control() => {
                self.cursor.advance();
                return Err(Diagnostic::error(format!("unexpected character {c:?}"))
                    .with_code(ErrorCode::E002)
                    .with_location(start.location())
                    .with_label(self.cursor.span_from(start), ErrorCode::E002.description()));
            }
            _ => return Ok(self.word(start)),
        };

        self.cursor.advance();
        Ok(self.token(kind, start))
    }

    fn string(&mut self, start: Snapshot) -> Result<DefToken<'src>> {
        self.cursor.advance();
        let content_start = self.cursor.snapshot();
        self.cursor.advance_while(|c| c != '"' && c != '\n');
        let content = self.cursor.slice_from(content_start);

        if !self.cursor.eat('"') {
            return Err(Diagnostic::error("unterminated string")
                .with_code(ErrorCode::E001)
                .with_location(start.location())
                .with_label(self.cursor.span_from(start), "string starts here"));
        }
        Ok(Token::new(
            DefTokenKind::String,
            content,
            self.cursor.span_from(start),
            start.location(),
        ))
    }

    /// A word runs until whitespace, a delimiter or `*/`.
    fn word(&mut self, start: Snapshot) -> DefToken<'src> {
        while let Some(c) = self.cursor.peek() {
            if is_delimiter(c) || self.cursor.starts_with(DEFINITION_END) {
                break;
            }
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(start);
        let kind = match classify_number(text) {
            Some(NumberKind::Integer) => DefTokenKind::Integer,
            Some(NumberKind::Decimal) => DefTokenKind::Decimal,
            None => DefTokenKind::Word,
        };
        Token::new(kind, text, self.cursor.span_from(start), start.location())
    }

    fn token(&self, kind: DefTokenKind, start: Snapshot) -> DefToken<'src> {
        Token::new(
            kind,
            self.cursor.slice_from(start),
            self.cursor.span_from(start),
            start.location(),
        )
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '{' | '}' | ';' | ',' | '?' | '"')
}

#[cfg(test)]
mod tests {
    use entdef_core::location::Location;

    use super::*;

    fn header_tokens(source: &str) -> Vec<(DefTokenKind, &str)> {
        let mut lexer = DefLexer::new(source);
        lexer.skip_to_definition().unwrap();
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token(Newlines::Significant).unwrap();
            if token.kind == DefTokenKind::Eof {
                break;
            }
            tokens.push((token.kind, token.text));
        }
        tokens
    }

    #[test]
    fn test_header_line() {
        assert_eq!(
            header_tokens("/*QUAKED light (0 1 .5) (-8 -8 -8) (8 8 8) START_OFF -\n*/"),
            vec![
                (DefTokenKind::Word, "light"),
                (DefTokenKind::OpenParen, "("),
                (DefTokenKind::Integer, "0"),
                (DefTokenKind::Integer, "1"),
                (DefTokenKind::Decimal, ".5"),
                (DefTokenKind::CloseParen, ")"),
                (DefTokenKind::OpenParen, "("),
                (DefTokenKind::Integer, "-8"),
                (DefTokenKind::Integer, "-8"),
                (DefTokenKind::Integer, "-8"),
                (DefTokenKind::CloseParen, ")"),
                (DefTokenKind::OpenParen, "("),
                (DefTokenKind::Integer, "8"),
                (DefTokenKind::Integer, "8"),
                (DefTokenKind::Integer, "8"),
                (DefTokenKind::CloseParen, ")"),
                (DefTokenKind::Word, "START_OFF"),
                (DefTokenKind::Word, "-"),
                (DefTokenKind::Newline, "\n"),
                (DefTokenKind::EndDefinition, "*/"),
            ]
        );
    }

    #[test]
    fn test_word_stops_at_end_marker() {
        assert_eq!(
            header_tokens("/*QUAKED func_wall (0 .5 .8) ? TOGGLE*/"),
            vec![
                (DefTokenKind::Word, "func_wall"),
                (DefTokenKind::OpenParen, "("),
                (DefTokenKind::Integer, "0"),
                (DefTokenKind::Decimal, ".5"),
                (DefTokenKind::Decimal, ".8"),
                (DefTokenKind::CloseParen, ")"),
                (DefTokenKind::Question, "?"),
                (DefTokenKind::Word, "TOGGLE"),
                (DefTokenKind::EndDefinition, "*/"),
            ]
        );
    }

    #[test]
    fn test_skip_to_definition_reports_marker_location() {
        let mut lexer = DefLexer::new("// prelude\nvoid() light = {};\n  /*QUAKED light");
        let start = lexer.skip_to_definition().unwrap();
        assert_eq!(start.location(), Location::new(3, 3));
        assert!(lexer.skip_to_definition().is_none());
    }

    #[test]
    fn test_block_tokens_skip_newlines() {
        let mut lexer = DefLexer::new("{\n  base(\"Item\");\n}");
        let kinds: Vec<DefTokenKind> = std::iter::from_fn(|| {
            let token = lexer.next_token(Newlines::Skipped).unwrap();
            (token.kind != DefTokenKind::Eof).then_some(token.kind)
        })
        .collect();
        assert_eq!(
            kinds,
            vec![
                DefTokenKind::OpenBrace,
                DefTokenKind::Word,
                DefTokenKind::OpenParen,
                DefTokenKind::String,
                DefTokenKind::CloseParen,
                DefTokenKind::Semicolon,
                DefTokenKind::CloseBrace,
            ]
        );
    }

    #[test]
    fn test_read_description() {
        let mut lexer = DefLexer::new(" Green armor.\n*/ trailing");
        assert_eq!(lexer.read_description().unwrap(), " Green armor.\n");

        let mut lexer = DefLexer::new("never closed");
        let err = lexer.read_description().unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E001));
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = DefLexer::new("\"open\n\"");
        let err = lexer.next_token(Newlines::Skipped).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E001));
    }
}
