//! Tokenizer for FGD documents.
//!
//! Whitespace and `//` comments separate tokens. Words run until whitespace or
//! one of the delimiters `()[]=:,+"`, so names like `@PointClass`,
//! `target_source` or `-16` are single tokens. A word that is entirely a
//! number becomes an [`FgdTokenKind::Integer`] or [`FgdTokenKind::Decimal`].

use std::fmt;

use crate::{
    cursor::{Cursor, Snapshot},
    error::{Diagnostic, ErrorCode, Result},
    token::{NumberKind, Token, classify_number},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FgdTokenKind {
    Integer,
    Decimal,
    Word,
    String,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Equals,
    Colon,
    Comma,
    Plus,
    Eof,
}

impl fmt::Display for FgdTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FgdTokenKind::Integer => "integer",
            FgdTokenKind::Decimal => "decimal",
            FgdTokenKind::Word => "word",
            FgdTokenKind::String => "string",
            FgdTokenKind::OpenParen => "`(`",
            FgdTokenKind::CloseParen => "`)`",
            FgdTokenKind::OpenBracket => "`[`",
            FgdTokenKind::CloseBracket => "`]`",
            FgdTokenKind::Equals => "`=`",
            FgdTokenKind::Colon => "`:`",
            FgdTokenKind::Comma => "`,`",
            FgdTokenKind::Plus => "`+`",
            FgdTokenKind::Eof => "end of input",
        })
    }
}

pub(crate) type FgdToken<'src> = Token<'src, FgdTokenKind>;

#[derive(Debug, Clone)]
pub(crate) struct FgdLexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> FgdLexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Creates a lexer continuing at a snapshot taken over the same source.
    pub fn at(source: &'src str, snapshot: Snapshot) -> Self {
        Self {
            cursor: Cursor::at(source, snapshot),
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

    /// Returns the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<FgdToken<'src>> {
        let snapshot = self.snapshot();
        let token = self.next_token();
        self.restore(snapshot);
        token
    }

    pub fn next_token(&mut self) -> Result<FgdToken<'src>> {
        self.cursor.skip_whitespace_and_comments();

        let start = self.cursor.snapshot();
        let Some(c) = self.cursor.peek() else {
            return Ok(self.token(FgdTokenKind::Eof, start));
        };

        let kind = match c {
            '(' => FgdTokenKind::OpenParen,
            ')' => FgdTokenKind::CloseParen,
            '[' => FgdTokenKind::OpenBracket,
            ']' => FgdTokenKind::CloseBracket,
            '=' => FgdTokenKind::Equals,
            ':' => FgdTokenKind::Colon,
            ',' => FgdTokenKind::Comma,
            '+' => FgdTokenKind::Plus,
            '"' => return self.string(start),
            c if c.is_control() => {
                self.cursor.advance();
                return Err(Diagnostic::error(format!(
                    "unexpected character {:?}",
                    c
                ))
                .with_code(ErrorCode::E002)
                .with_location(start.location())
                .with_label(self.cursor.span_from(start), ErrorCode::E002.description()));
            }
            _ => return Ok(self.word(start)),
        };

        self.cursor.advance();
        Ok(self.token(kind, start))
    }

    fn string(&mut self, start: Snapshot) -> Result<FgdToken<'src>> {
        self.cursor.advance();
        let content_start = self.cursor.snapshot();
        self.cursor.advance_while(|c| c != '"');
        let content = self.cursor.slice_from(content_start);

        if !self.cursor.eat('"') {
            return Err(Diagnostic::error("unterminated string")
                .with_code(ErrorCode::E001)
                .with_location(start.location())
                .with_label(self.cursor.span_from(start), "string starts here")
                .with_help("close the string with `\"`"));
        }

        Ok(Token::new(
            FgdTokenKind::String,
            content,
            self.cursor.span_from(start),
            start.location(),
        ))
    }

    fn word(&mut self, start: Snapshot) -> FgdToken<'src> {
        let text = self.cursor.advance_while(|c| !is_delimiter(c));
        let kind = match classify_number(text) {
            Some(NumberKind::Integer) => FgdTokenKind::Integer,
            Some(NumberKind::Decimal) => FgdTokenKind::Decimal,
            None => FgdTokenKind::Word,
        };
        Token::new(kind, text, self.cursor.span_from(start), start.location())
    }

    fn token(&self, kind: FgdTokenKind, start: Snapshot) -> FgdToken<'src> {
        Token::new(
            kind,
            self.cursor.slice_from(start),
            self.cursor.span_from(start),
            start.location(),
        )
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '=' | ':' | ',' | '+' | '"')
}
