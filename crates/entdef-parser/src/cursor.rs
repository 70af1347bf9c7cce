//! Character cursor shared by all definition lexers.
//!
//! A [`Cursor`] walks a source string and tracks the byte offset together
//! with a 1-based line and column. A [`Snapshot`] captures that state by value
//! and can be restored on any cursor over the same source, which lets a
//! format parser hand its position to a sub-parser (such as the expression
//! parser for model definitions) and continue where that parser stopped.

use entdef_core::location::Location;

use crate::span::Span;

/// Saved position of a [`Cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    offset: usize,
    line: usize,
    column: usize,
}

impl Snapshot {
    /// Snapshot at the start of a document.
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::start()
    }
}

#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    source: &'src str,
    position: Snapshot,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::at(source, Snapshot::start())
    }

    /// Creates a cursor positioned at a snapshot taken over the same source.
    pub fn at(source: &'src str, snapshot: Snapshot) -> Self {
        Self {
            source,
            position: snapshot,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn snapshot(&self) -> Snapshot {
        self.position
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.position = snapshot;
    }

    pub fn offset(&self) -> usize {
        self.position.offset
    }

    pub fn location(&self) -> Location {
        self.position.location()
    }

    /// The not yet consumed part of the source.
    pub fn rest(&self) -> &'src str {
        &self.source[self.position.offset..]
    }

    pub fn is_eof(&self) -> bool {
        self.position.offset >= self.source.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Returns the character `n` positions ahead of the current one.
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Consumes one character, updating line and column.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position.offset += c.len_utf8();
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        Some(c)
    }

    /// Consumes `expected` if it is the next character.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes `prefix` if the rest of the source starts with it.
    pub fn eat_str(&mut self, prefix: &str) -> bool {
        if !self.starts_with(prefix) {
            return false;
        }
        for _ in prefix.chars() {
            self.advance();
        }
        true
    }

    /// Consumes characters while `predicate` holds and returns them.
    pub fn advance_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> &'src str {
        let start = self.position.offset;
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.advance();
        }
        &self.source[start..self.position.offset]
    }

    /// Consumes everything up to the first occurrence of `needle`.
    ///
    /// Returns the skipped text, or `None` without moving if `needle` does not
    /// occur in the rest of the source.
    pub fn advance_until(&mut self, needle: &str) -> Option<&'src str> {
        let len = self.rest().find(needle)?;
        let start = self.position.offset;
        let end = start + len;
        while self.position.offset < end {
            self.advance();
        }
        Some(&self.source[start..end])
    }

    /// Skips whitespace and `//` line comments.
    pub fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.advance_while(char::is_whitespace);
            if self.starts_with("//") {
                self.advance_while(|c| c != '\n');
            } else {
                break;
            }
        }
    }

    /// Source text between `start` and the current position.
    pub fn slice_from(&self, start: Snapshot) -> &'src str {
        &self.source[start.offset..self.position.offset]
    }

    /// Byte span between `start` and the current position.
    pub fn span_from(&self, start: Snapshot) -> Span {
        Span::new(start.offset..self.position.offset)
    }
}
