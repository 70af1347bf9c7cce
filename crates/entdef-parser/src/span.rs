//! Byte ranges into parsed source text.

use std::ops::Range;

/// A half-open byte range `start..end` into a source document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both spans.
    pub fn union(self, other: Span) -> Span {
        Span::new(self.start.min(other.start)..self.end.max(other.end))
    }

    pub fn to_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_union() {
        let span = Span::new(4..8).union(Span::new(2..5));
        assert_eq!(span.to_range(), 2..8);
        assert_eq!(span.len(), 6);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let span = Span::new(9..3);
        assert!(span.is_empty());
        assert_eq!(span.start(), 9);
    }
}
