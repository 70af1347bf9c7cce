//! Positioned tokens shared by the lexers.

use entdef_core::location::Location;

use crate::span::Span;

/// A token with its source text and position.
///
/// For string tokens `text` is the content between the quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'src, K> {
    pub kind: K,
    pub text: &'src str,
    pub span: Span,
    pub location: Location,
}

impl<'src, K> Token<'src, K> {
    pub fn new(kind: K, text: &'src str, span: Span, location: Location) -> Self {
        Self {
            kind,
            text,
            span,
            location,
        }
    }
}

/// Numeric shape of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberKind {
    Integer,
    Decimal,
}

/// Classifies `text` as an integer or decimal literal.
///
/// Accepts an optional leading `-`, digits and an optional `.digits` part.
pub(crate) fn classify_number(text: &str) -> Option<NumberKind> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !fraction.is_none_or(all_digits) {
        return None;
    }
    match fraction {
        None if !whole.is_empty() => Some(NumberKind::Integer),
        Some(fraction) if !whole.is_empty() || !fraction.is_empty() => Some(NumberKind::Decimal),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_number() {
        assert_eq!(classify_number("42"), Some(NumberKind::Integer));
        assert_eq!(classify_number("-16"), Some(NumberKind::Integer));
        assert_eq!(classify_number("0.5"), Some(NumberKind::Decimal));
        assert_eq!(classify_number(".5"), Some(NumberKind::Decimal));
        assert_eq!(classify_number("-"), None);
        assert_eq!(classify_number("."), None);
        assert_eq!(classify_number("1a"), None);
        assert_eq!(classify_number("1.2.3"), None);
    }
}
