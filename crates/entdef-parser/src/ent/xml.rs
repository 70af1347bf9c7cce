//! A small XML reader for ENT documents.
//!
//! Builds an element tree from the document. Supports declarations,
//! comments, `<!DOCTYPE>`, CDATA sections, single or double quoted attribute
//! values, and text with the five predefined entities and numeric character
//! references. Namespaces and DTD validation are not supported.

use entdef_core::location::Location;

use crate::{
    cursor::{Cursor, Snapshot},
    error::{Diagnostic, ErrorCode, Result},
    span::Span,
};

#[derive(Debug, Clone, PartialEq)]
pub(super) struct XmlAttribute<'src> {
    pub name: &'src str,
    pub value: String,
    /// Position of the value, after the opening quote.
    pub value_location: Location,
    pub value_span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum XmlNode<'src> {
    Element(XmlElement<'src>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct XmlElement<'src> {
    pub name: &'src str,
    pub attributes: Vec<XmlAttribute<'src>>,
    pub children: Vec<XmlNode<'src>>,
    pub location: Location,
    /// Span of the start tag.
    pub span: Span,
}

impl<'src> XmlElement<'src> {
    pub fn attribute(&self, name: &str) -> Option<&XmlAttribute<'src>> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(|attribute| attribute.value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement<'src>> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Direct text content, trimmed.
    pub fn text(&self) -> String {
        let text: String = self
            .children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect();
        text.trim().to_string()
    }
}

/// Parses `source` into its root element.
///
/// Returns `None` for a document without elements.
pub(super) fn parse_document(source: &str) -> Result<Option<XmlElement<'_>>> {
    let mut reader = XmlReader {
        cursor: Cursor::new(source),
    };

    reader.skip_prolog()?;
    if reader.cursor.is_eof() {
        return Ok(None);
    }
    let root = reader.element()?;
    reader.skip_prolog()?;
    if !reader.cursor.is_eof() {
        let start = reader.cursor.snapshot();
        return Err(Diagnostic::error("unexpected content after the root element")
            .with_code(ErrorCode::E103)
            .with_location(start.location())
            .with_label(
                Span::new(start.offset()..source.len()),
                "a document has exactly one root element",
            ));
    }
    Ok(Some(root))
}

struct XmlReader<'src> {
    cursor: Cursor<'src>,
}

impl<'src> XmlReader<'src> {
    /// Skip whitespace, declarations, comments and the document type
    fn skip_prolog(&mut self) -> Result<()> {
        loop {
            self.cursor.advance_while(char::is_whitespace);
            if self.cursor.starts_with("<?") {
                self.skip_delimited("<?", "?>", "declaration")?;
            } else if self.cursor.starts_with("<!--") {
                self.skip_delimited("<!--", "-->", "comment")?;
            } else if self.cursor.starts_with("<!DOCTYPE") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_delimited(&mut self, open: &str, close: &str, what: &str) -> Result<()> {
        let start = self.cursor.snapshot();
        self.cursor.eat_str(open);
        if self.cursor.advance_until(close).is_none() {
            return Err(self.unterminated(start, what));
        }
        self.cursor.eat_str(close);
        Ok(())
    }

    /// `<!DOCTYPE name [ internal subset ]>`
    fn skip_doctype(&mut self) -> Result<()> {
        let start = self.cursor.snapshot();
        self.cursor.eat_str("<!DOCTYPE");
        let mut depth = 0usize;
        loop {
            match self.cursor.advance() {
                Some('[') => depth += 1,
                Some(']') => depth = depth.saturating_sub(1),
                Some('>') if depth == 0 => return Ok(()),
                Some(_) => {}
                None => return Err(self.unterminated(start, "document type declaration")),
            }
        }
    }

    fn element(&mut self) -> Result<XmlElement<'src>> {
        let start = self.cursor.snapshot();
        if !self.cursor.eat('<') {
            return Err(self.unexpected_character("`<`"));
        }
        let name = self.name()?;

        let mut attributes = Vec::new();
        let self_closing = loop {
            self.cursor.advance_while(char::is_whitespace);
            if self.cursor.eat_str("/>") {
                break true;
            }
            if self.cursor.eat('>') {
                break false;
            }
            if self.cursor.is_eof() {
                return Err(self.unterminated(start, "start tag"));
            }
            attributes.push(self.attribute()?);
        };

        let span = self.cursor.span_from(start);
        let children = if self_closing {
            Vec::new()
        } else {
            self.content(name, start)?
        };

        Ok(XmlElement {
            name,
            attributes,
            children,
            location: start.location(),
            span,
        })
    }

    fn attribute(&mut self) -> Result<XmlAttribute<'src>> {
        let name = self.name()?;
        self.cursor.advance_while(char::is_whitespace);
        if !self.cursor.eat('=') {
            return Err(self.unexpected_character("`=`"));
        }
        self.cursor.advance_while(char::is_whitespace);

        let quote = match self.cursor.peek() {
            Some(quote @ ('"' | '\'')) => quote,
            _ => return Err(self.unexpected_character("quoted attribute value")),
        };
        let quote_start = self.cursor.snapshot();
        self.cursor.advance();

        let value_start = self.cursor.snapshot();
        let raw = self.cursor.advance_while(|c| c != quote && c != '<');
        let value_span = self.cursor.span_from(value_start);
        if !self.cursor.eat(quote) {
            return Err(self.unterminated(quote_start, "attribute value"));
        }

        Ok(XmlAttribute {
            name,
            value: self.decode(raw, value_start)?,
            value_location: value_start.location(),
            value_span,
        })
    }

    /// Parse children up to the end tag of `name`
    fn content(&mut self, name: &str, start: Snapshot) -> Result<Vec<XmlNode<'src>>> {
        let mut children = Vec::new();
        loop {
            if self.cursor.starts_with("</") {
                let end_start = self.cursor.snapshot();
                self.cursor.eat_str("</");
                let end_name = self.name()?;
                self.cursor.advance_while(char::is_whitespace);
                if !self.cursor.eat('>') {
                    return Err(self.unexpected_character("`>`"));
                }
                if end_name != name {
                    return Err(Diagnostic::error(format!(
                        "expected `</{name}>`, found `</{end_name}>`"
                    ))
                    .with_code(ErrorCode::E103)
                    .with_location(end_start.location())
                    .with_label(self.cursor.span_from(end_start), "mismatched end tag")
                    .with_secondary_label(
                        Span::new(start.offset()..start.offset() + name.len() + 1),
                        "element opened here",
                    ));
                }
                return Ok(children);
            } else if self.cursor.starts_with("<!--") {
                self.skip_delimited("<!--", "-->", "comment")?;
            } else if self.cursor.starts_with("<?") {
                self.skip_delimited("<?", "?>", "processing instruction")?;
            } else if self.cursor.starts_with("<![CDATA[") {
                let cdata_start = self.cursor.snapshot();
                self.cursor.eat_str("<![CDATA[");
                let Some(text) = self.cursor.advance_until("]]>") else {
                    return Err(self.unterminated(cdata_start, "CDATA section"));
                };
                self.cursor.eat_str("]]>");
                children.push(XmlNode::Text(text.to_string()));
            } else if self.cursor.starts_with("<") {
                children.push(XmlNode::Element(self.element()?));
            } else if self.cursor.is_eof() {
                return Err(self.unterminated(start, &format!("element `<{name}>`")));
            } else {
                let text_start = self.cursor.snapshot();
                let raw = self.cursor.advance_while(|c| c != '<');
                children.push(XmlNode::Text(self.decode(raw, text_start)?));
            }
        }
    }

    fn name(&mut self) -> Result<&'src str> {
        let name = self
            .cursor
            .advance_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
        if name.is_empty() {
            return Err(self.unexpected_character("name"));
        }
        Ok(name)
    }

    /// Replace entity and character references in `raw`, which starts at `start`
    fn decode(&self, raw: &str, start: Snapshot) -> Result<String> {
        let mut decoded = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(ampersand) = rest.find('&') {
            decoded.push_str(&rest[..ampersand]);
            let reference = &rest[ampersand + 1..];
            let resolved = reference
                .find(';')
                .and_then(|end| Some((resolve_reference(&reference[..end])?, end)));
            let Some((c, end)) = resolved else {
                let offset = raw.len() - rest.len() + ampersand;
                return Err(self.invalid_reference(start, offset, reference));
            };
            decoded.push(c);
            rest = &reference[end + 1..];
        }
        decoded.push_str(rest);
        Ok(decoded)
    }

    fn invalid_reference(&self, start: Snapshot, offset: usize, reference: &str) -> Diagnostic {
        let mut cursor = Cursor::at(self.cursor.source(), start);
        while cursor.offset() < start.offset() + offset {
            cursor.advance();
        }
        let at = cursor.snapshot();
        let len = reference.find(';').map_or(1, |end| end + 2);
        Diagnostic::error("invalid character reference")
            .with_code(ErrorCode::E003)
            .with_location(at.location())
            .with_label(Span::new(at.offset()..at.offset() + len), ErrorCode::E003.description())
            .with_help("escape `&` as `&amp;`")
    }

    fn unexpected_character(&self, expected: &str) -> Diagnostic {
        let start = self.cursor.snapshot();
        let Some(c) = self.cursor.peek() else {
            return Diagnostic::error(format!("expected {expected}, found end of input"))
                .with_code(ErrorCode::E001)
                .with_location(start.location());
        };
        Diagnostic::error(format!("expected {expected}, found {c:?}"))
            .with_code(ErrorCode::E002)
            .with_location(start.location())
            .with_label(
                Span::new(start.offset()..start.offset() + c.len_utf8()),
                ErrorCode::E002.description(),
            )
    }

    fn unterminated(&self, start: Snapshot, what: &str) -> Diagnostic {
        Diagnostic::error(format!("unterminated {what}"))
            .with_code(ErrorCode::E001)
            .with_location(start.location())
            .with_label(self.cursor.span_from(start), format!("{what} starts here"))
    }
}

fn resolve_reference(reference: &str) -> Option<char> {
    match reference {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = reference.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
