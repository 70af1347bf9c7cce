//! Typed defaults of numeric and boolean attributes.
//!
//! Definition files carry defaults as text. A default that does not parse as
//! the declared type keeps the attribute, but as an untyped one holding the
//! literal text, and the caller reports it once.

use entdef_core::attribute::{AttributeCommon, AttributeDefinition, AttributeKind};

/// Declared kinds whose defaults are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypedKind {
    Integer,
    Float,
    Boolean,
}

impl TypedKind {
    fn attribute_kind(self) -> AttributeKind {
        match self {
            TypedKind::Integer => AttributeKind::Integer,
            TypedKind::Float => AttributeKind::Float,
            TypedKind::Boolean => AttributeKind::Boolean,
        }
    }
}

/// A default that did not parse, with the untyped attribute replacing the typed one.
#[derive(Debug)]
pub(crate) struct InvalidDefault {
    pub attribute: AttributeDefinition,
    pub message: String,
}

/// Builds an attribute of `kind` with `default` parsed as that kind.
///
/// An empty or missing default gives an attribute without default.
pub(crate) fn typed_attribute(
    kind: TypedKind,
    common: AttributeCommon,
    default: Option<&str>,
) -> Result<AttributeDefinition, InvalidDefault> {
    let literal = default.map(str::trim).filter(|literal| !literal.is_empty());
    let Some(literal) = literal else {
        return Ok(empty(kind, common));
    };

    let parsed = match kind {
        TypedKind::Integer => literal
            .parse()
            .ok()
            .map(|default| AttributeDefinition::Integer {
                common: common.clone(),
                default: Some(default),
            }),
        TypedKind::Float => literal
            .parse()
            .ok()
            .map(|default| AttributeDefinition::Float {
                common: common.clone(),
                default: Some(default),
            }),
        TypedKind::Boolean => parse_bool(literal).map(|default| AttributeDefinition::Boolean {
            common: common.clone(),
            default: Some(default),
        }),
    };

    parsed.ok_or_else(|| InvalidDefault {
        message: format!(
            "invalid default value '{literal}' for {} attribute `{}`, keeping it untyped",
            kind.attribute_kind(),
            common.name()
        ),
        attribute: AttributeDefinition::Unknown {
            common,
            default: Some(literal.to_string()),
        },
    })
}

fn empty(kind: TypedKind, common: AttributeCommon) -> AttributeDefinition {
    match kind {
        TypedKind::Integer => AttributeDefinition::Integer {
            common,
            default: None,
        },
        TypedKind::Float => AttributeDefinition::Float {
            common,
            default: None,
        },
        TypedKind::Boolean => AttributeDefinition::Boolean {
            common,
            default: None,
        },
    }
}

fn parse_bool(literal: &str) -> Option<bool> {
    if literal.eq_ignore_ascii_case("true") {
        return Some(true);
    }
    if literal.eq_ignore_ascii_case("false") {
        return Some(false);
    }
    literal.parse::<i32>().ok().map(|n| n != 0)
}
