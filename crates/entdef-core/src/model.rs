//! Model definitions of point entities.

use std::fmt;

use crate::expression::{Expression, ExpressionKind};

/// The expression that selects a point entity's model.
///
/// Inherited model definitions are chained with [`ModelDefinition::append`]:
/// the result is a switch whose first yielding alternative wins, so a
/// subclass's own model takes precedence over those of its base classes.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    expression: Expression,
}

impl ModelDefinition {
    pub fn new(expression: Expression) -> Self {
        Self { expression }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn into_expression(self) -> Expression {
        self.expression
    }

    /// Appends `other` as a lower priority fallback.
    ///
    /// Switch alternatives of both sides are spliced into one flat switch,
    /// which selects the same value as nesting them.
    pub fn append(&mut self, other: &ModelDefinition) {
        let location = self.expression.location();
        let placeholder = Expression::new(ExpressionKind::Switch(Vec::new()), location);
        let own = std::mem::replace(&mut self.expression, placeholder);

        let mut cases = alternatives(own);
        cases.extend(alternatives(other.expression.clone()));

        self.expression = Expression::new(ExpressionKind::Switch(cases), location);
    }
}

fn alternatives(expression: Expression) -> Vec<Expression> {
    let location = expression.location();
    match expression.into_kind() {
        ExpressionKind::Switch(cases) => cases,
        kind => vec![Expression::new(kind, location)],
    }
}

impl From<Expression> for ModelDefinition {
    fn from(expression: Expression) -> Self {
        Self::new(expression)
    }
}

impl fmt::Display for ModelDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.expression.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{expression::Value, location::Location};

    fn model(path: &str) -> ModelDefinition {
        ModelDefinition::new(Expression::literal(
            Value::String(path.to_string()),
            Location::new(1, 1),
        ))
    }

    #[test]
    fn test_append_builds_fallback_chain() {
        let mut definition = model("own.mdl");
        definition.append(&model("base1.mdl"));
        definition.append(&model("base2.mdl"));

        assert_eq!(
            definition.to_string(),
            "{{ \"own.mdl\", \"base1.mdl\", \"base2.mdl\" }}"
        );
    }

    #[test]
    fn test_append_splices_switches() {
        let mut left = model("a.mdl");
        left.append(&model("b.mdl"));
        let mut right = model("c.mdl");
        right.append(&model("d.mdl"));

        left.append(&right);
        let ExpressionKind::Switch(cases) = left.expression().kind() else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 4);
    }
}
