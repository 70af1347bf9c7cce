//! Abstract syntax of the model expression language.
//!
//! Model definitions select the model shown for a point entity, optionally
//! depending on the entity's attribute values:
//!
//! ```text
//! {{ spawnflags == 1 -> "progs/armor.mdl", { "path": "progs/armor.mdl", "skin": 2 } }}
//! ```
//!
//! This module holds the tree ([`Expression`]), constant values ([`Value`]),
//! the canonical textual rendering (via `Display`) and constant folding
//! ([`Expression::optimize`]). Evaluation against entity instances is left to
//! the embedding application.

use std::fmt;

use indexmap::IndexMap;

use crate::location::Location;

/// A constant value of the expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Bitwise operators only apply to whole numbers in the `i64` range.
fn integral(n: f64) -> Option<i64> {
    (n.fract() == 0.0 && n.abs() < 9.0e15).then_some(n as i64)
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write_number(f, *n),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                if entries.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{key}\": {value}")?;
                }
                f.write_str(" }")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
    Not,
    BitwiseNot,
}

impl UnaryOperator {
    fn apply(self, operand: &Value) -> Option<Value> {
        match (self, operand) {
            (UnaryOperator::Plus, Value::Number(n)) => Some(Value::Number(*n)),
            (UnaryOperator::Minus, Value::Number(n)) => Some(Value::Number(-n)),
            (UnaryOperator::Not, Value::Boolean(b)) => Some(Value::Boolean(!b)),
            (UnaryOperator::BitwiseNot, Value::Number(n)) => {
                Some(Value::Number(!integral(*n)? as f64))
            }
            _ => None,
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::Not => "!",
            UnaryOperator::BitwiseNot => "~",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    ShiftLeft,
    ShiftRight,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    And,
    Or,
}

impl BinaryOperator {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 10,
            BinaryOperator::Add | BinaryOperator::Subtract => 9,
            BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight => 8,
            BinaryOperator::Less
            | BinaryOperator::LessOrEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterOrEqual => 7,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 6,
            BinaryOperator::BitwiseAnd => 5,
            BinaryOperator::BitwiseXor => 4,
            BinaryOperator::BitwiseOr => 3,
            BinaryOperator::And => 2,
            BinaryOperator::Or => 1,
        }
    }

    fn apply(self, lhs: &Value, rhs: &Value) -> Option<Value> {
        use BinaryOperator as Op;

        match (self, lhs, rhs) {
            (Op::Add, Value::Number(a), Value::Number(b)) => Some(Value::Number(a + b)),
            (Op::Add, Value::String(a), Value::String(b)) => Some(Value::String(format!("{a}{b}"))),
            (Op::Subtract, Value::Number(a), Value::Number(b)) => Some(Value::Number(a - b)),
            (Op::Multiply, Value::Number(a), Value::Number(b)) => Some(Value::Number(a * b)),
            (Op::Divide, Value::Number(a), Value::Number(b)) if *b != 0.0 => {
                Some(Value::Number(a / b))
            }
            (Op::Modulo, Value::Number(a), Value::Number(b)) if *b != 0.0 => {
                Some(Value::Number(a % b))
            }
            (Op::Less, Value::Number(a), Value::Number(b)) => Some(Value::Boolean(a < b)),
            (Op::LessOrEqual, Value::Number(a), Value::Number(b)) => Some(Value::Boolean(a <= b)),
            (Op::Greater, Value::Number(a), Value::Number(b)) => Some(Value::Boolean(a > b)),
            (Op::GreaterOrEqual, Value::Number(a), Value::Number(b)) => {
                Some(Value::Boolean(a >= b))
            }
            (Op::Less, Value::String(a), Value::String(b)) => Some(Value::Boolean(a < b)),
            (Op::LessOrEqual, Value::String(a), Value::String(b)) => Some(Value::Boolean(a <= b)),
            (Op::Greater, Value::String(a), Value::String(b)) => Some(Value::Boolean(a > b)),
            (Op::GreaterOrEqual, Value::String(a), Value::String(b)) => {
                Some(Value::Boolean(a >= b))
            }
            (Op::Equal, a, b) => Some(Value::Boolean(a == b)),
            (Op::NotEqual, a, b) => Some(Value::Boolean(a != b)),
            (Op::And, Value::Boolean(a), Value::Boolean(b)) => Some(Value::Boolean(*a && *b)),
            (Op::Or, Value::Boolean(a), Value::Boolean(b)) => Some(Value::Boolean(*a || *b)),
            (Op::BitwiseAnd, Value::Number(a), Value::Number(b)) => {
                Some(Value::Number((integral(*a)? & integral(*b)?) as f64))
            }
            (Op::BitwiseXor, Value::Number(a), Value::Number(b)) => {
                Some(Value::Number((integral(*a)? ^ integral(*b)?) as f64))
            }
            (Op::BitwiseOr, Value::Number(a), Value::Number(b)) => {
                Some(Value::Number((integral(*a)? | integral(*b)?) as f64))
            }
            (Op::ShiftLeft, Value::Number(a), Value::Number(b)) => {
                let shift = u32::try_from(integral(*b)?).ok()?;
                Some(Value::Number(integral(*a)?.checked_shl(shift)? as f64))
            }
            (Op::ShiftRight, Value::Number(a), Value::Number(b)) => {
                let shift = u32::try_from(integral(*b)?).ok()?;
                Some(Value::Number(integral(*a)?.checked_shr(shift)? as f64))
            }
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Less => "<",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterOrEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseXor => "^",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        })
    }
}

/// The shape of an expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(Value),
    Variable(String),
    Array(Vec<Expression>),
    /// Map entries in declaration order.
    Map(Vec<(String, Expression)>),
    Unary(UnaryOperator, Box<Expression>),
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
    Subscript(Box<Expression>, Box<Expression>),
    /// `condition -> value`; yields nothing when the condition is false.
    Case(Box<Expression>, Box<Expression>),
    /// `{{ a, b, ... }}`; the first element that yields a value wins.
    Switch(Vec<Expression>),
}

/// An expression node with the location it was parsed from.
///
/// Equality ignores locations.
#[derive(Debug, Clone)]
pub struct Expression {
    kind: ExpressionKind,
    location: Location,
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Expression {
    pub fn new(kind: ExpressionKind, location: Location) -> Self {
        Self { kind, location }
    }

    pub fn literal(value: Value, location: Location) -> Self {
        Self::new(ExpressionKind::Literal(value), location)
    }

    pub fn kind(&self) -> &ExpressionKind {
        &self.kind
    }

    pub fn into_kind(self) -> ExpressionKind {
        self.kind
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Returns the constant value if this node is a literal.
    pub fn as_literal(&self) -> Option<&Value> {
        match &self.kind {
            ExpressionKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    fn precedence(&self) -> u8 {
        match &self.kind {
            ExpressionKind::Case(..) => 0,
            ExpressionKind::Binary(op, ..) => op.precedence(),
            _ => u8::MAX,
        }
    }

    /// Folds constant sub-expressions.
    ///
    /// Arrays and maps whose elements are all literals become literals, unary
    /// and binary operations on literals are computed, constant subscripts are
    /// resolved, and switch cases with constant conditions are decided.
    /// Operations that are not defined for their operand types are kept as-is.
    ///
    /// ```
    /// use entdef_core::expression::{BinaryOperator, Expression, ExpressionKind, Value};
    /// use entdef_core::location::Location;
    ///
    /// let at = Location::default();
    /// let sum = Expression::new(
    ///     ExpressionKind::Binary(
    ///         BinaryOperator::Add,
    ///         Box::new(Expression::literal(Value::Number(1.0), at)),
    ///         Box::new(Expression::literal(Value::Number(2.0), at)),
    ///     ),
    ///     at,
    /// );
    /// assert_eq!(sum.optimize().as_literal(), Some(&Value::Number(3.0)));
    /// ```
    pub fn optimize(self) -> Expression {
        let location = self.location;
        let kind = match self.kind {
            ExpressionKind::Literal(_) | ExpressionKind::Variable(_) => self.kind,
            ExpressionKind::Array(items) => {
                let items: Vec<Expression> = items.into_iter().map(Expression::optimize).collect();
                if items.iter().all(|item| item.as_literal().is_some()) {
                    ExpressionKind::Literal(Value::Array(
                        items
                            .into_iter()
                            .filter_map(|item| match item.kind {
                                ExpressionKind::Literal(value) => Some(value),
                                _ => None,
                            })
                            .collect(),
                    ))
                } else {
                    ExpressionKind::Array(items)
                }
            }
            ExpressionKind::Map(entries) => {
                let entries: Vec<(String, Expression)> = entries
                    .into_iter()
                    .map(|(key, value)| (key, value.optimize()))
                    .collect();
                if entries.iter().all(|(_, value)| value.as_literal().is_some()) {
                    ExpressionKind::Literal(Value::Map(
                        entries
                            .into_iter()
                            .filter_map(|(key, value)| match value.kind {
                                ExpressionKind::Literal(value) => Some((key, value)),
                                _ => None,
                            })
                            .collect(),
                    ))
                } else {
                    ExpressionKind::Map(entries)
                }
            }
            ExpressionKind::Unary(op, operand) => {
                let operand = operand.optimize();
                match operand.as_literal().and_then(|value| op.apply(value)) {
                    Some(value) => ExpressionKind::Literal(value),
                    None => ExpressionKind::Unary(op, Box::new(operand)),
                }
            }
            ExpressionKind::Binary(op, lhs, rhs) => {
                let lhs = lhs.optimize();
                let rhs = rhs.optimize();
                let folded = match (lhs.as_literal(), rhs.as_literal()) {
                    (Some(a), Some(b)) => op.apply(a, b),
                    _ => None,
                };
                match folded {
                    Some(value) => ExpressionKind::Literal(value),
                    None => ExpressionKind::Binary(op, Box::new(lhs), Box::new(rhs)),
                }
            }
            ExpressionKind::Subscript(target, index) => {
                let target = target.optimize();
                let index = index.optimize();
                let folded = match (target.as_literal(), index.as_literal()) {
                    (Some(Value::Array(items)), Some(Value::Number(n)))
                        if *n >= 0.0 && n.fract() == 0.0 =>
                    {
                        items.get(*n as usize).cloned()
                    }
                    (Some(Value::Map(entries)), Some(Value::String(key))) => {
                        entries.get(key).cloned()
                    }
                    _ => None,
                };
                match folded {
                    Some(value) => ExpressionKind::Literal(value),
                    None => ExpressionKind::Subscript(Box::new(target), Box::new(index)),
                }
            }
            ExpressionKind::Case(condition, value) => {
                ExpressionKind::Case(Box::new(condition.optimize()), Box::new(value.optimize()))
            }
            ExpressionKind::Switch(cases) => return optimize_switch(cases, location),
        };

        Expression::new(kind, location)
    }
}

fn optimize_switch(cases: Vec<Expression>, location: Location) -> Expression {
    let mut remaining = Vec::with_capacity(cases.len());

    for case in cases.into_iter().map(Expression::optimize) {
        let case = match case.kind {
            ExpressionKind::Case(condition, value) => {
                match condition.as_literal().and_then(Value::as_bool) {
                    Some(false) => continue,
                    Some(true) => *value,
                    None => Expression::new(ExpressionKind::Case(condition, value), case.location),
                }
            }
            kind => Expression::new(kind, case.location),
        };

        // A literal always yields a value, so later cases are unreachable.
        let is_literal = case.as_literal().is_some();
        remaining.push(case);
        if is_literal {
            break;
        }
    }

    let single_plain = remaining.len() == 1
        && !matches!(
            remaining[0].kind,
            ExpressionKind::Case(..) | ExpressionKind::Switch(_)
        );
    if single_plain {
        if let Some(only) = remaining.pop() {
            return only;
        }
    }

    Expression::new(ExpressionKind::Switch(remaining), location)
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Expression, min: u8) -> fmt::Result {
    if operand.precedence() < min {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionKind::Literal(value) => write!(f, "{value}"),
            ExpressionKind::Variable(name) => f.write_str(name),
            ExpressionKind::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ExpressionKind::Map(entries) => {
                if entries.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{key}\": {value}")?;
                }
                f.write_str(" }")
            }
            ExpressionKind::Unary(op, operand) => {
                write!(f, "{op}")?;
                write_operand(f, operand, u8::MAX)
            }
            ExpressionKind::Binary(op, lhs, rhs) => {
                let precedence = op.precedence();
                write_operand(f, lhs, precedence)?;
                write!(f, " {op} ")?;
                // Left associative: an equal-precedence right operand needs parentheses.
                write_operand(f, rhs, precedence + 1)
            }
            ExpressionKind::Subscript(target, index) => {
                write_operand(f, target, u8::MAX)?;
                write!(f, "[{index}]")
            }
            ExpressionKind::Case(condition, value) => {
                write_operand(f, condition, 1)?;
                f.write_str(" -> ")?;
                write_operand(f, value, 1)
            }
            ExpressionKind::Switch(cases) => {
                if cases.is_empty() {
                    return f.write_str("{{}}");
                }
                f.write_str("{{ ")?;
                for (i, case) in cases.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{case}")?;
                }
                f.write_str(" }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> Location {
        Location::new(1, 1)
    }

    fn number(n: f64) -> Expression {
        Expression::literal(Value::Number(n), at())
    }

    fn string(s: &str) -> Expression {
        Expression::literal(Value::String(s.to_string()), at())
    }

    fn variable(name: &str) -> Expression {
        Expression::new(ExpressionKind::Variable(name.to_string()), at())
    }

    fn binary(op: BinaryOperator, lhs: Expression, rhs: Expression) -> Expression {
        Expression::new(ExpressionKind::Binary(op, Box::new(lhs), Box::new(rhs)), at())
    }

    fn case(condition: Expression, value: Expression) -> Expression {
        Expression::new(
            ExpressionKind::Case(Box::new(condition), Box::new(value)),
            at(),
        )
    }

    fn switch(cases: Vec<Expression>) -> Expression {
        Expression::new(ExpressionKind::Switch(cases), at())
    }

    #[test]
    fn test_display_literals() {
        assert_eq!(number(2.0).to_string(), "2");
        assert_eq!(number(0.5).to_string(), "0.5");
        assert_eq!(string("a.mdl").to_string(), "\"a.mdl\"");
        assert_eq!(
            Expression::literal(Value::Boolean(true), at()).to_string(),
            "true"
        );
    }

    #[test]
    fn test_display_switch_with_cases() {
        let expression = switch(vec![
            case(
                binary(BinaryOperator::Equal, variable("spawnflags"), number(1.0)),
                string("a.mdl"),
            ),
            string("b.mdl"),
        ]);
        assert_eq!(
            expression.to_string(),
            "{{ spawnflags == 1 -> \"a.mdl\", \"b.mdl\" }}"
        );
    }

    #[test]
    fn test_display_parenthesizes_by_precedence() {
        let sum = binary(BinaryOperator::Add, number(1.0), variable("x"));
        let product = binary(BinaryOperator::Multiply, sum, number(2.0));
        assert_eq!(product.to_string(), "(1 + x) * 2");

        let nested = binary(
            BinaryOperator::Subtract,
            variable("a"),
            binary(BinaryOperator::Subtract, variable("b"), variable("c")),
        );
        assert_eq!(nested.to_string(), "a - (b - c)");
    }

    #[test]
    fn test_display_map() {
        let map = Expression::new(
            ExpressionKind::Map(vec![
                ("path".to_string(), string("x.mdl")),
                ("skin".to_string(), number(1.0)),
            ]),
            at(),
        );
        assert_eq!(map.to_string(), "{ \"path\": \"x.mdl\", \"skin\": 1 }");
    }

    #[test]
    fn test_optimize_folds_arithmetic_and_comparison() {
        let expression = binary(
            BinaryOperator::Less,
            binary(BinaryOperator::Multiply, number(2.0), number(3.0)),
            number(10.0),
        );
        assert_eq!(
            expression.optimize().as_literal(),
            Some(&Value::Boolean(true))
        );
    }

    #[test]
    fn test_optimize_keeps_variables() {
        let expression = binary(
            BinaryOperator::Add,
            variable("x"),
            binary(BinaryOperator::Add, number(1.0), number(1.0)),
        );
        let optimized = expression.optimize();
        assert_eq!(optimized.to_string(), "x + 2");
    }

    #[test]
    fn test_optimize_map_becomes_literal() {
        let map = Expression::new(
            ExpressionKind::Map(vec![("path".to_string(), string("x.mdl"))]),
            at(),
        );
        let optimized = map.optimize();
        let Some(Value::Map(entries)) = optimized.as_literal() else {
            panic!("expected literal map, got {optimized:?}");
        };
        assert_eq!(entries.get("path"), Some(&Value::String("x.mdl".to_string())));
    }

    #[test]
    fn test_optimize_switch_decides_constant_cases() {
        let expression = switch(vec![
            case(Expression::literal(Value::Boolean(false), at()), string("never.mdl")),
            case(
                binary(BinaryOperator::Equal, variable("spawnflags"), number(1.0)),
                string("a.mdl"),
            ),
            case(Expression::literal(Value::Boolean(true), at()), string("b.mdl")),
            string("unreachable.mdl"),
        ]);
        assert_eq!(
            expression.optimize().to_string(),
            "{{ spawnflags == 1 -> \"a.mdl\", \"b.mdl\" }}"
        );
    }

    #[test]
    fn test_optimize_switch_with_single_plain_value_unwraps() {
        let expression = switch(vec![string("only.mdl")]);
        assert_eq!(expression.optimize(), string("only.mdl"));
    }

    #[test]
    fn test_optimize_leaves_undefined_operations() {
        let expression = binary(BinaryOperator::Divide, number(1.0), number(0.0));
        assert!(expression.optimize().as_literal().is_none());

        let mixed = binary(BinaryOperator::Add, number(1.0), string("a"));
        assert!(mixed.optimize().as_literal().is_none());
    }

    #[test]
    fn test_optimize_folds_bitwise_operations() {
        let masked = binary(BinaryOperator::BitwiseAnd, number(6.0), number(3.0));
        assert_eq!(masked.optimize().as_literal(), Some(&Value::Number(2.0)));

        let combined = binary(
            BinaryOperator::BitwiseOr,
            binary(BinaryOperator::ShiftLeft, number(1.0), number(4.0)),
            binary(BinaryOperator::BitwiseXor, number(5.0), number(1.0)),
        );
        assert_eq!(combined.optimize().as_literal(), Some(&Value::Number(20.0)));

        let inverted = Expression::new(
            ExpressionKind::Unary(UnaryOperator::BitwiseNot, Box::new(number(0.0))),
            at(),
        );
        assert_eq!(inverted.optimize().as_literal(), Some(&Value::Number(-1.0)));
    }

    #[test]
    fn test_optimize_keeps_bitwise_on_fractions_and_wide_shifts() {
        let fraction = binary(BinaryOperator::BitwiseAnd, number(1.5), number(1.0));
        assert!(fraction.optimize().as_literal().is_none());

        let negative = binary(BinaryOperator::ShiftRight, number(8.0), number(-1.0));
        assert!(negative.optimize().as_literal().is_none());

        let wide = binary(BinaryOperator::ShiftLeft, number(1.0), number(64.0));
        assert!(wide.optimize().as_literal().is_none());
    }

    #[test]
    fn test_display_bitwise_precedence() {
        let test = binary(
            BinaryOperator::Equal,
            binary(BinaryOperator::BitwiseAnd, variable("spawnflags"), number(3.0)),
            number(1.0),
        );
        assert_eq!(test.to_string(), "(spawnflags & 3) == 1");

        let mask = binary(
            BinaryOperator::BitwiseAnd,
            variable("spawnflags"),
            binary(BinaryOperator::ShiftLeft, number(1.0), number(2.0)),
        );
        assert_eq!(mask.to_string(), "spawnflags & 1 << 2");
    }

    #[test]
    fn test_optimize_subscript() {
        let array = Expression::new(ExpressionKind::Array(vec![number(4.0), number(5.0)]), at());
        let subscript = Expression::new(
            ExpressionKind::Subscript(Box::new(array), Box::new(number(1.0))),
            at(),
        );
        assert_eq!(subscript.optimize().as_literal(), Some(&Value::Number(5.0)));
    }
}
