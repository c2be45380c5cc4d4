//! Predicate trees.
//!
//! A [`Condition`] is either a leaf comparison on a model field or a group
//! node combining sub-conditions. The two variants keep leaf operators and
//! group operators apart at the type level, so the compiler's recursion is
//! exhaustive.
//!
//! # Example
//!
//! ```
//! use lifeguard_statement::Condition;
//!
//! let adults_in_us = Condition::attr("age")
//!     .gt(20)
//!     .and(Condition::attr("country").eq("US"));
//! assert_eq!(adults_in_us.leaf_count(), 2);
//! ```

use crate::query::operator::{GroupOperator, Operator};
use sea_query::Value;

/// Right-hand side of a leaf comparison.
///
/// Shapes are validated during compilation: `BETWEEN` needs a two-element
/// list, `IN` a non-empty list, the `LIKE` family and `REGEXP` a string.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonValue {
    /// No operand (`IS NULL`, `IS NOT NULL`).
    Null,
    Scalar(Value),
    List(Vec<Value>),
}

impl ComparisonValue {
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        ComparisonValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for ComparisonValue {
    fn from(value: Value) -> Self {
        ComparisonValue::Scalar(value)
    }
}

impl From<Vec<Value>> for ComparisonValue {
    fn from(values: Vec<Value>) -> Self {
        ComparisonValue::List(values)
    }
}

/// Predicate tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Leaf {
        attribute: String,
        operator: Operator,
        value: ComparisonValue,
    },
    Group {
        operator: GroupOperator,
        left: Box<Condition>,
        /// `None` only for unary groups (`NOT`).
        right: Option<Box<Condition>>,
    },
}

impl Condition {
    /// Start a leaf on `attribute` (a model field name).
    pub fn attr(attribute: impl Into<String>) -> Attribute {
        Attribute {
            name: attribute.into(),
        }
    }

    pub fn leaf(
        attribute: impl Into<String>,
        operator: Operator,
        value: impl Into<ComparisonValue>,
    ) -> Self {
        Condition::Leaf {
            attribute: attribute.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn group(operator: GroupOperator, left: Condition, right: Option<Condition>) -> Self {
        Condition::Group {
            operator,
            left: Box::new(left),
            right: right.map(Box::new),
        }
    }

    pub fn and(self, other: Condition) -> Self {
        Condition::group(GroupOperator::And, self, Some(other))
    }

    pub fn or(self, other: Condition) -> Self {
        Condition::group(GroupOperator::Or, self, Some(other))
    }

    /// Negation node. Representable, but rejected by every compiler.
    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Condition) -> Self {
        Condition::group(GroupOperator::Not, inner, None)
    }

    /// Fold `conditions` with AND; `None` when empty.
    pub fn all<I: IntoIterator<Item = Condition>>(conditions: I) -> Option<Self> {
        conditions.into_iter().reduce(Condition::and)
    }

    /// Fold `conditions` with OR; `None` when empty.
    pub fn any<I: IntoIterator<Item = Condition>>(conditions: I) -> Option<Self> {
        conditions.into_iter().reduce(Condition::or)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Condition::Leaf { .. })
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Condition::Leaf { .. } => 1,
            Condition::Group { left, right, .. } => {
                left.leaf_count() + right.as_ref().map_or(0, |r| r.leaf_count())
            }
        }
    }
}

/// Fluent leaf constructor returned by [`Condition::attr`].
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
}

impl Attribute {
    fn cmp(self, operator: Operator, value: ComparisonValue) -> Condition {
        Condition::leaf(self.name, operator, value)
    }

    fn scalar(self, operator: Operator, value: Value) -> Condition {
        self.cmp(operator, ComparisonValue::Scalar(value))
    }

    pub fn eq(self, value: impl Into<Value>) -> Condition {
        self.scalar(Operator::Equal, value.into())
    }

    pub fn ne(self, value: impl Into<Value>) -> Condition {
        self.scalar(Operator::NotEqual, value.into())
    }

    pub fn lt(self, value: impl Into<Value>) -> Condition {
        self.scalar(Operator::LessThan, value.into())
    }

    pub fn lte(self, value: impl Into<Value>) -> Condition {
        self.scalar(Operator::LessThanOrEqual, value.into())
    }

    pub fn gt(self, value: impl Into<Value>) -> Condition {
        self.scalar(Operator::GreaterThan, value.into())
    }

    pub fn gte(self, value: impl Into<Value>) -> Condition {
        self.scalar(Operator::GreaterThanOrEqual, value.into())
    }

    pub fn is_in<I, V>(self, values: I) -> Condition
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.cmp(Operator::In, ComparisonValue::list(values))
    }

    pub fn between(self, min: impl Into<Value>, max: impl Into<Value>) -> Condition {
        self.cmp(
            Operator::Between,
            ComparisonValue::List(vec![min.into(), max.into()]),
        )
    }

    /// Raw `LIKE`; the pattern is passed through unchanged.
    pub fn like(self, pattern: impl Into<String>) -> Condition {
        self.scalar(Operator::Like, Value::from(pattern.into()))
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Condition {
        self.scalar(Operator::StartsWith, Value::from(prefix.into()))
    }

    pub fn ends_with(self, suffix: impl Into<String>) -> Condition {
        self.scalar(Operator::EndsWith, Value::from(suffix.into()))
    }

    pub fn regexp(self, pattern: impl Into<String>) -> Condition {
        self.scalar(Operator::Regexp, Value::from(pattern.into()))
    }

    pub fn is_null(self) -> Condition {
        self.cmp(Operator::IsNull, ComparisonValue::Null)
    }

    pub fn is_not_null(self) -> Condition {
        self.cmp(Operator::IsNotNull, ComparisonValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluent_leaf() {
        let c = Condition::attr("age").gt(20);
        assert_eq!(
            c,
            Condition::Leaf {
                attribute: "age".into(),
                operator: Operator::GreaterThan,
                value: ComparisonValue::Scalar(Value::from(20)),
            }
        );
        assert!(c.is_leaf());
    }

    #[test]
    fn test_group_shape() {
        let c = Condition::attr("a").eq(1).or(Condition::attr("b").eq(2));
        match c {
            Condition::Group {
                operator,
                left,
                right,
            } => {
                assert_eq!(operator, GroupOperator::Or);
                assert!(left.is_leaf());
                assert!(right.is_some());
            }
            Condition::Leaf { .. } => panic!("expected group"),
        }
    }

    #[test]
    fn test_not_is_unary() {
        let c = Condition::not(Condition::attr("a").is_null());
        assert!(matches!(
            c,
            Condition::Group {
                operator: GroupOperator::Not,
                right: None,
                ..
            }
        ));
        assert_eq!(c.leaf_count(), 1);
    }

    #[test]
    fn test_all_and_any_fold() {
        assert!(Condition::all(Vec::new()).is_none());
        let c = Condition::all([
            Condition::attr("a").eq(1),
            Condition::attr("b").eq(2),
            Condition::attr("c").eq(3),
        ])
        .unwrap();
        assert_eq!(c.leaf_count(), 3);
        let d = Condition::any([Condition::attr("a").eq(1)]).unwrap();
        assert!(d.is_leaf());
    }

    #[test]
    fn test_between_and_in_build_lists() {
        let Condition::Leaf { value, .. } = Condition::attr("age").between(18, 65) else {
            panic!("expected leaf");
        };
        assert_eq!(value, ComparisonValue::List(vec![Value::from(18), Value::from(65)]));

        let Condition::Leaf { value, .. } = Condition::attr("id").is_in([1, 2, 3]) else {
            panic!("expected leaf");
        };
        assert!(matches!(value, ComparisonValue::List(v) if v.len() == 3));
    }
}
