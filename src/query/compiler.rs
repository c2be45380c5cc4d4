//! Condition compilation.
//!
//! [`ConditionCompiler`] walks a [`Condition`] tree and produces a sea-query
//! [`sea_query::Condition`] for the statement's `WHERE` clause. Leaves become
//! `alias.column <token> <placeholder>` expressions; AND/OR nodes are joined
//! with `Condition::all()` / `Condition::any()` so sea-query handles
//! parenthesisation.
//!
//! Every placeholder is also recorded in a named [`Parameters`] ledger keyed
//! `"{attribute}_{counter}"`. The counter is threaded through the recursion
//! and only ever increases, so two leaves on the same attribute never share a
//! key.
//!
//! [`compile_structured`] is the constrained mode: it flattens a tree into a
//! list of per-branch filter maps (OR of ANDs) and rejects trees that cannot
//! be expressed that way.

use crate::executor::LifeError;
use crate::query::backend::Backend;
use crate::query::condition::{ComparisonValue, Condition};
use crate::query::operator::{translate, translate_group, GroupOperator, GroupToken, Operator, Token};
use crate::query::Name;
use crate::schema::ModelDescriptor;
use sea_query::{Condition as SeaCondition, Expr, ExprTrait, LikeExpr, Value};
use std::collections::BTreeMap;

/// Value bound to one named parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Value(Value),
    /// Whole-list binding used by `IN`.
    List(Vec<Value>),
}

/// Named parameter ledger of a compiled query, in binding order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, Bound)>,
}

impl Parameters {
    fn insert(&mut self, name: String, bound: Bound) -> Result<(), LifeError> {
        if self.get(&name).is_some() {
            return Err(LifeError::InternalError(format!(
                "parameter `{name}` bound twice in one query"
            )));
        }
        self.entries.push((name, bound));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Bound> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bound)| bound)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bound)> {
        self.entries.iter().map(|(name, bound)| (name.as_str(), bound))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Recursive compiler from [`Condition`] to a sea-query condition.
pub struct ConditionCompiler<'d> {
    backend: Backend,
    alias: String,
    descriptor: &'d ModelDescriptor,
    counter: usize,
    parameters: Parameters,
}

impl<'d> ConditionCompiler<'d> {
    pub fn new(backend: Backend, alias: impl Into<String>, descriptor: &'d ModelDescriptor) -> Self {
        Self {
            backend,
            alias: alias.into(),
            descriptor,
            counter: 0,
            parameters: Parameters::default(),
        }
    }

    /// Next placeholder index.
    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn into_parameters(self) -> Parameters {
        self.parameters
    }

    /// Compile `condition`, failing at the first invalid node.
    ///
    /// # Errors
    ///
    /// `QueryError` for `NOT` nodes, group nodes missing an operand, operators
    /// without a backend token, and malformed comparison values.
    pub fn compile(&mut self, condition: &Condition) -> Result<SeaCondition, LifeError> {
        match condition {
            Condition::Leaf {
                attribute,
                operator,
                value,
            } => {
                let expr = self.compile_leaf(attribute, *operator, value)?;
                Ok(SeaCondition::all().add(expr))
            }
            Condition::Group {
                operator,
                left,
                right,
            } => {
                let token = translate_group(*operator)?;
                let right = right.as_deref().ok_or_else(|| {
                    LifeError::QueryError(format!("{operator} node is missing its right operand"))
                })?;
                let left = self.compile(left)?;
                let right = self.compile(right)?;
                let joined = match token {
                    GroupToken::All => SeaCondition::all(),
                    GroupToken::Any => SeaCondition::any(),
                };
                Ok(joined.add(left).add(right))
            }
        }
    }

    fn compile_leaf(
        &mut self,
        attribute: &str,
        operator: Operator,
        value: &ComparisonValue,
    ) -> Result<Expr, LifeError> {
        check_shape(attribute, operator, value)?;
        let token = translate(self.backend, operator)?;
        let column = Expr::col((
            Name::new(&self.alias),
            Name::new(self.descriptor.column_name(attribute)),
        ));

        let expr = match (token, value) {
            (Token::IsNull, _) => column.is_null(),
            (Token::IsNotNull, _) => column.is_not_null(),
            (Token::Between, ComparisonValue::List(bounds)) => {
                let (min, max) = (bounds[0].clone(), bounds[1].clone());
                self.bind(attribute, Bound::Value(min.clone()))?;
                self.bind(attribute, Bound::Value(max.clone()))?;
                column.between(Expr::val(min), Expr::val(max))
            }
            (Token::In, ComparisonValue::List(items)) => {
                self.bind(attribute, Bound::List(items.clone()))?;
                column.is_in(items.iter().cloned().map(Expr::val))
            }
            (Token::Like, ComparisonValue::Scalar(v)) => {
                let pattern = like_pattern(operator, v)?;
                self.bind(attribute, Bound::Value(Value::from(pattern.clone())))?;
                column.like(LikeExpr::new(pattern).escape('\\'))
            }
            (Token::Binary(_), ComparisonValue::Scalar(v)) => {
                let oper = token.bin_oper().ok_or_else(|| {
                    LifeError::QueryError(format!("no binary operator for {operator}"))
                })?;
                self.bind(attribute, Bound::Value(v.clone()))?;
                column.binary(oper, Expr::val(v.clone()))
            }
            _ => return Err(shape_error(attribute, operator, "a scalar value")),
        };
        Ok(expr)
    }

    fn bind(&mut self, attribute: &str, bound: Bound) -> Result<(), LifeError> {
        let name = format!("{attribute}_{}", self.counter);
        self.counter += 1;
        self.parameters.insert(name, bound)
    }
}

/// Validate the comparison value against the operator's expected shape.
fn check_shape(attribute: &str, operator: Operator, value: &ComparisonValue) -> Result<(), LifeError> {
    match (operator, value) {
        (Operator::IsNull | Operator::IsNotNull, _) => Ok(()),
        (Operator::Between, ComparisonValue::List(bounds)) if bounds.len() == 2 => Ok(()),
        (Operator::Between, ComparisonValue::List(bounds)) => Err(LifeError::QueryError(format!(
            "BETWEEN on `{attribute}` needs exactly 2 bounds, got {}",
            bounds.len()
        ))),
        (Operator::Between, _) => Err(shape_error(attribute, operator, "a [min, max] pair")),
        (Operator::In, ComparisonValue::List(items)) if !items.is_empty() => Ok(()),
        (Operator::In, ComparisonValue::List(_)) => Err(LifeError::QueryError(format!(
            "IN on `{attribute}` needs at least one value"
        ))),
        (Operator::In, _) => Err(shape_error(attribute, operator, "a list of values")),
        (
            Operator::Like | Operator::StartsWith | Operator::EndsWith | Operator::Regexp,
            ComparisonValue::Scalar(Value::String(Some(_))),
        ) => Ok(()),
        (Operator::Like | Operator::StartsWith | Operator::EndsWith | Operator::Regexp, _) => {
            Err(shape_error(attribute, operator, "a string"))
        }
        (_, ComparisonValue::Scalar(_)) => Ok(()),
        (_, _) => Err(shape_error(attribute, operator, "a scalar value")),
    }
}

fn shape_error(attribute: &str, operator: Operator, expected: &str) -> LifeError {
    LifeError::QueryError(format!("{operator} on `{attribute}` requires {expected}"))
}

/// Build the LIKE pattern, adding wildcards for the prefix/suffix operators.
fn like_pattern(operator: Operator, value: &Value) -> Result<String, LifeError> {
    let Value::String(Some(raw)) = value else {
        return Err(LifeError::QueryError(format!("{operator} requires a string")));
    };
    let raw = raw.to_string();
    Ok(match operator {
        Operator::StartsWith => format!("{}%", escape_like(&raw)),
        Operator::EndsWith => format!("%{}", escape_like(&raw)),
        _ => raw,
    })
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// One leaf of a structured filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub operator: Operator,
    pub value: ComparisonValue,
}

/// Conjunction of predicates keyed by field; a field appears at most once.
pub type FilterMap = BTreeMap<String, Predicate>;

/// Flatten `condition` into OR-ed filter maps.
///
/// OR nodes concatenate branches. AND nodes merge two single-branch sides;
/// an AND over an OR-tree, a `NOT`, or a field constrained twice within one
/// branch cannot be represented and is rejected.
///
/// # Errors
///
/// `QueryError` for the unrepresentable shapes above and malformed values.
pub fn compile_structured(condition: &Condition) -> Result<Vec<FilterMap>, LifeError> {
    match condition {
        Condition::Leaf {
            attribute,
            operator,
            value,
        } => {
            check_shape(attribute, *operator, value)?;
            let mut map = FilterMap::new();
            map.insert(
                attribute.clone(),
                Predicate {
                    operator: *operator,
                    value: value.clone(),
                },
            );
            Ok(vec![map])
        }
        Condition::Group {
            operator: GroupOperator::Not,
            ..
        } => Err(LifeError::QueryError(
            "NOT cannot be expressed as a structured filter".to_string(),
        )),
        Condition::Group {
            operator,
            left,
            right,
        } => {
            let right = right.as_deref().ok_or_else(|| {
                LifeError::QueryError(format!("{operator} node is missing its right operand"))
            })?;
            let mut left = compile_structured(left)?;
            let mut right = compile_structured(right)?;
            match operator {
                GroupOperator::Or => {
                    left.append(&mut right);
                    Ok(left)
                }
                _ => {
                    if left.len() != 1 || right.len() != 1 {
                        return Err(LifeError::QueryError(
                            "AND over an OR branch cannot be merged into a single filter map"
                                .to_string(),
                        ));
                    }
                    let mut merged = left.remove(0);
                    for (field, predicate) in right.remove(0) {
                        if merged.contains_key(&field) {
                            return Err(LifeError::QueryError(format!(
                                "field `{field}` is constrained twice in one filter branch"
                            )));
                        }
                        merged.insert(field, predicate);
                    }
                    Ok(vec![merged])
                }
            }
        }
    }
}
