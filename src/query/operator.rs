//! Operator translation.
//!
//! Abstract comparison and group operators are mapped to backend tokens with
//! plain `match` tables. A missing mapping is a `QueryError`, never a silent
//! fallthrough.

use crate::executor::LifeError;
use crate::query::backend::Backend;
use sea_query::BinOper;
use std::fmt;

/// Leaf comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    In,
    Between,
    /// `LIKE` with a caller-supplied pattern.
    Like,
    /// `LIKE 'value%'`; the wildcard is appended by the compiler.
    StartsWith,
    /// `LIKE '%value'`; the wildcard is prepended by the compiler.
    EndsWith,
    Regexp,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "EQUAL",
            Operator::NotEqual => "NOT_EQUAL",
            Operator::LessThan => "LESS_THAN",
            Operator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            Operator::GreaterThan => "GREATER_THAN",
            Operator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            Operator::In => "IN",
            Operator::Between => "BETWEEN",
            Operator::Like => "LIKE",
            Operator::StartsWith => "STARTS_WITH",
            Operator::EndsWith => "ENDS_WITH",
            Operator::Regexp => "REGEXP",
            Operator::IsNull => "IS_NULL",
            Operator::IsNotNull => "IS_NOT_NULL",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combinators joining sub-conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupOperator {
    And,
    Or,
    /// Recognised by the condition model but has no backend token.
    Not,
}

impl GroupOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupOperator::And => "AND",
            GroupOperator::Or => "OR",
            GroupOperator::Not => "NOT",
        }
    }
}

impl fmt::Display for GroupOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either kind of operator, for callers holding an untyped operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyOperator {
    Comparison(Operator),
    Group(GroupOperator),
}

impl From<Operator> for AnyOperator {
    fn from(op: Operator) -> Self {
        AnyOperator::Comparison(op)
    }
}

impl From<GroupOperator> for AnyOperator {
    fn from(op: GroupOperator) -> Self {
        AnyOperator::Group(op)
    }
}

/// Backend token for a leaf comparison.
///
/// The variant also fixes the operand shape the compiler must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `column <op> $n`
    Binary(&'static str),
    /// `column IN ($n, ...)`
    In,
    /// `column BETWEEN $n AND $m`
    Between,
    /// `column LIKE $n`
    Like,
    /// `column IS NULL`
    IsNull,
    /// `column IS NOT NULL`
    IsNotNull,
}

impl Token {
    pub fn sql(self) -> &'static str {
        match self {
            Token::Binary(op) => op,
            Token::In => "IN",
            Token::Between => "BETWEEN",
            Token::Like => "LIKE",
            Token::IsNull => "IS NULL",
            Token::IsNotNull => "IS NOT NULL",
        }
    }

    /// sea-query operator for `Binary` tokens.
    pub(crate) fn bin_oper(self) -> Option<BinOper> {
        match self {
            Token::Binary("=") => Some(BinOper::Equal),
            Token::Binary("<>") => Some(BinOper::NotEqual),
            Token::Binary("<") => Some(BinOper::SmallerThan),
            Token::Binary("<=") => Some(BinOper::SmallerThanOrEqual),
            Token::Binary(">") => Some(BinOper::GreaterThan),
            Token::Binary(">=") => Some(BinOper::GreaterThanOrEqual),
            Token::Binary(custom) => Some(BinOper::Custom(custom)),
            _ => None,
        }
    }
}

/// Backend token for a group node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupToken {
    /// Joined with `sea_query::Condition::all()`.
    All,
    /// Joined with `sea_query::Condition::any()`.
    Any,
}

impl GroupToken {
    pub fn sql(self) -> &'static str {
        match self {
            GroupToken::All => "AND",
            GroupToken::Any => "OR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendToken {
    Comparison(Token),
    Group(GroupToken),
}

/// Translate a comparison operator for `backend`.
///
/// # Errors
///
/// `QueryError` when the backend has no token for the operator (SQLite ships
/// without a `REGEXP` implementation).
pub fn translate(backend: Backend, operator: Operator) -> Result<Token, LifeError> {
    let token = match operator {
        Operator::Equal => Token::Binary("="),
        Operator::NotEqual => Token::Binary("<>"),
        Operator::LessThan => Token::Binary("<"),
        Operator::LessThanOrEqual => Token::Binary("<="),
        Operator::GreaterThan => Token::Binary(">"),
        Operator::GreaterThanOrEqual => Token::Binary(">="),
        Operator::In => Token::In,
        Operator::Between => Token::Between,
        Operator::Like | Operator::StartsWith | Operator::EndsWith => Token::Like,
        Operator::Regexp => match backend {
            Backend::Postgres => Token::Binary("~"),
            Backend::Mysql => Token::Binary("REGEXP"),
            Backend::Sqlite => return Err(unsupported(operator.as_str(), backend)),
        },
        Operator::IsNull => Token::IsNull,
        Operator::IsNotNull => Token::IsNotNull,
    };
    Ok(token)
}

/// Translate a group operator.
///
/// # Errors
///
/// `QueryError` for [`GroupOperator::Not`], which has no token.
pub fn translate_group(operator: GroupOperator) -> Result<GroupToken, LifeError> {
    match operator {
        GroupOperator::And => Ok(GroupToken::All),
        GroupOperator::Or => Ok(GroupToken::Any),
        GroupOperator::Not => Err(LifeError::QueryError(
            "unsupported operator NOT: negation is not implemented".to_string(),
        )),
    }
}

/// Translate either kind of operator, comparison table first.
///
/// # Errors
///
/// Same as [`translate`] and [`translate_group`].
pub fn translate_any(
    backend: Backend,
    operator: impl Into<AnyOperator>,
) -> Result<BackendToken, LifeError> {
    match operator.into() {
        AnyOperator::Comparison(op) => translate(backend, op).map(BackendToken::Comparison),
        AnyOperator::Group(op) => translate_group(op).map(BackendToken::Group),
    }
}

fn unsupported(operator: &str, backend: Backend) -> LifeError {
    LifeError::QueryError(format!(
        "unsupported operator {operator}: no {backend} mapping"
    ))
}
