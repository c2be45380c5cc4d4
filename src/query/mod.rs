//! Statement compilation and pagination.
//!
//! This module holds the query pipeline, leaf first:
//! - **Operator**: abstract operators and their backend tokens (`translate`)
//! - **Condition**: the predicate tree (`Condition`)
//! - **Compiler**: predicate tree to sea-query condition plus parameter ledger
//! - **Statement**: fluent builder producing a `CompiledQuery`
//! - **Aggregate**: shaping of aggregate and grouped result rows
//! - **Execution**: the `Paginator`
//! - **Value Conversion**: sea-query `Value` to `ToSql` parameters and back
//!
//! # Examples
//!
//! ```
//! use lifeguard_statement::{Backend, Condition, Model, ModelDescriptor, Order, Schema, Statement};
//!
//! struct User;
//!
//! impl Model for User {
//!     fn descriptor() -> ModelDescriptor {
//!         ModelDescriptor::new("users").field("name").field("age").field("country")
//!     }
//! }
//!
//! let schema = Schema::new().with::<User>();
//! let mut statement = Statement::new(&schema, Backend::Postgres);
//! statement
//!     .from::<User>()
//!     .where_(Condition::attr("age").gt(20).and(Condition::attr("country").eq("US")))
//!     .order_by("name", Order::Asc)
//!     .limit(5);
//!
//! let query = statement.build()?;
//! assert_eq!(query.parameters().len(), 2);
//! # Ok::<(), lifeguard_statement::LifeError>(())
//! ```

use sea_query::Iden;

pub mod backend;
#[doc(inline)]
pub use backend::Backend;

pub mod operator;
#[doc(inline)]
pub use operator::{
    translate, translate_any, translate_group, AnyOperator, BackendToken, GroupOperator,
    GroupToken, Operator, Token,
};

pub mod condition;
#[doc(inline)]
pub use condition::{Attribute, ComparisonValue, Condition};

pub mod compiler;
#[doc(inline)]
pub use compiler::{compile_structured, Bound, ConditionCompiler, FilterMap, Parameters, Predicate};

pub mod statement;
#[doc(inline)]
pub use statement::{Aggregate, CompiledQuery, FindOptions, Statement};

pub mod aggregate;
#[doc(inline)]
pub use aggregate::{AggregateOutput, GroupedRows};

pub mod execution;
#[doc(inline)]
pub use execution::Paginator;

pub(crate) mod value_conversion;

/// Runtime identifier for tables, aliases and columns resolved from a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Name(String);

impl Name {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Name(name.into())
    }
}

impl Iden for Name {
    fn unquoted(&self) -> &str {
        &self.0
    }
}
