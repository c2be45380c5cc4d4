//! # Lifeguard Statement
//!
//! Fluent, backend-agnostic statements for Lifeguard models: a predicate tree
//! compiled into sea-query conditions with collision-free parameters, a
//! statement builder with aggregate and grouping support, and a paginator that
//! counts once and hydrates rows into models.
//!
//! See [README on GitHub](https://github.com/microscaler/lifeguard) for full architecture.

pub mod config;
pub mod executor;
pub mod query;
pub mod row;
pub mod schema;

#[cfg(feature = "tracing")]
pub mod tracing_helpers;

pub use config::StatementConfig;
pub use executor::{LifeError, LifeExecutor, MayPostgresExecutor};
pub use query::{
    compile_structured, translate, translate_any, translate_group, Aggregate, AggregateOutput,
    AnyOperator, Attribute, Backend, BackendToken, Bound, CompiledQuery, ComparisonValue,
    Condition, ConditionCompiler, FilterMap, FindOptions, GroupOperator, GroupToken, GroupedRows,
    Operator, Paginator, Parameters, Predicate, Statement, Token,
};
pub use row::{hydrate, FromRow, FromValue, ModelRow, Row};
pub use schema::{Model, ModelDescriptor, Schema};

pub use sea_query::{Order, Value};
