//! Statement builder.
//!
//! A [`Statement`] accumulates query intent through `&mut self` fluent methods
//! and compiles it with [`Statement::build`] into a [`CompiledQuery`]: the
//! sea-query `SelectStatement`, its rendered SQL and values for the statement's
//! [`Backend`], and the named [`Parameters`] ledger of the `WHERE` clause.
//!
//! Compilation rules:
//! - the select list is exactly one of the active aggregate, the explicit field
//!   list, or all fields of the target alias;
//! - aggregate and grouped queries get no implicit ordering, row queries are
//!   ordered by primary key ascending unless an order is given;
//! - aggregate queries get no implicit limit, row queries fall back to the
//!   configured default limit;
//! - offset is only emitted when set.

use crate::config::StatementConfig;
use crate::executor::{LifeError, LifeExecutor};
use crate::query::aggregate::{self, AggregateOutput};
use crate::query::backend::Backend;
use crate::query::compiler::{compile_structured, ConditionCompiler, FilterMap, Parameters};
use crate::query::condition::Condition;
use crate::query::execution::Paginator;
use crate::query::Name;
use crate::row::{hydrate, FromRow};
use crate::schema::{Model, ModelDescriptor, Schema};
use sea_query::{Asterisk, Expr, Func, FunctionCall, Order, Query, SelectStatement, Values};
use std::any::TypeId;
use std::collections::BTreeMap;

/// Aggregate selector. At most one is active per statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    CountDistinct(String),
    Sum(String),
    Avg(String),
    Max(String),
    Min(String),
    Distinct(String),
}

impl Aggregate {
    /// Rank used when several selectors were configured; lower wins.
    pub fn priority(&self) -> u8 {
        match self {
            Aggregate::Count => 0,
            Aggregate::CountDistinct(_) => 1,
            Aggregate::Sum(_) => 2,
            Aggregate::Avg(_) => 3,
            Aggregate::Max(_) => 4,
            Aggregate::Min(_) => 5,
            Aggregate::Distinct(_) => 6,
        }
    }

    /// Field the aggregate is computed over, `None` for `COUNT(*)`.
    pub fn field(&self) -> Option<&str> {
        match self {
            Aggregate::Count => None,
            Aggregate::CountDistinct(f)
            | Aggregate::Sum(f)
            | Aggregate::Avg(f)
            | Aggregate::Max(f)
            | Aggregate::Min(f)
            | Aggregate::Distinct(f) => Some(f),
        }
    }
}

/// Backend-ready artifact produced by [`Statement::build`].
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    select: SelectStatement,
    backend: Backend,
    sql: String,
    values: Values,
    parameters: Parameters,
    aggregate: Option<Aggregate>,
    output_column: Option<String>,
    group_columns: Vec<String>,
}

impl CompiledQuery {
    fn render(
        select: SelectStatement,
        backend: Backend,
        parameters: Parameters,
        aggregate: Option<Aggregate>,
        output_column: Option<String>,
        group_columns: Vec<String>,
    ) -> Self {
        let (sql, values) = backend.render(&select);
        log::debug!(
            "compiled {backend} query: {sql} ({} condition parameters)",
            parameters.len()
        );
        Self {
            select,
            backend,
            sql,
            values,
            parameters,
            aggregate,
            output_column,
            group_columns,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Every positional value, including `LIMIT`/`OFFSET`.
    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Named ledger of the condition parameters.
    ///
    /// The ledger is logical: an `IN` list is one entry holding the whole
    /// array, while [`values`](Self::values) carries one positional value per
    /// element. Use `values` for binding.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The underlying sea-query handle.
    pub fn select(&self) -> &SelectStatement {
        &self.select
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn aggregate(&self) -> Option<&Aggregate> {
        self.aggregate.as_ref()
    }

    /// Result column holding the aggregate value.
    pub fn output_column(&self) -> Option<&str> {
        self.output_column.as_deref()
    }

    /// Group-by columns in declaration order, as they appear in result rows.
    pub fn group_columns(&self) -> &[String] {
        &self.group_columns
    }

    pub fn is_aggregate(&self) -> bool {
        self.aggregate.is_some()
    }
}

fn select_as(select: &mut SelectStatement, expr: FunctionCall, alias: &str) -> String {
    select.expr_as(expr, Name::new(alias));
    alias.to_string()
}

/// Structured query description for adapters that take filter maps instead
/// of SQL text.
#[derive(Debug, Clone, PartialEq)]
pub struct FindOptions {
    pub table: String,
    /// OR of AND-maps keyed by column name; empty means no filter.
    pub filters: Vec<FilterMap>,
    pub order: Vec<(String, Order)>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

/// Fluent statement accumulator.
///
/// Setters overwrite (last call wins) except [`order_by`](Self::order_by) and
/// [`group_by`](Self::group_by), which append. Each aggregate selector has its
/// own slot; [`build`](Self::build) uses the highest-priority one.
#[derive(Debug, Clone)]
pub struct Statement<'s> {
    schema: &'s Schema,
    backend: Backend,
    default_limit: u64,
    default_page_size: u64,
    model: Option<TypeId>,
    fields: Vec<String>,
    aggregates: BTreeMap<u8, Aggregate>,
    group_by: Vec<String>,
    order_by: Vec<(String, Order)>,
    condition: Option<Condition>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<'s> Statement<'s> {
    pub fn new(schema: &'s Schema, backend: Backend) -> Self {
        Self::with_config(
            schema,
            &StatementConfig {
                backend,
                ..StatementConfig::default()
            },
        )
    }

    pub fn with_config(schema: &'s Schema, config: &StatementConfig) -> Self {
        Self {
            schema,
            backend: config.backend,
            default_limit: config.default_limit,
            default_page_size: config.default_page_size,
            model: None,
            fields: Vec::new(),
            aggregates: BTreeMap::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            condition: None,
            limit: None,
            offset: None,
        }
    }

    /// Set the target model.
    pub fn from<M: Model>(&mut self) -> &mut Self {
        self.model = Some(TypeId::of::<M>());
        self
    }

    /// Explicit field list, replacing any previous one.
    pub fn select<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn where_(&mut self, condition: Condition) -> &mut Self {
        self.condition = Some(condition);
        self
    }

    /// Alias of [`where_`](Self::where_).
    pub fn filter(&mut self, condition: Condition) -> &mut Self {
        self.where_(condition)
    }

    pub fn order_by(&mut self, field: impl Into<String>, order: Order) -> &mut Self {
        self.order_by.push((field.into(), order));
        self
    }

    pub fn group_by(&mut self, field: impl Into<String>) -> &mut Self {
        self.group_by.push(field.into());
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    fn set_aggregate(&mut self, aggregate: Aggregate) -> &mut Self {
        self.aggregates.insert(aggregate.priority(), aggregate);
        self
    }

    pub fn count(&mut self) -> &mut Self {
        self.set_aggregate(Aggregate::Count)
    }

    pub fn count_distinct(&mut self, field: impl Into<String>) -> &mut Self {
        self.set_aggregate(Aggregate::CountDistinct(field.into()))
    }

    pub fn sum(&mut self, field: impl Into<String>) -> &mut Self {
        self.set_aggregate(Aggregate::Sum(field.into()))
    }

    pub fn avg(&mut self, field: impl Into<String>) -> &mut Self {
        self.set_aggregate(Aggregate::Avg(field.into()))
    }

    pub fn max(&mut self, field: impl Into<String>) -> &mut Self {
        self.set_aggregate(Aggregate::Max(field.into()))
    }

    pub fn min(&mut self, field: impl Into<String>) -> &mut Self {
        self.set_aggregate(Aggregate::Min(field.into()))
    }

    pub fn distinct(&mut self, field: impl Into<String>) -> &mut Self {
        self.set_aggregate(Aggregate::Distinct(field.into()))
    }

    /// Active aggregate selector, if any.
    pub fn aggregate_selector(&self) -> Option<&Aggregate> {
        self.aggregates.values().next()
    }

    pub fn is_aggregate(&self) -> bool {
        !self.aggregates.is_empty()
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty()
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn model_type(&self) -> Option<TypeId> {
        self.model
    }

    pub(crate) fn descriptor(&self) -> Result<&'s ModelDescriptor, LifeError> {
        let model = self.model.ok_or_else(|| {
            LifeError::InternalError("statement has no target model; call from::<M>() first".to_string())
        })?;
        self.schema.descriptor_by_id(model)
    }

    /// Compile the statement.
    ///
    /// # Errors
    ///
    /// `InternalError` without a registered target model, `QueryError` from
    /// condition compilation.
    pub fn build(&self) -> Result<CompiledQuery, LifeError> {
        self.compile(self.limit, self.offset, true)
    }

    /// Compile with an explicit page window, overriding limit and offset.
    pub(crate) fn build_window(&self, limit: u64, offset: u64) -> Result<CompiledQuery, LifeError> {
        self.compile(Some(limit), Some(offset), true)
    }

    /// `SELECT COUNT(*) FROM (<row query>) AS count_subquery`.
    ///
    /// The inner query keeps filters and grouping but drops ordering, limit
    /// and offset, so the result is the number of matching records.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_count(&self) -> Result<CompiledQuery, LifeError> {
        let inner = self.compile(None, None, false)?;
        let mut select = Query::select();
        select
            .expr_as(Func::count(Expr::col(Asterisk)), Name::new("count"))
            .from_subquery(inner.select, Name::new("count_subquery"));
        Ok(CompiledQuery::render(
            select,
            self.backend,
            inner.parameters,
            Some(Aggregate::Count),
            Some("count".to_string()),
            Vec::new(),
        ))
    }

    fn compile(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
        windowed: bool,
    ) -> Result<CompiledQuery, LifeError> {
        let descriptor = self.descriptor()?;
        let alias = descriptor.table_alias();
        let column = |field: &str| (Name::new(alias), Name::new(descriptor.column_name(field)));

        let mut select = Query::select();
        select.from_as(Name::new(descriptor.table()), Name::new(alias));

        let group_columns: Vec<String> = self
            .group_by
            .iter()
            .map(|field| descriptor.column_name(field).to_string())
            .collect();
        let aggregate = self.aggregate_selector().cloned();

        let mut output_column = None;
        match &aggregate {
            Some(agg) => {
                for field in &self.group_by {
                    select.column(column(field));
                }
                output_column = Some(match agg {
                    Aggregate::Distinct(field) => {
                        select.distinct().column(column(field));
                        descriptor.column_name(field).to_string()
                    }
                    Aggregate::Count => select_as(&mut select, Func::count(Expr::col(Asterisk)), "count"),
                    Aggregate::CountDistinct(f) => {
                        select_as(&mut select, Func::count_distinct(Expr::col(column(f))), "count")
                    }
                    Aggregate::Sum(f) => select_as(&mut select, Func::sum(Expr::col(column(f))), "sum"),
                    Aggregate::Avg(f) => select_as(&mut select, Func::avg(Expr::col(column(f))), "avg"),
                    Aggregate::Max(f) => select_as(&mut select, Func::max(Expr::col(column(f))), "max"),
                    Aggregate::Min(f) => select_as(&mut select, Func::min(Expr::col(column(f))), "min"),
                });
            }
            None if !self.fields.is_empty() => {
                let pk = descriptor.primary_key_field();
                if !self.fields.iter().any(|f| f == pk) {
                    select.column(column(pk));
                }
                for field in &self.fields {
                    select.column(column(field));
                }
            }
            None if !self.group_by.is_empty() => {
                for field in &self.group_by {
                    select.column(column(field));
                }
            }
            None => {
                select.column((Name::new(alias), Asterisk));
            }
        }

        let mut compiler = ConditionCompiler::new(self.backend, alias, descriptor);
        if let Some(condition) = &self.condition {
            select.cond_where(compiler.compile(condition)?);
        }

        for field in &self.group_by {
            select.group_by_col(column(field));
        }

        if windowed {
            if !self.order_by.is_empty() {
                for (field, order) in &self.order_by {
                    select.order_by(column(field), order.clone());
                }
            } else if aggregate.is_none() && self.group_by.is_empty() {
                select.order_by(column(descriptor.primary_key_field()), Order::Asc);
            }

            match limit {
                Some(limit) => {
                    select.limit(limit);
                }
                None if aggregate.is_none() => {
                    select.limit(self.default_limit);
                }
                None => {}
            }

            if let Some(offset) = offset {
                select.offset(offset);
            }
        }

        Ok(CompiledQuery::render(
            select,
            self.backend,
            compiler.into_parameters(),
            aggregate,
            output_column,
            group_columns,
        ))
    }

    /// Structured form of the statement (filter maps, order, skip, take).
    ///
    /// # Errors
    ///
    /// `InternalError` without a registered target model; `QueryError` when the
    /// condition cannot be flattened into filter maps.
    pub fn find_options(&self) -> Result<FindOptions, LifeError> {
        let descriptor = self.descriptor()?;
        let filters = match &self.condition {
            Some(condition) => compile_structured(condition)?
                .into_iter()
                .map(|map| {
                    map.into_iter()
                        .map(|(field, predicate)| {
                            (descriptor.column_name(&field).to_string(), predicate)
                        })
                        .collect()
                })
                .collect(),
            None => Vec::new(),
        };

        let order = if self.order_by.is_empty() && !self.is_aggregate() && self.group_by.is_empty() {
            vec![(descriptor.primary_key_column().to_string(), Order::Asc)]
        } else {
            self.order_by
                .iter()
                .map(|(field, order)| (descriptor.column_name(field).to_string(), order.clone()))
                .collect()
        };

        let take = match self.limit {
            Some(limit) => Some(limit),
            None if !self.is_aggregate() => Some(self.default_limit),
            None => None,
        };

        Ok(FindOptions {
            table: descriptor.table().to_string(),
            filters,
            order,
            skip: self.offset,
            take,
        })
    }

    /// Run a row query and hydrate every row into `M`.
    ///
    /// # Errors
    ///
    /// `InternalError` when the target is not `M`, `QueryError` for aggregate
    /// statements, plus compile, executor and hydration errors.
    pub fn execute<M, Ex>(&self, executor: &Ex) -> Result<Vec<M>, LifeError>
    where
        M: Model + FromRow,
        Ex: LifeExecutor + ?Sized,
    {
        if self.model != Some(TypeId::of::<M>()) {
            return Err(LifeError::InternalError(format!(
                "statement does not target {}",
                std::any::type_name::<M>()
            )));
        }
        if self.is_aggregate() {
            return Err(LifeError::QueryError(
                "aggregate statements return values, not models; use aggregate()".to_string(),
            ));
        }
        let descriptor = self.descriptor()?;
        let query = self.build()?;
        let rows = executor.query_all(query.sql(), query.values())?;
        let transient: Vec<&str> = descriptor.transient_fields().collect();
        rows.iter()
            .map(|row| hydrate::<M>(row, descriptor, &transient))
            .collect()
    }

    /// Run an aggregate or grouped statement and shape the result.
    ///
    /// # Errors
    ///
    /// `QueryError` for plain row statements, plus compile, executor and
    /// shaping errors.
    pub fn aggregate<Ex>(&self, executor: &Ex) -> Result<AggregateOutput, LifeError>
    where
        Ex: LifeExecutor + ?Sized,
    {
        if !self.is_aggregate() && !self.is_grouped() {
            return Err(LifeError::QueryError(
                "statement has neither an aggregate nor a group-by; use execute()".to_string(),
            ));
        }
        let query = self.build()?;
        let rows = executor.query_all(query.sql(), query.values())?;
        aggregate::process(&query, rows)
    }

    /// Page through the statement's rows as `M`.
    ///
    /// # Errors
    ///
    /// `PagingError` without a target model, when the target is not `M`, for
    /// aggregate or grouped statements, or when `page_size` is 0.
    pub fn paginate<'e, M, Ex>(
        &self,
        executor: &'e Ex,
        page_size: u64,
    ) -> Result<Paginator<'s, 'e, M, Ex>, LifeError>
    where
        M: Model + FromRow,
        Ex: LifeExecutor + ?Sized,
    {
        Paginator::new(self.clone(), executor, page_size)
    }

    /// [`paginate`](Self::paginate) with the configured `default_page_size`.
    ///
    /// # Errors
    ///
    /// As [`paginate`](Self::paginate).
    pub fn paginate_default<'e, M, Ex>(
        &self,
        executor: &'e Ex,
    ) -> Result<Paginator<'s, 'e, M, Ex>, LifeError>
    where
        M: Model + FromRow,
        Ex: LifeExecutor + ?Sized,
    {
        self.paginate(executor, self.default_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User;

    impl Model for User {
        fn descriptor() -> ModelDescriptor {
            ModelDescriptor::new("users")
                .alias("u")
                .primary_key("id")
                .field("name")
                .field("age")
                .column("country", "country_code")
                .field("state")
        }
    }

    struct Ghost;

    impl Model for Ghost {
        fn descriptor() -> ModelDescriptor {
            ModelDescriptor::new("ghosts")
        }
    }

    fn schema() -> Schema {
        Schema::new().with::<User>()
    }

    #[test]
    fn test_build_without_model_is_internal_error() {
        let schema = schema();
        let statement = Statement::new(&schema, Backend::Postgres);
        assert!(matches!(statement.build(), Err(LifeError::InternalError(_))));
    }

    #[test]
    fn test_build_with_unregistered_model_is_internal_error() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Postgres);
        statement.from::<Ghost>();
        assert!(matches!(statement.build(), Err(LifeError::InternalError(_))));
    }

    #[test]
    fn test_row_query_defaults() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Postgres);
        statement.from::<User>();
        let query = statement.build().unwrap();
        let sql = query.sql();
        assert!(sql.starts_with(r#"SELECT "u".* FROM "users" AS "u""#), "{sql}");
        assert!(sql.contains(r#"ORDER BY "u"."id" ASC"#), "{sql}");
        assert!(sql.contains("LIMIT"), "{sql}");
        assert!(!sql.contains("OFFSET"), "{sql}");
        assert!(query.parameters().is_empty());
    }

    #[test]
    fn test_default_limit_comes_from_config() {
        let schema = schema();
        let config = StatementConfig {
            default_limit: 7,
            ..StatementConfig::default()
        };
        let mut statement = Statement::with_config(&schema, &config);
        statement.from::<User>();
        let query = statement.build().unwrap();
        assert!(query.values().iter().any(|v| *v == sea_query::Value::from(7u64)
            || *v == sea_query::Value::from(7i64)));
    }

    #[test]
    fn test_aggregate_has_no_default_order_or_limit() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Postgres);
        statement.from::<User>().count();
        let query = statement.build().unwrap();
        let sql = query.sql();
        assert!(sql.contains(r#"COUNT(*) AS "count""#), "{sql}");
        assert!(!sql.contains("ORDER BY"), "{sql}");
        assert!(!sql.contains("LIMIT"), "{sql}");
        assert_eq!(query.output_column(), Some("count"));
    }

    #[test]
    fn test_count_beats_explicit_fields_and_other_aggregates() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Postgres);
        statement.from::<User>().select(["name"]).sum("age").count();
        assert_eq!(statement.aggregate_selector(), Some(&Aggregate::Count));
        let sql = statement.build().unwrap().sql().to_string();
        assert!(sql.contains("COUNT(*)"), "{sql}");
        assert!(!sql.contains("SUM"), "{sql}");
        assert!(!sql.contains(r#""u"."name""#), "{sql}");
    }

    #[test]
    fn test_aggregate_priority_chain() {
        let schema = schema();
        let cases: Vec<(fn(&mut Statement<'_>), &str)> = vec![
            (
                |s| {
                    s.min("age").count_distinct("country").sum("age");
                },
                r#"SELECT COUNT(DISTINCT "u"."country_code") AS "count" FROM"#,
            ),
            (
                |s| {
                    s.distinct("name").avg("age").sum("age");
                },
                r#"SELECT SUM("u"."age") AS "sum" FROM"#,
            ),
            (
                |s| {
                    s.max("age").avg("age").min("age");
                },
                r#"SELECT AVG("u"."age") AS "avg" FROM"#,
            ),
            (
                |s| {
                    s.distinct("name").min("age").max("age");
                },
                r#"SELECT MAX("u"."age") AS "max" FROM"#,
            ),
            (
                |s| {
                    s.select(["name"]).distinct("country").min("age");
                },
                r#"SELECT MIN("u"."age") AS "min" FROM"#,
            ),
            (
                |s| {
                    s.select(["name"]).distinct("country");
                },
                r#"SELECT DISTINCT "u"."country_code" FROM"#,
            ),
            (
                |s| {
                    s.count_distinct("age").count();
                },
                r#"SELECT COUNT(*) AS "count" FROM"#,
            ),
        ];

        for (setup, expected) in cases {
            let mut statement = Statement::new(&schema, Backend::Postgres);
            statement.from::<User>();
            setup(&mut statement);
            let sql = statement.build().unwrap().sql().to_string();
            assert!(sql.starts_with(expected), "expected {expected}, got {sql}");
        }
    }

    #[test]
    fn test_same_aggregate_last_call_wins() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Postgres);
        statement.from::<User>().max("age").max("name");
        assert_eq!(statement.aggregate_selector(), Some(&Aggregate::Max("name".into())));
    }

    #[test]
    fn test_explicit_fields_include_primary_key() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Postgres);
        statement.from::<User>().select(["name", "country"]);
        let sql = statement.build().unwrap().sql().to_string();
        assert!(
            sql.starts_with(r#"SELECT "u"."id", "u"."name", "u"."country_code" FROM"#),
            "{sql}"
        );
    }

    #[test]
    fn test_distinct_selects_column() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Postgres);
        statement.from::<User>().distinct("country");
        let query = statement.build().unwrap();
        assert!(query.sql().starts_with(r#"SELECT DISTINCT "u"."country_code""#), "{}", query.sql());
        assert_eq!(query.output_column(), Some("country_code"));
    }

    #[test]
    fn test_group_by_in_declaration_order() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Postgres);
        statement.from::<User>().group_by("state").group_by("age").count();
        let query = statement.build().unwrap();
        assert!(
            query.sql().contains(r#"GROUP BY "u"."state", "u"."age""#),
            "{}",
            query.sql()
        );
        assert_eq!(query.group_columns().to_vec(), vec!["state".to_string(), "age".to_string()]);
        assert!(!query.sql().contains("ORDER BY"));
    }

    #[test]
    fn test_offset_only_when_set() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Postgres);
        statement.from::<User>().limit(10).offset(20);
        let sql = statement.build().unwrap().sql().to_string();
        assert!(sql.contains("LIMIT $1 OFFSET $2"), "{sql}");
    }

    #[test]
    fn test_count_query_drops_window() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Postgres);
        statement
            .from::<User>()
            .where_(Condition::attr("age").gt(20))
            .order_by("name", Order::Desc)
            .limit(5)
            .offset(10);
        let count = statement.build_count().unwrap();
        let sql = count.sql();
        assert!(sql.starts_with(r#"SELECT COUNT(*) AS "count" FROM (SELECT"#), "{sql}");
        assert!(sql.ends_with(r#"AS "count_subquery""#), "{sql}");
        assert!(!sql.contains("ORDER BY"), "{sql}");
        assert!(!sql.contains("LIMIT"), "{sql}");
        assert_eq!(count.values().iter().count(), 1);
    }

    #[test]
    fn test_mysql_backend_renders_question_marks() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Mysql);
        statement.from::<User>().where_(Condition::attr("age").gt(20));
        let sql = statement.build().unwrap().sql().to_string();
        assert!(sql.contains("`u`.`age` > ?"), "{sql}");
    }

    #[test]
    fn test_find_options_maps_columns() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Postgres);
        statement
            .from::<User>()
            .where_(Condition::attr("country").eq("US").or(Condition::attr("age").lt(3)))
            .offset(4);
        let options = statement.find_options().unwrap();
        assert_eq!(options.table, "users");
        assert_eq!(options.filters.len(), 2);
        assert!(options.filters[0].contains_key("country_code"));
        assert_eq!(options.order, vec![("id".to_string(), Order::Asc)]);
        assert_eq!(options.skip, Some(4));
        assert_eq!(options.take, Some(StatementConfig::default().default_limit));
    }

    #[test]
    fn test_find_options_rejects_and_of_or() {
        let schema = schema();
        let mut statement = Statement::new(&schema, Backend::Postgres);
        let either = |a: &str, b: &str| Condition::attr(a).eq(1).or(Condition::attr(b).eq(2));
        statement
            .from::<User>()
            .where_(either("age", "name").and(either("state", "country")));
        assert!(matches!(statement.find_options(), Err(LifeError::QueryError(_))));
        assert!(statement.build().is_ok());
    }
}
