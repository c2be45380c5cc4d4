//! `LifeExecutor` Module
//!
//! Provides the `LifeExecutor` trait, the single boundary through which compiled
//! statements reach a database, and the `LifeError` type shared by the compiler,
//! the statement builder and the paginator.
//!
//! The crate never opens connections itself. Callers hand in an executor (a
//! `may_postgres::Client` wrapped in [`MayPostgresExecutor`], a pooled
//! connection, or a test double) and the statement layer only ever calls
//! [`LifeExecutor::query_all`] and [`LifeExecutor::query_counted`].

use crate::query::statement::CompiledQuery;
use crate::query::value_conversion::{row_from_postgres, with_converted_params};
use crate::row::Row;
use may_postgres::{Client, Error as PostgresError};
use sea_query::Values;
use std::fmt;

#[cfg(feature = "tracing")]
use crate::tracing_helpers;

/// `LifeExecutor` error type
#[derive(Debug)]
pub enum LifeError {
    /// `PostgreSQL` error from `may_postgres`, propagated untouched
    PostgresError(PostgresError),
    /// Malformed predicate tree, bad operand shape, or an operator without a backend token
    QueryError(String),
    /// Invalid page request (no target model, page 0, aggregate statement, ...)
    PagingError(String),
    /// Programmer error: statement without a model, unregistered model, schema collisions
    InternalError(String),
    /// Row parsing/conversion error during hydration
    ParseError(String),
    /// Other execution errors
    Other(String),
}

impl fmt::Display for LifeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifeError::PostgresError(e) => write!(f, "PostgreSQL error: {e}"),
            LifeError::QueryError(s) => write!(f, "Query error: {s}"),
            LifeError::PagingError(s) => write!(f, "Paging error: {s}"),
            LifeError::InternalError(s) => write!(f, "Internal error: {s}"),
            LifeError::ParseError(s) => write!(f, "Parse error: {s}"),
            LifeError::Other(s) => write!(f, "Execution error: {s}"),
        }
    }
}

impl std::error::Error for LifeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LifeError::PostgresError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PostgresError> for LifeError {
    fn from(err: PostgresError) -> Self {
        LifeError::PostgresError(err)
    }
}

/// Trait for executing compiled statements
///
/// Implementations receive rendered SQL plus the sea-query values to bind and
/// return rows keyed by column name. Backend errors must be returned as-is;
/// the statement layer never interprets them.
///
/// # Examples
///
/// ```no_run
/// use lifeguard_statement::{LifeError, LifeExecutor, Row};
/// use sea_query::Values;
///
/// struct Empty;
///
/// impl LifeExecutor for Empty {
///     fn query_all(&self, _query: &str, _values: &Values) -> Result<Vec<Row>, LifeError> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait LifeExecutor {
    /// Execute a query and return all rows
    ///
    /// # Errors
    ///
    /// Returns `LifeError` if the query execution fails.
    fn query_all(&self, query: &str, values: &Values) -> Result<Vec<Row>, LifeError>;

    /// Fetch one page of rows together with the total number of matching records
    ///
    /// The default implementation issues two round trips: the count query
    /// first, then the page query. Backends that can return both in one call
    /// should override it.
    ///
    /// # Errors
    ///
    /// Returns `LifeError` if either query fails or the count row is malformed.
    fn query_counted(
        &self,
        rows: &CompiledQuery,
        count: &CompiledQuery,
    ) -> Result<(Vec<Row>, u64), LifeError> {
        let count_rows = self.query_all(count.sql(), count.values())?;
        let total = read_count(&count_rows)?;
        let rows = self.query_all(rows.sql(), rows.values())?;
        Ok((rows, total))
    }
}

impl<T: LifeExecutor + ?Sized> LifeExecutor for &T {
    fn query_all(&self, query: &str, values: &Values) -> Result<Vec<Row>, LifeError> {
        (**self).query_all(query, values)
    }

    fn query_counted(
        &self,
        rows: &CompiledQuery,
        count: &CompiledQuery,
    ) -> Result<(Vec<Row>, u64), LifeError> {
        (**self).query_counted(rows, count)
    }
}

/// Read the single `count` column produced by a count query.
pub(crate) fn read_count(rows: &[Row]) -> Result<u64, LifeError> {
    let row = rows
        .first()
        .ok_or_else(|| LifeError::ParseError("count query returned no rows".to_string()))?;
    let count: i64 = row
        .try_get("count")
        .or_else(|_| row.try_get_index(0))?;
    if count < 0 {
        return Err(LifeError::Other(format!("Count cannot be negative: {count}")));
    }
    Ok(count as u64)
}

/// Implementation of `LifeExecutor` for `may_postgres::Client`
///
/// Binds sea-query values as `ToSql` parameters and converts typed
/// PostgreSQL columns back into sea-query values.
pub struct MayPostgresExecutor {
    client: Client,
}

impl MayPostgresExecutor {
    /// Create a new executor from a `may_postgres::Client`
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Consume the executor and return the underlying client
    pub fn into_client(self) -> Client {
        self.client
    }
}

impl LifeExecutor for MayPostgresExecutor {
    fn query_all(&self, query: &str, values: &Values) -> Result<Vec<Row>, LifeError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(query).entered();

        log::debug!("executing query: {query} ({} bound values)", values.iter().count());
        let rows = with_converted_params(values, |params| {
            self.client.query(query, params).map_err(LifeError::PostgresError)
        })?;
        rows.iter().map(row_from_postgres).collect()
    }
}
