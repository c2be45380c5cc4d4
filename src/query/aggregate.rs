//! Aggregate and grouped result shaping.
//!
//! Scalar aggregates collapse the backend's single row into one value;
//! `DISTINCT` collects one value per row. Grouped queries are nested by each
//! group-by column in declaration order, innermost level holding the member
//! rows. Groups keep the order in which their key was first seen.

use crate::executor::LifeError;
use crate::query::statement::{Aggregate, CompiledQuery};
use crate::row::{value_to_json, Row};
use sea_query::Value;

/// Shaped result of an aggregate or grouped statement.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOutput {
    Count(i64),
    /// `SUM`/`AVG`; `None` when the aggregate ran over no non-null values.
    Number(Option<f64>),
    /// `MAX`/`MIN`, same type as the column.
    Value(Value),
    Distinct(Vec<Value>),
    Grouped(GroupedRows),
}

impl AggregateOutput {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AggregateOutput::Count(n) => serde_json::Value::from(*n),
            AggregateOutput::Number(n) => n
                .and_then(serde_json::Number::from_f64)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            AggregateOutput::Value(v) => value_to_json(v),
            AggregateOutput::Distinct(values) => {
                serde_json::Value::Array(values.iter().map(value_to_json).collect())
            }
            AggregateOutput::Grouped(groups) => groups.to_json(),
        }
    }
}

/// Nested grouping of result rows.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupedRows {
    Level {
        column: String,
        groups: Vec<(Value, GroupedRows)>,
    },
    Rows(Vec<Row>),
}

impl GroupedRows {
    /// Nest `rows` by `columns`, outermost first.
    ///
    /// # Errors
    ///
    /// `ParseError` when a row lacks one of the group columns.
    pub fn nest(columns: &[String], rows: Vec<Row>) -> Result<Self, LifeError> {
        let Some((column, rest)) = columns.split_first() else {
            return Ok(GroupedRows::Rows(rows));
        };

        let mut buckets: Vec<(Value, Vec<Row>)> = Vec::new();
        for row in rows {
            let key = row.get(column).cloned().ok_or_else(|| {
                LifeError::ParseError(format!("group column `{column}` missing from result row"))
            })?;
            match buckets.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(row),
                None => buckets.push((key, vec![row])),
            }
        }

        let groups = buckets
            .into_iter()
            .map(|(key, members)| Ok((key, GroupedRows::nest(rest, members)?)))
            .collect::<Result<Vec<_>, LifeError>>()?;
        Ok(GroupedRows::Level {
            column: column.clone(),
            groups,
        })
    }

    /// Group at `key` on this level.
    pub fn get(&self, key: &Value) -> Option<&GroupedRows> {
        match self {
            GroupedRows::Level { groups, .. } => {
                groups.iter().find(|(k, _)| k == key).map(|(_, g)| g)
            }
            GroupedRows::Rows(_) => None,
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            GroupedRows::Level { column, .. } => Some(column),
            GroupedRows::Rows(_) => None,
        }
    }

    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            GroupedRows::Rows(rows) => Some(rows),
            GroupedRows::Level { .. } => None,
        }
    }

    /// `{"<key>": {...: [rows]}}`; keys are rendered as JSON text unless they are strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            GroupedRows::Rows(rows) => {
                serde_json::Value::Array(rows.iter().map(Row::to_json).collect())
            }
            GroupedRows::Level { groups, .. } => {
                let map = groups
                    .iter()
                    .map(|(key, group)| {
                        let key = match value_to_json(key) {
                            serde_json::Value::String(s) => s,
                            other => other.to_string(),
                        };
                        (key, group.to_json())
                    })
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(map)
            }
        }
    }
}

/// Shape the rows returned for `query`.
///
/// # Errors
///
/// `QueryError` when `query` is neither an aggregate nor grouped, `ParseError`
/// when the expected result column is missing or has the wrong type.
pub fn process(query: &CompiledQuery, rows: Vec<Row>) -> Result<AggregateOutput, LifeError> {
    if !query.group_columns().is_empty() {
        return GroupedRows::nest(query.group_columns(), rows).map(AggregateOutput::Grouped);
    }

    let aggregate = query.aggregate().ok_or_else(|| {
        LifeError::QueryError("statement has neither an aggregate nor a group-by".to_string())
    })?;
    let column = query
        .output_column()
        .ok_or_else(|| LifeError::InternalError("aggregate query without output column".to_string()))?;

    if let Aggregate::Distinct(_) = aggregate {
        return rows
            .iter()
            .map(|row| row.try_get::<Value>(column))
            .collect::<Result<Vec<_>, _>>()
            .map(AggregateOutput::Distinct);
    }

    let row = rows.first().ok_or_else(|| {
        LifeError::ParseError(format!("aggregate query returned no rows for `{column}`"))
    })?;
    let output = match aggregate {
        Aggregate::Count | Aggregate::CountDistinct(_) => {
            AggregateOutput::Count(row.try_get(column)?)
        }
        Aggregate::Sum(_) | Aggregate::Avg(_) => {
            AggregateOutput::Number(row.try_get::<Option<f64>>(column)?)
        }
        Aggregate::Max(_) | Aggregate::Min(_) | Aggregate::Distinct(_) => {
            AggregateOutput::Value(row.try_get(column)?)
        }
    };
    Ok(output)
}
