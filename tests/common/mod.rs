//! Shared fixtures for integration tests.

#![allow(dead_code)]

use lifeguard_statement::{
    FromRow, FromValue, LifeError, LifeExecutor, Model, ModelDescriptor, ModelRow, Row, Schema,
};
use sea_query::{Value, Values};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub country: String,
}

impl Model for User {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new("users")
            .alias("u")
            .primary_key("id")
            .field("name")
            .field("age")
            .column("country", "country_code")
    }
}

impl FromRow for User {
    fn from_row(row: &ModelRow<'_>) -> Result<Self, LifeError> {
        Ok(User {
            id: i64::from_value(row.identity())
                .ok_or_else(|| LifeError::ParseError("user id is not an integer".into()))?,
            name: row.get("name")?,
            age: row.get("age")?,
            country: row.get("country")?,
        })
    }
}

pub fn schema() -> Schema {
    Schema::new().with::<User>()
}

pub fn user_row(id: i64, name: &str, age: i32, country: &str) -> Row {
    Row::new()
        .with("id", id)
        .with("name", name)
        .with("age", age)
        .with("country_code", country)
}

pub fn users(n: i64) -> Vec<Row> {
    (1..=n)
        .map(|id| user_row(id, &format!("user{id}"), 20 + id as i32, "US"))
        .collect()
}

/// Mock executor that captures SQL and parameter counts for verification.
///
/// Count queries are answered with the number of canned rows; other queries
/// return the `LIMIT`/`OFFSET` window of the canned rows (the last two
/// bound values when both are present).
pub struct MockExecutor {
    rows: Vec<Row>,
    captured_sql: Arc<Mutex<Vec<String>>>,
    captured_param_counts: Arc<Mutex<Vec<usize>>>,
}

impl MockExecutor {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            captured_sql: Arc::new(Mutex::new(Vec::new())),
            captured_param_counts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_captured_sql(&self) -> Vec<String> {
        self.captured_sql.lock().unwrap().clone()
    }

    pub fn get_captured_param_counts(&self) -> Vec<usize> {
        self.captured_param_counts.lock().unwrap().clone()
    }

    pub fn count_queries(&self) -> usize {
        self.get_captured_sql()
            .iter()
            .filter(|sql| sql.starts_with("SELECT COUNT(*) AS \"count\" FROM ("))
            .count()
    }

    pub fn clear(&self) {
        self.captured_sql.lock().unwrap().clear();
        self.captured_param_counts.lock().unwrap().clear();
    }
}

impl LifeExecutor for MockExecutor {
    fn query_all(&self, query: &str, values: &Values) -> Result<Vec<Row>, LifeError> {
        self.captured_sql.lock().unwrap().push(query.to_string());
        self.captured_param_counts
            .lock()
            .unwrap()
            .push(values.iter().count());

        if query.starts_with("SELECT COUNT(*) AS \"count\" FROM (") {
            return Ok(vec![Row::new().with("count", self.rows.len() as i64)]);
        }

        let (limit, offset) = if query.contains(" OFFSET ") {
            let tail: Vec<u64> = values
                .0
                .iter()
                .rev()
                .take(2)
                .filter_map(|v| match v {
                    Value::BigUnsigned(Some(n)) => Some(*n),
                    _ => None,
                })
                .collect();
            (tail[1] as usize, tail[0] as usize)
        } else {
            (self.rows.len(), 0)
        };
        Ok(self.rows.iter().skip(offset).take(limit).cloned().collect())
    }
}
