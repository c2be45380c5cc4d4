//! Value conversion between sea-query and `may_postgres`.
//!
//! Outbound, sea-query [`Value`]s are turned into `ToSql` parameters in two
//! passes: first every value is moved into owned, typed storage, then the
//! parameter slice is made of references into that storage, valid for the
//! duration of the closure.
//!
//! Inbound, typed PostgreSQL columns are decoded back into sea-query values
//! so the statement layer only ever sees [`Row`].

use crate::executor::LifeError;
use crate::row::Row;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use may_postgres::types::{ToSql, Type};
use rust_decimal::Decimal;
use sea_query::Value;
use uuid::Uuid;

/// Convert sea-query values to `ToSql` parameters and run `f` with them.
///
/// NULLs keep their SQL type so the driver's type check accepts them.
///
/// # Errors
///
/// `LifeError::Other` for unsigned values above `i64::MAX` and value kinds
/// with no PostgreSQL binding.
pub fn with_converted_params<F, R>(values: &sea_query::Values, f: F) -> Result<R, LifeError>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R, LifeError>,
{
    // First pass: owned storage
    let mut stored: Vec<Box<dyn ToSql>> = Vec::with_capacity(values.iter().count());
    for value in values.iter() {
        let param: Box<dyn ToSql> = match value {
            Value::Bool(b) => Box::new(*b),
            Value::TinyInt(i) => Box::new(i.map(i16::from)),
            Value::SmallInt(i) => Box::new(*i),
            Value::Int(i) => Box::new(*i),
            Value::BigInt(i) => Box::new(*i),
            Value::TinyUnsigned(u) => Box::new(u.map(i16::from)),
            Value::SmallUnsigned(u) => Box::new(u.map(i32::from)),
            Value::Unsigned(u) => Box::new(u.map(i64::from)),
            Value::BigUnsigned(u) => Box::new(match u {
                Some(u) => Some(i64::try_from(*u).map_err(|_| {
                    LifeError::Other(format!(
                        "BigUnsigned value {u} exceeds i64::MAX ({}), cannot be safely cast to i64",
                        i64::MAX
                    ))
                })?),
                None => None,
            }),
            Value::Float(f) => Box::new(*f),
            Value::Double(d) => Box::new(*d),
            Value::String(s) => Box::new(s.as_ref().map(ToString::to_string)),
            Value::Char(c) => Box::new(c.map(String::from)),
            Value::Bytes(b) => Box::new(b.as_ref().map(|b| b.to_vec())),
            Value::Json(j) => Box::new(j.as_ref().map(|j| serde_json::Value::clone(j))),
            Value::Decimal(d) => Box::new(d.as_ref().map(|d| Decimal::clone(d))),
            Value::Uuid(u) => Box::new(u.as_ref().map(|u| Uuid::clone(u))),
            Value::ChronoDate(d) => Box::new(d.as_ref().map(|d| NaiveDate::clone(d))),
            Value::ChronoDateTime(d) => Box::new(d.as_ref().map(|d| NaiveDateTime::clone(d))),
            Value::ChronoDateTimeUtc(d) => Box::new(d.as_ref().map(|d| DateTime::<Utc>::clone(d))),
            _ => {
                return Err(LifeError::Other(format!(
                    "Unsupported value type in query: {value:?}"
                )));
            }
        };
        stored.push(param);
    }

    // Second pass: references into the storage
    let params: Vec<&dyn ToSql> = stored.iter().map(|p| &**p).collect();
    f(&params)
}

/// Decode a `may_postgres` row into a [`Row`], column by column.
///
/// # Errors
///
/// `PostgresError` when a column fails to decode, `ParseError` for column
/// types with no sea-query counterpart.
pub(crate) fn row_from_postgres(row: &may_postgres::Row) -> Result<Row, LifeError> {
    let mut out = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let value = if *ty == Type::BOOL {
            Value::from(row.try_get::<_, Option<bool>>(idx)?)
        } else if *ty == Type::INT2 {
            Value::from(row.try_get::<_, Option<i16>>(idx)?)
        } else if *ty == Type::INT4 {
            Value::from(row.try_get::<_, Option<i32>>(idx)?)
        } else if *ty == Type::INT8 {
            Value::from(row.try_get::<_, Option<i64>>(idx)?)
        } else if *ty == Type::FLOAT4 {
            Value::from(row.try_get::<_, Option<f32>>(idx)?)
        } else if *ty == Type::FLOAT8 {
            Value::from(row.try_get::<_, Option<f64>>(idx)?)
        } else if *ty == Type::NUMERIC {
            Value::from(row.try_get::<_, Option<Decimal>>(idx)?)
        } else if *ty == Type::TEXT
            || *ty == Type::VARCHAR
            || *ty == Type::BPCHAR
            || *ty == Type::NAME
        {
            Value::from(row.try_get::<_, Option<String>>(idx)?)
        } else if *ty == Type::BYTEA {
            Value::from(row.try_get::<_, Option<Vec<u8>>>(idx)?)
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            Value::from(row.try_get::<_, Option<serde_json::Value>>(idx)?)
        } else if *ty == Type::UUID {
            Value::from(row.try_get::<_, Option<Uuid>>(idx)?)
        } else if *ty == Type::DATE {
            Value::from(row.try_get::<_, Option<NaiveDate>>(idx)?)
        } else if *ty == Type::TIMESTAMP {
            Value::from(row.try_get::<_, Option<NaiveDateTime>>(idx)?)
        } else if *ty == Type::TIMESTAMPTZ {
            Value::from(row.try_get::<_, Option<DateTime<Utc>>>(idx)?)
        } else {
            return Err(LifeError::ParseError(format!(
                "column `{}` has unsupported type {ty}",
                column.name()
            )));
        };
        out.push(column.name(), value);
    }
    Ok(out)
}
