//! Raw result rows and model hydration.
//!
//! Executors return [`Row`] values: an ordered list of `(column, value)` pairs
//! holding sea-query [`Value`]s. Hydration turns a row into a typed model
//! through [`FromRow`], reading fields by *field* name through the model's
//! [`ModelDescriptor`] so column renames never leak into model code.

use crate::executor::LifeError;
use crate::schema::ModelDescriptor;
use sea_query::Value;

/// One raw result row, columns in backend order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append, mostly useful for executors and test doubles.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.columns.get(index).map(|(_, value)| value)
    }

    /// Typed access by column name.
    ///
    /// # Errors
    ///
    /// `ParseError` when the column is missing or holds an incompatible value.
    pub fn try_get<T: FromValue>(&self, column: &str) -> Result<T, LifeError> {
        let value = self
            .get(column)
            .ok_or_else(|| LifeError::ParseError(format!("column `{column}` not present in row")))?;
        T::from_value(value).ok_or_else(|| {
            LifeError::ParseError(format!("column `{column}` holds incompatible value {value:?}"))
        })
    }

    /// Typed access by position.
    ///
    /// # Errors
    ///
    /// `ParseError` when the index is out of range or the value is incompatible.
    pub fn try_get_index<T: FromValue>(&self, index: usize) -> Result<T, LifeError> {
        let value = self
            .get_index(index)
            .ok_or_else(|| LifeError::ParseError(format!("column index {index} out of range")))?;
        T::from_value(value).ok_or_else(|| {
            LifeError::ParseError(format!("column {index} holds incompatible value {value:?}"))
        })
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Render the row as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .map(|(name, value)| (name.clone(), value_to_json(value)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

/// Extraction of Rust values from sea-query [`Value`]s.
///
/// Integer widths are widened or narrowed when the value fits; `Option<T>`
/// maps SQL `NULL` to `None`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(Some(b)) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::TinyInt(Some(i)) => Some(i64::from(*i)),
            Value::SmallInt(Some(i)) => Some(i64::from(*i)),
            Value::Int(Some(i)) => Some(i64::from(*i)),
            Value::BigInt(Some(i)) => Some(*i),
            Value::TinyUnsigned(Some(u)) => Some(i64::from(*u)),
            Value::SmallUnsigned(Some(u)) => Some(i64::from(*u)),
            Value::Unsigned(Some(u)) => Some(i64::from(*u)),
            Value::BigUnsigned(Some(u)) => i64::try_from(*u).ok(),
            Value::Decimal(Some(d)) => d.to_string().parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|i| u64::try_from(i).ok())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(Some(f)) => Some(f64::from(*f)),
            Value::Double(Some(d)) => Some(*d),
            Value::Decimal(Some(d)) => d.to_string().parse().ok(),
            other => i64::from_value(other).map(|i| i as f64),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(Some(s)) => Some(s.to_string()),
            Value::Char(Some(c)) => Some(c.to_string()),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        if is_null(value) {
            Some(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

/// Whether a value is SQL `NULL`.
pub fn is_null(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::TinyUnsigned(None)
            | Value::SmallUnsigned(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Float(None)
            | Value::Double(None)
            | Value::String(None)
            | Value::Char(None)
            | Value::Bytes(None)
            | Value::Json(None)
            | Value::Decimal(None)
            | Value::Uuid(None)
            | Value::ChronoDate(None)
            | Value::ChronoDateTime(None)
            | Value::ChronoDateTimeUtc(None)
    )
}

/// JSON rendering of a single value; temporal, uuid and decimal values become strings.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;

    if is_null(value) {
        return Json::Null;
    }
    match value {
        Value::Bool(Some(b)) => Json::Bool(*b),
        Value::Float(Some(_)) | Value::Double(Some(_)) => f64::from_value(value)
            .and_then(serde_json::Number::from_f64)
            .map_or(Json::Null, Json::Number),
        Value::BigUnsigned(Some(u)) => Json::from(*u),
        Value::String(Some(s)) => Json::String(s.to_string()),
        Value::Char(Some(c)) => Json::String(c.to_string()),
        Value::Json(Some(j)) => (**j).clone(),
        Value::Decimal(Some(d)) => Json::String(d.to_string()),
        Value::Uuid(Some(u)) => Json::String(u.to_string()),
        Value::ChronoDate(Some(d)) => Json::String(d.to_string()),
        Value::ChronoDateTime(Some(d)) => Json::String(d.to_string()),
        Value::ChronoDateTimeUtc(Some(d)) => Json::String(d.to_string()),
        other => match i64::from_value(other) {
            Some(i) => Json::from(i),
            None => Json::String(format!("{other:?}")),
        },
    }
}

/// A row viewed through a model's schema descriptor.
///
/// Field lookups resolve to column names; transient fields (computed columns
/// that are not persisted) are read under their own name.
pub struct ModelRow<'r> {
    row: &'r Row,
    descriptor: &'r ModelDescriptor,
    identity: &'r Value,
}

impl<'r> ModelRow<'r> {
    /// Primary key value of this row.
    pub fn identity(&self) -> &Value {
        self.identity
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.row.get(self.descriptor.column_name(field))
    }

    /// Typed field access.
    ///
    /// # Errors
    ///
    /// `ParseError` when the field's column is missing or incompatible.
    pub fn get<T: FromValue>(&self, field: &str) -> Result<T, LifeError> {
        self.row.try_get(self.descriptor.column_name(field))
    }

    pub fn raw(&self) -> &Row {
        self.row
    }
}

/// Conversion from a raw row into a model instance.
pub trait FromRow: Sized {
    /// # Errors
    ///
    /// `ParseError` when a required field is missing or has the wrong type.
    fn from_row(row: &ModelRow<'_>) -> Result<Self, LifeError>;
}

/// Hydrate one row into `M`.
///
/// The descriptor's primary key column supplies the identity. Each transient
/// field must not collide with a persisted field: such a collision is a schema
/// error and fails with `InternalError` before any value is read.
///
/// # Errors
///
/// `InternalError` on a transient/persisted collision, `ParseError` when the
/// primary key column is missing or null, or whatever `M::from_row` returns.
pub fn hydrate<M: FromRow>(
    row: &Row,
    descriptor: &ModelDescriptor,
    transient: &[&str],
) -> Result<M, LifeError> {
    if let Some(field) = transient.iter().find(|field| descriptor.is_persisted(field)) {
        return Err(LifeError::InternalError(format!(
            "transient field `{field}` collides with a persisted field of `{}`",
            descriptor.table()
        )));
    }

    let pk_column = descriptor.primary_key_column();
    let identity = row.get(pk_column).ok_or_else(|| {
        LifeError::ParseError(format!(
            "primary key column `{pk_column}` missing from `{}` row",
            descriptor.table()
        ))
    })?;
    if is_null(identity) {
        return Err(LifeError::ParseError(format!(
            "primary key column `{pk_column}` is NULL in `{}` row",
            descriptor.table()
        )));
    }

    M::from_row(&ModelRow {
        row,
        descriptor,
        identity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Account {
        id: i64,
        email: String,
        nickname: Option<String>,
    }

    impl FromRow for Account {
        fn from_row(row: &ModelRow<'_>) -> Result<Self, LifeError> {
            Ok(Account {
                id: i64::from_value(row.identity())
                    .ok_or_else(|| LifeError::ParseError("bad id".into()))?,
                email: row.get("email")?,
                nickname: row.get("nickname")?,
            })
        }
    }

    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new("accounts")
            .primary_key("id")
            .column("email", "email_address")
            .field("nickname")
            .transient("score")
    }

    #[test]
    fn test_row_lookup_by_name_and_index() {
        let row = Row::new().with("id", 1i64).with("name", "ada");
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("name"), Some(&Value::from("ada")));
        assert_eq!(row.try_get_index::<i64>(0).unwrap(), 1);
        assert!(matches!(row.try_get::<i64>("missing"), Err(LifeError::ParseError(_))));
        assert!(matches!(row.try_get::<bool>("name"), Err(LifeError::ParseError(_))));
    }

    #[test]
    fn test_integer_widening_and_nulls() {
        assert_eq!(i64::from_value(&Value::Int(Some(5))), Some(5));
        assert_eq!(i32::from_value(&Value::BigInt(Some(i64::MAX))), None);
        assert_eq!(f64::from_value(&Value::Int(Some(2))), Some(2.0));
        assert_eq!(Option::<String>::from_value(&Value::String(None)), Some(None));
    }

    #[test]
    fn test_hydrate_resolves_columns_through_descriptor() {
        let row = Row::new()
            .with("id", 7i64)
            .with("email_address", "a@example.com")
            .with("nickname", Value::String(None));
        let account: Account = hydrate(&row, &descriptor(), &["score"]).unwrap();
        assert_eq!(
            account,
            Account {
                id: 7,
                email: "a@example.com".to_string(),
                nickname: None
            }
        );
    }

    #[test]
    fn test_hydrate_rejects_transient_collision() {
        let row = Row::new().with("id", 1i64);
        let err = hydrate::<Account>(&row, &descriptor(), &["email"]).unwrap_err();
        assert!(matches!(err, LifeError::InternalError(_)));
    }

    #[test]
    fn test_hydrate_requires_primary_key() {
        let row = Row::new().with("email_address", "a@example.com");
        assert!(matches!(
            hydrate::<Account>(&row, &descriptor(), &[]),
            Err(LifeError::ParseError(_))
        ));

        let null_pk = Row::new().with("id", Value::BigInt(None));
        assert!(matches!(
            hydrate::<Account>(&null_pk, &descriptor(), &[]),
            Err(LifeError::ParseError(_))
        ));
    }

    #[test]
    fn test_row_to_json() {
        let row = Row::new().with("id", 1i32).with("name", "ada").with("score", 1.5f64);
        assert_eq!(
            row.to_json(),
            serde_json::json!({"id": 1, "name": "ada", "score": 1.5})
        );
    }
}
