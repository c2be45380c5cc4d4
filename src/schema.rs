//! Pre-built schema descriptors.
//!
//! A [`Schema`] maps model types to their [`ModelDescriptor`]: table name,
//! query alias, primary key, field-to-column mapping and transient fields.
//! Descriptors are produced once at registration time (via [`Model::descriptor`])
//! and handed to the statement builder, so compilation never reflects on the
//! model type.

use crate::executor::LifeError;
use std::any::{type_name, TypeId};
use std::collections::HashMap;

/// A model type that can be registered in a [`Schema`].
///
/// # Example
///
/// ```
/// use lifeguard_statement::{Model, ModelDescriptor, Schema};
///
/// struct User;
///
/// impl Model for User {
///     fn descriptor() -> ModelDescriptor {
///         ModelDescriptor::new("users")
///             .alias("u")
///             .primary_key("id")
///             .column("name", "full_name")
///             .field("age")
///     }
/// }
///
/// let schema = Schema::new().with::<User>();
/// assert_eq!(schema.table_name::<User>(), Some("users"));
/// ```
pub trait Model: 'static {
    fn descriptor() -> ModelDescriptor;
}

/// Table and column metadata for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    model: &'static str,
    table: String,
    alias: Option<String>,
    primary_key: String,
    columns: Vec<(String, String)>,
    transient: Vec<String>,
}

impl ModelDescriptor {
    /// New descriptor for `table`; the primary key defaults to `id`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            model: "",
            table: table.into(),
            alias: None,
            primary_key: "id".to_string(),
            columns: Vec::new(),
            transient: Vec::new(),
        }
    }

    /// Alias used to qualify columns; defaults to the table name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Declare the primary key field. Also registers it as a persisted field.
    pub fn primary_key(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.columns.iter().any(|(f, _)| *f == field) {
            self.columns.push((field.clone(), field.clone()));
        }
        self.primary_key = field;
        self
    }

    /// Map a field to a differently named column.
    pub fn column(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        let field = field.into();
        let column = column.into();
        match self.columns.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = column,
            None => self.columns.push((field, column)),
        }
        self
    }

    /// Persisted field stored under its own name.
    pub fn field(self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.column(field.clone(), field)
    }

    /// Computed, non-persisted field filled from an extra result column.
    pub fn transient(mut self, field: impl Into<String>) -> Self {
        self.transient.push(field.into());
        self
    }

    /// Rust type name of the registered model, empty until registered.
    pub fn model(&self) -> &str {
        self.model
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn table_alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    pub fn primary_key_field(&self) -> &str {
        &self.primary_key
    }

    pub fn primary_key_column(&self) -> &str {
        self.column_name(&self.primary_key)
    }

    /// Column backing `field`. Unmapped names resolve to themselves.
    pub fn column_name<'a>(&'a self, field: &'a str) -> &'a str {
        self.columns
            .iter()
            .find(|(f, _)| f == field)
            .map_or(field, |(_, column)| column.as_str())
    }

    pub fn is_persisted(&self, field: &str) -> bool {
        self.primary_key == field || self.columns.iter().any(|(f, _)| f == field)
    }

    pub fn transient_fields(&self) -> impl Iterator<Item = &str> {
        self.transient.iter().map(String::as_str)
    }

    pub fn persisted_fields(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(field, _)| field.as_str())
    }
}

/// Registry of model descriptors keyed by model type.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    models: HashMap<TypeId, ModelDescriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `M`, replacing any previous descriptor.
    pub fn register<M: Model>(&mut self) -> &mut Self {
        let mut descriptor = M::descriptor();
        descriptor.model = type_name::<M>();
        log::debug!(
            "registered model {} -> table `{}`",
            descriptor.model,
            descriptor.table
        );
        self.models.insert(TypeId::of::<M>(), descriptor);
        self
    }

    /// Owned-builder form of [`Schema::register`].
    pub fn with<M: Model>(mut self) -> Self {
        self.register::<M>();
        self
    }

    pub fn descriptor<M: Model>(&self) -> Option<&ModelDescriptor> {
        self.models.get(&TypeId::of::<M>())
    }

    pub(crate) fn descriptor_by_id(&self, id: TypeId) -> Result<&ModelDescriptor, LifeError> {
        self.models.get(&id).ok_or_else(|| {
            LifeError::InternalError("statement targets a model that is not registered".to_string())
        })
    }

    pub fn table_name<M: Model>(&self) -> Option<&str> {
        self.descriptor::<M>().map(ModelDescriptor::table)
    }

    pub fn column_name<'a, M: Model>(&'a self, field: &'a str) -> Option<&'a str> {
        self.descriptor::<M>().map(|d| d.column_name(field))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
