//! Schema and metadata types for database tables, columns, indexes, and constraints.
//!
//! These types provide an engine-agnostic, immutable representation of
//! catalog metadata. They are produced in one pass by a
//! [`SchemaIntrospector`](super::traits::SchemaIntrospector) and only read
//! afterwards; nothing here holds a connection or performs I/O.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Referential action used when the catalog does not report one.
pub const DEFAULT_REFERENTIAL_ACTION: &str = "RESTRICT";

/// Violations of model invariants detected while assembling a snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Two tables in one schema share a name.
    #[error("duplicate table name '{0}'")]
    DuplicateTable(String),

    /// Foreign key column lists differ in length.
    #[error(
        "foreign key '{name}' has {local} local column(s) but {referenced} referenced column(s)"
    )]
    ForeignKeyArity {
        name: String,
        local: usize,
        referenced: usize,
    },
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    data_type: String,
    nullable: bool,
    default: Option<String>,
    auto_increment: bool,
    comment: Option<String>,
    max_length: Option<i64>,
}

impl Column {
    /// Create a non-nullable column with the engine-native type spelling.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: false,
            default: None,
            auto_increment: false,
            comment: None,
            max_length: None,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Raw default expression as reported by the catalog; never coerced.
    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default = default;
        self
    }

    pub fn auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    /// Empty comments are stored as `None`.
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment.filter(|c| !c.is_empty());
        self
    }

    pub fn with_max_length(mut self, max_length: Option<i64>) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type, e.g. `varchar(255)`.
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Maximum length in characters for string types.
    pub fn max_length(&self) -> Option<i64> {
        self.max_length
    }
}

/// Index metadata.
///
/// Column order is part of the index identity: `(a, b)` and `(b, a)` are
/// different indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    name: String,
    columns: Vec<String>,
    unique: bool,
    primary: bool,
}

impl Index {
    pub fn new(name: impl Into<String>, columns: Vec<String>, unique: bool, primary: bool) -> Self {
        Self {
            name: name.into(),
            columns,
            unique,
            primary,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Whether this index backs the table's primary key.
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }
}

/// Foreign key metadata.
///
/// `local_columns[i]` references `referenced_columns[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    name: String,
    local_columns: Vec<String>,
    referenced_schema: Option<String>,
    referenced_table: String,
    referenced_columns: Vec<String>,
    on_delete: String,
    on_update: String,
}

impl ForeignKey {
    /// Create a foreign key with `RESTRICT` actions.
    pub fn new(
        name: impl Into<String>,
        local_columns: Vec<String>,
        referenced_table: impl Into<String>,
        referenced_columns: Vec<String>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if local_columns.len() != referenced_columns.len() {
            return Err(ModelError::ForeignKeyArity {
                name,
                local: local_columns.len(),
                referenced: referenced_columns.len(),
            });
        }

        Ok(Self {
            name,
            local_columns,
            referenced_schema: None,
            referenced_table: referenced_table.into(),
            referenced_columns,
            on_delete: DEFAULT_REFERENTIAL_ACTION.to_string(),
            on_update: DEFAULT_REFERENTIAL_ACTION.to_string(),
        })
    }

    pub fn with_referenced_schema(mut self, schema: Option<String>) -> Self {
        self.referenced_schema = schema;
        self
    }

    /// Set referential actions; `None` or empty keeps `RESTRICT`.
    pub fn with_actions(mut self, on_delete: Option<String>, on_update: Option<String>) -> Self {
        self.on_delete = normalize_action(on_delete);
        self.on_update = normalize_action(on_update);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_columns(&self) -> &[String] {
        &self.local_columns
    }

    pub fn referenced_schema(&self) -> Option<&str> {
        self.referenced_schema.as_deref()
    }

    pub fn referenced_table(&self) -> &str {
        &self.referenced_table
    }

    pub fn referenced_columns(&self) -> &[String] {
        &self.referenced_columns
    }

    pub fn on_delete(&self) -> &str {
        &self.on_delete
    }

    pub fn on_update(&self) -> &str {
        &self.on_update
    }

    /// Local/referenced column pairs in declaration order.
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.local_columns
            .iter()
            .zip(&self.referenced_columns)
            .map(|(l, r)| (l.as_str(), r.as_str()))
    }
}

fn normalize_action(action: Option<String>) -> String {
    match action {
        Some(a) if !a.trim().is_empty() => a.trim().to_uppercase(),
        _ => DEFAULT_REFERENTIAL_ACTION.to_string(),
    }
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    schema: Option<String>,
    columns: Vec<Column>,
    indexes: Vec<Index>,
    foreign_keys: Vec<ForeignKey>,
    comment: Option<String>,
    table_type: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            comment: None,
            table_type: None,
        }
    }

    pub fn with_schema(mut self, schema: Option<String>) -> Self {
        self.schema = schema;
        self
    }

    /// Columns must already be in ordinal order.
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_indexes(mut self, indexes: Vec<Index>) -> Self {
        self.indexes = indexes;
        self
    }

    pub fn with_foreign_keys(mut self, foreign_keys: Vec<ForeignKey>) -> Self {
        self.foreign_keys = foreign_keys;
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment.filter(|c| !c.is_empty());
        self
    }

    pub fn with_table_type(mut self, table_type: Option<String>) -> Self {
        self.table_type = table_type;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning schema/database name.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Catalog table type, e.g. `BASE TABLE` or `VIEW`.
    pub fn table_type(&self) -> Option<&str> {
        self.table_type.as_deref()
    }

    pub fn is_view(&self) -> bool {
        self.table_type
            .as_deref()
            .map(|t| t.to_uppercase().contains("VIEW"))
            .unwrap_or(false)
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The index backing the primary key, if any.
    pub fn primary_key(&self) -> Option<&Index> {
        self.indexes.iter().find(|i| i.primary)
    }

    pub fn has_foreign_keys(&self) -> bool {
        !self.foreign_keys.is_empty()
    }
}

/// A full snapshot of one database.
///
/// Table names are unique; lookups by name go through an index built once at
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaParts")]
pub struct Schema {
    name: String,
    engine: String,
    tables: Vec<Table>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct SchemaParts {
    name: String,
    engine: String,
    tables: Vec<Table>,
}

impl TryFrom<SchemaParts> for Schema {
    type Error = ModelError;

    fn try_from(parts: SchemaParts) -> Result<Self, Self::Error> {
        Schema::new(parts.name, parts.engine, parts.tables)
    }
}

impl Schema {
    pub fn new(
        name: impl Into<String>,
        engine: impl Into<String>,
        tables: Vec<Table>,
    ) -> Result<Self, ModelError> {
        let mut by_name = HashMap::with_capacity(tables.len());
        for (pos, table) in tables.iter().enumerate() {
            if by_name.insert(table.name.clone(), pos).is_some() {
                return Err(ModelError::DuplicateTable(table.name.clone()));
            }
        }

        Ok(Self {
            name: name.into(),
            engine: engine.into(),
            tables,
            by_name,
        })
    }

    /// Database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Engine identifier, e.g. `mysql`.
    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// Tables in the order the adapter produced them.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Look up a table by exact name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.by_name.get(name).map(|&pos| &self.tables[pos])
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table names, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Tables owning at least one outgoing foreign key.
    pub fn tables_with_foreign_keys(&self) -> Vec<&Table> {
        self.tables.iter().filter(|t| t.has_foreign_keys()).collect()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.engine == other.engine && self.tables == other.tables
    }
}

impl Eq for Schema {}
