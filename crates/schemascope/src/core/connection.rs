//! Catalog connection abstraction.
//!
//! A [`CatalogConnection`] is the externally owned handle that adapters read
//! catalog metadata through. The library never opens or closes it.
//!
//! Query text is always a `&'static str`: table and database names supplied
//! by callers can only reach the database as bound parameters, never by
//! being formatted into SQL.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::QueryError;

/// A parameterized catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    sql: &'static str,
    params: Vec<String>,
}

impl CatalogQuery {
    pub fn new(sql: &'static str) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    /// Append a positional parameter.
    pub fn bind(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

/// One catalog result row, decoded as optional strings keyed by column label.
///
/// Labels are matched case-insensitively since catalog views differ in how
/// they report column case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRow {
    values: HashMap<String, Option<String>>,
}

impl CatalogRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: &str, value: Option<String>) {
        self.values.insert(column.to_ascii_uppercase(), value);
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with(mut self, column: &str, value: Option<&str>) -> Self {
        self.insert(column, value.map(str::to_string));
        self
    }

    /// Value of `column`, or `None` if it is NULL or absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(&column.to_ascii_uppercase())
            .and_then(|v| v.as_deref())
    }

    /// Owned copy of [`get`](Self::get).
    pub fn get_string(&self, column: &str) -> Option<String> {
        self.get(column).map(str::to_string)
    }

    /// Value of a column that must be present and non-NULL.
    pub fn require(&self, column: &str) -> Result<&str, QueryError> {
        self.get(column).ok_or_else(|| {
            QueryError::new(format!("catalog row is missing required column {}", column))
        })
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(|v| v.trim().parse().ok())
    }

    /// Interpret `1`/`YES`/`TRUE` as true; anything else, including NULL, as false.
    pub fn get_flag(&self, column: &str) -> bool {
        matches!(
            self.get(column).map(|v| v.trim().to_ascii_uppercase()),
            Some(ref v) if v == "1" || v == "YES" || v == "TRUE"
        )
    }
}

impl<'a> FromIterator<(&'a str, Option<String>)> for CatalogRow {
    fn from_iter<I: IntoIterator<Item = (&'a str, Option<String>)>>(iter: I) -> Self {
        let mut row = CatalogRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

/// A live handle capable of answering catalog queries.
#[async_trait]
pub trait CatalogConnection: Send + Sync {
    /// Driver identifier the resolver keys adapters by (e.g. `"mysql"`).
    fn driver_name(&self) -> &str;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<(), QueryError>;

    /// Run a catalog query and return every row.
    async fn fetch_all(&self, query: &CatalogQuery) -> Result<Vec<CatalogRow>, QueryError>;

    /// Run a catalog query and return the first row, if any.
    async fn fetch_optional(&self, query: &CatalogQuery) -> Result<Option<CatalogRow>, QueryError> {
        Ok(self.fetch_all(query).await?.into_iter().next())
    }
}
