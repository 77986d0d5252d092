//! Core traits for engine-agnostic schema introspection.
//!
//! - [`SchemaIntrospector`]: reads catalog metadata for one engine and
//!   assembles [`Schema`] snapshots
//! - [`IntrospectorFactory`]: constructs introspectors for the
//!   [`AdapterResolver`](super::resolver::AdapterResolver)
//!
//! # Design Patterns
//!
//! - **Abstract Factory**: factories build a validated introspector per connection
//! - **Template Method**: default trait methods derive `is_empty` and
//!   `tables_with_foreign_keys` from the required primitives

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

use super::connection::CatalogConnection;
use super::schema::{Schema, Table};

/// Version string reported when the version probe fails.
pub const UNKNOWN_VERSION: &str = "unknown";

/// What an engine adapter can report and how long its identifiers may be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Engine identifier, e.g. `mysql`.
    pub engine: String,

    /// Server version, or `"unknown"` if it could not be probed.
    pub version: String,

    pub supports_foreign_keys: bool,
    pub supports_views: bool,
    pub supports_check_constraints: bool,

    /// Maximum identifier lengths in characters.
    pub max_table_name_length: u32,
    pub max_column_name_length: u32,
    pub max_index_name_length: u32,
}

/// Read catalog metadata for one database engine.
///
/// An introspector is bound to one connection and one default database.
/// Snapshots of the default database are memoized; passing a database name
/// always issues fresh catalog queries.
///
/// Implementations are not required to be safe for concurrent use on the
/// same connection; use one introspector per logical request.
#[async_trait]
pub trait SchemaIntrospector: Send + Sync {
    /// Fixed engine identifier, e.g. `"mysql"`.
    fn engine_name(&self) -> &str;

    /// The database this introspector is bound to.
    fn database(&self) -> &str;

    /// Shallow check that this adapter can talk to `connection`.
    fn is_supported(&self, connection: &dyn CatalogConnection) -> bool;

    /// Full snapshot of `database`, or of the bound database when `None`.
    async fn schema(&self, database: Option<&str>) -> Result<Arc<Schema>>;

    /// Introspect a single table. `Ok(None)` if it does not exist.
    async fn table(&self, name: &str, database: Option<&str>) -> Result<Option<Table>>;

    /// Distinct table names, sorted alphabetically.
    async fn table_names(&self, database: Option<&str>) -> Result<Vec<String>>;

    /// Every database visible to the connection, sorted alphabetically.
    async fn database_names(&self) -> Result<Vec<String>>;

    /// Engine version and static feature flags.
    async fn capabilities(&self) -> Capabilities;

    /// Tables of the bound database that own at least one foreign key.
    async fn tables_with_foreign_keys(&self) -> Result<Vec<Table>> {
        let schema = self.schema(None).await?;
        Ok(schema
            .tables_with_foreign_keys()
            .into_iter()
            .cloned()
            .collect())
    }

    /// True iff the bound database has no tables.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.table_names(None).await?.is_empty())
    }
}

/// Builds a validated [`SchemaIntrospector`] for a connection.
///
/// Registered with the [`AdapterResolver`](super::resolver::AdapterResolver)
/// under one or more driver identifiers.
#[async_trait]
pub trait IntrospectorFactory: Send + Sync {
    /// Validate `connection` and bind an introspector to `database`
    /// (the connection's current database when `None`).
    async fn create(
        &self,
        connection: Arc<dyn CatalogConnection>,
        database: Option<&str>,
    ) -> Result<Arc<dyn SchemaIntrospector>>;
}
