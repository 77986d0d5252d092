//! Validated connection plus its resolved introspector.
//!
//! A [`ConnectionHandler`] is the entry point for callers holding a live
//! connection: it probes the connection once, resolves the engine adapter
//! eagerly, and then hands out the same introspector for the rest of the
//! request.

use std::sync::Arc;

use tracing::{debug, info};

use crate::core::connection::CatalogConnection;
use crate::core::resolver::AdapterResolver;
use crate::core::schema::Schema;
use crate::core::traits::{Capabilities, SchemaIntrospector};
use crate::error::{IntrospectError, Result};

/// Holds a caller-owned connection and the introspector resolved for it.
///
/// The handler never closes the connection.
pub struct ConnectionHandler {
    connection: Arc<dyn CatalogConnection>,
    introspector: Arc<dyn SchemaIntrospector>,
}

impl ConnectionHandler {
    /// Probe `connection` and resolve its introspector.
    ///
    /// # Errors
    ///
    /// - [`IntrospectError::InvalidConnection`] if the liveness probe fails
    ///   or the adapter rejects the connection
    /// - [`IntrospectError::UnsupportedEngine`] if no adapter is registered
    ///   for the connection's driver
    pub async fn new(
        connection: Arc<dyn CatalogConnection>,
        database: Option<&str>,
        resolver: &AdapterResolver,
    ) -> Result<Self> {
        connection.ping().await.map_err(|e| {
            IntrospectError::invalid_connection(format!(
                "{} connection failed liveness probe: {}",
                connection.driver_name(),
                e
            ))
        })?;
        debug!("{} connection is alive", connection.driver_name());

        let introspector = resolver.resolve(connection.clone(), database).await?;

        info!(
            "Introspecting {} database '{}'",
            introspector.engine_name(),
            introspector.database()
        );

        Ok(Self {
            connection,
            introspector,
        })
    }

    /// The resolved introspector. Always the same instance.
    pub fn introspector(&self) -> Arc<dyn SchemaIntrospector> {
        Arc::clone(&self.introspector)
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Arc<dyn CatalogConnection> {
        &self.connection
    }

    /// Engine identifier of the resolved adapter.
    pub fn engine(&self) -> &str {
        self.introspector.engine_name()
    }

    /// Database the introspector is bound to.
    pub fn database(&self) -> &str {
        self.introspector.database()
    }

    pub async fn capabilities(&self) -> Capabilities {
        self.introspector.capabilities().await
    }

    /// Databases visible to the connection, sorted.
    pub async fn available_databases(&self) -> Result<Vec<String>> {
        self.introspector.database_names().await
    }

    /// Snapshot of `database`, or the bound database when `None`.
    pub async fn schema(&self, database: Option<&str>) -> Result<Arc<Schema>> {
        self.introspector.schema(database).await
    }
}

impl std::fmt::Debug for ConnectionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandler")
            .field("driver", &self.connection.driver_name())
            .field("engine", &self.engine())
            .field("database", &self.database())
            .finish()
    }
}
