//! Adapter resolver for explicit engine registration.
//!
//! The [`AdapterResolver`] maps a connection's driver identifier to the
//! [`IntrospectorFactory`] that knows how to read that engine's catalog. It is
//! explicitly constructed and passed to the
//! [`ConnectionHandler`](crate::handler::ConnectionHandler) rather than held
//! in global state, and [`register`](AdapterResolver::register) is the only
//! extension point for new engines.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{IntrospectError, Result};

use super::connection::CatalogConnection;
use super::traits::{IntrospectorFactory, SchemaIntrospector};

/// Registry of introspector factories keyed by driver identifier.
///
/// # Example
///
/// ```rust,ignore
/// let mut resolver = AdapterResolver::with_builtins();
/// resolver.register("pgsql", Arc::new(MyPostgresFactory));
///
/// let introspector = resolver.resolve(connection, Some("shop")).await?;
/// ```
#[derive(Default, Clone)]
pub struct AdapterResolver {
    factories: HashMap<String, Arc<dyn IntrospectorFactory>>,
}

impl AdapterResolver {
    /// Create a new empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with the built-in adapters registered.
    ///
    /// With the `mysql` feature enabled this registers `mysql` only. A
    /// MariaDB connection reporting `mariadb` as its driver needs the caller
    /// to register that identifier against
    /// [`MysqlIntrospectorFactory`](crate::drivers::MysqlIntrospectorFactory).
    pub fn with_builtins() -> Self {
        #[allow(unused_mut)]
        let mut resolver = Self::new();

        #[cfg(feature = "mysql")]
        resolver.register("mysql", Arc::new(crate::drivers::MysqlIntrospectorFactory));

        resolver
    }

    /// Register or replace the factory for a driver identifier.
    ///
    /// Identifiers are matched case-insensitively.
    pub fn register(&mut self, identifier: impl Into<String>, factory: Arc<dyn IntrospectorFactory>) {
        let identifier = identifier.into().to_lowercase();
        debug!("Registering introspector for driver '{}'", identifier);
        self.factories.insert(identifier, factory);
    }

    /// Check if a driver identifier is registered.
    pub fn is_registered(&self, identifier: &str) -> bool {
        self.factories.contains_key(&identifier.to_lowercase())
    }

    /// All registered driver identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Build the introspector for `connection`'s reported driver.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::UnsupportedEngine`] listing every registered
    /// identifier if the driver is unknown; otherwise whatever the factory's
    /// connection validation reports.
    pub async fn resolve(
        &self,
        connection: Arc<dyn CatalogConnection>,
        database: Option<&str>,
    ) -> Result<Arc<dyn SchemaIntrospector>> {
        let engine = connection.driver_name().to_lowercase();

        let factory = self
            .factories
            .get(&engine)
            .ok_or_else(|| IntrospectError::UnsupportedEngine {
                engine: connection.driver_name().to_string(),
                supported: self.identifiers(),
            })?;

        debug!("Resolved introspector for driver '{}'", engine);
        factory.create(connection, database).await
    }
}

impl std::fmt::Debug for AdapterResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterResolver")
            .field("factories", &self.identifiers())
            .finish()
    }
}
