//! Database driver implementations.
//!
//! This module provides engine-specific implementations of the core traits:
//!
//! - [`mysql`]: MySQL and MariaDB (feature `mysql`)
//!
//! # Adding New Databases
//!
//! To add support for a new engine:
//!
//! 1. Create a new module under `drivers/` (e.g., `drivers/postgres/`)
//! 2. Implement `CatalogConnection` for the engine's pool
//! 3. Implement `SchemaIntrospector` and an `IntrospectorFactory` for it
//! 4. Register the factory in `AdapterResolver::with_builtins()`
//! 5. Gate the driver with a feature flag in `Cargo.toml`

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "mysql")]
pub use mysql::{MysqlConnection, MysqlIntrospector, MysqlIntrospectorFactory};
