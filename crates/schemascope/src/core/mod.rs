//! Core abstractions for engine-agnostic schema introspection.
//!
//! - [`schema`]: Immutable table, column, index, and foreign key metadata
//! - [`connection`]: The catalog connection trait and parameterized queries
//! - [`traits`]: Introspector and factory traits, engine capabilities
//! - [`resolver`]: Driver-identifier registry for introspector factories
//!
//! # Architecture
//!
//! The core module defines engine-agnostic abstractions that are implemented
//! by driver modules (`drivers/mysql`). New engines are added by implementing
//! [`IntrospectorFactory`] and registering it with an [`AdapterResolver`];
//! nothing in the core needs to change.

pub mod connection;
pub mod resolver;
pub mod schema;
pub mod traits;

pub use connection::{CatalogConnection, CatalogQuery, CatalogRow};
pub use resolver::AdapterResolver;
pub use schema::{Column, ForeignKey, Index, ModelError, Schema, Table};
pub use traits::{Capabilities, IntrospectorFactory, SchemaIntrospector, UNKNOWN_VERSION};
