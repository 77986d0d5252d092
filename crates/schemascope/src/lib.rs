//! # schemascope
//!
//! Read-only relational schema introspection.
//!
//! This library reads structural metadata (tables, columns, indexes and
//! foreign keys) from a live database connection without ever touching row
//! data, normalizes it into an immutable, engine-agnostic [`Schema`]
//! snapshot, and renders that snapshot as JSON or as a navigable HTML page.
//!
//! - **Engine adapters** query catalog views and fold rows into the model
//! - **Adapter resolver** maps a connection's driver identifier to an adapter
//! - **Visualization gate** refuses to render until explicitly enabled
//! - **Renderers** are pure functions from a snapshot to text
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use schemascope::{
//!     AdapterResolver, Config, ConnectionHandler, JsonRenderer, MysqlConnection, Visualizer,
//! };
//!
//! #[tokio::main]
//! async fn main() -> schemascope::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let connection = Arc::new(MysqlConnection::connect(&config.connection).await?);
//!
//!     let resolver = AdapterResolver::with_builtins();
//!     let handler = ConnectionHandler::new(connection, Some("shop"), &resolver).await?;
//!     let schema = handler.introspector().schema(None).await?;
//!
//!     let mut visualizer = Visualizer::new(schema);
//!     visualizer.enable();
//!     println!("{}", visualizer.render(&JsonRenderer::new())?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod handler;
pub mod render;
pub mod visualize;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use crate::core::{
    AdapterResolver, Capabilities, CatalogConnection, CatalogQuery, CatalogRow, Column,
    ForeignKey, Index, IntrospectorFactory, Schema, SchemaIntrospector, Table,
};
pub use config::{Config, ConnectionConfig, OutputFormat, VisualizationConfig};
pub use error::{IntrospectError, QueryError, Result};
pub use handler::ConnectionHandler;
pub use render::{HtmlRenderer, JsonRenderer, Renderer};
pub use visualize::Visualizer;

#[cfg(feature = "mysql")]
pub use drivers::{MysqlConnection, MysqlIntrospector, MysqlIntrospectorFactory};
