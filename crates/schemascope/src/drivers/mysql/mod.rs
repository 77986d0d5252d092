//! MySQL/MariaDB database driver.
//!
//! This module provides MySQL-specific implementations for:
//! - [`MysqlConnection`]: SQLx pool exposed as a catalog connection
//! - [`MysqlIntrospector`]: `INFORMATION_SCHEMA` reader
//! - [`MysqlIntrospectorFactory`]: Resolver entry for `mysql`
//!
//! # Feature Flag
//!
//! This module is only available when the `mysql` feature is enabled
//! (it is on by default):
//!
//! ```toml
//! [dependencies]
//! schemascope = { version = "0.1", features = ["mysql"] }
//! ```
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+

mod connection;
mod introspector;

pub use connection::MysqlConnection;
pub use introspector::{MysqlIntrospector, MysqlIntrospectorFactory};
