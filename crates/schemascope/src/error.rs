//! Error types for schema introspection and rendering.

use thiserror::Error;

/// A catalog query failure reported by the connection layer.
///
/// Drivers normalize their native errors into this shape so adapters can
/// classify failures (permission vs. everything else) without depending on
/// a particular client library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct QueryError {
    /// Engine-native error number, when the driver exposes one.
    pub code: Option<u32>,

    /// Human-readable message from the driver.
    pub message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: u32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

/// Main error type for introspection operations.
///
/// Every failure the library reports is one of these variants, so callers can
/// match broadly on `IntrospectError` or narrowly on a single kind.
#[derive(Error, Debug)]
pub enum IntrospectError {
    /// Connection handle unusable, wrong engine, or catalog unreachable.
    #[error("Invalid connection: {0}")]
    InvalidConnection(String),

    /// No adapter registered for the connection's driver identifier.
    #[error(
        "Unsupported database engine '{engine}'. Supported engines: {}",
        supported.join(", ")
    )]
    UnsupportedEngine {
        engine: String,
        supported: Vec<String>,
    },

    /// A catalog query for a specific table failed.
    #[error("Schema access failed for table {table} while {operation}: {source}")]
    SchemaAccess {
        table: String,
        operation: String,
        #[source]
        source: QueryError,
    },

    /// A catalog query was rejected for lack of privileges.
    #[error("Permission denied reading metadata for {table} while {operation}: {source}")]
    PermissionDenied {
        table: String,
        operation: String,
        #[source]
        source: QueryError,
    },

    /// Rendering was attempted while the visualization gate is disabled.
    #[error("Visualization is disabled; call enable() before rendering {format} output")]
    VisualizationDisabled { format: String },

    /// Assembled metadata violates a model invariant.
    #[error("Invalid metadata: {0}")]
    Model(#[from] crate::core::schema::ModelError),

    /// A renderer's output sink rejected a write.
    #[error("Render failed: {0}")]
    Render(String),

    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntrospectError {
    /// Create an InvalidConnection error.
    pub fn invalid_connection(message: impl Into<String>) -> Self {
        IntrospectError::InvalidConnection(message.into())
    }

    /// Create a SchemaAccess error for a table-level catalog failure.
    pub fn schema_access(
        table: impl Into<String>,
        operation: impl Into<String>,
        source: QueryError,
    ) -> Self {
        IntrospectError::SchemaAccess {
            table: table.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a PermissionDenied error.
    pub fn permission_denied(
        table: impl Into<String>,
        operation: impl Into<String>,
        source: QueryError,
    ) -> Self {
        IntrospectError::PermissionDenied {
            table: table.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a VisualizationDisabled error naming the attempted format.
    pub fn visualization_disabled(format: impl Into<String>) -> Self {
        IntrospectError::VisualizationDisabled {
            format: format.into(),
        }
    }

    /// Whether this error means the caller lacks catalog privileges.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, IntrospectError::PermissionDenied { .. })
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            IntrospectError::Config(_) | IntrospectError::Yaml(_) => 2,
            IntrospectError::VisualizationDisabled { .. } => 3,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for introspection operations.
pub type Result<T> = std::result::Result<T, IntrospectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_engine_lists_identifiers() {
        let err = IntrospectError::UnsupportedEngine {
            engine: "pgsql".to_string(),
            supported: vec!["mysql".to_string(), "sqlite".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unsupported database engine 'pgsql'. Supported engines: mysql, sqlite"
        );
    }

    #[test]
    fn test_format_detailed_includes_cause() {
        let err = IntrospectError::schema_access(
            "orders",
            "loading columns",
            QueryError::with_code(1064, "syntax error"),
        );
        let detailed = err.format_detailed();
        assert!(detailed.contains("Schema access failed for table orders"));
        assert!(detailed.contains("Caused by:\n  1: syntax error"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(IntrospectError::Config("x".into()).exit_code(), 2);
        assert_eq!(IntrospectError::visualization_disabled("json").exit_code(), 3);
        assert_eq!(IntrospectError::invalid_connection("dead").exit_code(), 1);
    }
}
