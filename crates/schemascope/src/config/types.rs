//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Environment variable consulted when `connection.password` is omitted.
pub const PASSWORD_ENV: &str = "SCHEMASCOPE_PASSWORD";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection to introspect.
    pub connection: ConnectionConfig,

    /// Rendering behavior.
    #[serde(default)]
    pub visualization: VisualizationConfig,
}

/// Database connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Driver identifier (default: "mysql").
    #[serde(default = "default_mysql")]
    pub r#type: String,

    /// Database host.
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Username.
    pub user: String,

    /// Password. Falls back to `SCHEMASCOPE_PASSWORD` when empty.
    #[serde(default)]
    pub password: String,

    /// Database to introspect. When unset, the server's default database
    /// for the session is used.
    #[serde(default)]
    pub database: Option<String>,

    /// SSL mode (default: "preferred").
    #[serde(default = "default_preferred")]
    pub ssl_mode: String,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("type", &self.r#type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Output format for rendered snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Html,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            other => Err(format!(
                "unknown format '{}'. Supported formats: json, html",
                other
            )),
        }
    }
}

/// Visualization configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationConfig {
    /// Whether rendering is allowed (default: false).
    #[serde(default)]
    pub enabled: bool,

    /// Format used when none is given on the command line.
    #[serde(default)]
    pub default_format: OutputFormat,

    /// Pretty-print JSON output.
    #[serde(default)]
    pub pretty: bool,
}

fn default_mysql() -> String {
    "mysql".to_string()
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_preferred() -> String {
    "preferred".to_string()
}
