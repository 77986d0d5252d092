//! Configuration validation.

use super::Config;
use crate::error::{IntrospectError, Result};

/// SSL modes understood by the MySQL driver.
const SSL_MODES: &[&str] = &[
    "disable",
    "disabled",
    "prefer",
    "preferred",
    "require",
    "required",
    "verify_ca",
    "verify-ca",
    "verify_identity",
    "verify-identity",
    "verify_full",
    "verify-full",
];

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let connection = &config.connection;

    if connection.r#type.trim().is_empty() {
        return Err(IntrospectError::Config("connection.type is required".into()));
    }
    if connection.host.is_empty() {
        return Err(IntrospectError::Config("connection.host is required".into()));
    }
    if connection.user.is_empty() {
        return Err(IntrospectError::Config("connection.user is required".into()));
    }
    if connection.port == 0 {
        return Err(IntrospectError::Config(
            "connection.port must be between 1 and 65535".into(),
        ));
    }
    if connection.database.as_deref() == Some("") {
        return Err(IntrospectError::Config(
            "connection.database must not be empty; omit it to use the session default".into(),
        ));
    }
    if !SSL_MODES.contains(&connection.ssl_mode.to_lowercase().as_str()) {
        return Err(IntrospectError::Config(format!(
            "connection.ssl_mode '{}' is not recognized. Supported: disabled, preferred, required, verify_ca, verify_identity",
            connection.ssl_mode
        )));
    }

    Ok(())
}
