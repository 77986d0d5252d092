//! SQLx-backed catalog connection for MySQL/MariaDB.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{
    MySqlConnectOptions, MySqlDatabaseError, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlSslMode,
};
use sqlx::{Column, Row};
use tracing::info;

use crate::config::ConnectionConfig;
use crate::core::connection::{CatalogConnection, CatalogQuery, CatalogRow};
use crate::error::{IntrospectError, QueryError, Result};

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Catalog reads are sequential within a request; two connections cover the
/// version probe overlapping a schema read.
const POOL_MAX_CONNECTIONS: u32 = 2;

/// A MySQL connection pool exposed as a [`CatalogConnection`].
///
/// The pool belongs to whoever built it. Introspectors only borrow it through
/// an `Arc`; call [`close`](Self::close) when the request is done.
#[derive(Debug, Clone)]
pub struct MysqlConnection {
    pool: MySqlPool,
}

impl MysqlConnection {
    /// Open a pool from configuration.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(parse_ssl_mode(&config.ssl_mode)?);

        if let Some(database) = config.database.as_deref() {
            options = options.database(database);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(POOL_MAX_CONNECTIONS)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| {
                IntrospectError::invalid_connection(format!(
                    "connecting to MySQL at {}:{}: {}",
                    config.host,
                    config.port,
                    QueryError::from(e)
                ))
            })?;

        info!(
            "Connected to MySQL: {}:{}/{}",
            config.host,
            config.port,
            config.database.as_deref().unwrap_or("")
        );

        Ok(Self { pool })
    }

    /// The underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn decode_row(row: &MySqlRow) -> std::result::Result<CatalogRow, QueryError> {
        row.columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let value: Option<String> = row.try_get(idx)?;
                Ok::<_, QueryError>((column.name(), value))
            })
            .collect()
    }
}

impl From<MySqlPool> for MysqlConnection {
    fn from(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogConnection for MysqlConnection {
    fn driver_name(&self) -> &str {
        "mysql"
    }

    async fn ping(&self) -> std::result::Result<(), QueryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn fetch_all(
        &self,
        query: &CatalogQuery,
    ) -> std::result::Result<Vec<CatalogRow>, QueryError> {
        let mut sql_query = sqlx::query(query.sql());
        for param in query.params() {
            sql_query = sql_query.bind(param.as_str());
        }

        let rows: Vec<MySqlRow> = sql_query.fetch_all(&self.pool).await?;
        rows.iter().map(Self::decode_row).collect()
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                match db_err.try_downcast_ref::<MySqlDatabaseError>() {
                    Some(mysql_err) => {
                        QueryError::with_code(u32::from(mysql_err.number()), mysql_err.message())
                    }
                    None => QueryError::new(db_err.message()),
                }
            }
            _ => QueryError::new(err.to_string()),
        }
    }
}

/// Map a config `ssl_mode` string to the SQLx setting.
fn parse_ssl_mode(mode: &str) -> Result<MySqlSslMode> {
    match mode.to_lowercase().replace('-', "_").as_str() {
        "disable" | "disabled" => Ok(MySqlSslMode::Disabled),
        "prefer" | "preferred" => Ok(MySqlSslMode::Preferred),
        "require" | "required" => Ok(MySqlSslMode::Required),
        "verify_ca" => Ok(MySqlSslMode::VerifyCa),
        "verify_identity" | "verify_full" => Ok(MySqlSslMode::VerifyIdentity),
        other => Err(IntrospectError::Config(format!(
            "Unknown ssl_mode '{}'. Supported: disabled, preferred, required, verify_ca, verify_identity",
            other
        ))),
    }
}
