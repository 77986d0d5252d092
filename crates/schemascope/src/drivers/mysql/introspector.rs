//! MySQL/MariaDB catalog introspector.
//!
//! Reads `INFORMATION_SCHEMA` views only. Every value is cast to `CHAR`
//! server-side so rows decode uniformly as optional strings regardless of
//! how the server collates its catalog columns.
//!
//! # Primary key rule
//!
//! MySQL always names the primary key index `PRIMARY` and refuses that name
//! for any other index. An index is reported as primary when it carries that
//! name *and* is unique.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::core::connection::{CatalogConnection, CatalogQuery, CatalogRow};
use crate::core::schema::{Column, ForeignKey, Index, Schema, Table};
use crate::core::traits::{Capabilities, IntrospectorFactory, SchemaIntrospector, UNKNOWN_VERSION};
use crate::error::{IntrospectError, QueryError, Result};

/// Reserved name of the primary key index.
const PRIMARY_INDEX_NAME: &str = "PRIMARY";

/// MySQL identifier length limit (tables, columns, indexes).
const MAX_IDENTIFIER_LENGTH: u32 = 64;

/// MySQL placeholder comment on views.
const VIEW_COMMENT: &str = "VIEW";

/// Error numbers MySQL reports for privilege failures.
///
/// 1044 database access denied, 1045 login denied, 1142 table command denied,
/// 1143 column command denied, 1227 specific privilege required,
/// 1370 routine command denied.
const PERMISSION_ERROR_CODES: &[u32] = &[1044, 1045, 1142, 1143, 1227, 1370];

const CATALOG_PROBE: &str = r#"
    SELECT CAST(COUNT(*) AS CHAR(20)) AS schema_count
    FROM INFORMATION_SCHEMA.SCHEMATA
"#;

const CURRENT_DATABASE: &str = r#"
    SELECT CAST(DATABASE() AS CHAR(255)) AS DATABASE_NAME
"#;

const SERVER_VERSION: &str = r#"
    SELECT CAST(VERSION() AS CHAR(255)) AS VERSION
"#;

const LIST_DATABASES: &str = r#"
    SELECT CAST(SCHEMA_NAME AS CHAR(255)) AS SCHEMA_NAME
    FROM INFORMATION_SCHEMA.SCHEMATA
    ORDER BY SCHEMA_NAME
"#;

const LIST_TABLE_NAMES: &str = r#"
    SELECT DISTINCT CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_SCHEMA = ?
    ORDER BY TABLE_NAME
"#;

const LIST_TABLES: &str = r#"
    SELECT
        CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME,
        CAST(TABLE_TYPE AS CHAR(64)) AS TABLE_TYPE,
        CAST(TABLE_COMMENT AS CHAR) AS TABLE_COMMENT
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_SCHEMA = ?
    ORDER BY TABLE_NAME
"#;

const FIND_TABLE: &str = r#"
    SELECT
        CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME,
        CAST(TABLE_TYPE AS CHAR(64)) AS TABLE_TYPE,
        CAST(TABLE_COMMENT AS CHAR) AS TABLE_COMMENT
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
"#;

const LOAD_COLUMNS: &str = r#"
    SELECT
        CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
        CAST(COLUMN_TYPE AS CHAR) AS COLUMN_TYPE,
        CAST(IS_NULLABLE AS CHAR(3)) AS IS_NULLABLE,
        CAST(COLUMN_DEFAULT AS CHAR) AS COLUMN_DEFAULT,
        CAST(IF(EXTRA LIKE '%auto_increment%', 1, 0) AS CHAR(1)) AS is_auto_increment,
        CAST(COLUMN_COMMENT AS CHAR) AS COLUMN_COMMENT,
        CAST(CHARACTER_MAXIMUM_LENGTH AS CHAR(20)) AS max_length,
        CAST(ORDINAL_POSITION AS CHAR(10)) AS ORDINAL_POSITION
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

const LOAD_INDEXES: &str = r#"
    SELECT
        CAST(INDEX_NAME AS CHAR(255)) AS INDEX_NAME,
        CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
        CAST(NON_UNIQUE AS CHAR(1)) AS NON_UNIQUE,
        CAST(SEQ_IN_INDEX AS CHAR(10)) AS SEQ_IN_INDEX
    FROM INFORMATION_SCHEMA.STATISTICS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    ORDER BY INDEX_NAME = 'PRIMARY' DESC, INDEX_NAME, SEQ_IN_INDEX
"#;

const LOAD_FOREIGN_KEYS: &str = r#"
    SELECT
        CAST(kcu.CONSTRAINT_NAME AS CHAR(255)) AS CONSTRAINT_NAME,
        CAST(kcu.COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
        CAST(kcu.REFERENCED_TABLE_SCHEMA AS CHAR(255)) AS REFERENCED_TABLE_SCHEMA,
        CAST(kcu.REFERENCED_TABLE_NAME AS CHAR(255)) AS REFERENCED_TABLE_NAME,
        CAST(kcu.REFERENCED_COLUMN_NAME AS CHAR(255)) AS REFERENCED_COLUMN_NAME,
        CAST(kcu.ORDINAL_POSITION AS CHAR(10)) AS ORDINAL_POSITION,
        CAST(rc.UPDATE_RULE AS CHAR(64)) AS UPDATE_RULE,
        CAST(rc.DELETE_RULE AS CHAR(64)) AS DELETE_RULE
    FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
    LEFT JOIN INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS rc
        ON rc.CONSTRAINT_SCHEMA = kcu.CONSTRAINT_SCHEMA
        AND rc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
        AND rc.TABLE_NAME = kcu.TABLE_NAME
    WHERE kcu.TABLE_SCHEMA = ? AND kcu.TABLE_NAME = ?
      AND kcu.REFERENCED_TABLE_NAME IS NOT NULL
    ORDER BY kcu.CONSTRAINT_NAME, kcu.ORDINAL_POSITION
"#;

/// MySQL/MariaDB schema introspector.
pub struct MysqlIntrospector {
    connection: Arc<dyn CatalogConnection>,
    database: String,
    cached: OnceCell<Arc<Schema>>,
}

impl MysqlIntrospector {
    /// Engine identifier reported in snapshots and capabilities.
    pub const ENGINE: &'static str = "mysql";

    /// Validate `connection` and bind to `database`.
    ///
    /// When `database` is `None` the connection's current database is used.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::InvalidConnection`] if the connection is not a
    /// MySQL connection, `INFORMATION_SCHEMA` cannot be read, or no database
    /// is selected.
    pub async fn new(connection: Arc<dyn CatalogConnection>, database: Option<&str>) -> Result<Self> {
        if !Self::supports(connection.as_ref()) {
            return Err(IntrospectError::invalid_connection(format!(
                "expected a MySQL connection, got driver '{}'",
                connection.driver_name()
            )));
        }

        connection
            .fetch_all(&CatalogQuery::new(CATALOG_PROBE))
            .await
            .map_err(|e| {
                IntrospectError::invalid_connection(format!(
                    "INFORMATION_SCHEMA is not reachable: {}",
                    e
                ))
            })?;

        let database = match database.filter(|d| !d.is_empty()) {
            Some(database) => database.to_string(),
            None => Self::current_database(connection.as_ref()).await?,
        };

        info!("Bound MySQL introspector to database '{}'", database);

        Ok(Self {
            connection,
            database,
            cached: OnceCell::new(),
        })
    }

    /// Whether `connection` reports a driver this adapter understands.
    pub fn supports(connection: &dyn CatalogConnection) -> bool {
        matches!(
            connection.driver_name().to_lowercase().as_str(),
            "mysql" | "mariadb"
        )
    }

    async fn current_database(connection: &dyn CatalogConnection) -> Result<String> {
        let row = connection
            .fetch_optional(&CatalogQuery::new(CURRENT_DATABASE))
            .await
            .map_err(|e| {
                IntrospectError::invalid_connection(format!(
                    "could not determine current database: {}",
                    e
                ))
            })?;

        row.and_then(|r| r.get_string("DATABASE_NAME"))
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                IntrospectError::invalid_connection(
                    "no database selected; pass a database name explicitly",
                )
            })
    }

    fn target<'a>(&'a self, database: Option<&'a str>) -> &'a str {
        database.unwrap_or(&self.database)
    }

    /// Run a catalog query, classifying failures against `table`.
    async fn fetch(
        &self,
        query: CatalogQuery,
        table: &str,
        operation: &str,
    ) -> Result<Vec<CatalogRow>> {
        self.connection
            .fetch_all(&query)
            .await
            .map_err(|e| classify_error(table, operation, e))
    }

    /// Fetch the full snapshot of `database` from the catalog.
    async fn extract_schema(&self, database: &str) -> Result<Schema> {
        let rows = self
            .fetch(
                CatalogQuery::new(LIST_TABLES).bind(database),
                &format!("{}.*", database),
                "listing tables",
            )
            .await?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            let table = self.build_table(database, row).await?;
            tables.push(table);
        }

        info!(
            "Extracted {} tables from MySQL database '{}'",
            tables.len(),
            database
        );

        Ok(Schema::new(database, Self::ENGINE, tables)?)
    }

    /// Assemble one table from its `INFORMATION_SCHEMA.TABLES` row.
    async fn build_table(&self, database: &str, row: &CatalogRow) -> Result<Table> {
        let name = row
            .require("TABLE_NAME")
            .map_err(|e| classify_error(&format!("{}.*", database), "listing tables", e))?
            .to_string();
        let table_type = row.get_string("TABLE_TYPE");
        let is_view = table_type
            .as_deref()
            .map(|t| t.to_uppercase().contains("VIEW"))
            .unwrap_or(false);
        let comment = row
            .get_string("TABLE_COMMENT")
            .filter(|c| !(is_view && c == VIEW_COMMENT));

        let columns = self.load_columns(database, &name).await?;
        let indexes = self.load_indexes(database, &name).await?;
        let foreign_keys = self.load_foreign_keys(database, &name).await?;

        debug!(
            "Loaded {}.{}: {} columns, {} indexes, {} foreign keys",
            database,
            name,
            columns.len(),
            indexes.len(),
            foreign_keys.len()
        );

        Ok(Table::new(name)
            .with_schema(Some(database.to_string()))
            .with_table_type(table_type)
            .with_comment(comment)
            .with_columns(columns)
            .with_indexes(indexes)
            .with_foreign_keys(foreign_keys))
    }

    /// Load columns for a table in ordinal order.
    async fn load_columns(&self, database: &str, table: &str) -> Result<Vec<Column>> {
        let full_name = format!("{}.{}", database, table);
        let rows = self
            .fetch(
                CatalogQuery::new(LOAD_COLUMNS).bind(database).bind(table),
                &full_name,
                "loading columns",
            )
            .await?;

        let mut ordered: Vec<(i64, Column)> = Vec::with_capacity(rows.len());
        for (pos, row) in rows.iter().enumerate() {
            let name = row
                .require("COLUMN_NAME")
                .map_err(|e| classify_error(&full_name, "loading columns", e))?;
            let data_type = row
                .require("COLUMN_TYPE")
                .map_err(|e| classify_error(&full_name, "loading columns", e))?;

            let column = Column::new(name, data_type)
                .nullable(row.get_flag("IS_NULLABLE"))
                .with_default(row.get_string("COLUMN_DEFAULT"))
                .auto_increment(row.get_flag("is_auto_increment"))
                .with_comment(row.get_string("COLUMN_COMMENT"))
                .with_max_length(row.get_i64("max_length"));

            let ordinal = row.get_i64("ORDINAL_POSITION").unwrap_or(pos as i64 + 1);
            ordered.push((ordinal, column));
        }

        // Stable: rows without a usable ordinal keep arrival order
        ordered.sort_by_key(|(ordinal, _)| *ordinal);
        Ok(ordered.into_iter().map(|(_, column)| column).collect())
    }

    /// Load indexes, folding one catalog row per index column.
    async fn load_indexes(&self, database: &str, table: &str) -> Result<Vec<Index>> {
        let full_name = format!("{}.{}", database, table);
        let rows = self
            .fetch(
                CatalogQuery::new(LOAD_INDEXES).bind(database).bind(table),
                &full_name,
                "loading indexes",
            )
            .await?;

        fold_indexes(&rows).map_err(|e| classify_error(&full_name, "loading indexes", e))
    }

    /// Load foreign keys, folding one catalog row per key column.
    async fn load_foreign_keys(&self, database: &str, table: &str) -> Result<Vec<ForeignKey>> {
        let full_name = format!("{}.{}", database, table);
        let rows = self
            .fetch(
                CatalogQuery::new(LOAD_FOREIGN_KEYS)
                    .bind(database)
                    .bind(table),
                &full_name,
                "loading foreign keys",
            )
            .await?;

        fold_foreign_keys(&rows).map_err(|e| classify_error(&full_name, "loading foreign keys", e))
    }

    async fn server_version(&self) -> String {
        match self
            .connection
            .fetch_optional(&CatalogQuery::new(SERVER_VERSION))
            .await
        {
            Ok(Some(row)) => row
                .get_string("VERSION")
                .unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
            Ok(None) => UNKNOWN_VERSION.to_string(),
            Err(e) => {
                warn!("MySQL version probe failed: {}", e);
                UNKNOWN_VERSION.to_string()
            }
        }
    }
}

#[async_trait]
impl SchemaIntrospector for MysqlIntrospector {
    fn engine_name(&self) -> &str {
        Self::ENGINE
    }

    fn database(&self) -> &str {
        &self.database
    }

    fn is_supported(&self, connection: &dyn CatalogConnection) -> bool {
        Self::supports(connection)
    }

    async fn schema(&self, database: Option<&str>) -> Result<Arc<Schema>> {
        match database {
            Some(database) => Ok(Arc::new(self.extract_schema(database).await?)),
            None => {
                let schema = self
                    .cached
                    .get_or_try_init(|| async {
                        self.extract_schema(&self.database).await.map(Arc::new)
                    })
                    .await?;
                Ok(Arc::clone(schema))
            }
        }
    }

    async fn table(&self, name: &str, database: Option<&str>) -> Result<Option<Table>> {
        let database = self.target(database);
        let rows = self
            .fetch(
                CatalogQuery::new(FIND_TABLE).bind(database).bind(name),
                &format!("{}.{}", database, name),
                "looking up table",
            )
            .await?;

        match rows.first() {
            Some(row) => Ok(Some(self.build_table(database, row).await?)),
            None => Ok(None),
        }
    }

    async fn table_names(&self, database: Option<&str>) -> Result<Vec<String>> {
        let database = self.target(database);
        let rows = self
            .fetch(
                CatalogQuery::new(LIST_TABLE_NAMES).bind(database),
                &format!("{}.*", database),
                "listing tables",
            )
            .await?;

        let mut names: Vec<String> = rows
            .iter()
            .filter_map(|row| row.get_string("TABLE_NAME"))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn database_names(&self) -> Result<Vec<String>> {
        let rows = self
            .fetch(
                CatalogQuery::new(LIST_DATABASES),
                "INFORMATION_SCHEMA.SCHEMATA",
                "listing databases",
            )
            .await?;

        let mut names: Vec<String> = rows
            .iter()
            .filter_map(|row| row.get_string("SCHEMA_NAME"))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn capabilities(&self) -> Capabilities {
        let version = self.server_version().await;
        Capabilities {
            engine: Self::ENGINE.to_string(),
            supports_check_constraints: supports_check_constraints(&version),
            version,
            supports_foreign_keys: true,
            supports_views: true,
            max_table_name_length: MAX_IDENTIFIER_LENGTH,
            max_column_name_length: MAX_IDENTIFIER_LENGTH,
            max_index_name_length: MAX_IDENTIFIER_LENGTH,
        }
    }
}

/// Factory the built-in resolver registers under `mysql`.
///
/// Callers may also register it under `mariadb`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlIntrospectorFactory;

#[async_trait]
impl IntrospectorFactory for MysqlIntrospectorFactory {
    async fn create(
        &self,
        connection: Arc<dyn CatalogConnection>,
        database: Option<&str>,
    ) -> Result<Arc<dyn SchemaIntrospector>> {
        Ok(Arc::new(MysqlIntrospector::new(connection, database).await?))
    }
}

/// Wrap a catalog failure, separating privilege errors from the rest.
fn classify_error(table: &str, operation: &str, err: QueryError) -> IntrospectError {
    match err.code {
        Some(code) if PERMISSION_ERROR_CODES.contains(&code) => {
            IntrospectError::permission_denied(table, operation, err)
        }
        _ => IntrospectError::schema_access(table, operation, err),
    }
}

/// Group `STATISTICS` rows by index name, keeping first-seen index order and
/// ordering each index's columns by `SEQ_IN_INDEX`.
fn fold_indexes(rows: &[CatalogRow]) -> std::result::Result<Vec<Index>, QueryError> {
    struct Pending {
        name: String,
        unique: bool,
        columns: Vec<(i64, String)>,
    }

    let mut pending: Vec<Pending> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (arrival, row) in rows.iter().enumerate() {
        let name = row.require("INDEX_NAME")?;
        let pos = match positions.get(name) {
            Some(&pos) => pos,
            None => {
                pending.push(Pending {
                    name: name.to_string(),
                    unique: row.get("NON_UNIQUE").map(str::trim) == Some("0"),
                    columns: Vec::new(),
                });
                positions.insert(name.to_string(), pending.len() - 1);
                pending.len() - 1
            }
        };

        // Functional key parts have no COLUMN_NAME
        if let Some(column) = row.get_string("COLUMN_NAME") {
            let seq = row.get_i64("SEQ_IN_INDEX").unwrap_or(arrival as i64);
            pending[pos].columns.push((seq, column));
        }
    }

    Ok(pending
        .into_iter()
        .map(|mut p| {
            p.columns.sort_by_key(|(seq, _)| *seq);
            let primary = p.name == PRIMARY_INDEX_NAME && p.unique;
            let columns = p.columns.into_iter().map(|(_, c)| c).collect();
            Index::new(p.name, columns, p.unique, primary)
        })
        .collect())
}

/// Group `KEY_COLUMN_USAGE` rows by constraint name, pairing local and
/// referenced columns by `ORDINAL_POSITION`.
fn fold_foreign_keys(rows: &[CatalogRow]) -> std::result::Result<Vec<ForeignKey>, QueryError> {
    struct Pending {
        name: String,
        referenced_schema: Option<String>,
        referenced_table: String,
        on_delete: Option<String>,
        on_update: Option<String>,
        pairs: Vec<(i64, String, String)>,
    }

    let mut pending: Vec<Pending> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (arrival, row) in rows.iter().enumerate() {
        let name = row.require("CONSTRAINT_NAME")?;
        let pos = match positions.get(name) {
            Some(&pos) => pos,
            None => {
                pending.push(Pending {
                    name: name.to_string(),
                    referenced_schema: row.get_string("REFERENCED_TABLE_SCHEMA"),
                    referenced_table: row.require("REFERENCED_TABLE_NAME")?.to_string(),
                    on_delete: row.get_string("DELETE_RULE"),
                    on_update: row.get_string("UPDATE_RULE"),
                    pairs: Vec::new(),
                });
                positions.insert(name.to_string(), pending.len() - 1);
                pending.len() - 1
            }
        };

        let local = row.require("COLUMN_NAME")?.to_string();
        let referenced = row.require("REFERENCED_COLUMN_NAME")?.to_string();
        let ordinal = row.get_i64("ORDINAL_POSITION").unwrap_or(arrival as i64);
        pending[pos].pairs.push((ordinal, local, referenced));
    }

    pending
        .into_iter()
        .map(|mut p| {
            p.pairs.sort_by_key(|(ordinal, _, _)| *ordinal);
            let (local, referenced): (Vec<String>, Vec<String>) =
                p.pairs.into_iter().map(|(_, l, r)| (l, r)).unzip();

            ForeignKey::new(p.name, local, p.referenced_table, referenced)
                .map(|fk| {
                    fk.with_referenced_schema(p.referenced_schema)
                        .with_actions(p.on_delete, p.on_update)
                })
                .map_err(|e| QueryError::new(e.to_string()))
        })
        .collect()
}

/// Whether the server version enforces CHECK constraints
/// (MySQL 8.0.16+, MariaDB 10.2.1+).
fn supports_check_constraints(version: &str) -> bool {
    let numbers: Vec<u32> = version
        .split(|c: char| !c.is_ascii_digit())
        .take(3)
        .map(|part| part.parse().unwrap_or(0))
        .collect();

    let (major, minor, patch) = match numbers.as_slice() {
        [major, minor, patch] => (*major, *minor, *patch),
        _ => return false,
    };

    if version.to_lowercase().contains("mariadb") {
        (major, minor, patch) >= (10, 2, 1)
    } else {
        (major, minor, patch) >= (8, 0, 16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{row, MockConnection};

    fn table_row(name: &str, table_type: &str, comment: &str) -> CatalogRow {
        row(&[
            ("TABLE_NAME", Some(name)),
            ("TABLE_TYPE", Some(table_type)),
            ("TABLE_COMMENT", Some(comment)),
        ])
    }

    fn column_row(name: &str, column_type: &str, nullable: &str, ordinal: &str) -> CatalogRow {
        row(&[
            ("COLUMN_NAME", Some(name)),
            ("COLUMN_TYPE", Some(column_type)),
            ("IS_NULLABLE", Some(nullable)),
            ("COLUMN_DEFAULT", None),
            ("is_auto_increment", Some("0")),
            ("COLUMN_COMMENT", Some("")),
            ("max_length", None),
            ("ORDINAL_POSITION", Some(ordinal)),
        ])
    }

    fn index_row(name: &str, column: &str, non_unique: &str, seq: &str) -> CatalogRow {
        row(&[
            ("INDEX_NAME", Some(name)),
            ("COLUMN_NAME", Some(column)),
            ("NON_UNIQUE", Some(non_unique)),
            ("SEQ_IN_INDEX", Some(seq)),
        ])
    }

    fn fk_row(
        name: &str,
        column: &str,
        ref_table: &str,
        ref_column: &str,
        ordinal: &str,
        rules: Option<(&str, &str)>,
    ) -> CatalogRow {
        row(&[
            ("CONSTRAINT_NAME", Some(name)),
            ("COLUMN_NAME", Some(column)),
            ("REFERENCED_TABLE_SCHEMA", Some("shop")),
            ("REFERENCED_TABLE_NAME", Some(ref_table)),
            ("REFERENCED_COLUMN_NAME", Some(ref_column)),
            ("ORDINAL_POSITION", Some(ordinal)),
            ("DELETE_RULE", rules.map(|r| r.0)),
            ("UPDATE_RULE", rules.map(|r| r.1)),
        ])
    }

    /// A `shop` database with `customers` and `orders`.
    fn shop_connection() -> MockConnection {
        MockConnection::new("mysql")
            .on(
                "INFORMATION_SCHEMA.SCHEMATA",
                vec![
                    row(&[("SCHEMA_NAME", Some("shop"))]),
                    row(&[("SCHEMA_NAME", Some("analytics"))]),
                ],
            )
            .on_params(
                "TABLE_COMMENT",
                &["shop", "orders"],
                vec![table_row("orders", "BASE TABLE", "Customer orders")],
            )
            .on(
                "ORDER BY TABLE_NAME",
                vec![
                    table_row("customers", "BASE TABLE", ""),
                    table_row("orders", "BASE TABLE", "Customer orders"),
                ],
            )
            .on_params(
                "INFORMATION_SCHEMA.COLUMNS",
                &["shop", "orders"],
                vec![
                    // Deliberately out of ordinal order
                    column_row("customer_id", "int", "NO", "2"),
                    row(&[
                        ("COLUMN_NAME", Some("id")),
                        ("COLUMN_TYPE", Some("int unsigned")),
                        ("IS_NULLABLE", Some("NO")),
                        ("COLUMN_DEFAULT", None),
                        ("is_auto_increment", Some("1")),
                        ("COLUMN_COMMENT", Some("")),
                        ("max_length", None),
                        ("ORDINAL_POSITION", Some("1")),
                    ]),
                    row(&[
                        ("COLUMN_NAME", Some("status")),
                        ("COLUMN_TYPE", Some("varchar(20)")),
                        ("IS_NULLABLE", Some("YES")),
                        ("COLUMN_DEFAULT", Some("new")),
                        ("is_auto_increment", Some("0")),
                        ("COLUMN_COMMENT", Some("Order state")),
                        ("max_length", Some("20")),
                        ("ORDINAL_POSITION", Some("3")),
                    ]),
                ],
            )
            .on_params(
                "INFORMATION_SCHEMA.COLUMNS",
                &["shop", "customers"],
                vec![column_row("id", "int", "NO", "1")],
            )
            .on_params(
                "INFORMATION_SCHEMA.STATISTICS",
                &["shop", "orders"],
                vec![
                    index_row("PRIMARY", "id", "0", "1"),
                    index_row("idx_customer_status", "status", "1", "2"),
                    index_row("idx_customer_status", "customer_id", "1", "1"),
                ],
            )
            .on_params(
                "INFORMATION_SCHEMA.STATISTICS",
                &["shop", "customers"],
                vec![index_row("PRIMARY", "id", "0", "1")],
            )
            .on_params(
                "INFORMATION_SCHEMA.KEY_COLUMN_USAGE",
                &["shop", "orders"],
                vec![fk_row(
                    "fk_orders_customer",
                    "customer_id",
                    "customers",
                    "id",
                    "1",
                    Some(("CASCADE", "NO ACTION")),
                )],
            )
    }

    async fn introspector(connection: MockConnection) -> (Arc<MockConnection>, MysqlIntrospector) {
        let connection = Arc::new(connection);
        let introspector = MysqlIntrospector::new(connection.clone(), Some("shop"))
            .await
            .unwrap();
        (connection, introspector)
    }

    #[tokio::test]
    async fn test_schema_assembles_tables() {
        let (_, introspector) = introspector(shop_connection()).await;
        let schema = introspector.schema(None).await.unwrap();

        assert_eq!(schema.name(), "shop");
        assert_eq!(schema.engine(), "mysql");
        assert_eq!(schema.table_names(), vec!["customers", "orders"]);

        let orders = schema.table("orders").unwrap();
        assert_eq!(orders.schema(), Some("shop"));
        assert_eq!(orders.comment(), Some("Customer orders"));
        assert_eq!(orders.table_type(), Some("BASE TABLE"));

        let names: Vec<&str> = orders.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["id", "customer_id", "status"]);

        let id = orders.column("id").unwrap();
        assert_eq!(id.data_type(), "int unsigned");
        assert!(id.is_auto_increment());
        assert!(!id.is_nullable());

        let status = orders.column("status").unwrap();
        assert!(status.is_nullable());
        assert_eq!(status.default_value(), Some("new"));
        assert_eq!(status.comment(), Some("Order state"));
        assert_eq!(status.max_length(), Some(20));
    }

    #[tokio::test]
    async fn test_indexes_fold_by_name_in_sequence_order() {
        let (_, introspector) = introspector(shop_connection()).await;
        let orders = introspector.table("orders", None).await.unwrap().unwrap();

        let indexes = orders.indexes();
        assert_eq!(indexes.len(), 2);

        assert_eq!(indexes[0].name(), "PRIMARY");
        assert!(indexes[0].is_primary());
        assert!(indexes[0].is_unique());

        assert_eq!(indexes[1].name(), "idx_customer_status");
        assert_eq!(
            indexes[1].columns(),
            ["customer_id".to_string(), "status".to_string()]
        );
        assert!(!indexes[1].is_unique());
        assert!(!indexes[1].is_primary());
    }

    #[tokio::test]
    async fn test_foreign_keys_fold_and_keep_rules() {
        let (_, introspector) = introspector(shop_connection()).await;
        let orders = introspector.table("orders", None).await.unwrap().unwrap();

        let fk = &orders.foreign_keys()[0];
        assert_eq!(fk.name(), "fk_orders_customer");
        assert_eq!(fk.referenced_table(), "customers");
        assert_eq!(fk.referenced_schema(), Some("shop"));
        assert_eq!(fk.on_delete(), "CASCADE");
        assert_eq!(fk.on_update(), "NO ACTION");
    }

    #[test]
    fn test_composite_foreign_key_pairs_follow_ordinals() {
        let rows = vec![
            fk_row("fk_line_variant", "variant_id", "variants", "id", "2", None),
            fk_row("fk_line_variant", "product_id", "variants", "product_id", "1", None),
            fk_row("fk_line_order", "order_id", "orders", "id", "1", None),
        ];

        let fks = fold_foreign_keys(&rows).unwrap();
        assert_eq!(fks.len(), 2);

        let variant = &fks[0];
        assert_eq!(variant.name(), "fk_line_variant");
        assert_eq!(variant.local_columns().len(), variant.referenced_columns().len());
        let pairs: Vec<_> = variant.column_pairs().collect();
        assert_eq!(pairs, vec![("product_id", "product_id"), ("variant_id", "id")]);

        // No REFERENTIAL_CONSTRAINTS match: actions fall back to RESTRICT
        assert_eq!(variant.on_delete(), "RESTRICT");
        assert_eq!(variant.on_update(), "RESTRICT");
    }

    #[test]
    fn test_primary_requires_unique_sentinel() {
        let rows = vec![
            index_row("PRIMARY", "id", "1", "1"),
            index_row("uniq_email", "email", "0", "1"),
        ];
        let indexes = fold_indexes(&rows).unwrap();
        assert!(!indexes[0].is_primary());
        assert!(indexes[1].is_unique());
        assert!(!indexes[1].is_primary());
    }

    #[tokio::test]
    async fn test_default_schema_is_memoized() {
        let (connection, introspector) = introspector(shop_connection()).await;

        let first = introspector.schema(None).await.unwrap();
        let second = introspector.schema(None).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(connection.count("TABLE_COMMENT"), 1);
    }

    #[tokio::test]
    async fn test_override_database_bypasses_cache() {
        let (connection, introspector) = introspector(shop_connection()).await;

        let default = introspector.schema(None).await.unwrap();
        let other = introspector.schema(Some("analytics")).await.unwrap();
        let again = introspector.schema(Some("analytics")).await.unwrap();

        assert_eq!(other.name(), "analytics");
        assert!(!Arc::ptr_eq(&other, &again));
        assert!(Arc::ptr_eq(&default, &introspector.schema(None).await.unwrap()));
        assert_eq!(connection.count("TABLE_COMMENT"), 3);
    }

    #[tokio::test]
    async fn test_identifiers_are_bound_not_interpolated() {
        let (connection, introspector) = introspector(shop_connection()).await;
        let hostile = "x' OR '1'='1";

        introspector.table(hostile, Some("shop`; DROP")).await.unwrap();
        introspector.table_names(Some(hostile)).await.unwrap();

        for query in connection.issued() {
            assert!(!query.sql().contains(hostile));
            assert!(!query.sql().contains("DROP"));
        }
        assert!(connection
            .issued()
            .iter()
            .any(|q| q.params().contains(&hostile.to_string())));
    }

    #[tokio::test]
    async fn test_missing_table_is_none() {
        let (_, introspector) = introspector(shop_connection()).await;
        assert!(introspector.table("ghost", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_table_names_sorted_and_distinct() {
        let connection = MockConnection::new("mysql").on(
            "SELECT DISTINCT",
            vec![
                row(&[("TABLE_NAME", Some("b"))]),
                row(&[("TABLE_NAME", Some("a"))]),
                row(&[("TABLE_NAME", Some("b"))]),
            ],
        );
        let (_, introspector) = introspector(connection).await;

        assert_eq!(introspector.table_names(None).await.unwrap(), vec!["a", "b"]);
        assert!(!introspector.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_database() {
        let (_, introspector) = introspector(MockConnection::new("mysql")).await;
        assert!(introspector.is_empty().await.unwrap());
        assert!(introspector.schema(None).await.unwrap().is_empty());
        assert!(introspector
            .tables_with_foreign_keys()
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_tables_with_foreign_keys() {
        let (_, introspector) = introspector(shop_connection()).await;
        let tables = introspector.tables_with_foreign_keys().await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name(), "orders");
    }

    #[tokio::test]
    async fn test_view_placeholder_comment_dropped() {
        let connection = MockConnection::new("mysql").on(
            "TABLE_COMMENT",
            vec![table_row("active_orders", "VIEW", "VIEW")],
        );
        let (_, introspector) = introspector(connection).await;

        let schema = introspector.schema(None).await.unwrap();
        let view = schema.table("active_orders").unwrap();
        assert!(view.is_view());
        assert!(view.comment().is_none());
    }

    #[tokio::test]
    async fn test_query_failure_names_table() {
        let connection = MockConnection::new("mysql")
            .fail(
                "INFORMATION_SCHEMA.STATISTICS",
                QueryError::with_code(1064, "You have an error in your SQL syntax"),
            )
            .on("TABLE_COMMENT", vec![table_row("orders", "BASE TABLE", "")]);

        let (_, introspector) = introspector(connection).await;
        let err = introspector.schema(None).await.unwrap_err();

        match err {
            IntrospectError::SchemaAccess {
                table, operation, ..
            } => {
                assert_eq!(table, "shop.orders");
                assert_eq!(operation, "loading indexes");
            }
            other => panic!("expected SchemaAccess, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_permission_errors_are_distinguished() {
        let connection = MockConnection::new("mysql")
            .fail(
                "INFORMATION_SCHEMA.COLUMNS",
                QueryError::with_code(1142, "SELECT command denied to user"),
            )
            .on("TABLE_COMMENT", vec![table_row("orders", "BASE TABLE", "")]);

        let (_, introspector) = introspector(connection).await;
        let err = introspector.schema(None).await.unwrap_err();
        assert!(err.is_permission_denied());
        assert!(err.to_string().contains("shop.orders"));
    }

    #[tokio::test]
    async fn test_rejects_foreign_driver() {
        let err = MysqlIntrospector::new(Arc::new(MockConnection::new("pgsql")), Some("shop"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IntrospectError::InvalidConnection(_)));
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_invalid_connection() {
        let connection = MockConnection::new("mysql").fail(
            "INFORMATION_SCHEMA.SCHEMATA",
            QueryError::with_code(1044, "Access denied for user"),
        );
        let err = MysqlIntrospector::new(Arc::new(connection), Some("shop"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IntrospectError::InvalidConnection(_)));
    }

    #[tokio::test]
    async fn test_defaults_to_current_database() {
        let connection = MockConnection::new("mariadb").on(
            "DATABASE()",
            vec![row(&[("DATABASE_NAME", Some("inventory"))])],
        );
        let introspector = MysqlIntrospector::new(Arc::new(connection), None)
            .await
            .unwrap();
        assert_eq!(introspector.database(), "inventory");
    }

    #[tokio::test]
    async fn test_no_current_database_is_invalid_connection() {
        let connection = MockConnection::new("mysql").on(
            "DATABASE()",
            vec![row(&[("DATABASE_NAME", None)])],
        );
        let err = MysqlIntrospector::new(Arc::new(connection), None)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IntrospectError::InvalidConnection(_)));
    }

    #[tokio::test]
    async fn test_database_names_sorted() {
        let (_, introspector) = introspector(shop_connection()).await;
        assert_eq!(
            introspector.database_names().await.unwrap(),
            vec!["analytics", "shop"]
        );
    }

    #[tokio::test]
    async fn test_capabilities_version_fallback() {
        let connection = MockConnection::new("mysql").fail(
            "VERSION()",
            QueryError::new("function not available"),
        );
        let (_, introspector) = introspector(connection).await;

        let caps = introspector.capabilities().await;
        assert_eq!(caps.engine, "mysql");
        assert_eq!(caps.version, "unknown");
        assert!(caps.supports_foreign_keys);
        assert!(caps.supports_views);
        assert!(!caps.supports_check_constraints);
        assert_eq!(caps.max_table_name_length, 64);
    }

    #[tokio::test]
    async fn test_capabilities_reports_version() {
        let connection = MockConnection::new("mysql").on(
            "VERSION()",
            vec![row(&[("VERSION", Some("8.0.36"))])],
        );
        let (_, introspector) = introspector(connection).await;

        let caps = introspector.capabilities().await;
        assert_eq!(caps.version, "8.0.36");
        assert!(caps.supports_check_constraints);
    }

    #[test]
    fn test_supports_check_constraints() {
        assert!(supports_check_constraints("8.0.16"));
        assert!(supports_check_constraints("8.4.0-log"));
        assert!(!supports_check_constraints("8.0.15"));
        assert!(!supports_check_constraints("5.7.44"));
        assert!(supports_check_constraints("10.6.12-MariaDB"));
        assert!(!supports_check_constraints("10.1.48-MariaDB"));
        assert!(!supports_check_constraints("unknown"));
    }
}
