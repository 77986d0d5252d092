//! Structured JSON renderer.

use serde::Serialize;

use super::{sorted_foreign_keys, sorted_indexes, sorted_tables, Renderer};
use crate::core::schema::{Column, ForeignKey, Index, Schema, Table};
use crate::error::Result;

/// Renders a snapshot as one JSON document under a top-level `schema` key.
///
/// Absent optional values and `false` flags are omitted rather than written
/// as `null`/`false`; `nullable` is always present. Empty column, index and
/// foreign key lists are omitted from tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    pretty: bool,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent the output.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, schema: &Schema) -> Result<String> {
        let document = Document {
            schema: SchemaDoc::from(schema),
        };

        let output = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(output)
    }

    fn name(&self) -> &str {
        "json"
    }

    fn mime_type(&self) -> &str {
        "application/json"
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Serialize)]
struct Document<'a> {
    schema: SchemaDoc<'a>,
}

#[derive(Serialize)]
struct SchemaDoc<'a> {
    name: &'a str,
    engine: &'a str,
    tables: Vec<TableDoc<'a>>,
}

impl<'a> From<&'a Schema> for SchemaDoc<'a> {
    fn from(schema: &'a Schema) -> Self {
        Self {
            name: schema.name(),
            engine: schema.engine(),
            tables: sorted_tables(schema).into_iter().map(TableDoc::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TableDoc<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    table_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    columns: Vec<ColumnDoc<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    indexes: Vec<IndexDoc<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    foreign_keys: Vec<ForeignKeyDoc<'a>>,
}

impl<'a> From<&'a Table> for TableDoc<'a> {
    fn from(table: &'a Table) -> Self {
        Self {
            name: table.name(),
            schema: table.schema(),
            table_type: table.table_type(),
            comment: table.comment(),
            columns: table.columns().iter().map(ColumnDoc::from).collect(),
            indexes: sorted_indexes(table).into_iter().map(IndexDoc::from).collect(),
            foreign_keys: sorted_foreign_keys(table)
                .into_iter()
                .map(ForeignKeyDoc::from)
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ColumnDoc<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    data_type: &'a str,
    nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    auto_increment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

impl<'a> From<&'a Column> for ColumnDoc<'a> {
    fn from(column: &'a Column) -> Self {
        Self {
            name: column.name(),
            data_type: column.data_type(),
            nullable: column.is_nullable(),
            default: column.default_value(),
            auto_increment: column.is_auto_increment(),
            max_length: column.max_length(),
            comment: column.comment(),
        }
    }
}

#[derive(Serialize)]
struct IndexDoc<'a> {
    name: &'a str,
    columns: &'a [String],
    #[serde(skip_serializing_if = "is_false")]
    unique: bool,
    #[serde(skip_serializing_if = "is_false")]
    primary: bool,
}

impl<'a> From<&'a Index> for IndexDoc<'a> {
    fn from(index: &'a Index) -> Self {
        Self {
            name: index.name(),
            columns: index.columns(),
            unique: index.is_unique(),
            primary: index.is_primary(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ForeignKeyDoc<'a> {
    name: &'a str,
    local_columns: &'a [String],
    referenced_table: &'a str,
    referenced_columns: &'a [String],
    on_delete: &'a str,
    on_update: &'a str,
}

impl<'a> From<&'a ForeignKey> for ForeignKeyDoc<'a> {
    fn from(fk: &'a ForeignKey) -> Self {
        Self {
            name: fk.name(),
            local_columns: fk.local_columns(),
            referenced_table: fk.referenced_table(),
            referenced_columns: fk.referenced_columns(),
            on_delete: fk.on_delete(),
            on_update: fk.on_update(),
        }
    }
}
