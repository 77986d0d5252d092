//! Output renderers for schema snapshots.
//!
//! - [`JsonRenderer`]: Structured document for machine consumers
//! - [`HtmlRenderer`]: Self-contained navigable page
//!
//! Renderers are pure: they read a [`Schema`] and return text. They never
//! touch a connection, so rendering the same snapshot twice yields
//! byte-identical output. Every string that originates from the catalog is
//! escaped for the target format.
//!
//! Tables, indexes and foreign keys are emitted sorted by name; columns keep
//! their ordinal order.

mod html;
mod json;

pub use html::HtmlRenderer;
pub use json::JsonRenderer;

use crate::core::schema::{ForeignKey, Index, Schema, Table};
use crate::error::Result;

/// Turns a schema snapshot into text.
pub trait Renderer: Send + Sync {
    /// Render `schema`. Must not perform I/O.
    fn render(&self, schema: &Schema) -> Result<String>;

    /// Short format name, e.g. `"json"`.
    fn name(&self) -> &str;

    /// MIME type of the rendered output.
    fn mime_type(&self) -> &str;
}

/// Tables sorted by name.
pub(crate) fn sorted_tables(schema: &Schema) -> Vec<&Table> {
    let mut tables: Vec<&Table> = schema.tables().iter().collect();
    tables.sort_by(|a, b| a.name().cmp(b.name()));
    tables
}

/// Indexes sorted by name.
pub(crate) fn sorted_indexes(table: &Table) -> Vec<&Index> {
    let mut indexes: Vec<&Index> = table.indexes().iter().collect();
    indexes.sort_by(|a, b| a.name().cmp(b.name()));
    indexes
}

/// Foreign keys sorted by name.
pub(crate) fn sorted_foreign_keys(table: &Table) -> Vec<&ForeignKey> {
    let mut foreign_keys: Vec<&ForeignKey> = table.foreign_keys().iter().collect();
    foreign_keys.sort_by(|a, b| a.name().cmp(b.name()));
    foreign_keys
}
