//! Navigable HTML renderer.
//!
//! Produces one self-contained page: a navigation list of every table, a
//! header with the database name, engine and table count, and one section
//! per table. CSS `:target` rules show a single section at a time, with the
//! first table visible when no anchor is selected, so the page needs no
//! script to navigate.

use std::fmt::Write;

use super::{sorted_foreign_keys, sorted_indexes, sorted_tables, Renderer};
use crate::core::schema::{Schema, Table};
use crate::error::{IntrospectError, Result};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; display: flex; color: #1f2328; }
nav { width: 16rem; min-height: 100vh; padding: 1rem; background: #f6f8fa; border-right: 1px solid #d0d7de; }
nav ul { list-style: none; padding: 0; margin: 0; }
nav a { display: block; padding: 0.2rem 0.4rem; color: #0969da; text-decoration: none; font-family: monospace; }
main { flex: 1; padding: 1rem 2rem; }
header p { color: #59636e; }
section.table { display: none; }
section.table:target { display: block; }
main:not(:has(section.table:target)) section.table:first-of-type { display: block; }
table { border-collapse: collapse; margin-bottom: 1.5rem; }
th, td { border: 1px solid #d0d7de; padding: 0.3rem 0.6rem; text-align: left; }
th { background: #f6f8fa; }
td code { font-size: 0.9em; }
"#;

/// Renders a snapshot as a standalone HTML page.
///
/// A database switcher (a GET form with a `database` parameter) is included
/// only when more than one database is supplied through
/// [`with_databases`](Self::with_databases). Submitting it requests the same
/// URL with `?database=NAME`, so the page must be served by a host that
/// answers that parameter with
/// [`Visualizer::render_for`](crate::visualize::Visualizer::render_for).
/// Pages written to a static file should omit the database list.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    databases: Vec<String>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Databases offered in the switcher.
    pub fn with_databases(mut self, databases: Vec<String>) -> Self {
        self.databases = databases;
        self
    }

    /// Write the page into `out`.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::Render`] if `out` rejects a write.
    pub fn render_into<W: Write>(&self, out: &mut W, schema: &Schema) -> Result<()> {
        self.write_page(out, schema)
            .map_err(|_| IntrospectError::Render(format!("writing HTML for '{}'", schema.name())))
    }

    fn write_switcher<W: Write>(&self, out: &mut W, current: &str) -> std::fmt::Result {
        if self.databases.len() < 2 {
            return Ok(());
        }

        writeln!(out, "<form method=\"get\" class=\"switcher\">")?;
        writeln!(out, "<label for=\"database\">Database</label>")?;
        writeln!(
            out,
            "<select id=\"database\" name=\"database\" onchange=\"this.form.submit()\">"
        )?;
        for database in &self.databases {
            let selected = if database == current { " selected" } else { "" };
            writeln!(
                out,
                "<option value=\"{0}\"{1}>{0}</option>",
                escape_html(database),
                selected
            )?;
        }
        writeln!(out, "</select>")?;
        writeln!(out, "<noscript><button type=\"submit\">Switch</button></noscript>")?;
        writeln!(out, "</form>")
    }

    fn write_page<W: Write>(&self, out: &mut W, schema: &Schema) -> std::fmt::Result {
        let tables = sorted_tables(schema);
        let name = escape_html(schema.name());

        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html lang=\"en\">")?;
        writeln!(out, "<head>")?;
        writeln!(out, "<meta charset=\"utf-8\">")?;
        writeln!(out, "<title>{} schema</title>", name)?;
        writeln!(out, "<style>{}</style>", STYLE)?;
        writeln!(out, "</head>")?;
        writeln!(out, "<body>")?;

        writeln!(out, "<nav>")?;
        self.write_switcher(out, schema.name())?;
        writeln!(out, "<h2>Tables</h2>")?;
        if tables.is_empty() {
            writeln!(out, "<p>No tables</p>")?;
        } else {
            writeln!(out, "<ul>")?;
            for (pos, table) in tables.iter().enumerate() {
                writeln!(
                    out,
                    "<li><a href=\"#{}\">{}</a></li>",
                    anchor_id(pos, table.name()),
                    escape_html(table.name())
                )?;
            }
            writeln!(out, "</ul>")?;
        }
        writeln!(out, "</nav>")?;

        writeln!(out, "<main>")?;
        writeln!(out, "<header>")?;
        writeln!(out, "<h1>{}</h1>", name)?;
        writeln!(
            out,
            "<p>Engine: {} &middot; {} {}</p>",
            escape_html(schema.engine()),
            tables.len(),
            if tables.len() == 1 { "table" } else { "tables" }
        )?;
        writeln!(out, "</header>")?;

        for (pos, table) in tables.iter().enumerate() {
            write_table(out, pos, table)?;
        }

        writeln!(out, "</main>")?;
        writeln!(out, "</body>")?;
        writeln!(out, "</html>")
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, schema: &Schema) -> Result<String> {
        let mut out = String::new();
        self.render_into(&mut out, schema)?;
        Ok(out)
    }

    fn name(&self) -> &str {
        "html"
    }

    fn mime_type(&self) -> &str {
        "text/html; charset=utf-8"
    }
}

fn write_table<W: Write>(out: &mut W, pos: usize, table: &Table) -> std::fmt::Result {
    writeln!(
        out,
        "<section class=\"table\" id=\"{}\">",
        anchor_id(pos, table.name())
    )?;
    writeln!(out, "<h2>{}</h2>", escape_html(&table.full_name()))?;
    if let Some(table_type) = table.table_type() {
        writeln!(out, "<p class=\"type\">{}</p>", escape_html(table_type))?;
    }
    if let Some(comment) = table.comment() {
        writeln!(out, "<p class=\"comment\">{}</p>", escape_html(comment))?;
    }

    writeln!(out, "<h3>Columns</h3>")?;
    if table.columns().is_empty() {
        writeln!(out, "<p>No columns</p>")?;
    } else {
        writeln!(out, "<table>")?;
        writeln!(
            out,
            "<tr><th>Name</th><th>Type</th><th>Nullable</th><th>Default</th><th>Extra</th><th>Comment</th></tr>"
        )?;
        for column in table.columns() {
            writeln!(
                out,
                "<tr><td><code>{}</code></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(column.name()),
                escape_html(column.data_type()),
                if column.is_nullable() { "YES" } else { "NO" },
                column.default_value().map(escape_html).unwrap_or_default(),
                if column.is_auto_increment() { "auto_increment" } else { "" },
                column.comment().map(escape_html).unwrap_or_default(),
            )?;
        }
        writeln!(out, "</table>")?;
    }

    let indexes = sorted_indexes(table);
    if !indexes.is_empty() {
        writeln!(out, "<h3>Indexes</h3>")?;
        writeln!(out, "<table>")?;
        writeln!(
            out,
            "<tr><th>Name</th><th>Columns</th><th>Unique</th><th>Primary</th></tr>"
        )?;
        for index in indexes {
            writeln!(
                out,
                "<tr><td><code>{}</code></td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(index.name()),
                escape_list(index.columns()),
                if index.is_unique() { "YES" } else { "NO" },
                if index.is_primary() { "YES" } else { "NO" },
            )?;
        }
        writeln!(out, "</table>")?;
    }

    let foreign_keys = sorted_foreign_keys(table);
    if !foreign_keys.is_empty() {
        writeln!(out, "<h3>Foreign keys</h3>")?;
        writeln!(out, "<table>")?;
        writeln!(
            out,
            "<tr><th>Name</th><th>Columns</th><th>References</th><th>On delete</th><th>On update</th></tr>"
        )?;
        for fk in foreign_keys {
            writeln!(
                out,
                "<tr><td><code>{}</code></td><td>{}</td><td>{} ({})</td><td>{}</td><td>{}</td></tr>",
                escape_html(fk.name()),
                escape_list(fk.local_columns()),
                escape_html(fk.referenced_table()),
                escape_list(fk.referenced_columns()),
                escape_html(fk.on_delete()),
                escape_html(fk.on_update()),
            )?;
        }
        writeln!(out, "</table>")?;
    }

    writeln!(out, "</section>")
}

/// Fragment identifier for a table section.
///
/// Catalog names may contain characters that are awkward in URLs, so only
/// ASCII alphanumerics, `-` and `_` are kept. The position prefix keeps ids
/// unique when two names collapse to the same slug.
fn anchor_id(pos: usize, name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("t{}-{}", pos, slug)
}

fn escape_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| escape_html(v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escape text for use in element content and quoted attribute values.
pub(crate) fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
