///
/// # Script/Statement Builder
///
/// Pure rendering of SQL from an `ImportSpec`. Both backends route through
/// this module: the process backend runs the full four-statement script
/// against the CLI, the native backend runs the single `CREATE OR REPLACE`
/// statement over its own connection.
///
/// ## Script grammar
///
/// ```sql
/// ATTACH '<db>.db' AS db (TYPE SQLITE);
/// DROP TABLE IF EXISTS db.<table>;
/// CREATE TABLE db.<table> AS SELECT * FROM <reader>('<file>', <opt>=<val>, ...);
/// DETACH db;
/// ```
///
/// ## Quoting contract
///
/// String option values and the source path are single-quoted with no
/// escaping of embedded quotes. Values containing unescaped single quotes
/// will break the generated SQL; that is a documented caller contract, not
/// something this layer fixes silently.
///

use crate::import::{ImportOptions, ImportSpec};

/// An ordered list of SQL statements ready for execution.
#[derive(Debug, Clone)]
pub struct Script {
    statements: Vec<String>,
}

impl Script {
    pub fn new(statements: Vec<String>) -> Self {
        Self { statements }
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// The full script text, one statement per line.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for statement in &self.statements {
            out.push_str(statement);
            out.push('\n');
        }
        out
    }
}

/// Render reader options as `, name=value, ...` in insertion order, or an
/// empty string when there are none.
pub fn render_options(options: &ImportOptions) -> String {
    let mut out = String::new();
    for (name, value) in options {
        out.push_str(", ");
        out.push_str(name);
        out.push('=');
        out.push_str(&value.to_string());
    }
    out
}

fn render_reader_call(spec: &ImportSpec) -> String {
    format!(
        "{}('{}'{})",
        spec.kind().reader_function(),
        spec.source_path().display(),
        render_options(spec.import_options())
    )
}

/// The four-statement import script run by the process backend.
pub fn build_import_script(spec: &ImportSpec) -> Script {
    let table = spec.table_name();
    Script::new(vec![
        format!(
            "ATTACH '{}.db' AS db (TYPE SQLITE);",
            spec.database_name()
        ),
        format!("DROP TABLE IF EXISTS db.{};", table),
        format!(
            "CREATE TABLE db.{} AS SELECT * FROM {};",
            table,
            render_reader_call(spec)
        ),
        "DETACH db;".to_string(),
    ])
}

/// The single import statement run by the native backend over its own
/// connection. `CREATE OR REPLACE` makes the import idempotent per table.
pub fn render_native_import(spec: &ImportSpec) -> String {
    format!(
        "CREATE OR REPLACE TABLE {} AS SELECT * FROM {}",
        spec.table_name(),
        render_reader_call(spec)
    )
}
