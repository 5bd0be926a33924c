///
/// # Import specification
///
/// `ImportSpec` describes one file-to-table import request: where the data
/// lives, what kind of file it is, and which database/table it lands in.
/// A spec is built per import call and discarded once its statement has
/// been rendered.
///
/// ## File kind detection
///
/// The kind is inferred from the file extension, with a trailing `.gz`
/// stripped first (`data.csv.gz` is a csv import). The table of supported
/// kinds is closed: csv, json, parquet. Anything else fails with
/// `UnsupportedFileType` before the file is ever touched.
///
/// ## Options
///
/// Options are an insertion-order map merged over a fixed per-kind default
/// set, with caller overrides taking precedence. Overriding an existing key
/// keeps its original position, so rendering is deterministic.
///

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::errors::EngineError;

/// Supported source file kinds, mapped to engine reader functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Json,
    Parquet,
}

impl FileKind {
    /// Infer the kind from `path`'s extension, stripping `.gz` first.
    pub fn detect(path: &Path) -> Result<Self, EngineError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let name = name.strip_suffix(".gz").unwrap_or(&name);

        let extension = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match extension {
            "csv" => Ok(FileKind::Csv),
            "json" => Ok(FileKind::Json),
            "parquet" => Ok(FileKind::Parquet),
            other => Err(EngineError::UnsupportedFileType {
                path: path.to_path_buf(),
                extension: other.to_string(),
            }),
        }
    }

    /// Engine-side reader function for this kind. Closed table; adding a
    /// kind means adding exactly one entry here.
    pub fn reader_function(self) -> &'static str {
        match self {
            FileKind::Csv => "read_csv_auto",
            FileKind::Json => "read_json_auto",
            FileKind::Parquet => "read_parquet",
        }
    }

    /// Fixed default options merged under caller overrides.
    pub fn default_options(self) -> ImportOptions {
        let mut options = ImportOptions::new();
        if self == FileKind::Csv {
            options.insert("header".to_string(), OptionValue::Bool(true));
        }
        options
    }
}

/// A single reader-function option value.
///
/// Rendering rule: booleans are bare `true`/`false`, strings are
/// single-quoted, numbers are bare literals. Embedded single quotes in
/// string values are *not* escaped; callers must not pass values containing
/// unescaped quotes.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(i) => write!(f, "{}", i),
            OptionValue::Float(x) => write!(f, "{}", x),
            OptionValue::Str(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

impl From<f64> for OptionValue {
    fn from(x: f64) -> Self {
        OptionValue::Float(x)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

pub type ImportOptions = IndexMap<String, OptionValue>;

/// Replace every character outside `[A-Za-z0-9_]` with an underscore.
pub fn sanitize_table_name(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// One file-to-table import request.
#[derive(Debug, Clone)]
pub struct ImportSpec {
    source_path: PathBuf,
    kind: FileKind,
    database_name: String,
    table_name: String,
    options: ImportOptions,
    overwrite: bool,
}

impl ImportSpec {
    /// Build a spec, inferring the file kind from the source extension.
    pub fn new(
        source: impl Into<PathBuf>,
        database: &str,
        table: &str,
    ) -> Result<Self, EngineError> {
        let source = source.into();
        let kind = FileKind::detect(&source)?;
        Self::with_kind(source, database, table, kind)
    }

    /// Build a spec with an explicit kind, overriding extension detection.
    pub fn with_kind(
        source: impl Into<PathBuf>,
        database: &str,
        table: &str,
        kind: FileKind,
    ) -> Result<Self, EngineError> {
        let source = source.into();
        if !source.is_file() {
            return Err(EngineError::FileNotFound { path: source });
        }
        Ok(Self {
            source_path: source,
            kind,
            database_name: database.to_string(),
            table_name: sanitize_table_name(table),
            options: kind.default_options(),
            overwrite: false,
        })
    }

    /// Set a single reader option, overriding any default of the same name.
    pub fn option(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.to_string(), value.into());
        self
    }

    /// Merge a batch of caller options over the defaults, in iteration order.
    pub fn options(mut self, overrides: ImportOptions) -> Self {
        for (name, value) in overrides {
            self.options.insert(name, value);
        }
        self
    }

    /// Remove the target store file (and sidecars) before importing.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn import_options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn is_overwrite(&self) -> bool {
        self.overwrite
    }
}
