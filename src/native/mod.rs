///
/// # Native Backend
///
/// Calls directly into the engine shared library over FFI. The backend is
/// a small state machine over an owned pair of foreign handles:
///
/// - **Unconnected**: both handles null; only `connect` is valid
/// - **Connected**: database and connection open, in that order
/// - `disconnect` closes connection first, then database, back to
///   Unconnected; it is idempotent and safe when never connected
///
/// The pair is never partially valid: if opening the connection fails, the
/// already-opened database handle is closed before the error propagates.
/// Calling `connect` while connected disconnects first, so the prior
/// handles never leak. Dropping the backend disconnects, so handles are
/// released even without an explicit `disconnect`.
///
/// The library itself is resolved at construction time (missing artifact
/// fails fast) but loaded on the first `connect` — an unconnected backend
/// never makes a foreign call, which is what lets `query` reject with
/// `InvalidState` without touching the engine.
///
/// Holding raw foreign pointers makes the backend `!Send`/`!Sync`;
/// single-owner sequential use is enforced by the type system.
///

#[allow(non_camel_case_types)]
pub mod ffi;
mod marshal;
#[cfg(test)]
mod stub;

use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::ptr;

use tracing::debug;

use crate::backend::SqlBackend;
use crate::diagnostics::Diagnostics;
use crate::errors::EngineError;
use crate::import::{FileKind, ImportOptions, ImportSpec};
use crate::platform;
use crate::result::{QueryResult, Value};
use crate::script;

use ffi::{duckdb_connection, duckdb_database, duckdb_result, duckdb_state, EngineApi};
use marshal::{marshal_result, ResultGuard};

pub struct NativeBackend {
    library_path: PathBuf,
    api: Option<EngineApi>,
    database: duckdb_database,
    connection: duckdb_connection,
    diagnostics: Diagnostics,
}

impl NativeBackend {
    /// Resolve the engine shared library inside `engine_dir` for the
    /// current platform.
    pub fn new(engine_dir: &Path) -> Result<Self, EngineError> {
        Self::with_library(platform::resolve_library(engine_dir)?)
    }

    /// Use an already-resolved shared library path. The file must exist;
    /// it is loaded on the first `connect`.
    pub fn with_library(library: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let library = library.into();
        if !library.is_file() {
            return Err(EngineError::MissingArtifact { path: library });
        }
        Ok(Self {
            library_path: library,
            api: None,
            database: ptr::null_mut(),
            connection: ptr::null_mut(),
            diagnostics: Diagnostics::new(),
        })
    }

    #[cfg(test)]
    fn with_api(api: EngineApi) -> Self {
        Self {
            library_path: PathBuf::new(),
            api: Some(api),
            database: ptr::null_mut(),
            connection: ptr::null_mut(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.connection.is_null()
    }

    /// Open the database at `path` and a connection on it. A connected
    /// backend disconnects first; on any failure both handles end up null.
    pub fn connect(&mut self, path: &Path) -> Result<&mut Self, EngineError> {
        match self.connect_inner(path) {
            Ok(()) => Ok(self),
            Err(error) => {
                self.diagnostics.record(&error);
                Err(error)
            }
        }
    }

    fn connect_inner(&mut self, path: &Path) -> Result<(), EngineError> {
        if self.is_connected() {
            self.disconnect();
        }
        if self.api.is_none() {
            self.api = Some(EngineApi::load(&self.library_path)?);
        }
        let api = self
            .api
            .as_ref()
            .ok_or_else(|| EngineError::Connection("engine interface not loaded".to_string()))?;

        let c_path = CString::new(path.to_string_lossy().as_bytes()).map_err(|_| {
            EngineError::Connection(format!("database path contains NUL: {}", path.display()))
        })?;

        debug!(path = %path.display(), "opening engine database");
        let mut database: duckdb_database = ptr::null_mut();
        let state = unsafe { (api.open)(c_path.as_ptr(), &mut database) };
        if state != duckdb_state::Success || database.is_null() {
            return Err(EngineError::Connection(format!(
                "failed to open database at {}",
                path.display()
            )));
        }

        let mut connection: duckdb_connection = ptr::null_mut();
        let state = unsafe { (api.connect)(database, &mut connection) };
        if state != duckdb_state::Success || connection.is_null() {
            // Unwind the half-open pair before propagating.
            unsafe { (api.close)(&mut database) };
            return Err(EngineError::Connection(format!(
                "failed to open connection on {}",
                path.display()
            )));
        }

        self.database = database;
        self.connection = connection;
        Ok(())
    }

    /// Release the connection, then the database. Safe to call repeatedly
    /// and when never connected.
    pub fn disconnect(&mut self) {
        let Some(api) = self.api.as_ref() else {
            return;
        };
        if !self.connection.is_null() {
            unsafe { (api.disconnect)(&mut self.connection) };
            self.connection = ptr::null_mut();
        }
        if !self.database.is_null() {
            unsafe { (api.close)(&mut self.database) };
            self.database = ptr::null_mut();
        }
    }

    /// Execute `sql` and marshal the full result into host-owned rows.
    pub fn query(&mut self, sql: &str) -> Result<QueryResult, EngineError> {
        match self.query_inner(sql) {
            Ok(result) => Ok(result),
            Err(error) => {
                self.diagnostics.record(&error);
                Err(error)
            }
        }
    }

    fn query_inner(&mut self, sql: &str) -> Result<QueryResult, EngineError> {
        if !self.is_connected() {
            return Err(EngineError::InvalidState { operation: "query" });
        }
        let api = self
            .api
            .as_ref()
            .ok_or(EngineError::InvalidState { operation: "query" })?;

        let c_sql = CString::new(sql)
            .map_err(|_| EngineError::Query("SQL contains an embedded NUL".to_string()))?;

        debug!(sql, "executing query");
        let mut raw = duckdb_result::zeroed();
        let state = unsafe { (api.query)(self.connection, c_sql.as_ptr(), &mut raw) };

        // The guard destroys the foreign result on every path from here on,
        // including mid-marshal failures.
        let mut guard = ResultGuard::new(api, raw);
        if state != duckdb_state::Success {
            let message = guard
                .error_message()
                .unwrap_or_else(|| "unknown query failure".to_string());
            return Err(EngineError::Query(message));
        }
        marshal_result(api, guard.result_mut())
    }

    /// Row 0, column 0 of the result, or `None` when no rows came back.
    pub fn query_single(&mut self, sql: &str) -> Result<Option<Value>, EngineError> {
        let result = self.query(sql)?;
        Ok(result.first_value().cloned())
    }

    pub fn import_csv(
        &mut self,
        path: impl Into<PathBuf>,
        table: &str,
        options: ImportOptions,
    ) -> Result<&mut Self, EngineError> {
        self.import_kind(FileKind::Csv, path.into(), table, options)
    }

    pub fn import_json(
        &mut self,
        path: impl Into<PathBuf>,
        table: &str,
        options: ImportOptions,
    ) -> Result<&mut Self, EngineError> {
        self.import_kind(FileKind::Json, path.into(), table, options)
    }

    pub fn import_parquet(
        &mut self,
        path: impl Into<PathBuf>,
        table: &str,
        options: ImportOptions,
    ) -> Result<&mut Self, EngineError> {
        self.import_kind(FileKind::Parquet, path.into(), table, options)
    }

    fn import_kind(
        &mut self,
        kind: FileKind,
        path: PathBuf,
        table: &str,
        options: ImportOptions,
    ) -> Result<&mut Self, EngineError> {
        match self.import_spec(kind, path, table, options) {
            Ok(()) => Ok(self),
            Err(error) => {
                self.diagnostics.record(&error);
                Err(error)
            }
        }
    }

    fn import_spec(
        &mut self,
        kind: FileKind,
        path: PathBuf,
        table: &str,
        options: ImportOptions,
    ) -> Result<(), EngineError> {
        // The import lands in the connected database itself; "main" is
        // only a placeholder for the spec's store name.
        let spec = ImportSpec::with_kind(path, "main", table, kind)?.options(options);
        let sql = script::render_native_import(&spec);
        debug!(table = spec.table_name(), "importing file");
        self.query_inner(&sql).map(|_| ())
    }
}

impl SqlBackend for NativeBackend {
    fn import(&mut self, spec: &ImportSpec) -> Result<(), EngineError> {
        let sql = script::render_native_import(spec);
        self.query(&sql).map(|_| ())
    }

    fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

impl Drop for NativeBackend {
    fn drop(&mut self) {
        self.disconnect();
    }
}
