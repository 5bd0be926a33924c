///
/// # Foreign interface to the engine shared library
///
/// Bindings to the minimum DuckDB C API surface the native backend needs:
/// open/close a database, open/close a connection, run a query, walk the
/// result, and free engine-allocated buffers. Symbols are resolved once
/// when the library is loaded and held as plain function pointers; the
/// `Library` handle is kept alive alongside them so the pointers stay
/// valid for the `EngineApi`'s lifetime.
///
/// `duckdb_result` uses the engine's real ABI layout. The leading fields
/// are deprecated in the C API but still part of the struct; sizing the
/// struct down would let `duckdb_query` write past the allocation. The
/// error message on a failed query is read from `deprecated_error_message`
/// before the result is destroyed.
///

use std::os::raw::{c_char, c_void};
use std::path::Path;
use std::ptr;

use libloading::Library;

use crate::errors::EngineError;

pub type idx_t = u64;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum duckdb_state {
    Success = 0,
    Error = 1,
}

pub type duckdb_database = *mut c_void;
pub type duckdb_connection = *mut c_void;

#[repr(C)]
pub struct duckdb_result {
    pub deprecated_column_count: idx_t,
    pub deprecated_row_count: idx_t,
    pub deprecated_rows_changed: idx_t,
    pub deprecated_columns: *mut c_void,
    pub deprecated_error_message: *mut c_char,
    pub internal_data: *mut c_void,
}

impl duckdb_result {
    pub fn zeroed() -> Self {
        Self {
            deprecated_column_count: 0,
            deprecated_row_count: 0,
            deprecated_rows_changed: 0,
            deprecated_columns: ptr::null_mut(),
            deprecated_error_message: ptr::null_mut(),
            internal_data: ptr::null_mut(),
        }
    }
}

pub type OpenFn = unsafe extern "C" fn(*const c_char, *mut duckdb_database) -> duckdb_state;
pub type CloseFn = unsafe extern "C" fn(*mut duckdb_database);
pub type ConnectFn = unsafe extern "C" fn(duckdb_database, *mut duckdb_connection) -> duckdb_state;
pub type DisconnectFn = unsafe extern "C" fn(*mut duckdb_connection);
pub type QueryFn = unsafe extern "C" fn(duckdb_connection, *const c_char, *mut duckdb_result) -> duckdb_state;
pub type DestroyResultFn = unsafe extern "C" fn(*mut duckdb_result);
pub type ColumnCountFn = unsafe extern "C" fn(*mut duckdb_result) -> idx_t;
pub type RowCountFn = unsafe extern "C" fn(*mut duckdb_result) -> idx_t;
pub type ColumnNameFn = unsafe extern "C" fn(*mut duckdb_result, idx_t) -> *const c_char;
pub type ValueVarcharFn = unsafe extern "C" fn(*mut duckdb_result, idx_t, idx_t) -> *mut c_char;
pub type FreeFn = unsafe extern "C" fn(*mut c_void);

/// The engine's function table, bound once per backend.
pub struct EngineApi {
    pub open: OpenFn,
    pub close: CloseFn,
    pub connect: ConnectFn,
    pub disconnect: DisconnectFn,
    pub query: QueryFn,
    pub destroy_result: DestroyResultFn,
    pub column_count: ColumnCountFn,
    pub row_count: RowCountFn,
    pub column_name: ColumnNameFn,
    pub value_varchar: ValueVarcharFn,
    pub free: FreeFn,
    _lib: Option<Library>,
}

impl EngineApi {
    /// Load the shared library at `path` and bind every symbol. A missing
    /// symbol or an unloadable file fails with `LibraryLoad`.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let lib = unsafe { Library::new(path) }.map_err(|e| EngineError::LibraryLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let bind_err = |e: libloading::Error| EngineError::LibraryLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        // Copy each symbol out as a bare function pointer before moving
        // the library into the struct; the handle kept in `_lib` is what
        // keeps those pointers valid.
        let open = unsafe { *lib.get::<OpenFn>(b"duckdb_open\0").map_err(bind_err)? };
        let close = unsafe { *lib.get::<CloseFn>(b"duckdb_close\0").map_err(bind_err)? };
        let connect = unsafe { *lib.get::<ConnectFn>(b"duckdb_connect\0").map_err(bind_err)? };
        let disconnect =
            unsafe { *lib.get::<DisconnectFn>(b"duckdb_disconnect\0").map_err(bind_err)? };
        let query = unsafe { *lib.get::<QueryFn>(b"duckdb_query\0").map_err(bind_err)? };
        let destroy_result = unsafe {
            *lib.get::<DestroyResultFn>(b"duckdb_destroy_result\0")
                .map_err(bind_err)?
        };
        let column_count = unsafe {
            *lib.get::<ColumnCountFn>(b"duckdb_column_count\0")
                .map_err(bind_err)?
        };
        let row_count =
            unsafe { *lib.get::<RowCountFn>(b"duckdb_row_count\0").map_err(bind_err)? };
        let column_name = unsafe {
            *lib.get::<ColumnNameFn>(b"duckdb_column_name\0")
                .map_err(bind_err)?
        };
        let value_varchar = unsafe {
            *lib.get::<ValueVarcharFn>(b"duckdb_value_varchar\0")
                .map_err(bind_err)?
        };
        let free = unsafe { *lib.get::<FreeFn>(b"duckdb_free\0").map_err(bind_err)? };

        Ok(EngineApi {
            open,
            close,
            connect,
            disconnect,
            query,
            destroy_result,
            column_count,
            row_count,
            column_name,
            value_varchar,
            free,
            _lib: Some(lib),
        })
    }

    /// Build an api from bare function pointers. Test seam for exercising
    /// the backend against an in-crate stub engine.
    #[cfg(test)]
    #[allow(clippy::too_many_arguments)]
    pub fn from_raw(
        open: OpenFn,
        close: CloseFn,
        connect: ConnectFn,
        disconnect: DisconnectFn,
        query: QueryFn,
        destroy_result: DestroyResultFn,
        column_count: ColumnCountFn,
        row_count: RowCountFn,
        column_name: ColumnNameFn,
        value_varchar: ValueVarcharFn,
        free: FreeFn,
    ) -> Self {
        EngineApi {
            open,
            close,
            connect,
            disconnect,
            query,
            destroy_result,
            column_count,
            row_count,
            column_name,
            value_varchar,
            free,
            _lib: None,
        }
    }
}
