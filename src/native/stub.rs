///
/// In-crate stub engine for native-backend tests.
///
/// Implements the full foreign function table over a fixed two-column
/// table (`name`, `price`) so the state machine and the marshaler can be
/// exercised without a real shared library. Thread-local counters track
/// handle opens/closes, varchar allocations/frees, and result destroys so
/// tests can assert that foreign memory is balanced on every path.
///

use std::cell::Cell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::ptr;

use crate::native::ffi::{
    duckdb_connection, duckdb_database, duckdb_result, duckdb_state, idx_t, EngineApi,
};

thread_local! {
    static OPENS: Cell<usize> = const { Cell::new(0) };
    static CLOSES: Cell<usize> = const { Cell::new(0) };
    static CONNECTS: Cell<usize> = const { Cell::new(0) };
    static DISCONNECTS: Cell<usize> = const { Cell::new(0) };
    static VARCHAR_ALLOCS: Cell<usize> = const { Cell::new(0) };
    static VARCHAR_FREES: Cell<usize> = const { Cell::new(0) };
    static DESTROYS: Cell<usize> = const { Cell::new(0) };
    static FAIL_CONNECT: Cell<bool> = const { Cell::new(false) };
    static FAIL_QUERY: Cell<bool> = const { Cell::new(false) };
    static EMPTY_RESULT: Cell<bool> = const { Cell::new(false) };
}

pub fn reset() {
    for counter in [
        &OPENS, &CLOSES, &CONNECTS, &DISCONNECTS, &VARCHAR_ALLOCS, &VARCHAR_FREES, &DESTROYS,
    ] {
        counter.with(|c| c.set(0));
    }
    FAIL_CONNECT.with(|c| c.set(false));
    FAIL_QUERY.with(|c| c.set(false));
    EMPTY_RESULT.with(|c| c.set(false));
}

pub fn fail_connects(fail: bool) {
    FAIL_CONNECT.with(|c| c.set(fail));
}

pub fn fail_queries(fail: bool) {
    FAIL_QUERY.with(|c| c.set(fail));
}

pub fn return_empty_results(empty: bool) {
    EMPTY_RESULT.with(|c| c.set(empty));
}

pub fn opens() -> usize {
    OPENS.with(|c| c.get())
}

pub fn closes() -> usize {
    CLOSES.with(|c| c.get())
}

pub fn connects() -> usize {
    CONNECTS.with(|c| c.get())
}

pub fn disconnects() -> usize {
    DISCONNECTS.with(|c| c.get())
}

pub fn varchar_allocations() -> usize {
    VARCHAR_ALLOCS.with(|c| c.get())
}

pub fn varchar_frees() -> usize {
    VARCHAR_FREES.with(|c| c.get())
}

pub fn results_destroyed() -> usize {
    DESTROYS.with(|c| c.get())
}

struct StubResult {
    columns: Vec<CString>,
    cells: Vec<Vec<Option<&'static str>>>,
}

fn fixed_table() -> StubResult {
    let rows = if EMPTY_RESULT.with(|c| c.get()) {
        Vec::new()
    } else {
        vec![
            vec![Some("widget"), Some("9.99")],
            vec![Some("gadget"), None],
        ]
    };
    StubResult {
        columns: vec![
            CString::new("name").unwrap(),
            CString::new("price").unwrap(),
        ],
        cells: rows,
    }
}

/// A result as `duckdb_query` would have produced it on success.
pub fn successful_result() -> duckdb_result {
    let mut result = duckdb_result::zeroed();
    result.internal_data = Box::into_raw(Box::new(fixed_table())) as *mut c_void;
    result
}

static ERROR_MESSAGE: &[u8] = b"Parser Error: boom\0";

/// A result as `duckdb_query` would have produced it on failure: no
/// internal data, error message field set.
pub fn failed_result() -> duckdb_result {
    let mut result = duckdb_result::zeroed();
    result.deprecated_error_message = ERROR_MESSAGE.as_ptr() as *mut c_char;
    result
}

unsafe extern "C" fn stub_open(
    _path: *const c_char,
    out_database: *mut duckdb_database,
) -> duckdb_state {
    OPENS.with(|c| c.set(c.get() + 1));
    unsafe { *out_database = Box::into_raw(Box::new(0u8)) as *mut c_void };
    duckdb_state::Success
}

unsafe extern "C" fn stub_close(database: *mut duckdb_database) {
    unsafe {
        if !database.is_null() && !(*database).is_null() {
            drop(Box::from_raw(*database as *mut u8));
            *database = ptr::null_mut();
            CLOSES.with(|c| c.set(c.get() + 1));
        }
    }
}

unsafe extern "C" fn stub_connect(
    _database: duckdb_database,
    out_connection: *mut duckdb_connection,
) -> duckdb_state {
    if FAIL_CONNECT.with(|c| c.get()) {
        return duckdb_state::Error;
    }
    CONNECTS.with(|c| c.set(c.get() + 1));
    unsafe { *out_connection = Box::into_raw(Box::new(0u8)) as *mut c_void };
    duckdb_state::Success
}

unsafe extern "C" fn stub_disconnect(connection: *mut duckdb_connection) {
    unsafe {
        if !connection.is_null() && !(*connection).is_null() {
            drop(Box::from_raw(*connection as *mut u8));
            *connection = ptr::null_mut();
            DISCONNECTS.with(|c| c.set(c.get() + 1));
        }
    }
}

unsafe extern "C" fn stub_query(
    _connection: duckdb_connection,
    _sql: *const c_char,
    out_result: *mut duckdb_result,
) -> duckdb_state {
    if FAIL_QUERY.with(|c| c.get()) {
        unsafe { *out_result = failed_result() };
        return duckdb_state::Error;
    }
    unsafe { *out_result = successful_result() };
    duckdb_state::Success
}

unsafe extern "C" fn stub_destroy_result(result: *mut duckdb_result) {
    unsafe {
        if result.is_null() {
            return;
        }
        let internal = (*result).internal_data;
        if !internal.is_null() {
            drop(Box::from_raw(internal as *mut StubResult));
            (*result).internal_data = ptr::null_mut();
        }
        (*result).deprecated_error_message = ptr::null_mut();
        DESTROYS.with(|c| c.set(c.get() + 1));
    }
}

unsafe fn stub_data<'a>(result: *mut duckdb_result) -> Option<&'a StubResult> {
    unsafe {
        let internal = (*result).internal_data;
        if internal.is_null() {
            None
        } else {
            Some(&*(internal as *const StubResult))
        }
    }
}

unsafe extern "C" fn stub_column_count(result: *mut duckdb_result) -> idx_t {
    unsafe { stub_data(result).map(|r| r.columns.len() as idx_t).unwrap_or(0) }
}

unsafe extern "C" fn stub_row_count(result: *mut duckdb_result) -> idx_t {
    unsafe { stub_data(result).map(|r| r.cells.len() as idx_t).unwrap_or(0) }
}

unsafe extern "C" fn stub_column_name(result: *mut duckdb_result, col: idx_t) -> *const c_char {
    unsafe {
        stub_data(result)
            .and_then(|r| r.columns.get(col as usize))
            .map(|name| name.as_ptr())
            .unwrap_or(ptr::null())
    }
}

unsafe extern "C" fn stub_value_varchar(
    result: *mut duckdb_result,
    col: idx_t,
    row: idx_t,
) -> *mut c_char {
    unsafe {
        let cell = stub_data(result)
            .and_then(|r| r.cells.get(row as usize))
            .and_then(|cells| cells.get(col as usize))
            .copied()
            .flatten();
        match cell {
            Some(text) => {
                VARCHAR_ALLOCS.with(|c| c.set(c.get() + 1));
                CString::new(text).unwrap().into_raw()
            }
            None => ptr::null_mut(),
        }
    }
}

unsafe extern "C" fn stub_free(ptr: *mut c_void) {
    unsafe {
        if ptr.is_null() {
            return;
        }
        VARCHAR_FREES.with(|c| c.set(c.get() + 1));
        drop(CString::from_raw(ptr as *mut c_char));
    }
}

/// The complete stub function table.
pub fn api() -> EngineApi {
    EngineApi::from_raw(
        stub_open,
        stub_close,
        stub_connect,
        stub_disconnect,
        stub_query,
        stub_destroy_result,
        stub_column_count,
        stub_row_count,
        stub_column_name,
        stub_value_varchar,
        stub_free,
    )
}

#[test]
fn test_error_message_is_nul_terminated() {
    let _ = CStr::from_bytes_with_nul(ERROR_MESSAGE).unwrap();
}
