///
/// # Result Marshaler
///
/// Converts a foreign tabular result into a host-owned `QueryResult`.
///
/// Ownership rules over the foreign interface:
/// - column-name pointers are engine-owned; they are copied, never freed
/// - every `duckdb_value_varchar` buffer has exactly one owner (this
///   module) and is freed with `duckdb_free` immediately after the value
///   is copied into a host `String`; no foreign pointer is retained past
///   that call
/// - the result object itself is destroyed by `ResultGuard` when the guard
///   drops, on every exit path out of a query — including a failed query
///   and any error raised mid-extraction
///

use std::ffi::CStr;
use std::os::raw::c_void;

use crate::errors::EngineError;
use crate::native::ffi::{duckdb_result, idx_t, EngineApi};
use crate::result::{QueryResult, Value};

/// Owns a foreign result object and destroys it exactly once on drop.
pub(crate) struct ResultGuard<'a> {
    api: &'a EngineApi,
    result: duckdb_result,
}

impl<'a> ResultGuard<'a> {
    pub(crate) fn new(api: &'a EngineApi, result: duckdb_result) -> Self {
        Self { api, result }
    }

    /// The engine's error message field, read before the result is
    /// destroyed. Null when the query succeeded.
    pub(crate) fn error_message(&self) -> Option<String> {
        let ptr = self.result.deprecated_error_message;
        if ptr.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }

    pub(crate) fn result_mut(&mut self) -> &mut duckdb_result {
        &mut self.result
    }
}

impl Drop for ResultGuard<'_> {
    fn drop(&mut self) {
        unsafe { (self.api.destroy_result)(&mut self.result) };
    }
}

/// Walk the foreign result column-by-column, then the full row×column
/// grid, copying every cell into host-owned values.
pub(crate) fn marshal_result(
    api: &EngineApi,
    result: &mut duckdb_result,
) -> Result<QueryResult, EngineError> {
    let column_count = unsafe { (api.column_count)(result) } as usize;
    let row_count = unsafe { (api.row_count)(result) } as usize;

    let mut columns = Vec::with_capacity(column_count);
    for col in 0..column_count {
        let name_ptr = unsafe { (api.column_name)(result, col as idx_t) };
        let name = if name_ptr.is_null() {
            format!("column{}", col)
        } else {
            unsafe { CStr::from_ptr(name_ptr) }
                .to_string_lossy()
                .into_owned()
        };
        columns.push(name);
    }

    let mut rows = Vec::with_capacity(row_count);
    for row in 0..row_count {
        let mut values = Vec::with_capacity(column_count);
        for col in 0..column_count {
            values.push(read_cell(api, result, col as idx_t, row as idx_t));
        }
        rows.push(values);
    }

    Ok(QueryResult::new(columns, rows))
}

/// Fetch one cell in its varchar projection, copy it out, and release the
/// foreign buffer before returning.
fn read_cell(api: &EngineApi, result: &mut duckdb_result, col: idx_t, row: idx_t) -> Value {
    let ptr = unsafe { (api.value_varchar)(result, col, row) };
    if ptr.is_null() {
        return Value::Null;
    }
    let text = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
    unsafe { (api.free)(ptr as *mut c_void) };
    Value::Text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::stub;

    #[test]
    fn test_marshal_fixed_table() {
        stub::reset();
        let api = stub::api();
        let mut guard = ResultGuard::new(&api, stub::successful_result());

        let result = marshal_result(&api, guard.result_mut()).unwrap();
        assert_eq!(result.columns(), ["name", "price"]);
        assert_eq!(result.row_count(), 2);
        assert_eq!(result.get(0, "name").unwrap().as_str(), Some("widget"));
        assert_eq!(result.get(0, "price").unwrap().as_str(), Some("9.99"));
        assert_eq!(result.get(1, "name").unwrap().as_str(), Some("gadget"));
        assert!(result.get(1, "price").unwrap().is_null());

        drop(guard);
        // Three non-null cells were converted; each buffer was freed once,
        // and the result object was destroyed exactly once.
        assert_eq!(stub::varchar_allocations(), 3);
        assert_eq!(stub::varchar_frees(), 3);
        assert_eq!(stub::results_destroyed(), 1);
    }

    #[test]
    fn test_guard_reads_error_message_before_destroy() {
        stub::reset();
        let api = stub::api();
        let guard = ResultGuard::new(&api, stub::failed_result());

        assert_eq!(guard.error_message().unwrap(), "Parser Error: boom");
        drop(guard);
        assert_eq!(stub::results_destroyed(), 1);
    }

    #[test]
    fn test_guard_destroys_without_extraction() {
        stub::reset();
        let api = stub::api();
        let guard = ResultGuard::new(&api, stub::successful_result());
        drop(guard);
        assert_eq!(stub::results_destroyed(), 1);
        assert_eq!(stub::varchar_allocations(), 0);
    }
}
