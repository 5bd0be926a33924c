///
/// # fileql — SQL over structured files through an embedded engine
///
/// Runs SQL against large CSV/JSON/Parquet files without a pre-existing
/// database by driving an embedded DuckDB engine through one of two
/// backends:
///
/// - [`ProcessBackend`] writes a generated script to a temp file and runs
///   the engine CLI binary against it, capturing exit code and output.
///   The materialized `<db>.db` store is read back by a separate
///   relational reader outside this crate.
/// - [`NativeBackend`] loads the engine shared library and executes
///   queries over FFI, marshaling results into host-owned rows.
///
/// Both backends share the statement builder, the platform resolver, and
/// the error taxonomy, and each owns a sticky last-error diagnostics slot.
///
/// ## Example
///
/// ```rust,ignore
/// use fileql::{platform, ImportOptions, NativeBackend};
///
/// let dir = platform::default_engine_dir()?;
/// let mut backend = NativeBackend::new(&dir)?;
/// backend.connect("shop.duckdb".as_ref())?;
/// backend.import_csv("products.csv", "product", ImportOptions::new())?;
/// let price = backend.query_single("SELECT price FROM product WHERE ean = '123'")?;
/// ```
///

pub mod backend;
pub mod diagnostics;
pub mod errors;
pub mod import;
pub mod native;
pub mod platform;
pub mod process;
pub mod result;
pub mod script;
pub mod store;

pub use backend::SqlBackend;
pub use diagnostics::{Diagnostics, ErrorState};
pub use errors::EngineError;
pub use import::{FileKind, ImportOptions, ImportSpec, OptionValue};
pub use native::NativeBackend;
pub use platform::Platform;
pub use process::{ExitOutcome, ProcessBackend};
pub use result::{QueryResult, Value};
pub use script::{build_import_script, render_native_import, Script};
