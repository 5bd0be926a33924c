///
/// # Backend capability trait
///
/// The two execution strategies — subprocess and foreign-call — share the
/// file-to-table import capability and the per-instance diagnostics slot.
/// Callers that only import can hold either variant behind this trait;
/// structured row access (`query`, `query_single`) stays on the native
/// backend, since the process backend never returns rows itself.
///

use crate::diagnostics::Diagnostics;
use crate::errors::EngineError;
use crate::import::ImportSpec;

pub trait SqlBackend {
    /// Import the spec's source file into its target table, discarding any
    /// produced rows.
    fn import(&mut self, spec: &ImportSpec) -> Result<(), EngineError>;

    fn diagnostics(&self) -> &Diagnostics;

    fn has_error(&self) -> bool {
        self.diagnostics().has_error()
    }
}
