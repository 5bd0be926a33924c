///
/// # Per-backend diagnostics slot
///
/// Each backend instance owns one `Diagnostics` value holding the most
/// recent failure: a stable code tag, the rendered message, and a UTC
/// timestamp. The slot is overwritten on each failure and is *not* cleared
/// by a later successful operation — the last error sticks until the next
/// one replaces it. Callers that prefer polling over matching on returned
/// errors inspect the slot after a batch of calls.
///
/// The slot is deliberately per-instance rather than process-wide so two
/// backends in the same process never clobber each other's state.
///

use chrono::{DateTime, Utc};

use crate::errors::EngineError;

/// Snapshot of the most recent failure on a backend.
#[derive(Debug, Clone)]
pub struct ErrorState {
    pub code: &'static str,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    last: Option<ErrorState>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Record a failure, replacing whatever was recorded before.
    pub fn record(&mut self, error: &EngineError) {
        self.last = Some(ErrorState {
            code: error.code(),
            message: error.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn has_error(&self) -> bool {
        self.last.is_some()
    }

    pub fn last_error(&self) -> Option<&ErrorState> {
        self.last.as_ref()
    }
}
