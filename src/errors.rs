///
/// Error taxonomy shared by both execution backends.
///
/// Every failure a public operation can produce maps to one variant here.
/// Each variant carries a stable short tag (`code()`) used when the failure
/// is recorded in a backend's diagnostics slot, so callers can either match
/// on the returned error or poll the slot after a batch of calls.
///

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unsupported platform '{os}': only windows and linux are supported")]
    UnsupportedPlatform { os: String },

    #[error("Engine artifact missing at {path}")]
    MissingArtifact { path: PathBuf },

    #[error("Could not determine engine directory: {0}")]
    EngineDir(String),

    #[error("Source file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported file type '{extension}' for {path}")]
    UnsupportedFileType { path: PathBuf, extension: String },

    #[error("Failed to write script file: {0}")]
    ScriptWrite(#[from] std::io::Error),

    #[error("Failed to spawn engine binary {binary}: {reason}")]
    Spawn { binary: PathBuf, reason: String },

    #[error("Engine process exited with code {code}:\n{output}")]
    Execution { code: i32, output: String },

    #[error("Failed to load engine library {path}: {reason}")]
    LibraryLoad { path: PathBuf, reason: String },

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Operation '{operation}' requires a connected backend")]
    InvalidState { operation: &'static str },
}

impl EngineError {
    /// Stable tag recorded alongside the message in the diagnostics slot.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::UnsupportedPlatform { .. } => "PLATFORM_UNSUPPORTED",
            EngineError::MissingArtifact { .. } => "MISSING_ARTIFACT",
            EngineError::EngineDir(_) => "ENGINE_DIR",
            EngineError::FileNotFound { .. } => "FILE_NOT_FOUND",
            EngineError::UnsupportedFileType { .. } => "UNSUPPORTED_FILE_TYPE",
            EngineError::ScriptWrite(_) => "SCRIPT_WRITE",
            EngineError::Spawn { .. } => "SPAWN_FAILED",
            EngineError::Execution { .. } => "EXECUTION_FAILED",
            EngineError::LibraryLoad { .. } => "LIBRARY_LOAD_FAILED",
            EngineError::Connection(_) => "CONNECTION_FAILED",
            EngineError::Query(_) => "QUERY_FAILED",
            EngineError::InvalidState { .. } => "INVALID_STATE",
        }
    }
}
