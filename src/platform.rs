///
/// # Platform Resolver
///
/// Maps the host OS family to the platform-specific engine artifacts: the
/// CLI binary used by the process backend and the shared library loaded by
/// the native backend. Only Windows and Linux are supported; any other OS
/// family fails fast with `UnsupportedPlatform`.
///
/// Resolution also verifies the artifact exists on disk, so callers can
/// distinguish "this OS is not supported" from "this OS is supported but
/// the engine was never installed" (`MissingArtifact`).
///
/// ## Engine directory
///
/// Artifacts live in a single engine directory, resolved in order:
/// - the `FILEQL_ENGINE_DIR` environment variable, if set
/// - `{platform data dir}/fileql/engine` (e.g. `~/.local/share/fileql/engine`)
///

use std::path::{Path, PathBuf};

use crate::errors::EngineError;

pub const ENGINE_DIR_ENV: &str = "FILEQL_ENGINE_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
}

impl Platform {
    /// The platform this process is running on.
    pub fn current() -> Result<Self, EngineError> {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Result<Self, EngineError> {
        match os {
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            other => Err(EngineError::UnsupportedPlatform {
                os: other.to_string(),
            }),
        }
    }

    /// File name of the engine CLI binary for this platform.
    pub fn cli_name(self) -> &'static str {
        match self {
            Platform::Windows => "duckdb.exe",
            Platform::Linux => "duckdb",
        }
    }

    /// File name of the engine shared library for this platform.
    pub fn library_name(self) -> &'static str {
        match self {
            Platform::Windows => "duckdb.dll",
            Platform::Linux => "libduckdb.so",
        }
    }
}

/// Default engine directory for the current user.
pub fn default_engine_dir() -> Result<PathBuf, EngineError> {
    if let Ok(dir) = std::env::var(ENGINE_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    let base = dirs::data_dir().ok_or_else(|| {
        EngineError::EngineDir("no platform data directory available".to_string())
    })?;

    Ok(base.join("fileql").join("engine"))
}

/// Absolute path to the CLI binary inside `engine_dir`, verified to exist.
pub fn resolve_cli(engine_dir: &Path) -> Result<PathBuf, EngineError> {
    resolve_artifact(engine_dir, Platform::current()?.cli_name())
}

/// Absolute path to the shared library inside `engine_dir`, verified to exist.
pub fn resolve_library(engine_dir: &Path) -> Result<PathBuf, EngineError> {
    resolve_artifact(engine_dir, Platform::current()?.library_name())
}

fn resolve_artifact(engine_dir: &Path, name: &str) -> Result<PathBuf, EngineError> {
    let path = engine_dir.join(name);
    if !path.is_file() {
        return Err(EngineError::MissingArtifact { path });
    }
    Ok(path)
}
