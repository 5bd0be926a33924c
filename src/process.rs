///
/// # Process Backend
///
/// Runs the engine CLI binary as a subprocess against a generated script.
/// The script is written to a uniquely named temporary file whose lifetime
/// is exactly the invocation's lifetime: the file is removed on every exit
/// path — success, non-zero exit, or spawn failure — when the handle drops.
/// Deletion is advisory; a failed delete is never surfaced.
///
/// Invocation: `<binary> .shell ".read <script-path>"`. Exit code 0 means
/// success; anything else fails with `Execution` carrying the engine's
/// combined stdout/stderr verbatim so the underlying SQL error is visible.
///
/// This backend returns no structured rows. The resulting `<db>.db` store
/// is read back by a separate relational reader outside this crate.
///

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::backend::SqlBackend;
use crate::diagnostics::Diagnostics;
use crate::errors::EngineError;
use crate::import::ImportSpec;
use crate::platform;
use crate::script::{self, Script};
use crate::store;

/// Exit code and combined output of one engine invocation.
#[derive(Debug, Clone)]
pub struct ExitOutcome {
    pub code: i32,
    pub output: String,
}

pub struct ProcessBackend {
    binary: PathBuf,
    working_dir: Option<PathBuf>,
    diagnostics: Diagnostics,
}

impl ProcessBackend {
    /// Resolve the engine binary inside `engine_dir` for the current
    /// platform.
    pub fn new(engine_dir: &Path) -> Result<Self, EngineError> {
        Ok(Self::with_binary(platform::resolve_cli(engine_dir)?))
    }

    /// Use an already-resolved binary path.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Directory the subprocess runs in; this is where `<db>.db`
    /// materializes. Defaults to the caller's working directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Execute a rendered script, blocking until the subprocess exits.
    pub fn execute(&mut self, script: &Script) -> Result<ExitOutcome, EngineError> {
        match self.run(script) {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                self.diagnostics.record(&error);
                Err(error)
            }
        }
    }

    fn run(&self, script: &Script) -> Result<ExitOutcome, EngineError> {
        let mut file = tempfile::Builder::new()
            .prefix("fileql-")
            .suffix(".sql")
            .tempfile()?;
        file.write_all(script.text().as_bytes())?;
        file.flush()?;

        let script_path = file.path().to_path_buf();
        debug!(binary = %self.binary.display(), script = %script_path.display(), "spawning engine process");

        let mut command = Command::new(&self.binary);
        command
            .arg(".shell")
            .arg(format!(".read {}", script_path.display()));
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        // `file` stays alive until the subprocess has finished; dropping it
        // afterwards removes the script on every path out of this function.
        let output = command.output().map_err(|e| EngineError::Spawn {
            binary: self.binary.clone(),
            reason: e.to_string(),
        })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let code = output.status.code().unwrap_or(-1);
        debug!(code, "engine process finished");

        if !output.status.success() {
            return Err(EngineError::Execution { code, output: text });
        }
        Ok(ExitOutcome { code, output: text })
    }

    /// Render and run the four-statement import script for `spec`.
    pub fn import(&mut self, spec: &ImportSpec) -> Result<ExitOutcome, EngineError> {
        if spec.is_overwrite() {
            let store_name = store::store_file(spec.database_name());
            let store_path = match &self.working_dir {
                Some(dir) => dir.join(store_name),
                None => store_name,
            };
            store::reset_store(&store_path);
        }
        let script = script::build_import_script(spec);
        self.execute(&script)
    }
}

impl SqlBackend for ProcessBackend {
    fn import(&mut self, spec: &ImportSpec) -> Result<(), EngineError> {
        ProcessBackend::import(self, spec).map(|_| ())
    }

    fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}
