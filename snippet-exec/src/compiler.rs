use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

use crate::{
    error::Error,
    types::{CompilationUnit, ProcessOutcome, ProcessStatus},
};

/// Resolve `program` through PATH, or accept it as-is when it is a path.
pub(crate) fn resolve_program(program: &str) -> Result<PathBuf, Error> {
    which::which(program).map_err(|e| spawn_error(program, e))
}

/// Same wording the platform uses when a program cannot be started.
pub(crate) fn spawn_error(program: &str, cause: impl std::fmt::Display) -> Error {
    Error::Spawn {
        program: program.to_string(),
        message: format!("Cannot run program \"{}\": {}", program, cause),
    }
}

/// Runs the external compiler against a materialized source file
pub struct Compiler {
    program: String,
}

impl Compiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Compile `unit`, blocking until the compiler exits.
    ///
    /// There is no deadline here; only the runtime process is bounded.
    pub async fn compile(&self, unit: &CompilationUnit) -> Result<ProcessOutcome, Error> {
        let program = resolve_program(&self.program)?;
        debug!("Compiling {:?} with {:?}", unit.source_path, program);

        let started = Instant::now();
        let output = Command::new(&program)
            .arg(&unit.source_path)
            .current_dir(&unit.root_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| spawn_error(&self.program, e))?;

        let outcome = ProcessOutcome {
            status: ProcessStatus::Exited(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
            elapsed: started.elapsed(),
        };

        if !outcome.success() {
            debug!("Compilation failed with {}", output.status);
            return Err(Error::Compilation(outcome.stderr_lossy()));
        }

        Ok(outcome)
    }
}
