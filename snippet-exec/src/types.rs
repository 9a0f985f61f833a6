use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::ExitStatus;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, ErrorKind};

/// Error text reported when the runtime exceeds its deadline.
pub const TIMEOUT_MESSAGE: &str = "Execution timeout";

/// Extension of Java source files.
pub const SOURCE_EXTENSION: &str = "java";

/// Extension of compiled class files.
pub const ARTIFACT_EXTENSION: &str = "class";

/// How the compilation unit gets its class name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingMode {
    /// Taken from the caller's `filename`, regardless of what the code declares.
    /// Compilation fails whenever the two disagree.
    Fixed,
    /// Scanned out of the source text; requests without a public class fail fast.
    Derived,
}

impl FromStr for NamingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(NamingMode::Fixed),
            "derived" => Ok(NamingMode::Derived),
            _ => Err(format!("Unknown naming mode: {}", s)),
        }
    }
}

/// Code execution request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    /// Source code to compile and run
    pub code: String,
    /// Language tag supplied by the caller. Only logged.
    #[serde(default)]
    pub language: Option<String>,
    /// File name for the fixed-name variant
    #[serde(default)]
    pub filename: Option<String>,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: Some("java".to_string()),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// A materialized source file and the directory that owns it
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub class_name: String,
    pub source_path: PathBuf,
    pub root_dir: PathBuf,
}

impl CompilationUnit {
    /// Where the compiler leaves the class file for `class_name`.
    pub fn artifact_path(&self) -> PathBuf {
        self.root_dir
            .join(format!("{}.{}", self.class_name, ARTIFACT_EXTENSION))
    }
}

/// How a supervised process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Exited(ExitStatus),
    TimedOut,
}

/// Captured result of one child process
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub status: ProcessStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        matches!(self.status, ProcessStatus::Exited(status) if status.success())
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Execution result returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
    pub error: String,
    pub execution_time_millis: u64,
    /// Never measured; always zero.
    pub memory_used_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ExecutionResult {
    pub fn new(success: bool, output: String, error: String, elapsed: Duration) -> Self {
        Self {
            success,
            output,
            error,
            execution_time_millis: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            memory_used_bytes: 0,
            error_kind: None,
        }
    }

    pub fn failure(kind: ErrorKind, error: String, elapsed: Duration) -> Self {
        Self {
            error_kind: Some(kind),
            ..Self::new(false, String::new(), error, elapsed)
        }
    }

    /// Map a finished pipeline onto the response contract.
    ///
    /// `elapsed` covers the whole invocation, not only the runtime process.
    pub fn assemble(outcome: Result<ProcessOutcome, Error>, elapsed: Duration) -> Self {
        match outcome {
            Ok(outcome) => match outcome.status {
                ProcessStatus::TimedOut => Self::failure(
                    ErrorKind::ExecutionTimeout,
                    TIMEOUT_MESSAGE.to_string(),
                    elapsed,
                ),
                ProcessStatus::Exited(status) => {
                    let mut result = Self::new(
                        status.success(),
                        outcome.stdout_lossy(),
                        outcome.stderr_lossy(),
                        elapsed,
                    );
                    if !result.success {
                        result.error_kind = Some(ErrorKind::RuntimeFailure);
                    }
                    result
                }
            },
            Err(e) => Self::failure(e.kind(), e.to_string(), elapsed),
        }
    }
}

/// Response envelope. Failures live in `body`; the status code is always 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub body: ExecutionResult,
}

impl From<ExecutionResult> for Response {
    fn from(body: ExecutionResult) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }
}
