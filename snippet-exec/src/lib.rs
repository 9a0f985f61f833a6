//! # Snippet Execution
//!
//! Compiles a Java snippet submitted by an untrusted caller, runs the compiled
//! class under a hard wall-clock deadline and reports the captured output.
//! Every invocation gets its own temporary directory, removed on every exit path.
//!
//! No isolation is applied to the child processes and memory usage is not
//! measured (`memoryUsedBytes` is always zero).

mod compiler;
mod config;
mod error;
mod executor;
pub mod handler;
pub mod naming;
mod service;
mod supervisor;
mod types;
mod workspace;

#[cfg(test)]
mod tests;

pub use compiler::Compiler;
pub use config::{ExecutorConfig, DEFAULT_EXECUTION_TIMEOUT};
pub use error::{Error, ErrorKind};
pub use executor::CodeExecutor;
pub use service::CodeExecutionService;
pub use supervisor::Supervisor;
pub use types::{
    CompilationUnit, ExecutionRequest, ExecutionResult, NamingMode, ProcessOutcome,
    ProcessStatus, Response, TIMEOUT_MESSAGE,
};
pub use workspace::Workspace;

/// Result type for code execution operations
pub type Result<T> = std::result::Result<T, Error>;
