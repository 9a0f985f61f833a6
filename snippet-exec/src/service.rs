use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::{
    error::Error,
    executor::CodeExecutor,
    handler,
    types::{ExecutionRequest, ExecutionResult, NamingMode, ProcessOutcome, Response},
    ExecutorConfig,
};

/// Entry point for single-shot invocations.
///
/// Holds no mutable state, so one instance can serve concurrent callers.
#[derive(Clone)]
pub struct CodeExecutionService {
    executor: Arc<CodeExecutor>,
}

impl CodeExecutionService {
    pub fn new(config: ExecutorConfig) -> Result<Self, Error> {
        let executor = CodeExecutor::new(config)?;

        Ok(Self {
            executor: Arc::new(executor),
        })
    }

    pub fn executor(&self) -> &CodeExecutor {
        &self.executor
    }

    /// Execute an already decoded request.
    pub async fn execute(&self, request: ExecutionRequest, mode: NamingMode) -> ExecutionResult {
        let started = Instant::now();
        let executor = self.executor.clone();
        finish(started, async move { executor.run(&request, mode).await }).await
    }

    /// Decode and execute a raw invocation event.
    pub async fn handle_event(&self, event: Value, mode: NamingMode) -> Response {
        let started = Instant::now();
        let executor = self.executor.clone();
        let result = finish(started, async move {
            let request = handler::parse_event(event, mode)?;
            executor.run(&request, mode).await
        })
        .await;
        Response::from(result)
    }

    /// Decode and execute a request body received as bytes.
    pub async fn handle_bytes(&self, bytes: Vec<u8>, mode: NamingMode) -> Response {
        let started = Instant::now();
        let executor = self.executor.clone();
        let result = finish(started, async move {
            let request = handler::parse_event_bytes(&bytes, mode)?;
            executor.run(&request, mode).await
        })
        .await;
        Response::from(result)
    }
}

/// Run the pipeline on its own task so a panic becomes a failure result.
async fn finish<F>(started: Instant, pipeline: F) -> ExecutionResult
where
    F: Future<Output = Result<ProcessOutcome, Error>> + Send + 'static,
{
    let outcome = match tokio::spawn(pipeline).await {
        Ok(outcome) => outcome,
        Err(e) => Err(Error::Unexpected(format!("Execution task failed: {}", e))),
    };

    match &outcome {
        Ok(outcome) if outcome.success() => info!("Code execution completed successfully"),
        Ok(outcome) => info!("Code execution finished unsuccessfully: {:?}", outcome.status),
        Err(e) => error!("Code execution failed: {}", e),
    }

    ExecutionResult::assemble(outcome, started.elapsed())
}
