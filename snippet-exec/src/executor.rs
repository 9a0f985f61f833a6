use tracing::{debug, warn};
use which::which;

use crate::{
    compiler::Compiler,
    config::ExecutorConfig,
    error::Error,
    naming::{class_name_from_filename, extract_public_class},
    supervisor::Supervisor,
    types::{ExecutionRequest, NamingMode, ProcessOutcome},
    workspace::Workspace,
};

/// Drives one request through materialize, compile, run and cleanup
pub struct CodeExecutor {
    config: ExecutorConfig,
    compiler: Compiler,
    supervisor: Supervisor,
}

impl CodeExecutor {
    /// Create a new code executor
    pub fn new(config: ExecutorConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            compiler: Compiler::new(config.compiler.clone()),
            supervisor: Supervisor::new(config.runtime.clone(), config.execution_timeout),
            config,
        })
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run the pipeline for `request`.
    ///
    /// A timed out run is an `Ok` outcome; only failures before the runtime
    /// finishes are errors. The workspace is removed on every path.
    pub async fn run(
        &self,
        request: &ExecutionRequest,
        mode: NamingMode,
    ) -> Result<ProcessOutcome, Error> {
        debug!(
            "Executing {} request (language tag: {:?})",
            match mode {
                NamingMode::Fixed => "fixed-name",
                NamingMode::Derived => "derived-name",
            },
            request.language
        );

        let class_name = resolve_class_name(request, mode)?;
        let mut workspace = Workspace::create(&self.config).await?;

        let result = self
            .compile_and_run(&mut workspace, class_name, &request.code)
            .await;

        workspace.cleanup().await;
        result
    }

    async fn compile_and_run(
        &self,
        workspace: &mut Workspace,
        class_name: &str,
        code: &str,
    ) -> Result<ProcessOutcome, Error> {
        let unit = workspace.materialize(class_name, code).await?;
        self.compiler.compile(&unit).await?;
        self.supervisor.run(&unit).await
    }

    /// Check that the compiler and runtime can be found.
    pub fn check_tools(&self) -> Result<(), Error> {
        let missing: Vec<_> = self
            .config
            .required_tools()
            .into_iter()
            .filter(|tool| which(tool).is_err())
            .map(str::to_string)
            .collect();

        if !missing.is_empty() {
            warn!("Missing required tools: {}", missing.join(", "));
            return Err(Error::MissingTools(missing));
        }
        Ok(())
    }
}

fn resolve_class_name(request: &ExecutionRequest, mode: NamingMode) -> Result<&str, Error> {
    match mode {
        NamingMode::Derived => extract_public_class(&request.code).ok_or(Error::NoPublicClass),
        NamingMode::Fixed => request
            .filename
            .as_deref()
            .map(class_name_from_filename)
            .ok_or_else(|| Error::InvalidRequest("Missing required field: filename".into())),
    }
}
