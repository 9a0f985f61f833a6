use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

/// Wall-clock budget for the runtime process.
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(25);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Compiler binary, looked up on PATH unless it is a path
    pub compiler: String,

    /// Runtime binary, looked up on PATH unless it is a path
    pub runtime: String,

    /// Hard deadline for the runtime process, in seconds on the wire
    #[serde(rename = "execution_timeout_secs", with = "duration_serde")]
    pub execution_timeout: Duration,

    /// Directory under which per-request workspaces are created
    pub temp_root: PathBuf,

    /// Name prefix of each workspace directory
    pub workspace_prefix: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            compiler: "javac".to_string(),
            runtime: "java".to_string(),
            execution_timeout: DEFAULT_EXECUTION_TIMEOUT,
            temp_root: std::env::temp_dir(),
            workspace_prefix: "java_code".to_string(),
        }
    }
}

impl ExecutorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        toml::from_str(s).map_err(|e| Error::Configuration(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    pub fn with_execution_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = timeout;
        self
    }

    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }

    pub fn with_workspace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.workspace_prefix = prefix.into();
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.compiler.trim().is_empty() {
            return Err(Error::Configuration("compiler must not be empty".into()));
        }
        if self.runtime.trim().is_empty() {
            return Err(Error::Configuration("runtime must not be empty".into()));
        }
        if self.execution_timeout.is_zero() {
            return Err(Error::Configuration(
                "execution timeout must be greater than zero".into(),
            ));
        }
        if self.workspace_prefix.is_empty() || self.workspace_prefix.contains(['/', '\\']) {
            return Err(Error::Configuration(format!(
                "invalid workspace prefix: {:?}",
                self.workspace_prefix
            )));
        }
        Ok(())
    }

    /// Binaries that must be reachable for the pipeline to work.
    pub fn required_tools(&self) -> Vec<&str> {
        vec![self.compiler.as_str(), self.runtime.as_str()]
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExecutorConfig::default();
        assert_eq!(config.compiler, "javac");
        assert_eq!(config.runtime, "java");
        assert_eq!(config.execution_timeout, Duration::from_secs(25));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ExecutorConfig::from_toml_str(
            r#"
            runtime = "/opt/jdk/bin/java"
            execution_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.compiler, "javac");
        assert_eq!(config.runtime, "/opt/jdk/bin/java");
        assert_eq!(config.execution_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_toml() {
        let result = ExecutorConfig::from_toml_str("execution_timeout_secs = \"soon\"");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ExecutorConfig::default().with_execution_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_prefix_with_separator() {
        let config = ExecutorConfig::default().with_workspace_prefix("../escape");
        assert!(config.validate().is_err());
    }
}
