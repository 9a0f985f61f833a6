use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use which::which;

pub mod defaults {
    use crate::ExecutorConfig;
    use std::path::Path;
    use tokio::time::Duration;

    pub fn short_timeout() -> Duration {
        Duration::from_secs(1)
    }

    /// Timeout for the real JDK tests: long enough for a JVM to start.
    pub fn jvm_timeout() -> Duration {
        Duration::from_secs(10)
    }

    pub fn config_in(temp_root: &Path) -> ExecutorConfig {
        ExecutorConfig::default().with_temp_root(temp_root)
    }
}

/// Shell scripts standing in for `javac` and `java`
pub struct FakeToolchain {
    dir: TempDir,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create toolchain dir"),
        }
    }

    /// Write an executable `#!/bin/sh` script and return its absolute path.
    pub fn script(&self, name: &str, body: &str) -> String {
        let path = self.dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("failed to write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("failed to mark script executable");
        path.to_string_lossy().into_owned()
    }

    /// A path inside the toolchain directory, outside any workspace.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// File the runtime touches when it is started, see `scripts::java_marking`.
    pub fn marker(&self) -> PathBuf {
        self.path("runtime-started")
    }
}

pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).expect("failed to list dir").count()
}

pub fn skip_if_not_available(tools: &[&str]) -> bool {
    let missing: Vec<_> = tools
        .iter()
        .filter(|tool| which(**tool).is_err())
        .map(|s| (*s).to_string())
        .collect();

    if !missing.is_empty() {
        eprintln!("Skipping test: {} not available", missing.join(", "));
        return true;
    }
    false
}
