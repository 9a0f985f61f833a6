use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    config::ExecutorConfig,
    error::Error,
    types::{CompilationUnit, SOURCE_EXTENSION},
};

/// Private directory holding one request's source file and class files
pub struct Workspace {
    /// Root directory of the workspace
    pub root_dir: PathBuf,
    unit: Option<CompilationUnit>,
    cleaned: bool,
}

impl Workspace {
    /// Create a fresh directory under the configured temp root.
    ///
    /// `create_dir` fails on an existing path, so two requests never share one.
    pub async fn create(config: &ExecutorConfig) -> Result<Self, Error> {
        let id = Uuid::new_v4();
        let root_dir = config
            .temp_root
            .join(format!("{}-{}", config.workspace_prefix, id));

        fs::create_dir(&root_dir).await?;
        debug!("Created workspace {:?}", root_dir);

        Ok(Self {
            root_dir,
            unit: None,
            cleaned: false,
        })
    }

    /// Write `code` to `<root>/<class_name>.java`.
    pub async fn materialize(
        &mut self,
        class_name: &str,
        code: &str,
    ) -> Result<CompilationUnit, Error> {
        validate_identifier(class_name)?;

        let source_path = self
            .root_dir
            .join(format!("{}.{}", class_name, SOURCE_EXTENSION));
        let unit = CompilationUnit {
            class_name: class_name.to_string(),
            source_path,
            root_dir: self.root_dir.clone(),
        };
        // Recorded before writing so a partial file is still removed.
        self.unit = Some(unit.clone());

        fs::write(&unit.source_path, code).await?;
        debug!("Wrote source file {:?}", unit.source_path);

        Ok(unit)
    }

    /// Remove the source file, the class file and then the directory.
    ///
    /// Every step is best-effort. Failures are logged and never returned.
    pub async fn cleanup(mut self) {
        if let Some(unit) = self.unit.take() {
            remove_file(&unit.source_path).await;
            remove_file(&unit.artifact_path()).await;
        }
        // Nested and non-public classes leave extra .class files behind.
        if let Err(e) = fs::remove_dir_all(&self.root_dir).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to remove workspace {:?}: {}", self.root_dir, e);
            }
        }
        self.cleaned = true;
        debug!("Cleaned up workspace {:?}", self.root_dir);
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        // Reached only when the pipeline was cancelled or panicked.
        if let Err(e) = std::fs::remove_dir_all(&self.root_dir) {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to clean up workspace {:?}: {}", self.root_dir, e);
            }
        }
    }
}

async fn remove_file(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {:?}: {}", path, e),
    }
}

/// The class name becomes a file name, so it must stay inside the workspace.
fn validate_identifier(name: &str) -> Result<(), Error> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}
