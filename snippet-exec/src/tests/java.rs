//! End-to-end runs against a real JDK. Skipped when `javac`/`java` are missing.

use super::{
    fixtures::code_samples::*,
    utils::{
        defaults::{config_in, jvm_timeout},
        entries, skip_if_not_available,
    },
};
use crate::{CodeExecutionService, ErrorKind, ExecutionRequest, NamingMode, Result};
use tokio::time::Duration;

const JDK: &[&str] = &["javac", "java"];

async fn execute(
    request: ExecutionRequest,
    mode: NamingMode,
    timeout: Duration,
) -> Result<crate::ExecutionResult> {
    let temp_root = tempfile::tempdir()?;
    let service = CodeExecutionService::new(
        config_in(temp_root.path()).with_execution_timeout(timeout),
    )?;
    let result = service.execute(request, mode).await;
    assert_eq!(entries(temp_root.path()), 0, "workspace left behind");
    Ok(result)
}

#[tokio::test]
async fn test_java_hello() -> Result<()> {
    if skip_if_not_available(JDK) {
        return Ok(());
    }
    let result = execute(
        ExecutionRequest::new(JAVA_HELLO),
        NamingMode::Derived,
        jvm_timeout(),
    )
    .await?;

    assert!(result.success, "{}", result.error);
    assert_eq!(result.output, "Hello from Java!\n");
    assert_eq!(result.error, "");
    assert_eq!(result.memory_used_bytes, 0);
    Ok(())
}

#[tokio::test]
async fn test_java_fixed_name() -> Result<()> {
    if skip_if_not_available(JDK) {
        return Ok(());
    }
    let result = execute(
        ExecutionRequest::new(JAVA_HELLO).with_filename("Test.java"),
        NamingMode::Fixed,
        jvm_timeout(),
    )
    .await?;

    assert!(result.success, "{}", result.error);
    assert_eq!(result.output, "Hello from Java!\n");
    Ok(())
}

#[tokio::test]
async fn test_java_fixed_name_mismatch() -> Result<()> {
    if skip_if_not_available(JDK) {
        return Ok(());
    }
    let result = execute(
        ExecutionRequest::new(JAVA_HELLO).with_filename("Main.java"),
        NamingMode::Fixed,
        jvm_timeout(),
    )
    .await?;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::CompileFailure));
    assert!(result.error.contains("Test"), "{}", result.error);
    Ok(())
}

#[tokio::test]
async fn test_java_compile_error() -> Result<()> {
    if skip_if_not_available(JDK) {
        return Ok(());
    }
    let result = execute(
        ExecutionRequest::new(JAVA_SYNTAX_ERROR),
        NamingMode::Derived,
        jvm_timeout(),
    )
    .await?;

    assert!(!result.success);
    assert_eq!(result.output, "");
    assert!(result.error.contains("error:"), "{}", result.error);
    assert_eq!(result.error_kind, Some(ErrorKind::CompileFailure));
    Ok(())
}

#[tokio::test]
async fn test_java_runtime_exception() -> Result<()> {
    if skip_if_not_available(JDK) {
        return Ok(());
    }
    let result = execute(
        ExecutionRequest::new(JAVA_THROWS),
        NamingMode::Derived,
        jvm_timeout(),
    )
    .await?;

    assert!(!result.success);
    assert_eq!(result.output, "before\n");
    assert!(result.error.contains("IllegalStateException: boom"));
    assert_eq!(result.error_kind, Some(ErrorKind::RuntimeFailure));
    Ok(())
}

#[tokio::test]
async fn test_java_infinite_loop_times_out() -> Result<()> {
    if skip_if_not_available(JDK) {
        return Ok(());
    }
    let result = execute(
        ExecutionRequest::new(JAVA_INFINITE_LOOP),
        NamingMode::Derived,
        Duration::from_secs(3),
    )
    .await?;

    assert!(!result.success);
    assert_eq!(result.output, "");
    assert_eq!(result.error, "Execution timeout");
    assert!(result.execution_time_millis >= 3_000);
    Ok(())
}

#[tokio::test]
async fn test_java_nested_classes_are_cleaned_up() -> Result<()> {
    if skip_if_not_available(JDK) {
        return Ok(());
    }
    let result = execute(
        ExecutionRequest::new(JAVA_NESTED_CLASSES),
        NamingMode::Derived,
        jvm_timeout(),
    )
    .await?;

    assert!(result.success, "{}", result.error);
    assert_eq!(result.output, "inner\n");
    Ok(())
}
