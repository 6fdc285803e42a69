//! cf command execution
//!
//! Every remote operation of a push is a single invocation of the cf CLI.
//! The orchestrator only sees the [`CommandExecutor`] trait, so tests can swap
//! in a recording executor.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::ExecError;
use crate::tools::{self, tools::CF};

/// Runs one control-plane command and reports success or failure
pub trait CommandExecutor {
    /// Run cf with the given arguments and wait for it to exit
    ///
    /// # Errors
    ///
    /// Returns [`ExecError`] when cf cannot be found or started, or exits non-zero.
    async fn execute(&self, args: &[String]) -> Result<(), ExecError>;
}

/// Executor backed by the cf binary
///
/// The binary is located once, at construction. Stderr always reaches the
/// terminal; stdout only in trace mode.
pub struct CfExecutor {
    cf_path: Option<PathBuf>,
    trace: bool,
}

impl CfExecutor {
    pub fn new(trace: bool) -> Self {
        Self::with_path(tools::resolve_tool(CF), trace)
    }

    /// Executor for an already-resolved binary
    pub fn with_path(cf_path: Option<PathBuf>, trace: bool) -> Self {
        Self { cf_path, trace }
    }
}

impl CommandExecutor for CfExecutor {
    async fn execute(&self, args: &[String]) -> Result<(), ExecError> {
        let cf_path = self.cf_path.as_ref().ok_or_else(|| ExecError::ToolNotFound {
            tool: CF.to_string(),
            env_var: tools::tool_env_var(CF),
        })?;

        debug!("$ cf {}", args.join(" "));

        let stdout = if self.trace {
            Stdio::inherit()
        } else {
            Stdio::null()
        };

        let status = Command::new(cf_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| ExecError::Spawn {
                tool: cf_path.display().to_string(),
                source,
            })?;

        if !status.success() {
            return Err(ExecError::ExitStatus {
                code: status.code(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let executor = CfExecutor::with_path(None, false);
        let err = executor.execute(&args(&["apps"])).await.unwrap_err();
        assert!(matches!(err, ExecError::ToolNotFound { .. }));
        assert!(err.to_string().contains("CF_BIN"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_is_reported() {
        let executor = CfExecutor::with_path(which::which("false").ok(), false);
        if executor.cf_path.is_none() {
            return;
        }
        let err = executor.execute(&args(&["v3-push", "myApp"])).await.unwrap_err();
        assert!(matches!(err, ExecError::ExitStatus { code: Some(1) }));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_invocation() {
        let executor = CfExecutor::with_path(which::which("true").ok(), true);
        if executor.cf_path.is_none() {
            return;
        }
        tokio_test::block_on(executor.execute(&args(&["apps"]))).unwrap();
    }

    #[test]
    fn test_spawn_failure() {
        let executor = CfExecutor::with_path(Some(PathBuf::from("/nonexistent/cf")), false);
        let err = tokio_test::block_on(executor.execute(&args(&["apps"]))).unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }
}
