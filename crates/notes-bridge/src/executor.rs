//! Runs generated scripts in a bridge subprocess.
//!
//! One process per call. Output and diagnostics are read from separate
//! pipes and never merged. The process is killed when the deadline passes
//! or the call is cancelled.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::config::BridgeConfig;
use crate::context::CallContext;
use crate::error::ExecutionError;

/// What a successful script wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
}

/// A failed run together with whatever the bridge wrote to its diagnostic
/// stream. `diagnostics` is empty when the process never produced any
/// (spawn failure, deadline, cancellation).
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ScriptFailure {
    pub diagnostics: String,
    #[source]
    pub error: ExecutionError,
}

impl ScriptFailure {
    pub fn new(diagnostics: impl Into<String>, error: ExecutionError) -> Self {
        Self {
            diagnostics: diagnostics.into(),
            error,
        }
    }
}

impl From<ExecutionError> for ScriptFailure {
    fn from(error: ExecutionError) -> Self {
        Self::new(String::new(), error)
    }
}

#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    async fn execute(&self, ctx: &CallContext, script: &str) -> Result<ScriptOutput, ScriptFailure>;
}

/// Executes scripts with `osascript -e <script>`.
///
/// The program and flag are configurable so tests can substitute `sh -c`.
#[derive(Debug, Clone)]
pub struct OsascriptExecutor {
    program: String,
    script_flag: String,
    timeout: Duration,
}

impl OsascriptExecutor {
    pub fn new(program: impl Into<String>, script_flag: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            script_flag: script_flag.into(),
            timeout,
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(&config.program, &config.script_flag, config.script_timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for OsascriptExecutor {
    fn default() -> Self {
        Self::from_config(&BridgeConfig::default())
    }
}

#[async_trait]
impl ScriptExecutor for OsascriptExecutor {
    async fn execute(&self, ctx: &CallContext, script: &str) -> Result<ScriptOutput, ScriptFailure> {
        if ctx.is_cancelled() {
            return Err(ExecutionError::Cancelled.into());
        }
        let budget = ctx.budget(self.timeout);
        if budget.is_zero() {
            return Err(ExecutionError::DeadlineExceeded.into());
        }

        let start = Instant::now();
        let child = tokio::process::Command::new(&self.program)
            .arg(&self.script_flag)
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Dropping the pending wait kills the child.
        let output = tokio::select! {
            result = tokio::time::timeout(budget, child.wait_with_output()) => match result {
                Ok(Ok(output)) => output,
                Ok(Err(err)) => return Err(ExecutionError::Wait(err).into()),
                Err(_) => {
                    tracing::debug!("script deadline of {:?} exceeded", budget);
                    return Err(ExecutionError::DeadlineExceeded.into());
                }
            },
            _ = ctx.cancel_token().cancelled() => {
                tracing::debug!("script cancelled after {:?}", start.elapsed());
                return Err(ExecutionError::Cancelled.into());
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        tracing::debug!(
            "{} finished in {}ms with {}",
            self.program,
            start.elapsed().as_millis(),
            output.status
        );

        if output.status.success() {
            Ok(ScriptOutput { stdout, stderr })
        } else {
            Err(ScriptFailure::new(
                stderr.trim(),
                ExecutionError::Exit {
                    code: output.status.code(),
                },
            ))
        }
    }
}
