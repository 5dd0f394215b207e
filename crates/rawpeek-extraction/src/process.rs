//! Direct argument-vector invocation of external tools.
//!
//! Nothing here goes through a shell, so file paths are never re-parsed as
//! command text. Every child is bounded by a timeout and is killed if the
//! future driving it is dropped (timeout or cancelled request).

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::debug;

use rawpeek_core::error::StrategyError;

/// A program plus its arguments, with a short tool name for reporting.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    tool: String,
    program: String,
    args: Vec<OsString>,
}

impl ToolInvocation {
    pub fn new(tool: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

/// Run to completion and return whatever the child produced, whatever its exit status.
pub async fn run_unchecked(
    invocation: &ToolInvocation,
    timeout: Duration,
) -> Result<Output, StrategyError> {
    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StrategyError::ToolMissing {
                tool: invocation.tool.clone(),
            }
        } else {
            StrategyError::Spawn {
                tool: invocation.tool.clone(),
                message: e.to_string(),
            }
        }
    })?;

    let started = Instant::now();
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(StrategyError::Timeout {
                tool: invocation.tool.clone(),
                secs: timeout.as_secs(),
            })
        }
    };

    debug!(
        tool = %invocation.tool,
        args = ?invocation.args,
        status = ?output.status.code(),
        stdout_bytes = output.stdout.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "External tool finished"
    );

    Ok(output)
}

/// Run and require a zero exit status.
pub async fn run_tool(
    invocation: &ToolInvocation,
    timeout: Duration,
) -> Result<Output, StrategyError> {
    let output = run_unchecked(invocation, timeout).await?;
    if !output.status.success() {
        return Err(StrategyError::non_zero_exit(
            &invocation.tool,
            output.status.code(),
            &output.stderr,
        ));
    }
    Ok(output)
}

/// Run, require success, and write the child's stdout to `dest`.
///
/// `dest` is written even when stdout is empty so the validator sees the same
/// thing a shell redirect would have left behind.
pub async fn run_to_file(
    invocation: &ToolInvocation,
    timeout: Duration,
    dest: &Path,
) -> Result<u64, StrategyError> {
    let output = run_tool(invocation, timeout).await?;
    tokio::fs::write(dest, &output.stdout).await?;
    Ok(output.stdout.len() as u64)
}
