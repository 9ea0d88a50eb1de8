//! Process runner.
//!
//! Spawns one program without a shell, captures stdout and stderr until it
//! exits, and reports the exit code as data.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

use crate::error::RunnerError;
use crate::types::{CipherSuiteId, Entity};

/// Captured result of one finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRunResult {
    /// Exit code, or the negated signal number when killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RawRunResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// One program launch: `<program> <ciphersuite_id> [<payload_bytes>]`.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub entity: Entity,
    pub program: PathBuf,
    pub cipher_suite: CipherSuiteId,
    pub payload_bytes: u64,
}

impl Invocation {
    /// Positional arguments. The payload is omitted when zero.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.cipher_suite.to_string()];
        if self.payload_bytes != 0 {
            args.push(self.payload_bytes.to_string());
        }
        args
    }
}

/// Normalize an exit status to a signed code.
///
/// Signal deaths map to `-signal`, so SIGPROF (27) becomes `-27`.
pub fn normalize_exit_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

/// Run a program to completion and capture its output.
///
/// With a deadline, a process still running when it expires is killed and
/// [`RunnerError::Timeout`] is returned.
pub async fn run_program(
    invocation: &Invocation,
    deadline: Option<Duration>,
) -> Result<RawRunResult, RunnerError> {
    let program = &invocation.program;
    let args = invocation.args();

    let child = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| RunnerError::SpawnFailed {
            program: program.clone(),
            source: e,
        })?;

    tracing::debug!(
        entity = %invocation.entity,
        program = %program.display(),
        pid = ?child.id(),
        args = ?args,
        "Spawned process"
    );

    let output = match deadline {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(result) => result,
            Err(_) => {
                // Dropping the wait future drops the child, which kills it.
                return Err(RunnerError::Timeout {
                    program: program.clone(),
                    limit_ms: limit.as_millis(),
                });
            }
        },
        None => child.wait_with_output().await,
    }
    .map_err(|e| RunnerError::CaptureFailed {
        program: program.clone(),
        source: e,
    })?;

    let result = RawRunResult {
        exit_code: normalize_exit_status(output.status),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    tracing::debug!(
        entity = %invocation.entity,
        exit_code = result.exit_code,
        stdout = %result.stdout,
        stderr = %result.stderr,
        "Process exited"
    );

    Ok(result)
}
