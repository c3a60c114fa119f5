use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::RunError;

/// Normalized outcome of one vmq-admin invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    /// True iff the process exited with status code zero
    pub ok: bool,
    /// Executable path and arguments joined by single spaces
    pub command: String,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the administrative executable. Cheap to clone and shared read-only
/// across requests.
#[derive(Debug, Clone)]
pub struct AdminCli {
    bin: PathBuf,
    timeout: Option<Duration>,
}

impl AdminCli {
    pub fn new(bin: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Display form of the invocation, e.g. `/vernemq/bin/vmq-admin listener show`
    pub fn command_line(&self, args: &[&str]) -> String {
        let mut parts = Vec::with_capacity(args.len() + 1);
        parts.push(self.bin.to_string_lossy().into_owned());
        parts.extend(args.iter().map(|arg| arg.to_string()));
        parts.join(" ")
    }

    /// Run the executable with `args` and wait for it to exit.
    ///
    /// A non-zero exit is not an error: it comes back as `ok: false`. Errors
    /// are reserved for the child never starting, outliving the configured
    /// timeout, or its output being lost.
    ///
    /// The child runs on its own task so that dropping the returned future
    /// (a client hanging up mid-request) does not kill it.
    pub async fn run(&self, args: &[&str]) -> Result<CommandResult, RunError> {
        let command = self.command_line(args);

        let mut cmd = Command::new(&self.bin);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(%command, timeout = ?self.timeout, "running vmq-admin");
        let started = Instant::now();

        let task = tokio::spawn(collect_output(cmd, self.timeout));
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(source) => return Err(RunError::Aborted { command, source }),
        };

        let output = match outcome {
            Ok(output) => output,
            Err(failure) => {
                let err = failure.into_run_error(command);
                warn!(error = %err, "vmq-admin invocation failed");
                return Err(err);
            }
        };

        debug!(
            %command,
            status = %output.status,
            elapsed = ?started.elapsed(),
            "vmq-admin exited"
        );
        Ok(output_to_result(command, output))
    }
}

/// Why a child produced no `Output`. Kept apart from `RunError` because the
/// spawned task does not own the display command.
enum ChildFailure {
    Spawn(std::io::Error),
    Wait(std::io::Error),
    TimedOut(Duration),
}

impl ChildFailure {
    fn into_run_error(self, command: String) -> RunError {
        match self {
            ChildFailure::Spawn(source) => RunError::Spawn { command, source },
            ChildFailure::Wait(source) => RunError::Wait { command, source },
            ChildFailure::TimedOut(timeout) => RunError::TimedOut { command, timeout },
        }
    }
}

async fn collect_output(mut cmd: Command, timeout: Option<Duration>) -> Result<Output, ChildFailure> {
    let child = cmd.spawn().map_err(ChildFailure::Spawn)?;
    let wait = child.wait_with_output();

    let waited = match timeout {
        // Dropping `wait` on expiry drops the child, and kill_on_drop kills it
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(waited) => waited,
            Err(_) => return Err(ChildFailure::TimedOut(limit)),
        },
        None => wait.await,
    };
    waited.map_err(ChildFailure::Wait)
}

fn output_to_result(command: String, output: Output) -> CommandResult {
    CommandResult {
        ok: output.status.success(),
        command,
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Write an executable `vmq-admin` stand-in into `dir` running `body` under sh.
#[cfg(test)]
pub(crate) fn write_fake_admin(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("vmq-admin");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}
