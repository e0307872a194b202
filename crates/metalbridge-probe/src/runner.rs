use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metalbridge_core::ProbeCommand;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// Upper bound on reaping a child after it has been sent SIGKILL
const REAP_GRACE: Duration = Duration::from_millis(500);

/// Captured result of one external command.
///
/// Launch failures, non-zero exits and timeouts all land here as `ok=false`
/// with whatever output was read before the failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub ok: bool,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            ok: true,
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            ok: false,
            stderr: stderr.into(),
            ..Default::default()
        }
    }

    /// stdout followed by stderr, newline-separated when both are present
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

/// Executes probe commands. Implementations must never fail: every problem
/// is folded into `CommandOutput::ok`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ProbeCommand) -> CommandOutput;
}

/// Runs commands as real child processes with a hard wall-clock timeout
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &ProbeCommand) -> CommandOutput {
        let started = Instant::now();

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %command.program, error = %e, "Failed to launch probe command");
                return CommandOutput::default();
            }
        };

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        let finished = tokio::time::timeout(command.timeout(), async {
            let (_, _, status) = tokio::join!(
                drain(stdout_pipe, &mut stdout),
                drain(stderr_pipe, &mut stderr),
                child.wait(),
            );
            status
        })
        .await;

        let (ok, timed_out) = match finished {
            Ok(Ok(status)) => (status.success(), false),
            Ok(Err(e)) => {
                warn!(program = %command.program, error = %e, "Failed to wait on probe command");
                (false, false)
            }
            Err(_) => {
                warn!(
                    program = %command.program,
                    timeout_ms = command.timeout_ms,
                    "Probe command timed out, killing"
                );
                if let Err(e) = child.start_kill() {
                    debug!(program = %command.program, error = %e, "Kill failed");
                }
                let _ = tokio::time::timeout(REAP_GRACE, child.wait()).await;
                (false, true)
            }
        };

        debug!(
            command = %command,
            ok,
            timed_out,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Probe command finished"
        );

        CommandOutput {
            ok,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            timed_out,
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>, buf: &mut Vec<u8>) {
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(buf).await;
    }
}
