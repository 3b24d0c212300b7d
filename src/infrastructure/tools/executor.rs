//! # Process Runner
//!
//! Spawns and supervises external executables for the shell and git operations.
//! The child's stdin is always the null device, its output is captured in memory, and a
//! deadline armed at spawn time kills and reaps it if it runs too long. On unix the child leads
//! its own process group, so anything it started in the background dies with it.

use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::domain::error::ToolError;
use crate::domain::types::{RunRequest, RunResult};

/// Executes processes with a closed stdin and a hard deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Runs `request` to completion or until its timeout elapses.
    ///
    /// On timeout the child is killed and waited for before
    /// [`ToolError::ProcessTimeout`] is returned, so no zombie is left behind.
    pub async fn run(&self, request: &RunRequest) -> Result<RunResult, ToolError> {
        let program = request.program.display().to_string();

        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &request.working_dir {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| ToolError::Spawn {
            program: program.clone(),
            source,
        })?;
        tracing::debug!(
            "Spawned {} (pid {:?}) with {} args",
            program,
            child.id(),
            request.args.len()
        );

        let mut stdout = child.stdout.take().ok_or_else(|| ToolError::Spawn {
            program: program.clone(),
            source: std::io::Error::other("stdout was not captured"),
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| ToolError::Spawn {
            program: program.clone(),
            source: std::io::Error::other("stderr was not captured"),
        })?;

        // Drain both pipes while waiting, otherwise a chatty child blocks on a full pipe.
        let capture = async {
            let mut out = Vec::new();
            let mut err = Vec::new();
            let (status, read_out, read_err) = tokio::join!(
                child.wait(),
                stdout.read_to_end(&mut out),
                stderr.read_to_end(&mut err),
            );
            read_out?;
            read_err?;
            Ok::<_, std::io::Error>((status?, out, err))
        };
        let supervised = tokio::time::timeout(request.timeout, capture).await;

        match supervised {
            Ok(Ok((status, out, err))) => {
                tracing::debug!("{} exited with {:?}", program, status.code());
                Ok(RunResult {
                    exit_code: status.code(),
                    stdout: String::from_utf8_lossy(&out).into_owned(),
                    stderr: String::from_utf8_lossy(&err).into_owned(),
                })
            }
            Ok(Err(source)) => {
                reap(&mut child, &program).await;
                Err(capture_error(source))
            }
            Err(_elapsed) => {
                tracing::warn!(
                    "{} exceeded its {}s deadline, killing",
                    program,
                    request.timeout.as_secs()
                );
                reap(&mut child, &program).await;
                Err(ToolError::ProcessTimeout {
                    what: request.label,
                    secs: request.timeout.as_secs(),
                })
            }
        }
    }
}

/// Reading output or waiting failed after the child was already running.
fn capture_error(source: std::io::Error) -> ToolError {
    ToolError::io("running command")(source)
}

/// Kills the child's process group, then the child itself, and waits for it to exit.
async fn reap(child: &mut tokio::process::Child, program: &str) {
    kill_group(child, program);
    // `kill` sends the signal and then waits, which reaps the process.
    if let Err(e) = child.kill().await {
        tracing::error!("Failed to kill {}: {}", program, e);
    }
}

#[cfg(unix)]
fn kill_group(child: &tokio::process::Child, program: &str) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    // Spawned with `process_group(0)`, so the group id is the child's pid.
    let Some(pid) = child.id().and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        tracing::warn!("Failed to kill process group of {}: {}", program, e);
    }
}

// TODO: assign the child to a job object on Windows so grandchildren are killed too.
#[cfg(not(unix))]
fn kill_group(_child: &tokio::process::Child, _program: &str) {}
