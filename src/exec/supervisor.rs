//! Process Supervision
//!
//! Spawns package-manager commands behind the configured privilege
//! helper, buffers their stdout/stderr independently of the consumer,
//! and publishes lifecycle notifications. The adapter drains the
//! buffers on each notification, mirroring how the front-end's process
//! layer hands out "everything written since you last asked".

use std::sync::{Arc, Mutex};

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::su::SuHelper;
use crate::error::{Error, Result};
use crate::events::{ExitStatusKind, ProcessEvent};

/// Seam between the adapter and the underlying process machinery
pub trait ProcessSupervisor: Send {
    /// Launch `command` behind the configured privilege helper.
    fn execute_command(&mut self, command: &str) -> Result<()>;

    /// Launch the given command list inside a terminal emulator window.
    fn run_in_terminal(&mut self, commands: &[String]) -> Result<()>;

    /// Drain everything the process wrote to stdout since the last call.
    fn read_all_standard_output(&mut self) -> String;

    /// Drain everything the process wrote to stderr since the last call.
    fn read_all_standard_error(&mut self) -> String;
}

/// Tokio-backed supervisor running commands through `sh`.
///
/// Reader tasks follow the child independently of the adapter: output
/// accumulates in the shared buffers while notifications queue on the
/// event channel, so a slow consumer never stalls the child. Requires a
/// running tokio runtime.
pub struct ShellSupervisor {
    su: SuHelper,
    terminal: String,
    events_tx: mpsc::UnboundedSender<ProcessEvent>,
    stdout_buf: Arc<Mutex<String>>,
    stderr_buf: Arc<Mutex<String>>,
}

impl ShellSupervisor {
    /// Create a supervisor; the receiver side delivers `ProcessEvent`s
    /// to the adapter (see `PackageExecutor::drive`).
    pub fn new(
        su: SuHelper,
        terminal: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<ProcessEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (
            Self {
                su,
                terminal: terminal.into(),
                events_tx,
                stdout_buf: Arc::new(Mutex::new(String::new())),
                stderr_buf: Arc::new(Mutex::new(String::new())),
            },
            events_rx,
        )
    }

    /// The helper this supervisor wraps commands with
    pub fn su_helper(&self) -> SuHelper {
        self.su
    }

    fn watch_child(&self, mut child: Child, spawn_id: Uuid) {
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let events_tx = self.events_tx.clone();
        let stdout_buf = Arc::clone(&self.stdout_buf);
        let stderr_buf = Arc::clone(&self.stderr_buf);

        tokio::spawn(async move {
            let out_task = tokio::spawn(read_stream(stdout, stdout_buf, events_tx.clone(), false));
            let err_task = tokio::spawn(read_stream(stderr, stderr_buf, events_tx.clone(), true));

            // Drain both streams fully before reaping the child so the
            // final chunk is never lost
            let _ = out_task.await;
            let _ = err_task.await;

            let (exit_code, status) = match child.wait().await {
                Ok(status) => {
                    let kind = if status.code().is_some() {
                        ExitStatusKind::Normal
                    } else {
                        ExitStatusKind::Crashed
                    };
                    (status.code().unwrap_or(-1), kind)
                }
                Err(e) => {
                    warn!("wait failed for spawn {}: {}", spawn_id, e);
                    (-1, ExitStatusKind::Crashed)
                }
            };

            debug!("spawn {} finished: {} ({:?})", spawn_id, exit_code, status);
            let _ = events_tx.send(ProcessEvent::Finished { exit_code, status });
        });
    }
}

impl ProcessSupervisor for ShellSupervisor {
    fn execute_command(&mut self, command: &str) -> Result<()> {
        if command.trim().is_empty() {
            return Err(Error::EmptyCommand);
        }

        let argv = self.su.wrap(command);
        let spawn_id = Uuid::new_v4();
        debug!("spawn {}: {:?}", spawn_id, argv);

        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..])
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        let child = cmd.spawn().map_err(|e| Error::ProcessSpawnFailed {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

        let _ = self.events_tx.send(ProcessEvent::Started);
        self.watch_child(child, spawn_id);
        Ok(())
    }

    fn run_in_terminal(&mut self, commands: &[String]) -> Result<()> {
        if commands.is_empty() {
            return Err(Error::EmptyCommand);
        }

        let script = commands.join(" ");
        let spawn_id = Uuid::new_v4();
        debug!("terminal spawn {} via {}: {}", spawn_id, self.terminal, script);

        let mut cmd = Command::new(&self.terminal);
        cmd.args(["-e", "sh", "-c", script.as_str()]);

        let mut child = cmd.spawn().map_err(|e| Error::TerminalLaunchFailed {
            terminal: self.terminal.clone(),
            reason: e.to_string(),
        })?;

        let _ = self.events_tx.send(ProcessEvent::Started);

        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let (exit_code, status) = match child.wait().await {
                Ok(status) => {
                    let kind = if status.code().is_some() {
                        ExitStatusKind::Normal
                    } else {
                        ExitStatusKind::Crashed
                    };
                    (status.code().unwrap_or(-1), kind)
                }
                Err(e) => {
                    warn!("wait failed for terminal spawn {}: {}", spawn_id, e);
                    (-1, ExitStatusKind::Crashed)
                }
            };
            let _ = events_tx.send(ProcessEvent::Finished { exit_code, status });
        });
        Ok(())
    }

    fn read_all_standard_output(&mut self) -> String {
        let mut guard = self
            .stdout_buf
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *guard)
    }

    fn read_all_standard_error(&mut self) -> String {
        let mut guard = self
            .stderr_buf
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *guard)
    }
}

/// Read a child stream to EOF, appending to the shared buffer and
/// signalling readiness after every chunk.
async fn read_stream<R: tokio::io::AsyncRead + Unpin>(
    stream: Option<R>,
    buffer: Arc<Mutex<String>>,
    events_tx: mpsc::UnboundedSender<ProcessEvent>,
    is_stderr: bool,
) {
    let Some(mut reader) = stream else {
        return;
    };

    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break, // EOF
            Ok(n) => {
                let chunk = String::from_utf8_lossy(&buf[..n]);
                {
                    let mut guard = buffer
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    guard.push_str(&chunk);
                }
                let event = if is_stderr {
                    ProcessEvent::ErrorReady
                } else {
                    ProcessEvent::OutputReady
                };
                // Keep draining even when the receiver is gone so the
                // child never blocks on a full pipe
                let _ = events_tx.send(event);
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("stream read error: {}", e);
                break;
            }
        }
    }
}
