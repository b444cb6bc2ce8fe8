//! Supervision of the external recording process.
//!
//! The child is owned by a watcher task. The session keeps two oneshot
//! channels: one to ask the watcher to stop, one on which the watcher
//! reports the exit.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use uuid::Uuid;

use webcam::command::spawn_error;
use webcam::{CommandLine, RecordingOptions, WebcamResult};

/// How long a recorder gets to finalize its file after SIGINT.
pub const STOP_GRACE: Duration = Duration::from_secs(10);

/// Snapshot of a recording, for tool results and status queries.
#[derive(Debug, Clone, Serialize)]
pub struct RecordingInfo {
    pub id: String,
    pub filename: String,
    pub path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub options: RecordingOptions,
}

/// Reported by the watcher once the child is gone.
#[derive(Debug)]
pub struct RecordingExit {
    pub id: Uuid,
    pub status: Option<ExitStatus>,
    pub interrupted: bool,
    pub stderr: String,
}

pub(crate) struct ActiveRecording {
    id: Uuid,
    pid: Option<u32>,
    output_path: PathBuf,
    options: RecordingOptions,
    started_at: DateTime<Utc>,
    stop_tx: Option<oneshot::Sender<()>>,
    exit_rx: oneshot::Receiver<RecordingExit>,
}

impl ActiveRecording {
    /// Spawn the recorder and hand it to a watcher task. Returns as soon as
    /// the process is running.
    pub(crate) fn spawn(line: &CommandLine, output_path: PathBuf, options: RecordingOptions) -> WebcamResult<Self> {
        let mut cmd = line.to_command();
        cmd.stdout(Stdio::null());
        let child = cmd.spawn().map_err(|e| spawn_error(&line.program, e))?;

        let id = Uuid::new_v4();
        let pid = child.id();
        let (stop_tx, stop_rx) = oneshot::channel();
        let (exit_tx, exit_rx) = oneshot::channel();

        tracing::info!(%id, pid, path = %output_path.display(), "Recording started");
        tracing::debug!(command = %line, "Recorder command");
        tokio::spawn(supervise(child, id, stop_rx, exit_tx));

        Ok(Self {
            id,
            pid,
            output_path,
            options,
            started_at: Utc::now(),
            stop_tx: Some(stop_tx),
            exit_rx,
        })
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn info(&self) -> RecordingInfo {
        let elapsed = Utc::now().signed_duration_since(self.started_at);
        RecordingInfo {
            id: self.id.to_string(),
            filename: self
                .output_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: self.output_path.clone(),
            started_at: self.started_at,
            elapsed_secs: elapsed.num_milliseconds().max(0) as f64 / 1000.0,
            options: self.options.clone(),
        }
    }

    /// Non-blocking check for a reported exit.
    pub(crate) fn has_exited(&mut self) -> bool {
        match self.exit_rx.try_recv() {
            Ok(exit) => {
                debug_assert_eq!(exit.id, self.id);
                tracing::info!(
                    id = %exit.id,
                    status = ?exit.status,
                    interrupted = exit.interrupted,
                    "Recording finished"
                );
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Closed) => {
                tracing::warn!(id = %self.id, "Recording watcher ended without a report");
                true
            }
        }
    }

    /// Ask the watcher to interrupt the recorder. Does not wait for it.
    pub(crate) fn request_stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            if tx.send(()).is_err() {
                tracing::debug!(id = %self.id, "Recorder already exited");
            }
        }
    }

    /// Synchronous SIGINT for teardown paths where no runtime may be left to
    /// run the watcher.
    pub(crate) fn interrupt_blocking(&self) {
        #[cfg(unix)]
        {
            if let Some(pid) = self.pid {
                let _ = std::process::Command::new("kill")
                    .args(["-INT", &pid.to_string()])
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status();
            }
        }
    }
}

async fn supervise(
    mut child: Child,
    id: Uuid,
    stop_rx: oneshot::Receiver<()>,
    exit_tx: oneshot::Sender<RecordingExit>,
) {
    let stderr_task = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        })
    });

    // A dropped sender counts as a stop request.
    let waited = tokio::select! {
        status = child.wait() => Some(status),
        _ = stop_rx => None,
    };
    let interrupted = waited.is_none();

    let status = match waited {
        Some(status) => status,
        None => {
            interrupt(&mut child).await;
            match tokio::time::timeout(STOP_GRACE, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    tracing::warn!(%id, "Recorder ignored interrupt, killing it");
                    if let Err(e) = child.kill().await {
                        tracing::warn!(%id, "Failed to kill recorder: {e}");
                    }
                    child.wait().await
                }
            }
        }
    };

    let stderr = match stderr_task {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    };

    match &status {
        Ok(s) if s.success() || interrupted => {}
        Ok(s) => tracing::warn!(%id, "Recorder exited with {s}: {}", stderr.trim()),
        Err(e) => tracing::warn!(%id, "Failed to wait for recorder: {e}"),
    }

    let _ = exit_tx.send(RecordingExit {
        id,
        status: status.ok(),
        interrupted,
        stderr,
    });
}

/// SIGINT lets ffmpeg finalize the container; elsewhere fall back to a kill.
async fn interrupt(child: &mut Child) {
    #[cfg(unix)]
    {
        use webcam::command::run_command;

        if let Some(pid) = child.id() {
            match run_command(&CommandLine::new("kill").args(["-INT".to_string(), pid.to_string()])).await {
                Ok(_) => {
                    tracing::info!(pid, "Sent SIGINT to recorder");
                    return;
                }
                Err(e) => tracing::warn!(pid, "Failed to send SIGINT: {e}"),
            }
        }
    }

    if let Err(e) = child.start_kill() {
        tracing::warn!("Failed to stop recorder: {e}");
    }
}
