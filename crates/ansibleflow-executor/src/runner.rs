//! Process runner for ansible-playbook
//!
//! Spawns the resolved invocation, streams stdout and stderr line by line into
//! the log sink while the process runs, and terminates it on cancellation or
//! timeout. The process runs in its own process group so that forked workers
//! are signalled along with it.

use crate::log::LogSink;
use ansibleflow_core::{ResolvedInvocation, Result, StageError};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Lines buffered between the pipe readers and the sink
const LOG_CHANNEL_CAPACITY: usize = 256;

/// Time given to trailing output after the process is gone
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Time between SIGTERM and SIGKILL
const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Exit of a process that ran to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a resolved invocation to completion
///
/// Implementations return `Ok` only when the process exited on its own.
/// Cancellation and timeout are reported as [`StageError::Cancelled`] and
/// [`StageError::Timeout`] after the process has been terminated.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        invocation: &ResolvedInvocation,
        timeout: Duration,
        cancel: &CancellationToken,
        sink: &dyn LogSink,
    ) -> Result<ProcessExit>;
}

/// [`ProcessRunner`] backed by `tokio::process`
#[derive(Debug, Clone)]
pub struct TokioProcessRunner {
    grace_period: Duration,
}

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    /// Time a terminated process gets to exit before it is killed
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }
}

impl Default for TokioProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

enum ExitReason {
    Completed(std::io::Result<std::process::ExitStatus>),
    Cancelled,
    TimedOut,
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        invocation: &ResolvedInvocation,
        timeout: Duration,
        cancel: &CancellationToken,
        sink: &dyn LogSink,
    ) -> Result<ProcessExit> {
        if cancel.is_cancelled() {
            return Err(StageError::Cancelled);
        }

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        tracing::debug!(
            program = %invocation.program,
            working_dir = %invocation.working_dir.display(),
            "spawning process"
        );

        let mut child = cmd.spawn().map_err(|source| StageError::Launch {
            program: invocation.program.clone(),
            source,
        })?;

        let (tx, mut rx) = mpsc::channel::<String>(LOG_CHANNEL_CAPACITY);
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward_lines(stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward_lines(stderr, tx.clone())));
        }
        drop(tx);

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        let reason = loop {
            tokio::select! {
                Some(line) = rx.recv() => sink.info(&line),
                status = child.wait() => break ExitReason::Completed(status),
                _ = cancel.cancelled() => break ExitReason::Cancelled,
                _ = &mut deadline => break ExitReason::TimedOut,
            }
        };

        let result = match reason {
            ExitReason::Completed(Ok(status)) => Ok(ProcessExit {
                code: status.code(),
            }),
            ExitReason::Completed(Err(e)) => Err(StageError::Io(e)),
            ExitReason::Cancelled => {
                tracing::info!(pid = ?child.id(), "cancelled, terminating process");
                terminate(&mut child, self.grace_period, &mut rx, sink).await;
                Err(StageError::Cancelled)
            }
            ExitReason::TimedOut => {
                tracing::warn!(
                    pid = ?child.id(),
                    timeout_secs = timeout.as_secs(),
                    "timed out, terminating process"
                );
                terminate(&mut child, self.grace_period, &mut rx, sink).await;
                Err(StageError::Timeout(timeout.as_secs()))
            }
        };

        // Forward output still queued or in flight
        let drain = async {
            while let Some(line) = rx.recv().await {
                sink.info(&line);
            }
        };
        if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
            tracing::warn!("output pipes still open after exit, dropping remaining output");
        }
        for reader in readers {
            reader.abort();
        }

        result
    }
}

/// Read `stream` line by line into `tx` until EOF
async fn forward_lines<R>(stream: R, tx: mpsc::Sender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("error reading process output: {}", e);
                break;
            }
        }
    }
}

/// Stop the child and its process group: SIGTERM, wait for `grace`, then SIGKILL
///
/// Output keeps flowing into the sink while the process shuts down.
async fn terminate(
    child: &mut Child,
    grace: Duration,
    rx: &mut mpsc::Receiver<String>,
    sink: &dyn LogSink,
) {
    let Some(pid) = child.id() else {
        // Already reaped
        return;
    };

    let mut exited = false;
    if signal_group(pid, GroupSignal::Term) {
        let deadline = tokio::time::sleep(grace);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                Some(line) = rx.recv() => sink.info(&line),
                status = child.wait() => {
                    tracing::debug!(?status, "process exited after SIGTERM");
                    exited = true;
                    break;
                }
                _ = &mut deadline => break,
            }
        }
    }

    // Workers left in the group would keep the output pipes open
    signal_group(pid, GroupSignal::Kill);
    if !exited && let Err(e) = child.kill().await {
        tracing::warn!("failed to kill process: {}", e);
    }
}

#[derive(Debug, Clone, Copy)]
enum GroupSignal {
    Term,
    Kill,
}

/// Signal every process in the group led by `pid`
#[cfg(unix)]
fn signal_group(pid: u32, signal: GroupSignal) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let sig = match signal {
        GroupSignal::Term => Signal::SIGTERM,
        GroupSignal::Kill => Signal::SIGKILL,
    };

    // A negative pid addresses the process group
    match signal::kill(Pid::from_raw(-(pid as i32)), sig) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        Err(e) => {
            tracing::warn!(pid, signal = ?sig, error = ?e, "signal to process group failed");
            false
        }
    }
}

#[cfg(not(unix))]
fn signal_group(_pid: u32, _signal: GroupSignal) -> bool {
    false
}
