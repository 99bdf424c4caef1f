// src/system/runner.rs

use crate::{
    core::config::RunnerConfig,
    system::{
        descriptor::CommandDescriptor,
        diagnostics::{Diagnostics, LogDiagnostics},
        error::ExecutionError,
        tee::{CaptureBuffer, Tee},
    },
};
use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

/// Linux and macOS both report a closed PTY peer as `EIO` instead of a clean EOF.
const EIO: i32 = 5;

const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// How long output keeps being copied after the child exited. Background processes
/// the child left behind may hold the pipes open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

#[cfg(unix)]
const PTY_ROWS: u16 = 24;
#[cfg(unix)]
const PTY_COLS: u16 = 120;

/// Whether the child's output is also streamed to the console while being captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    /// Write to our stdout (and stderr in pipe mode) as the bytes arrive.
    Live,
    /// Capture only.
    Silent,
}

/// What a command that actually ran produced.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Everything the child wrote, stdout and stderr interleaved in write order.
    pub combined: String,
    /// Standard output alone, only filled by [`Runner::run_split`].
    pub stdout: Option<String>,
    /// Standard error alone, only filled by [`Runner::run_split`].
    pub stderr: Option<String>,
    /// Set when the child exited unsuccessfully.
    pub exit_error: Option<ExecutionError>,
}

impl ExecutionResult {
    /// `true` when the child exited successfully.
    pub fn success(&self) -> bool {
        self.exit_error.is_none()
    }
}

/// Runs [`CommandDescriptor`]s as child processes and captures what they print.
///
/// By default the child is attached to a pseudo-terminal so that tools keep their
/// colors and progress output; the PTY merges stdout and stderr. Pipe mode is used
/// when PTYs are disabled and always for split capture.
///
/// Each call owns its child, buffers and copy task: nothing is shared between
/// invocations, so a single `Runner` can be cloned and used concurrently.
#[derive(Debug, Clone)]
pub struct Runner {
    use_pty: bool,
    working_directory: Option<PathBuf>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(&RunnerConfig::default(), Arc::new(LogDiagnostics::default()))
    }
}

impl Runner {
    /// Builds a runner from its settings. PTYs are never used off Unix.
    pub fn new(config: &RunnerConfig, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            use_pty: cfg!(unix) && config.use_pty,
            working_directory: config.working_directory.clone(),
            diagnostics,
        }
    }

    /// `true` when [`run`](Self::run) attaches children to a pseudo-terminal.
    pub fn uses_pty(&self) -> bool {
        self.use_pty
    }

    /// The diagnostics sink commands are reported to.
    pub fn diagnostics(&self) -> &Arc<dyn Diagnostics> {
        &self.diagnostics
    }

    /// Runs the command and captures its combined output.
    ///
    /// Output is copied by a background task into the capture buffer and, with
    /// [`Echo::Live`], to the console. The task is joined before returning, so the
    /// result holds every byte the child wrote.
    ///
    /// # Errors
    /// `Err` means the command never ran properly: empty command, spawn or PTY
    /// failure, or an I/O error while copying. A non-zero exit is *not* an `Err`; it
    /// is reported in [`ExecutionResult::exit_error`] alongside the captured output.
    pub async fn run(
        &self,
        descriptor: &CommandDescriptor,
        echo: Echo,
    ) -> Result<ExecutionResult, ExecutionError> {
        ensure_runnable(descriptor)?;
        let started_at = Instant::now();
        self.diagnostics.command_started(descriptor, self.use_pty);

        let combined = CaptureBuffer::new();
        let status = if self.use_pty {
            let tee = Tee::new()
                .with(console(echo, Stream::Stdout))
                .with(combined.clone());
            self.pty_session(descriptor, tee).await
        } else {
            let stdout_tee = Tee::new()
                .with(console(echo, Stream::Stdout))
                .with(combined.clone());
            let stderr_tee = Tee::new()
                .with(console(echo, Stream::Stderr))
                .with(combined.clone());
            self.pipe_session(descriptor, stdout_tee, stderr_tee).await
        };

        let outcome = status.map(|status| ExecutionResult {
            combined: combined.contents(),
            stdout: None,
            stderr: None,
            exit_error: exit_error(descriptor, status),
        });
        self.report(descriptor, started_at, &outcome);
        outcome
    }

    /// Runs the command with plain pipes, keeping stdout and stderr apart.
    ///
    /// Each stream is written both to its own buffer and to a shared combined buffer.
    /// Nothing is echoed to the console. Used when callers need to look for known
    /// messages on a specific stream.
    ///
    /// # Errors
    /// Same contract as [`run`](Self::run).
    pub async fn run_split(
        &self,
        descriptor: &CommandDescriptor,
    ) -> Result<ExecutionResult, ExecutionError> {
        ensure_runnable(descriptor)?;
        let started_at = Instant::now();
        self.diagnostics.command_started(descriptor, false);

        let combined = CaptureBuffer::new();
        let stdout = CaptureBuffer::new();
        let stderr = CaptureBuffer::new();
        let stdout_tee = Tee::new().with(combined.clone()).with(stdout.clone());
        let stderr_tee = Tee::new().with(combined.clone()).with(stderr.clone());

        let outcome = self
            .pipe_session(descriptor, stdout_tee, stderr_tee)
            .await
            .map(|status| ExecutionResult {
                combined: combined.contents(),
                stdout: Some(stdout.contents()),
                stderr: Some(stderr.contents()),
                exit_error: exit_error(descriptor, status),
            });
        self.report(descriptor, started_at, &outcome);
        outcome
    }

    /// Joins the copy task once the child has exited. When descendants still hold the
    /// output channel open after [`DRAIN_GRACE`], the copy is abandoned and what was
    /// captured so far is kept.
    async fn finish_copy(
        &self,
        command_line: &str,
        mut copier: JoinHandle<io::Result<()>>,
    ) -> Result<(), ExecutionError> {
        match tokio::time::timeout(DRAIN_GRACE, &mut copier).await {
            Ok(joined) => join_copier(command_line, joined),
            Err(_) => {
                copier.abort();
                self.diagnostics.debug(&format!(
                    "output of '{}' still open {:?} after exit, stopped copying",
                    command_line, DRAIN_GRACE
                ));
                Ok(())
            }
        }
    }

    fn report(
        &self,
        descriptor: &CommandDescriptor,
        started_at: Instant,
        outcome: &Result<ExecutionResult, ExecutionError>,
    ) {
        let success = matches!(outcome, Ok(result) if result.success());
        self.diagnostics
            .command_finished(descriptor, started_at.elapsed(), success);
    }

    #[cfg(unix)]
    async fn pty_session(
        &self,
        descriptor: &CommandDescriptor,
        tee: Tee,
    ) -> Result<ExitStatus, ExecutionError> {
        let command_line = descriptor.to_string();

        let (pty, pts) = pty_process::open().map_err(|e| pty_failure(&command_line, e))?;
        pty.resize(pty_process::Size::new(PTY_ROWS, PTY_COLS))
            .map_err(|e| pty_failure(&command_line, e))?;

        let mut command =
            pty_process::Command::new(descriptor.executable()).args(descriptor.arguments());
        for (key, value) in descriptor.env_pairs() {
            command = command.env(key, value);
        }
        if let Some(dir) = &self.working_directory {
            command = command.current_dir(dunce::simplified(dir));
        }

        // `spawn` consumes our handle on the terminal side, so the PTY reports EOF
        // (or EIO) as soon as the child and its descendants close it.
        let mut child = command.spawn(pts).map_err(|e| ExecutionError::Spawn {
            command: command_line.clone(),
            source: io::Error::other(e.to_string()),
        })?;

        self.diagnostics
            .debug("starting copy of process pty output to stdout");
        let copier = tokio::spawn(pump(pty, tee));

        let status = child.wait().await.map_err(|source| ExecutionError::Io {
            command: command_line.clone(),
            source,
        })?;

        self.finish_copy(&command_line, copier).await?;
        self.diagnostics.debug("completed pty output copier");
        Ok(status)
    }

    #[cfg(not(unix))]
    async fn pty_session(
        &self,
        descriptor: &CommandDescriptor,
        _tee: Tee,
    ) -> Result<ExitStatus, ExecutionError> {
        Err(ExecutionError::Pty {
            command: descriptor.to_string(),
            message: "pseudo-terminals are not supported on this platform".to_string(),
        })
    }

    async fn pipe_session(
        &self,
        descriptor: &CommandDescriptor,
        stdout_tee: Tee,
        stderr_tee: Tee,
    ) -> Result<ExitStatus, ExecutionError> {
        let command_line = descriptor.to_string();

        let mut command = tokio::process::Command::new(descriptor.executable());
        command
            .args(descriptor.arguments())
            .envs(descriptor.env_pairs())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_directory {
            command.current_dir(dunce::simplified(dir));
        }

        let mut child = command.spawn().map_err(|source| ExecutionError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let copier = tokio::spawn(async move {
            let (out, err) = tokio::join!(drain(stdout, stdout_tee), drain(stderr, stderr_tee));
            out.and(err)
        });

        let status = child.wait().await.map_err(|source| ExecutionError::Io {
            command: command_line.clone(),
            source,
        })?;

        self.finish_copy(&command_line, copier).await?;
        Ok(status)
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn console(echo: Echo, stream: Stream) -> Box<dyn Write + Send> {
    match (echo, stream) {
        (Echo::Silent, _) => Box::new(io::sink()),
        (Echo::Live, Stream::Stdout) => Box::new(io::stdout()),
        (Echo::Live, Stream::Stderr) => Box::new(io::stderr()),
    }
}

fn ensure_runnable(descriptor: &CommandDescriptor) -> Result<(), ExecutionError> {
    if descriptor.is_empty() {
        return Err(ExecutionError::EmptyCommand {
            input: descriptor.to_string(),
        });
    }
    Ok(())
}

fn exit_error(descriptor: &CommandDescriptor, status: ExitStatus) -> Option<ExecutionError> {
    (!status.success()).then(|| ExecutionError::NonZeroExit {
        command: descriptor.to_string(),
        code: status.code(),
    })
}

#[cfg(unix)]
fn pty_failure(command_line: &str, err: impl std::fmt::Display) -> ExecutionError {
    ExecutionError::Pty {
        command: command_line.to_string(),
        message: err.to_string(),
    }
}

fn join_copier(
    command_line: &str,
    joined: Result<io::Result<()>, tokio::task::JoinError>,
) -> Result<(), ExecutionError> {
    joined
        .map_err(io::Error::other)
        .and_then(|copied| copied)
        .map_err(|source| ExecutionError::Io {
            command: command_line.to_string(),
            source,
        })
}

async fn drain<R>(reader: Option<R>, tee: Tee) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    match reader {
        Some(reader) => pump(reader, tee).await,
        None => Ok(()),
    }
}

/// Copies `reader` into `tee` until end of stream.
async fn pump<R>(mut reader: R, mut tee: Tee) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let read = match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.raw_os_error() == Some(EIO) => break,
            Err(e) => return Err(e),
        };
        if let Some(chunk) = buffer.get(..read) {
            tee.write_all(chunk)?;
            tee.flush()?;
        }
    }
    tee.flush()
}
