// Process runner implementation
// reason: tokio for concurrent stdin feeding and stdout/stderr draining
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, info, warn};

use krm_exec_core::port::{
    ExecutionError, ExecutionResult, OutputSink, ProcessCommand, ProcessRunner, TimeProvider,
};

/// Runs external tools with tokio
///
/// stdin feeding, the two output drains and the exit wait are joined on the
/// same task, so a child filling one pipe never blocks on the other. There
/// is no timeout: a hung child hangs the caller.
pub struct TokioProcessRunner {
    time_provider: Arc<dyn TimeProvider>,
}

impl TokioProcessRunner {
    /// Create a new process runner
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { time_provider }
    }

    /// Spawn the child with piped output; stdin is piped only when there is a payload
    fn spawn(command: &ProcessCommand) -> Result<Child, ExecutionError> {
        let stdin = if command.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        };

        Command::new(&command.program)
            .args(&command.args)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed {
                program: command.program.clone(),
                reason: e.to_string(),
            })
    }

    /// Write the payload and close stdin so the child sees EOF
    ///
    /// A child that exits without reading all of its input closes the pipe
    /// early; that is left to the exit status to judge.
    async fn feed_stdin(
        stdin: Option<ChildStdin>,
        payload: Option<&str>,
    ) -> Result<(), ExecutionError> {
        let (Some(mut stdin), Some(payload)) = (stdin, payload) else {
            return Ok(());
        };

        let written = async {
            stdin.write_all(payload.as_bytes()).await?;
            stdin.shutdown().await
        }
        .await;
        drop(stdin);

        match written {
            Ok(()) => {
                debug!(bytes = payload.len(), "Stdin payload written and closed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                warn!("Child closed stdin before reading the full payload");
                Ok(())
            }
            Err(e) => Err(ExecutionError::StdinWrite(e.to_string())),
        }
    }

    /// Read lines until EOF, handing each one (terminator included) to `emit`
    async fn drain<R>(reader: Option<R>, mut emit: impl FnMut(&str)) -> Result<usize, ExecutionError>
    where
        R: AsyncRead + Unpin,
    {
        let Some(reader) = reader else {
            return Ok(0);
        };

        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut lines = 0;
        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|e| ExecutionError::IoError(e.to_string()))?;
            if n == 0 {
                break;
            }
            emit(&String::from_utf8_lossy(&buf));
            lines += 1;
        }
        Ok(lines)
    }

    /// Map an exit status: 0 succeeds, anything else (code or signal) fails
    fn check_status(status: std::process::ExitStatus) -> Result<i32, ExecutionError> {
        match status.code() {
            Some(0) => Ok(0),
            Some(code) => Err(ExecutionError::NonZeroExit { code }),
            None => Err(ExecutionError::Signaled {
                signal: Self::signal_name(status),
            }),
        }
    }

    #[cfg(unix)]
    fn signal_name(status: std::process::ExitStatus) -> String {
        use nix::sys::signal::Signal;
        use std::os::unix::process::ExitStatusExt;

        match status.signal() {
            Some(raw) => Signal::try_from(raw)
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|_| raw.to_string()),
            None => "unknown".to_string(),
        }
    }

    #[cfg(not(unix))]
    fn signal_name(_status: std::process::ExitStatus) -> String {
        "unknown".to_string()
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        command: &ProcessCommand,
        sink: &dyn OutputSink,
    ) -> Result<ExecutionResult, ExecutionError> {
        let start_time = self.time_provider.now_millis();

        info!(
            program = %command.program,
            args = ?command.args,
            stdin_bytes = command.stdin.as_ref().map(String::len).unwrap_or(0),
            "Starting subprocess"
        );

        let mut child = Self::spawn(command)?;
        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Completion requires all four: payload written, both streams at EOF, exit
        let (fed, stdout_lines, stderr_lines, status) = tokio::join!(
            Self::feed_stdin(stdin, command.stdin.as_deref()),
            Self::drain(stdout, |chunk| sink.on_stdout(chunk)),
            Self::drain(stderr, |chunk| sink.on_stderr(chunk)),
            child.wait(),
        );

        let status = status.map_err(|e| ExecutionError::IoError(e.to_string()))?;
        let duration_ms = self.time_provider.now_millis() - start_time;

        info!(
            program = %command.program,
            duration_ms = %duration_ms,
            exit_code = ?status.code(),
            "Subprocess finished"
        );

        let exit_code = Self::check_status(status)?;
        fed?;

        Ok(ExecutionResult {
            exit_code,
            duration_ms,
            stdout_lines: stdout_lines?,
            stderr_lines: stderr_lines?,
        })
    }
}
