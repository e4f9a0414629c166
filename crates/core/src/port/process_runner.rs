// Process Runner Port
// Abstraction for running the external tool behind an adapter

use async_trait::async_trait;
use thiserror::Error;

/// Command to run: executable, arguments and optional stdin payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Written to stdin, which is closed right after. `None` closes stdin immediately.
    pub stdin: Option<String>,
}

impl ProcessCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, payload: impl Into<String>) -> Self {
        self.stdin = Some(payload.into());
        self
    }
}

/// Result of a process that exited successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub duration_ms: i64,
    pub stdout_lines: usize,
    pub stderr_lines: usize,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed for '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Exit with error code: {code}")]
    NonZeroExit { code: i32 },

    #[error("Terminated by signal: {signal}")]
    Signaled { signal: String },

    #[error("Stdin write failed: {0}")]
    StdinWrite(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Receiver for output chunks while a process runs
///
/// Both methods may be called interleaved while stdout and stderr are
/// drained, so implementations synchronize internally.
pub trait OutputSink: Send + Sync {
    fn on_stdout(&self, chunk: &str);
    fn on_stderr(&self, chunk: &str);
}

/// Process Runner trait
///
/// Implementations:
/// - TokioProcessRunner: spawns the real executable
/// - MockProcessRunner: scripted output for tests
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run a command to completion, streaming its output into `sink`
    ///
    /// Returns only after the process exited and both output streams hit EOF.
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the executable cannot be started
    /// - ExecutionError::NonZeroExit if it exits with a nonzero code
    /// - ExecutionError::Signaled if it is terminated by a signal
    async fn run(
        &self,
        command: &ProcessCommand,
        sink: &dyn OutputSink,
    ) -> Result<ExecutionResult, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Emit the given stdout/stderr lines, then exit 0
        Output {
            stdout: Vec<String>,
            stderr: Vec<String>,
        },
        /// Exit with a nonzero code
        Exit(i32),
        /// Executable not found
        SpawnFail(String),
    }

    /// Mock Process Runner recording every command it receives
    pub struct MockProcessRunner {
        behavior: MockBehavior,
        calls: Arc<Mutex<Vec<ProcessCommand>>>,
    }

    impl MockProcessRunner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success() -> Self {
            Self::with_output(Vec::<String>::new(), Vec::<String>::new())
        }

        pub fn with_output(
            stdout: impl IntoIterator<Item = impl Into<String>>,
            stderr: impl IntoIterator<Item = impl Into<String>>,
        ) -> Self {
            Self::new(MockBehavior::Output {
                stdout: stdout.into_iter().map(Into::into).collect(),
                stderr: stderr.into_iter().map(Into::into).collect(),
            })
        }

        pub fn new_exit(code: i32) -> Self {
            Self::new(MockBehavior::Exit(code))
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<ProcessCommand> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for MockProcessRunner {
        async fn run(
            &self,
            command: &ProcessCommand,
            sink: &dyn OutputSink,
        ) -> Result<ExecutionResult, ExecutionError> {
            self.calls.lock().unwrap().push(command.clone());

            match &self.behavior {
                MockBehavior::Output { stdout, stderr } => {
                    for chunk in stdout {
                        sink.on_stdout(chunk);
                    }
                    for chunk in stderr {
                        sink.on_stderr(chunk);
                    }
                    Ok(ExecutionResult {
                        exit_code: 0,
                        duration_ms: 1,
                        stdout_lines: stdout.len(),
                        stderr_lines: stderr.len(),
                    })
                }
                MockBehavior::Exit(code) => Err(ExecutionError::NonZeroExit { code: *code }),
                MockBehavior::SpawnFail(reason) => Err(ExecutionError::SpawnFailed {
                    program: command.program.clone(),
                    reason: reason.clone(),
                }),
            }
        }
    }
}
