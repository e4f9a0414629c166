// krm-exec Infrastructure - System Adapters
// Implements: ProcessRunner, LogSink

pub mod process_runner;
pub mod tracing_log_sink;

pub use process_runner::TokioProcessRunner;
pub use tracing_log_sink::TracingLogSink;
