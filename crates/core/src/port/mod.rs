// Port Layer - Interfaces for external dependencies

pub mod log_sink;
pub mod process_runner;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use log_sink::{LogLevel, LogSink};
pub use process_runner::{
    ExecutionError, ExecutionResult, OutputSink, ProcessCommand, ProcessRunner,
};
pub use time_provider::TimeProvider;
