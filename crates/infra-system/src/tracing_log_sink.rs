// LogSink backed by tracing events

use krm_exec_core::port::{LogLevel, LogSink};
use tracing::{error, info, warn};

/// Target used for subprocess output lines
pub const PROCESS_LOG_TARGET: &str = "krm_exec::process";

/// Emits adapter log lines as tracing events tagged with the adapter name
pub struct TracingLogSink {
    adapter: String,
}

impl TracingLogSink {
    pub fn new(adapter: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
        }
    }
}

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Info => info!(target: PROCESS_LOG_TARGET, adapter = %self.adapter, "I: {}", line),
            LogLevel::Warn => warn!(target: PROCESS_LOG_TARGET, adapter = %self.adapter, "W: {}", line),
            LogLevel::Error => error!(target: PROCESS_LOG_TARGET, adapter = %self.adapter, "E: {}", line),
        }
    }
}
