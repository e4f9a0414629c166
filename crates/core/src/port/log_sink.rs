// Log Sink Port
// Line-oriented log channels for subprocess output and adapter notices

/// Log channel level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Destination for adapter log lines
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, line: &str);

    fn info(&self, line: &str) {
        self.log(LogLevel::Info, line);
    }

    fn warn(&self, line: &str) {
        self.log(LogLevel::Warn, line);
    }

    fn error(&self, line: &str) {
        self.log(LogLevel::Error, line);
    }
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Log sink keeping every line in memory
    #[derive(Default)]
    pub struct RecordingLogSink {
        lines: Mutex<Vec<(LogLevel, String)>>,
    }

    impl RecordingLogSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lines(&self) -> Vec<(LogLevel, String)> {
            self.lines.lock().unwrap().clone()
        }

        /// Lines logged at one level, in order
        pub fn at(&self, level: LogLevel) -> Vec<String> {
            self.lines
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, line)| line.clone())
                .collect()
        }
    }

    impl LogSink for RecordingLogSink {
        fn log(&self, level: LogLevel, line: &str) {
            self.lines.lock().unwrap().push((level, line.to_string()));
        }
    }
}
