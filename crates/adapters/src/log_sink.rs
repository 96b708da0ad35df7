//! Output sinks for the JSON logger.

use std::io::Write;
use std::sync::Mutex;

/// Destination for encoded log lines.
pub trait LogSink: Send + Sync {
    /// Write one encoded line (newline included).
    fn write_line(&self, line: &str);
}

/// Sink writing to stderr.
#[derive(Debug, Default)]
pub struct StderrSink;

impl StderrSink {
    /// Build a stderr sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LogSink for StderrSink {
    fn write_line(&self, line: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
    }
}

/// In-memory sink for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Build an empty memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return the captured lines.
    pub fn take(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => Vec::new(),
        }
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        if let Ok(mut guard) = self.lines.lock() {
            guard.push(line.to_string());
        }
    }
}
