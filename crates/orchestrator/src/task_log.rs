//! Per-task log buffering.
//!
//! Each package's pipeline writes into its own [`TaskLog`]. When the package
//! finishes, the whole buffer is written out as one block so output from
//! concurrently running packages never interleaves.

use std::io::{self, Write};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct TaskLog {
    entries: Vec<LogEntry>,
}

impl TaskLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into());
    }

    fn push(&mut self, level: LogLevel, message: String) {
        debug!(?level, "{}", message);
        self.entries.push(LogEntry { level, message });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.level == LogLevel::Error)
    }

    /// Header line followed by every buffered line indented with a tab.
    pub fn render(&self, header: &str) -> String {
        let mut block = String::with_capacity(header.len() + 1);
        block.push_str(header);
        block.push('\n');
        for entry in &self.entries {
            for line in entry.message.lines() {
                block.push('\t');
                block.push_str(line);
                block.push('\n');
            }
        }
        block
    }

    pub fn flush_to<W: Write>(self, header: &str, out: &mut W) -> io::Result<()> {
        out.write_all(self.render(header).as_bytes())?;
        out.flush()
    }

    /// Writes the block to stdout while holding the stdout lock.
    pub fn flush(self, header: &str) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.flush_to(header, &mut lock)
    }
}
