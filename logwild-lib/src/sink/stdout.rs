use std::io::{self, Write as _};

use super::{LogEntry, LogSink};

/// Writes every entry as a JSON line to the process stdout.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for StdoutSink {
    fn write(&self, entry: LogEntry) -> io::Result<()> {
        let line = entry.to_json_line();
        let mut stdout = io::stdout().lock();
        stdout.write_all(line.as_bytes())?;
        stdout.write_all(b"\n")
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}
