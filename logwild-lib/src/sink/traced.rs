use std::io;

use rama::telemetry::tracing;

use super::{LogEntry, LogSink};

/// Emits every entry as a structured tracing event,
/// so that it ends up wherever the process diagnostics are shipped.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingSink {
    fn write(&self, entry: LogEntry) -> io::Result<()> {
        tracing::info!(
            seq = entry.sequence,
            ts = %humantime::format_rfc3339_millis(entry.timestamp),
            "{}",
            entry.message,
        );
        Ok(())
    }
}
