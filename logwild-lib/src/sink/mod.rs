//! Log sinks durably record the generated log entries.
//!
//! A sink may be shared between multiple burst runs (e.g. one file for the
//! whole server process). Each run uses it sequentially; coordinating
//! concurrent runs writing to the same destination is up to the sink.

use std::{
    fmt, io,
    path::PathBuf,
    str::FromStr,
    sync::Arc,
    time::SystemTime,
};

use rama::error::{BoxError, ErrorContext as _};

mod file;
mod stdout;
mod traced;

#[cfg(any(test, feature = "test-utils"))]
mod memory;

pub use self::{file::FileSink, stdout::StdoutSink, traced::TracingSink};

#[cfg(any(test, feature = "test-utils"))]
pub use self::memory::{FailingSink, MemorySink};

/// Destination of generated log entries.
pub trait LogSink: Send + Sync + 'static {
    /// Record a single entry.
    ///
    /// Ownership of the entry is handed over to the sink.
    fn write(&self, entry: LogEntry) -> io::Result<()>;

    /// Flush any buffered entries, called once at the end of a run.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// One generated log event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: SystemTime,
    /// 1-based position of this entry within its burst.
    pub sequence: u64,
    pub message: String,
}

impl LogEntry {
    pub fn new(sequence: u64, message: String) -> Self {
        Self {
            timestamp: SystemTime::now(),
            sequence,
            message,
        }
    }

    /// Canonical single line JSON rendering (without trailing newline).
    pub fn to_json_line(&self) -> String {
        serde_json::json!({
            "time": humantime::format_rfc3339_millis(self.timestamp).to_string(),
            "level": "INFO",
            "seq": self.sequence,
            "msg": self.message,
        })
        .to_string()
    }
}

/// Sink destination as configured by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SinkTarget {
    /// `-`
    #[default]
    Stdout,
    /// `tracing`
    Tracing,
    /// any other value, interpreted as a file path (opened in append mode)
    File(PathBuf),
}

impl SinkTarget {
    pub fn open(&self) -> Result<Arc<dyn LogSink>, BoxError> {
        Ok(match self {
            Self::Stdout => Arc::new(StdoutSink::new()),
            Self::Tracing => Arc::new(TracingSink::new()),
            Self::File(path) => Arc::new(
                FileSink::open(path)
                    .context("open file log sink")
                    .with_context_debug_field("path", || path.clone())?,
            ),
        })
    }
}

impl fmt::Display for SinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("-"),
            Self::Tracing => f.write_str("tracing"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl FromStr for SinkTarget {
    type Err = BoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BoxError::from("empty sink target is not allowed"));
        }
        if s == "-" {
            return Ok(Self::Stdout);
        }
        if s.eq_ignore_ascii_case("tracing") {
            return Ok(Self::Tracing);
        }
        Ok(Self::File(PathBuf::from(s)))
    }
}
