use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;

use super::{LogEntry, LogSink};

/// Keeps all written entries in memory, for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }
}

impl LogSink for MemorySink {
    fn write(&self, entry: LogEntry) -> io::Result<()> {
        self.entries.lock().push(entry);
        Ok(())
    }
}

/// Accepts `capacity` writes and fails every write after that.
#[derive(Debug, Clone)]
pub struct FailingSink {
    capacity: u64,
    written: Arc<AtomicU64>,
}

impl FailingSink {
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            written: Default::default(),
        }
    }

    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Acquire)
    }
}

impl LogSink for FailingSink {
    fn write(&self, _entry: LogEntry) -> io::Result<()> {
        let written = self.written.load(Ordering::Acquire);
        if written >= self.capacity {
            return Err(io::Error::new(
                io::ErrorKind::StorageFull,
                "failing sink: capacity exhausted",
            ));
        }
        self.written.store(written + 1, Ordering::Release);
        Ok(())
    }
}
