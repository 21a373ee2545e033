use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;

use super::{LogEntry, LogSink};

/// File backed sink.
///
/// The file is opened in append mode and created if missing,
/// existing content is never truncated.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_owned();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn write(&self, entry: LogEntry) -> io::Result<()> {
        let line = entry.to_json_line();
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")
    }

    fn flush(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.writer.get_mut().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test::{file_with_content, unique_empty_temp_dir};

    #[test]
    fn appends_to_existing_content() {
        let dir = unique_empty_temp_dir("logwild_file_sink").unwrap();
        let path = file_with_content(&dir, "out.log", "initial content\n").unwrap();

        let sink = FileSink::open(&path).unwrap();
        assert_eq!(path, sink.path());
        sink.write(LogEntry::new(1, "first".to_owned())).unwrap();
        sink.write(LogEntry::new(2, "second".to_owned())).unwrap();
        sink.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(3, lines.len());
        assert_eq!("initial content", lines[0]);
        assert!(lines[1].contains("\"msg\":\"first\""));
        assert!(lines[2].contains("\"msg\":\"second\""));
    }

    #[test]
    fn reopen_does_not_truncate() {
        let dir = unique_empty_temp_dir("logwild_file_sink").unwrap();
        let path = dir.join("out.log");

        for i in 1..=2 {
            let sink = FileSink::open(&path).unwrap();
            sink.write(LogEntry::new(i, format!("run {i}"))).unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(2, lines.len());
        assert!(lines[0].contains("run 1"));
        assert!(lines[1].contains("run 2"));
    }

    #[test]
    fn open_fails_for_missing_dir() {
        let dir = unique_empty_temp_dir("logwild_file_sink").unwrap();
        assert!(FileSink::open(dir.join("missing").join("out.log")).is_err());
    }
}
