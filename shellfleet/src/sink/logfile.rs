//! Run log: one `HH:MM:SS: <message>` line per lifecycle event.

use std::fs::File;
use std::io::{self, BufWriter, Stderr, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{info, warn};

use super::create_timestamped;
use crate::error::SinkError;

#[derive(Debug)]
enum LogTarget {
    Stderr(Stderr),
    File {
        path: PathBuf,
        writer: BufWriter<File>,
    },
}

/// The user-facing run log.
///
/// Every line is also mirrored to the `log` facade: lifecycle events at
/// info level, failures at warn level.
#[derive(Debug)]
pub struct LogSink {
    target: LogTarget,
}

impl LogSink {
    /// Log to the process error stream.
    pub fn stderr() -> Self {
        Self {
            target: LogTarget::Stderr(io::stderr()),
        }
    }

    /// Create `<run_name>_LOG_<timestamp>.txt` in `dir`.
    pub fn create(dir: &Path, run_name: &str) -> Result<Self, SinkError> {
        let (path, file) = create_timestamped(dir, &format!("{}_LOG", run_name), Local::now())
            .map_err(|(path, source)| SinkError::Create {
                kind: "log",
                path,
                source,
            })?;
        Ok(Self {
            target: LogTarget::File {
                path,
                writer: BufWriter::new(file),
            },
        })
    }

    /// Log to `dir` when given, otherwise to stderr.
    pub fn open(dir: Option<&Path>, run_name: &str) -> Result<Self, SinkError> {
        match dir {
            Some(dir) => Self::create(dir, run_name),
            None => Ok(Self::stderr()),
        }
    }

    /// Path of the log file, if logging to a file.
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            LogTarget::Stderr(_) => None,
            LogTarget::File { path, .. } => Some(path),
        }
    }

    /// Append one timestamped lifecycle line.
    pub fn line(&mut self, message: &str) -> Result<(), SinkError> {
        info!("{}", message);
        self.append(message)
    }

    /// Append one timestamped line describing a failure.
    pub fn failure(&mut self, message: &str) -> Result<(), SinkError> {
        warn!("{}", message);
        self.append(message)
    }

    fn append(&mut self, message: &str) -> Result<(), SinkError> {
        let stamped = format!("{}: {}\n", Local::now().format("%H:%M:%S"), message);
        let result = match &mut self.target {
            LogTarget::Stderr(err) => err.write_all(stamped.as_bytes()),
            LogTarget::File { writer, .. } => writer
                .write_all(stamped.as_bytes())
                .and_then(|()| writer.flush()),
        };
        result.map_err(|source| SinkError::Write { kind: "log", source })
    }

    /// Flush and release the destination.
    pub fn close(mut self) -> Result<(), SinkError> {
        let result = match &mut self.target {
            LogTarget::Stderr(err) => err.flush(),
            LogTarget::File { writer, .. } => writer.flush(),
        };
        result.map_err(|source| SinkError::Write { kind: "log", source })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = LogSink::create(dir.path(), "nightly").unwrap();
        let path = log.path().unwrap().to_path_buf();

        log.line("Connected to 10.0.0.1").unwrap();
        log.close().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let line = content.lines().next().unwrap();
        // HH:MM:SS: message
        assert_eq!(line.len(), "00:00:00: ".len() + "Connected to 10.0.0.1".len());
        assert_eq!(&line[2..3], ":");
        assert_eq!(&line[5..6], ":");
        assert!(line.ends_with(": Connected to 10.0.0.1"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_failures_share_the_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = LogSink::create(dir.path(), "nightly").unwrap();
        let path = log.path().unwrap().to_path_buf();

        log.line("Connected to r1").unwrap();
        log.failure("Unable to login to r1: timed out").unwrap();
        log.close().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().map(|l| &l[10..]).collect();
        assert_eq!(lines, vec!["Connected to r1", "Unable to login to r1: timed out"]);
    }

    #[test]
    fn test_log_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogSink::open(Some(dir.path()), "nightly").unwrap();
        let name = log.path().unwrap().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("nightly_LOG_"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = LogSink::create(&dir.path().join("nope"), "nightly").unwrap_err();
        assert!(matches!(err, SinkError::Create { kind: "log", .. }));
    }

    #[test]
    fn test_no_directory_means_stderr() {
        let log = LogSink::open(None, "nightly").unwrap();
        assert!(log.path().is_none());
    }
}
