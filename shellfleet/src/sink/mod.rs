//! Output and log destinations.
//!
//! Captured device output goes to an [`OutputSink`] chosen per run by the
//! [`SinkPolicy`]; lifecycle events go to a [`LogSink`]. Both fall back to
//! the process streams when no directory is configured.

mod logfile;
mod output;

pub use logfile::LogSink;
pub use output::{OutputRouter, OutputSink, SinkPolicy};

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Build `<base>_<YYYYMMDD_HHMMSS>.txt`.
///
/// `base` is reduced to `[-a-zA-Z0-9_.]` so host names and activity names
/// can be used directly.
pub fn timestamped_filename(base: &str, at: DateTime<Local>) -> String {
    format!("{}.txt", timestamped_stem(base, at))
}

fn timestamped_stem(base: &str, at: DateTime<Local>) -> String {
    let clean: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    format!("{}_{}", clean, at.format("%Y%m%d_%H%M%S"))
}

/// Create a new timestamped file in `dir`, never truncating an existing one.
///
/// When the name is taken (same base within the same second) a counter is
/// appended: `<base>_<timestamp>_2.txt`, `_3`, and so on.
pub(crate) fn create_timestamped(
    dir: &Path,
    base: &str,
    at: DateTime<Local>,
) -> Result<(PathBuf, File), (PathBuf, io::Error)> {
    let stem = timestamped_stem(base, at);
    let mut attempt = 1u32;
    loop {
        let path = match attempt {
            1 => dir.join(format!("{}.txt", stem)),
            n => dir.join(format!("{}_{}.txt", stem, n)),
        };
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err((path, e)),
        }
    }
}
