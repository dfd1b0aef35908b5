//! Output sinks and per-run routing.

use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::debug;

use super::create_timestamped;
use crate::error::SinkError;

/// Where captured output is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkPolicy {
    /// Everything to standard output.
    Stdout,

    /// One file in this directory for the whole run.
    SingleFile(PathBuf),

    /// One file per target in this directory.
    PerTarget(PathBuf),
}

impl SinkPolicy {
    /// Policy for an output directory (if any) and the single-file flag.
    pub fn from_routing(dir: Option<&Path>, single_file: bool) -> Self {
        match dir {
            None => SinkPolicy::Stdout,
            Some(dir) if single_file => SinkPolicy::SingleFile(dir.to_path_buf()),
            Some(dir) => SinkPolicy::PerTarget(dir.to_path_buf()),
        }
    }
}

/// A single output destination.
#[derive(Debug)]
pub enum OutputSink {
    /// Process standard output.
    Stdout(Stdout),

    /// A file opened for this run or target.
    File {
        path: PathBuf,
        writer: BufWriter<File>,
    },
}

impl OutputSink {
    /// Standard output.
    pub fn stdout() -> Self {
        OutputSink::Stdout(io::stdout())
    }

    /// Create a new `<base>_<timestamp>.txt` file in `dir`.
    ///
    /// An existing file of the same name is never truncated; a numeric
    /// suffix is added instead.
    pub fn create(dir: &Path, base: &str) -> Result<Self, SinkError> {
        let (path, file) = create_timestamped(dir, base, Local::now())
            .map_err(|(path, source)| SinkError::Create {
                kind: "output",
                path,
                source,
            })?;
        debug!("Opened output file {}", path.display());
        Ok(OutputSink::File {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            OutputSink::Stdout(_) => None,
            OutputSink::File { path, .. } => Some(path),
        }
    }

    /// Flush and release the destination.
    pub fn close(mut self) -> Result<(), SinkError> {
        self.flush().map_err(|source| SinkError::Write {
            kind: "output",
            source,
        })
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputSink::Stdout(out) => out.write(buf),
            OutputSink::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Stdout(out) => out.flush(),
            OutputSink::File { writer, .. } => writer.flush(),
        }
    }
}

/// Applies a [`SinkPolicy`] over one run.
///
/// The shared sink (stdout or single file) lives for the whole run; a
/// per-target sink lives between [`begin_target`](Self::begin_target) and
/// [`end_target`](Self::end_target). Writes go to whichever is open.
#[derive(Debug)]
pub struct OutputRouter {
    policy: SinkPolicy,
    shared: Option<OutputSink>,
    current: Option<OutputSink>,
    created: Vec<PathBuf>,
}

impl OutputRouter {
    /// Open the run-level sink required by `policy`.
    pub fn open(policy: SinkPolicy, run_name: &str) -> Result<Self, SinkError> {
        let mut created = Vec::new();
        let shared = match &policy {
            SinkPolicy::Stdout => Some(OutputSink::stdout()),
            SinkPolicy::SingleFile(dir) => {
                let sink = OutputSink::create(dir, &format!("{}_OUT", run_name))?;
                created.extend(sink.path().map(Path::to_path_buf));
                Some(sink)
            }
            SinkPolicy::PerTarget(_) => None,
        };

        Ok(Self {
            policy,
            shared,
            current: None,
            created,
        })
    }

    /// Open the target's own file when the policy asks for one.
    pub fn begin_target(&mut self, target: &str) -> Result<(), SinkError> {
        if let SinkPolicy::PerTarget(dir) = &self.policy {
            let sink = OutputSink::create(dir, target)?;
            self.created.extend(sink.path().map(Path::to_path_buf));
            self.current = Some(sink);
        }
        Ok(())
    }

    /// Close the target's own file, if one is open.
    pub fn end_target(&mut self) -> Result<(), SinkError> {
        match self.current.take() {
            Some(sink) => sink.close(),
            None => Ok(()),
        }
    }

    /// Every file created so far, in creation order.
    pub fn files(&self) -> &[PathBuf] {
        &self.created
    }

    /// Close any open sinks.
    pub fn close(mut self) -> Result<(), SinkError> {
        self.end_target()?;
        match self.shared.take() {
            Some(sink) => sink.close(),
            None => Ok(()),
        }
    }

    fn active(&mut self) -> io::Result<&mut OutputSink> {
        self.current
            .as_mut()
            .or(self.shared.as_mut())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no output sink open"))
    }
}

impl Write for OutputRouter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.active()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.active()?.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_policy_from_routing() {
        let dir = Path::new("/tmp/out");
        assert_eq!(SinkPolicy::from_routing(None, true), SinkPolicy::Stdout);
        assert_eq!(
            SinkPolicy::from_routing(Some(dir), true),
            SinkPolicy::SingleFile(dir.to_path_buf())
        );
        assert_eq!(
            SinkPolicy::from_routing(Some(dir), false),
            SinkPolicy::PerTarget(dir.to_path_buf())
        );
    }

    #[test]
    fn test_single_file_shared_across_targets() {
        let dir = tempfile::tempdir().unwrap();
        let mut router =
            OutputRouter::open(SinkPolicy::SingleFile(dir.path().to_path_buf()), "audit").unwrap();

        for target in ["a", "b"] {
            router.begin_target(target).unwrap();
            write!(router, "[{}]", target).unwrap();
            router.end_target().unwrap();
        }
        let files = router.files().to_vec();
        router.close().unwrap();

        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("audit_OUT_"));
        assert_eq!(fs::read_to_string(&files[0]).unwrap(), "[a][b]");
    }

    #[test]
    fn test_per_target_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut router =
            OutputRouter::open(SinkPolicy::PerTarget(dir.path().to_path_buf()), "audit").unwrap();
        assert!(router.files().is_empty());

        router.begin_target("10.0.0.1").unwrap();
        write!(router, "one").unwrap();
        router.end_target().unwrap();

        // Nothing open between targets
        assert!(write!(router, "stray").is_err());

        router.begin_target("10.0.0.2").unwrap();
        write!(router, "two").unwrap();
        router.end_target().unwrap();

        let files = router.files().to_vec();
        router.close().unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].file_name().unwrap().to_string_lossy().starts_with("10.0.0.1_"));
        assert_eq!(fs::read_to_string(&files[0]).unwrap(), "one");
        assert_eq!(fs::read_to_string(&files[1]).unwrap(), "two");
    }

    #[test]
    fn test_stdout_policy_writes_without_files() {
        let mut router = OutputRouter::open(SinkPolicy::Stdout, "audit").unwrap();

        router.begin_target("10.0.0.1").unwrap();
        write!(router, "\n----------------10.0.0.1--------------\n").unwrap();
        router.flush().unwrap();
        router.end_target().unwrap();

        // The shared stdout sink stays open between targets
        write!(router, "").unwrap();
        assert!(router.files().is_empty());
        router.close().unwrap();
    }

    #[test]
    fn test_repeated_target_keeps_earlier_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut router =
            OutputRouter::open(SinkPolicy::PerTarget(dir.path().to_path_buf()), "audit").unwrap();

        for text in ["first", "second"] {
            router.begin_target("10.0.0.1").unwrap();
            write!(router, "{}", text).unwrap();
            router.end_target().unwrap();
        }
        let files = router.files().to_vec();
        router.close().unwrap();

        assert_eq!(files.len(), 2);
        assert_ne!(files[0], files[1]);
        assert_eq!(fs::read_to_string(&files[0]).unwrap(), "first");
        assert_eq!(fs::read_to_string(&files[1]).unwrap(), "second");
    }

    #[test]
    fn test_unwritable_directory_is_a_create_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = OutputRouter::open(SinkPolicy::SingleFile(missing), "audit").unwrap_err();
        assert!(matches!(err, SinkError::Create { kind: "output", .. }));
    }
}
