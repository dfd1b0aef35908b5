//! Activities and the engine that runs them.
//!
//! An [`Activity`] is a validated task: one credential, one device kind,
//! an ordered target list and an ordered command list. The
//! [`Orchestrator`] visits every target in order and records an
//! [`Outcome`] for each without letting one target's failure stop the run.

mod engine;
mod report;

pub use engine::Orchestrator;
pub use report::{Outcome, RunReport, TargetReport};

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::Local;
use secrecy::SecretString;

use crate::error::TaskError;
use crate::platform::DeviceKind;
use crate::sink::{SinkPolicy, timestamped_filename};
use crate::transport::Credential;

/// A set of commands to run on a set of devices.
#[derive(Debug)]
pub struct Activity {
    /// Short name, used to build log and output file names.
    pub name: String,

    /// Free-form description.
    pub description: String,

    /// Login credential for every target.
    pub credential: Credential,

    /// Escalation password; escalation runs only when present.
    pub escalation_password: Option<SecretString>,

    /// Device variant for every target.
    pub kind: DeviceKind,

    /// Hosts, visited in this order.
    pub targets: Vec<String>,

    /// Commands, sent in this order.
    pub commands: Vec<String>,

    /// Output directory; stdout when absent.
    pub output_dir: Option<PathBuf>,

    /// One output file for the whole run instead of one per target.
    pub single_file: bool,

    /// Log directory; stderr when absent.
    pub log_dir: Option<PathBuf>,
}

impl Activity {
    /// Create an activity with no targets or commands yet.
    pub fn new(name: impl Into<String>, credential: Credential) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            credential,
            escalation_password: None,
            kind: DeviceKind::Generic,
            targets: Vec::new(),
            commands: Vec::new(),
            output_dir: None,
            single_file: false,
            log_dir: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the device kind.
    pub fn with_kind(mut self, kind: DeviceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add targets.
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets.extend(targets.into_iter().map(Into::into));
        self
    }

    /// Add commands.
    pub fn with_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.extend(commands.into_iter().map(Into::into));
        self
    }

    /// Require escalation with this password.
    pub fn with_escalation(mut self, password: SecretString) -> Self {
        self.escalation_password = Some(password);
        self
    }

    /// Write output under `dir`, in one file or one per target.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>, single_file: bool) -> Self {
        self.output_dir = Some(dir.into());
        self.single_file = single_file;
        self
    }

    /// Write the run log under `dir`.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Whether escalation is requested.
    pub fn needs_escalation(&self) -> bool {
        self.escalation_password.is_some()
    }

    /// Output routing for this activity.
    pub fn sink_policy(&self) -> SinkPolicy {
        SinkPolicy::from_routing(self.output_dir.as_deref(), self.single_file)
    }

    /// Validate before running.
    ///
    /// Output and log directories are created if missing and probed for
    /// writability.
    pub fn check(&self) -> Result<(), TaskError> {
        if self.name.trim().is_empty() {
            return Err(TaskError::Invalid("missing name".to_string()));
        }
        if let Some(dir) = &self.output_dir {
            probe_directory(dir).map_err(|e| {
                TaskError::Invalid(format!("output directory '{}': {}", dir.display(), e))
            })?;
        }
        if let Some(dir) = &self.log_dir {
            probe_directory(dir).map_err(|e| {
                TaskError::Invalid(format!("log directory '{}': {}", dir.display(), e))
            })?;
        }
        if self.targets.is_empty() {
            return Err(TaskError::Invalid("no target devices found".to_string()));
        }
        if self.commands.is_empty() {
            return Err(TaskError::Invalid("no commands found".to_string()));
        }
        Ok(())
    }

    /// Human-readable summary; never includes passwords.
    pub fn summary(&self) -> ActivitySummary<'_> {
        ActivitySummary(self)
    }
}

fn probe_directory(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let probe = dir.join("tmp.tmp");
    File::create(&probe)?;
    fs::remove_file(&probe)
}

/// Display adapter returned by [`Activity::summary`].
pub struct ActivitySummary<'a>(&'a Activity);

impl fmt::Display for ActivitySummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let activity = self.0;
        writeln!(f, "-------------Activity-------------------")?;
        writeln!(f, "\tName: {}", activity.name)?;
        if !activity.description.is_empty() {
            writeln!(f, "\tDescription: {}", activity.description)?;
        }
        writeln!(f, "\tUser: {}", activity.credential.username)?;
        if activity.needs_escalation() {
            writeln!(f, "\tSuperuser: YES")?;
        }
        if activity.kind != DeviceKind::Generic {
            writeln!(f, "\tDevice type: {}", activity.kind)?;
        }
        writeln!(f, "\tDevices: {}", activity.targets.len())?;
        match activity.sink_policy() {
            SinkPolicy::Stdout => {}
            SinkPolicy::SingleFile(dir) => {
                let name = timestamped_filename(&format!("{}_OUT", activity.name), Local::now());
                writeln!(f, "\tOutput File: {}", dir.join(name).display())?;
            }
            SinkPolicy::PerTarget(dir) => writeln!(f, "\tOutput Folder: {}", dir.display())?,
        }
        if let Some(dir) = &activity.log_dir {
            let name = timestamped_filename(&format!("{}_LOG", activity.name), Local::now());
            writeln!(f, "\tLog File: {}", dir.join(name).display())?;
        }
        write!(f, "----------------------------------------")
    }
}
