//! Task definition files.
//!
//! A task file describes one [`Activity`]: credentials (scrambled with
//! [`codec`]), targets, commands and where output and logs go.
//!
//! ```json
//! {
//!     "name": "nightly_audit",
//!     "desc": "Collect versions",
//!     "login": "admin",
//!     "password": "1113",
//!     "superuserPassword": "0402",
//!     "type": "ciscoios",
//!     "devices": ["10.0.0.1", "10.0.0.2"],
//!     "commands": ["show version", "show clock"],
//!     "outputDir": "./output",
//!     "singleFile": true,
//!     "logDir": "./logs"
//! }
//! ```

pub mod codec;

use std::path::{Path, PathBuf};

use log::debug;
use secrecy::SecretString;
use serde::Deserialize;

use crate::activity::Activity;
use crate::error::TaskError;
use crate::platform::DeviceKind;
use crate::transport::Credential;

/// On-disk shape of a task file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskFile {
    pub name: String,

    #[serde(default, rename = "desc")]
    pub description: String,

    /// Username, also the key for the scrambled passwords.
    pub login: String,

    /// Scrambled login password.
    pub password: String,

    /// Scrambled escalation password. Its presence means escalation is needed.
    #[serde(default, rename = "superuserPassword")]
    pub superuser_password: Option<String>,

    #[serde(default, rename = "type")]
    pub device_type: String,

    pub devices: Vec<String>,

    pub commands: Vec<String>,

    #[serde(default, rename = "outputDir")]
    pub output_dir: Option<PathBuf>,

    #[serde(default, rename = "singleFile")]
    pub single_file: bool,

    #[serde(default, rename = "logDir")]
    pub log_dir: Option<PathBuf>,
}

impl TaskFile {
    /// Read a `.json` task file.
    pub fn load(path: &Path) -> Result<Self, TaskError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if extension != "json" {
            return Err(TaskError::UnsupportedFormat(extension));
        }

        let text = std::fs::read_to_string(path).map_err(|source| TaskError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded task file {}", path.display());
        Self::from_json(&text)
    }

    /// Parse a task from JSON text.
    pub fn from_json(text: &str) -> Result<Self, TaskError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode the passwords and resolve the device type.
    pub fn into_activity(self) -> Result<Activity, TaskError> {
        let kind: DeviceKind = self
            .device_type
            .parse()
            .map_err(|e: crate::platform::UnknownDeviceKind| TaskError::Invalid(e.to_string()))?;

        let password = codec::decode(&self.password, &self.login)?;
        let escalation = self
            .superuser_password
            .as_deref()
            .map(|p| codec::decode(p, &self.login))
            .transpose()?;

        let mut activity = Activity::new(self.name, Credential::new(self.login, password))
            .with_description(self.description)
            .with_kind(kind)
            .with_targets(self.devices)
            .with_commands(self.commands);

        if let Some(escalation) = escalation {
            activity = activity.with_escalation(SecretString::from(escalation));
        }
        if let Some(dir) = self.output_dir {
            activity = activity.with_output_dir(dir, self.single_file);
        }
        if let Some(dir) = self.log_dir {
            activity = activity.with_log_dir(dir);
        }

        Ok(activity)
    }
}
