//! Device protocol variants.
//!
//! Every supported class of equipment answers the same fixed capability
//! set: login, escalate, logout. [`DeviceKind`] is the tag; the dialogues
//! themselves live under [`vendors`].

mod prompts;
pub mod vendors;

pub use prompts::{PromptSet, contains_marker};

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;

use crate::channel::{Dialogue, ShellChannel};
use crate::error::Result;
use crate::transport::Credential;

/// The class of device at the far end of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Plain SSH shell: no post-login dialogue, no escalation.
    #[default]
    Generic,

    /// IOS-like router or switch (`enable` escalation, `terminal length 0`).
    CiscoIos,

    /// WLC-like wireless controller with a second application-level login.
    CiscoWlc,

    /// Unix-like host escalating with `su`.
    Linux,
}

impl DeviceKind {
    /// Every non-generic tag accepted in task files.
    pub const TAGS: [&'static str; 3] = ["ciscoios", "ciscowlc", "linux"];

    /// The task-file tag for this kind (empty for generic).
    pub fn tag(&self) -> &'static str {
        match self {
            DeviceKind::Generic => "",
            DeviceKind::CiscoIos => "ciscoios",
            DeviceKind::CiscoWlc => "ciscowlc",
            DeviceKind::Linux => "linux",
        }
    }

    /// Run the post-connect login dialogue.
    pub async fn login<C: ShellChannel>(
        self,
        dialogue: &mut Dialogue<'_, C>,
        credential: &Credential,
        prompts: &PromptSet,
    ) -> Result<()> {
        match self {
            DeviceKind::Generic | DeviceKind::Linux => vendors::generic::login(dialogue).await,
            DeviceKind::CiscoIos => vendors::cisco_ios::login(dialogue).await,
            DeviceKind::CiscoWlc => vendors::cisco_wlc::login(dialogue, credential, prompts).await,
        }
    }

    /// Run the privilege escalation dialogue.
    pub async fn escalate<C: ShellChannel>(
        self,
        dialogue: &mut Dialogue<'_, C>,
        password: &SecretString,
        prompts: &PromptSet,
    ) -> Result<()> {
        match self {
            DeviceKind::Generic | DeviceKind::CiscoWlc => vendors::generic::escalate(dialogue).await,
            DeviceKind::CiscoIos => vendors::cisco_ios::escalate(dialogue, password, prompts).await,
            DeviceKind::Linux => vendors::linux::escalate(dialogue, password, prompts).await,
        }
    }

    /// Run the pre-closure logout dialogue. Does not close the transport.
    pub async fn logout<C: ShellChannel>(
        self,
        dialogue: &mut Dialogue<'_, C>,
        prompts: &PromptSet,
    ) -> Result<()> {
        match self {
            DeviceKind::Generic => vendors::generic::logout(dialogue).await,
            DeviceKind::CiscoIos => vendors::cisco_ios::logout(dialogue).await,
            DeviceKind::CiscoWlc => vendors::cisco_wlc::logout(dialogue, prompts).await,
            DeviceKind::Linux => vendors::linux::logout(dialogue).await,
        }
    }
}

/// Error returned when a device tag is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDeviceKind(pub String);

impl fmt::Display for UnknownDeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown device type '{}' (expected one of: {})",
            self.0,
            DeviceKind::TAGS.join(", ")
        )
    }
}

impl std::error::Error for UnknownDeviceKind {}

impl FromStr for DeviceKind {
    type Err = UnknownDeviceKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" => Ok(DeviceKind::Generic),
            "ciscoios" => Ok(DeviceKind::CiscoIos),
            "ciscowlc" => Ok(DeviceKind::CiscoWlc),
            "linux" => Ok(DeviceKind::Linux),
            _ => Err(UnknownDeviceKind(s.to_string())),
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Generic => write!(f, "generic"),
            other => write!(f, "{}", other.tag()),
        }
    }
}
