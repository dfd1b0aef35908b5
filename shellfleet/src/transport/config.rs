//! SSH connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys. Connection fails if the host
    /// is not already in known_hosts.
    Strict,

    /// Accept and auto-learn unknown keys, but reject changed keys.
    AcceptNew,

    /// Accept all keys without checking. Fleets of lab gear are usually
    /// re-imaged often enough that this is the practical default.
    #[default]
    Disabled,
}

/// Username and password for one activity.
///
/// The password stays wrapped in a [`SecretString`] so it never shows up in
/// `Debug` output or logs.
#[derive(Debug)]
pub struct Credential {
    /// Plain-text username.
    pub username: String,

    /// Decoded password.
    pub password: SecretString,
}

impl Credential {
    /// Create a credential from a username and a plain-text password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self {
            username: self.username.clone(),
            password: SecretString::from(self.password.expose_secret().to_owned()),
        }
    }
}

/// Host-independent SSH options shared by every target of a run.
#[derive(Debug, Clone)]
pub struct SshOptions {
    /// SSH port (default: 22).
    pub port: u16,

    /// Connection and handshake timeout.
    pub timeout: Duration,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file.
    pub known_hosts_path: Option<PathBuf>,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            port: 22,
            timeout: Duration::from_secs(30),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }
}

impl SshOptions {
    /// Set the SSH port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the connection timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Set the host key verification mode.
    pub fn with_host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a specific known_hosts file instead of `~/.ssh/known_hosts`.
    pub fn with_known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }
}
