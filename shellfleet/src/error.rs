//! Error types for shellfleet.
//!
//! Transport, channel and session errors are per-target: the orchestrator
//! turns them into an [`Outcome`](crate::activity::Outcome) and moves on.
//! Sink errors are the only ones that abort a run.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for shellfleet operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Shell channel errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Device session errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Output or log destination errors
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Task definition errors
    #[error("Task error: {0}")]
    Task(#[from] TaskError),
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// The server's host key is not in known_hosts (strict mode)
    #[error("Unknown host key for {host}:{port}")]
    HostKeyUnknown { host: String, port: u16 },

    /// The server's host key differs from the one in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Shell channel errors (send/drain on the interactive session).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// No channel is open
    #[error("Channel not open - connect first")]
    NotOpen,

    /// Channel closed by the remote end
    #[error("Channel closed")]
    Closed,

    /// The remote end accepted none of the bytes
    #[error("No bytes accepted by the channel")]
    NothingSent,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Received bytes are not valid UTF-8
    #[error("Undecodable output from remote: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

/// Device session errors (lifecycle misuse, missing prompts).
#[derive(Error, Debug)]
pub enum SessionError {
    /// Operation not allowed in the current state
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// An expected prompt marker was absent from the drained output
    #[error("Expected '{marker}' after {step}")]
    PromptNotSeen { step: &'static str, marker: String },
}

/// Output and log destination errors. These abort a run.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Could not create the destination file
    #[error("Unable to create {kind} file '{}': {source}", path.display())]
    Create {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Could not write to or flush the destination
    #[error("Unable to write {kind}: {source}")]
    Write {
        kind: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Task definition errors (loading, decoding, validation).
#[derive(Error, Debug)]
pub enum TaskError {
    /// The task file could not be read
    #[error("Unable to read task file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The task file is not valid JSON or misses required keys
    #[error("Malformed task file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Only JSON task files are understood
    #[error("Unsupported task file extension '{0}'")]
    UnsupportedFormat(String),

    /// An obfuscated password could not be decoded
    #[error("Invalid obfuscated password: {0}")]
    Codec(String),

    /// The task failed validation
    #[error("Activity is not valid: {0}")]
    Invalid(String),
}

/// Result type alias using shellfleet's Error.
pub type Result<T> = std::result::Result<T, Error>;
