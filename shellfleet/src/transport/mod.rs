//! SSH transport layer wrapping russh.
//!
//! This module provides the low-level SSH connection management,
//! handling connection setup, password authentication, and opening the
//! interactive PTY shell that [`PtyShell`](crate::channel::PtyShell) drives.

pub mod config;
mod ssh;

pub use config::{Credential, HostKeyVerification, SshOptions};
pub use ssh::SshTransport;
