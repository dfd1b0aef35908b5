//! Channel layer: raw send/drain primitives over an interactive shell.
//!
//! There is no in-band framing on an interactive shell, so nothing here
//! decides when a reply is complete. [`Dialogue`] layers the fixed
//! "send, settle, drain" step on top of any [`ShellChannel`].

mod dialogue;
mod pty;
#[cfg(test)]
pub(crate) mod scripted;

pub use dialogue::Dialogue;
pub use pty::PtyShell;

use std::future::Future;

use crate::error::Result;
use crate::transport::{Credential, SshOptions};

/// One interactive remote-shell channel to one host.
pub trait ShellChannel: Send {
    /// Perform the handshake, authenticate and open the shell.
    fn connect(
        &mut self,
        host: &str,
        credential: &Credential,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Write `text` followed by a line terminator. Returns the number of
    /// bytes the channel accepted.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<usize>> + Send;

    /// Return everything currently buffered without waiting for more.
    ///
    /// An empty string is normal: slow devices often have nothing ready yet.
    fn drain_available(&mut self) -> impl Future<Output = Result<String>> + Send;

    /// Best-effort teardown of the channel and connection. Failures are
    /// logged, never returned.
    fn close(&mut self) -> impl Future<Output = ()> + Send;

    /// Whether the channel is currently open.
    fn is_open(&self) -> bool;
}

/// Creates a fresh, unconnected [`ShellChannel`] for each target.
pub trait ShellFactory {
    /// The channel type produced.
    type Shell: ShellChannel;

    /// Create a new disconnected channel.
    fn create(&self) -> Self::Shell;
}

impl ShellFactory for SshOptions {
    type Shell = PtyShell;

    fn create(&self) -> PtyShell {
        PtyShell::new(self.clone())
    }
}

impl<F, C> ShellFactory for F
where
    F: Fn() -> C,
    C: ShellChannel,
{
    type Shell = C;

    fn create(&self) -> C {
        self()
    }
}
