//! The fixed "send, settle, drain" protocol step.
//!
//! Nothing on an interactive shell says when the device has finished
//! answering. Every step therefore waits a fixed settle interval after
//! sending and then takes whatever has arrived.

use std::time::Duration;

use log::trace;
use secrecy::{ExposeSecret, SecretString};

use super::ShellChannel;
use crate::error::{ChannelError, Result};

/// Drives a [`ShellChannel`] one settle-delimited step at a time.
pub struct Dialogue<'a, C: ShellChannel> {
    channel: &'a mut C,
    settle: Duration,
}

impl<'a, C: ShellChannel> Dialogue<'a, C> {
    /// Create a dialogue over `channel` waiting `settle` after each send.
    pub fn new(channel: &'a mut C, settle: Duration) -> Self {
        Self { channel, settle }
    }

    /// Take whatever output is buffered right now.
    pub async fn drain(&mut self) -> Result<String> {
        self.channel.drain_available().await
    }

    /// Throw away buffered output such as banners or stale prompts.
    pub async fn discard_pending(&mut self) -> Result<()> {
        let stale = self.channel.drain_available().await?;
        if !stale.is_empty() {
            trace!("Discarded {} bytes of pending output", stale.len());
        }
        Ok(())
    }

    /// Send a line and wait out the settle interval.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        trace!("Sending: {}", text);
        self.write_line(text).await
    }

    /// Send a secret line (never logged) and wait out the settle interval.
    pub async fn send_secret(&mut self, secret: &SecretString) -> Result<()> {
        trace!("Sending: <hidden>");
        self.write_line(secret.expose_secret()).await
    }

    /// Send a line, wait, and return what the device answered.
    pub async fn exchange(&mut self, text: &str) -> Result<String> {
        self.send(text).await?;
        self.drain().await
    }

    /// Send a secret line, wait, and return what the device answered.
    pub async fn exchange_secret(&mut self, secret: &SecretString) -> Result<String> {
        self.send_secret(secret).await?;
        self.drain().await
    }

    async fn write_line(&mut self, text: &str) -> Result<()> {
        let accepted = self.channel.send(text).await?;
        if accepted == 0 {
            return Err(ChannelError::NothingSent.into());
        }
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
        Ok(())
    }
}
