//! PTY shell channel backed by a russh session.

use std::time::Duration;

use bytes::BytesMut;
use log::{debug, trace, warn};
use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use super::ShellChannel;
use crate::error::{ChannelError, Result};
use crate::transport::{Credential, SshOptions, SshTransport};

/// Interactive shell over SSH.
///
/// Created disconnected; [`connect`](ShellChannel::connect) opens the
/// connection and requests a PTY shell.
pub struct PtyShell {
    /// Options used when connecting.
    options: SshOptions,

    /// SSH transport (None when disconnected).
    transport: Option<SshTransport>,

    /// The shell channel (None when disconnected).
    channel: Option<Channel<Msg>>,

    /// Set once the remote end sent EOF or closed the channel.
    remote_closed: bool,
}

impl PtyShell {
    /// Create a disconnected shell with the given options.
    pub fn new(options: SshOptions) -> Self {
        Self {
            options,
            transport: None,
            channel: None,
            remote_closed: false,
        }
    }
}

impl ShellChannel for PtyShell {
    async fn connect(&mut self, host: &str, credential: &Credential) -> Result<()> {
        let transport = SshTransport::connect(host, &self.options, credential).await?;
        let channel = match transport.open_shell(&self.options).await {
            Ok(channel) => channel,
            Err(e) => {
                if let Err(close_err) = transport.close().await {
                    debug!("Closing {} after shell request failure: {}", host, close_err);
                }
                return Err(e);
            }
        };

        self.transport = Some(transport);
        self.channel = Some(channel);
        self.remote_closed = false;
        Ok(())
    }

    async fn send(&mut self, text: &str) -> Result<usize> {
        if self.remote_closed {
            return Err(ChannelError::Closed.into());
        }
        let channel = self.channel.as_ref().ok_or(ChannelError::NotOpen)?;

        let line = format!("{}\n", text);
        channel
            .data(line.as_bytes())
            .await
            .map_err(ChannelError::Ssh)?;

        Ok(line.len())
    }

    async fn drain_available(&mut self) -> Result<String> {
        let channel = self.channel.as_mut().ok_or(ChannelError::NotOpen)?;
        let mut pending = BytesMut::new();

        loop {
            // A zero timeout polls the queue once and never waits for new data
            match tokio::time::timeout(Duration::ZERO, channel.wait()).await {
                Ok(Some(ChannelMsg::Data { ref data })) => pending.extend_from_slice(data),
                Ok(Some(ChannelMsg::ExtendedData { ref data, .. })) => {
                    pending.extend_from_slice(data)
                }
                Ok(Some(ChannelMsg::Eof | ChannelMsg::Close)) | Ok(None) => {
                    self.remote_closed = true;
                    break;
                }
                Ok(Some(_)) => {}
                Err(_) => break,
            }
        }

        trace!("Drained {} bytes", pending.len());

        let text = String::from_utf8(pending.to_vec()).map_err(ChannelError::Decode)?;
        Ok(text)
    }

    async fn close(&mut self) {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                debug!("Channel close failed: {}", e);
            }
        }
        if let Some(transport) = self.transport.take() {
            let host = transport.host().to_string();
            if let Err(e) = transport.close().await {
                warn!("Disconnect from {} failed: {}", host, e);
            }
        }
    }

    fn is_open(&self) -> bool {
        self.channel.is_some() && !self.remote_closed
    }
}
