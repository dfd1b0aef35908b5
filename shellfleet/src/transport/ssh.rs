//! Password-authenticated SSH connections over russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::PublicKey;
use russh::{Channel, Disconnect};
use secrecy::ExposeSecret;

use super::config::{Credential, HostKeyVerification, SshOptions};
use crate::error::{Result, TransportError};

/// One authenticated SSH connection to a single host.
pub struct SshTransport {
    handle: Handle<FleetClient>,
    host: String,
}

impl SshTransport {
    /// Handshake with `host`, check its key and log in with `credential`.
    ///
    /// Both the handshake and the authentication are bounded by the
    /// options' timeout.
    pub async fn connect(host: &str, options: &SshOptions, credential: &Credential) -> Result<Self> {
        let config = Arc::new(client::Config {
            inactivity_timeout: Some(options.timeout),
            ..Default::default()
        });
        let client = FleetClient {
            policy: HostKeyPolicy {
                mode: options.host_key_verification.clone(),
                host: host.to_string(),
                port: options.port,
                known_hosts: options.known_hosts_path.clone(),
            },
            rejection: Arc::default(),
        };
        let rejection = Arc::clone(&client.rejection);

        debug!("Connecting to {}:{}", host, options.port);
        let handshake = client::connect(config, (host, options.port), client);
        let mut handle = match tokio::time::timeout(options.timeout, handshake).await {
            Err(_) => return Err(TransportError::Timeout(options.timeout).into()),
            Ok(Err(e)) => {
                // A rejected host key surfaces from russh as a generic error
                let detail = rejection.lock().ok().and_then(|mut r| r.take());
                return Err(detail.unwrap_or(TransportError::Ssh(e)).into());
            }
            Ok(Ok(handle)) => handle,
        };

        let auth = handle.authenticate_password(
            credential.username.as_str(),
            credential.password.expose_secret(),
        );
        let accepted = tokio::time::timeout(options.timeout, auth)
            .await
            .map_err(|_| TransportError::Timeout(options.timeout))?
            .map_err(TransportError::Ssh)?
            .success();
        if !accepted {
            return Err(TransportError::AuthenticationFailed {
                user: credential.username.clone(),
            }
            .into());
        }

        debug!("Logged in to {} as {}", host, credential.username);
        Ok(Self {
            handle,
            host: host.to_string(),
        })
    }

    /// Open a session channel, request a PTY and start the login shell.
    pub async fn open_shell(&self, options: &SshOptions) -> Result<Channel<Msg>> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;
        channel
            .request_pty(
                true,
                "vt100",
                options.terminal_width,
                options.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(TransportError::Ssh)?;
        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;
        Ok(channel)
    }

    /// Host this transport is connected to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Send a disconnect and drop the connection.
    pub async fn close(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// How one host's key is checked against known_hosts.
struct HostKeyPolicy {
    mode: HostKeyVerification,
    host: String,
    port: u16,
    known_hosts: Option<PathBuf>,
}

impl HostKeyPolicy {
    fn verify(&self, key: &PublicKey) -> std::result::Result<(), TransportError> {
        if self.mode == HostKeyVerification::Disabled {
            return Ok(());
        }

        if self.is_known(key)? {
            return Ok(());
        }

        match self.mode {
            HostKeyVerification::AcceptNew => {
                // Learning is best effort; the key itself is accepted
                match self.remember(key) {
                    Ok(()) => info!("Added host key for {}:{}", self.host, self.port),
                    Err(e) => warn!("Cannot record host key for {}: {}", self.host, e),
                }
                Ok(())
            }
            _ => Err(TransportError::HostKeyUnknown {
                host: self.host.clone(),
                port: self.port,
            }),
        }
    }

    /// `Ok(false)` when the host is absent, an error when its key changed.
    fn is_known(&self, key: &PublicKey) -> std::result::Result<bool, TransportError> {
        let lookup = match &self.known_hosts {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, key, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, key),
        };
        lookup.map_err(|e| match e {
            russh::keys::Error::KeyChanged { line } => TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            },
            other => TransportError::KnownHosts(other.to_string()),
        })
    }

    fn remember(&self, key: &PublicKey) -> std::result::Result<(), TransportError> {
        let learned = match &self.known_hosts {
            Some(path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, key, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, key),
        };
        learned.map_err(|e| TransportError::KnownHosts(e.to_string()))
    }
}

/// russh client callbacks for one connection.
struct FleetClient {
    policy: HostKeyPolicy,

    /// Why the host key was refused, picked up by `connect`.
    rejection: Arc<Mutex<Option<TransportError>>>,
}

impl client::Handler for FleetClient {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.policy.verify(server_public_key) {
            Ok(()) => Ok(true),
            Err(e) => {
                if let Ok(mut slot) = self.rejection.lock() {
                    *slot = Some(e);
                }
                Ok(false)
            }
        }
    }
}
