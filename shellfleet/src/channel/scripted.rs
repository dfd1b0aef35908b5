//! Scripted in-memory shell for tests.
//!
//! Replays canned device replies keyed by the exact line sent, and records
//! every connect/send/close in a shared [`Journal`] so tests can inspect
//! the conversation after the shell has been consumed.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::ShellChannel;
use crate::error::{ChannelError, Result, TransportError};
use crate::transport::Credential;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Connect(String),
    Sent(String),
    Close,
}

/// Shared record of everything the shells of one test did.
#[derive(Debug, Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Sent(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn connects(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Connect(host) => Some(host),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn closes(&self) -> usize {
        self.events().iter().filter(|e| **e == Event::Close).count()
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedShell {
    banner: Vec<u8>,
    replies: HashMap<String, Vec<u8>>,
    unreachable: HashSet<String>,
    rejected: HashSet<String>,
    accept_nothing: bool,
    journal: Journal,
    pending: Vec<u8>,
    open: bool,
}

impl ScriptedShell {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Output waiting in the buffer right after connecting.
    pub(crate) fn banner(mut self, text: &str) -> Self {
        self.banner = text.as_bytes().to_vec();
        self
    }

    /// Output produced whenever `input` is sent.
    pub(crate) fn reply(mut self, input: &str, text: &str) -> Self {
        self.replies
            .insert(input.to_string(), text.as_bytes().to_vec());
        self
    }

    /// Raw bytes produced whenever `input` is sent.
    pub(crate) fn reply_bytes(mut self, input: &str, bytes: &[u8]) -> Self {
        self.replies.insert(input.to_string(), bytes.to_vec());
        self
    }

    /// Connecting to `host` fails.
    pub(crate) fn unreachable(mut self, host: &str) -> Self {
        self.unreachable.insert(host.to_string());
        self
    }

    /// Sending exactly `input` fails as if the remote had hung up.
    pub(crate) fn reject(mut self, input: &str) -> Self {
        self.rejected.insert(input.to_string());
        self
    }

    /// Every send reports zero bytes accepted.
    pub(crate) fn accept_nothing(mut self) -> Self {
        self.accept_nothing = true;
        self
    }

    pub(crate) fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl ShellChannel for ScriptedShell {
    async fn connect(&mut self, host: &str, _credential: &Credential) -> Result<()> {
        self.journal.push(Event::Connect(host.to_string()));
        if self.unreachable.contains(host) {
            return Err(TransportError::Timeout(Duration::from_secs(30)).into());
        }
        self.open = true;
        self.pending = self.banner.clone();
        Ok(())
    }

    async fn send(&mut self, text: &str) -> Result<usize> {
        if !self.open {
            return Err(ChannelError::NotOpen.into());
        }
        self.journal.push(Event::Sent(text.to_string()));
        if self.rejected.contains(text) {
            return Err(ChannelError::Closed.into());
        }
        if self.accept_nothing {
            return Ok(0);
        }
        if let Some(reply) = self.replies.get(text) {
            self.pending.extend_from_slice(reply);
        }
        Ok(text.len() + 1)
    }

    async fn drain_available(&mut self) -> Result<String> {
        if !self.open {
            return Err(ChannelError::NotOpen.into());
        }
        let pending = std::mem::take(&mut self.pending);
        Ok(String::from_utf8(pending).map_err(ChannelError::Decode)?)
    }

    async fn close(&mut self) {
        self.journal.push(Event::Close);
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
