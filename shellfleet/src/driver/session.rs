//! Per-target device session.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use log::{debug, info};
use secrecy::SecretString;

use super::runner;
use crate::channel::{Dialogue, ShellChannel};
use crate::error::{ChannelError, Result, SessionError};
use crate::platform::{DeviceKind, PromptSet};
use crate::transport::Credential;

/// Settle intervals waited after each send, before draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// After login, escalation and logout steps.
    pub dialogue_settle: Duration,

    /// After each command of the command sequence.
    pub command_settle: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            dialogue_settle: Duration::from_secs(1),
            command_settle: Duration::from_secs(2),
        }
    }
}

impl SessionTiming {
    /// Create a timing with explicit settle intervals.
    pub fn new(dialogue_settle: Duration, command_settle: Duration) -> Self {
        Self {
            dialogue_settle,
            command_settle,
        }
    }
}

/// Lifecycle state of a [`DeviceSession`].
///
/// ```text
/// Disconnected -> Connected -> LoggedIn -> [Escalated] -> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    LoggedIn,
    Escalated,
    Closed,
}

impl SessionState {
    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connected => "connected",
            SessionState::LoggedIn => "logged in",
            SessionState::Escalated => "escalated",
            SessionState::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One device session: one target, one run, one shell channel.
///
/// Built fully populated and never reused: once closed, a new session
/// must be created for the next target.
pub struct DeviceSession<C: ShellChannel> {
    host: String,
    channel: C,
    credential: Credential,
    kind: DeviceKind,
    timing: SessionTiming,
    prompts: PromptSet,
    state: SessionState,
}

impl<C: ShellChannel> DeviceSession<C> {
    /// Create a disconnected session for `host` over `channel`.
    pub fn new(
        host: impl Into<String>,
        channel: C,
        kind: DeviceKind,
        credential: Credential,
    ) -> Self {
        Self {
            host: host.into(),
            channel,
            credential,
            kind,
            timing: SessionTiming::default(),
            prompts: PromptSet::default(),
            state: SessionState::Disconnected,
        }
    }

    /// Set the settle intervals.
    pub fn with_timing(mut self, timing: SessionTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Set the prompt markers.
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Target host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Device variant.
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Open the shell channel.
    pub async fn connect(&mut self) -> Result<()> {
        self.require("connect", &[SessionState::Disconnected])?;
        self.channel.connect(&self.host, &self.credential).await?;
        self.state = SessionState::Connected;
        debug!("{}: connected", self.host);
        Ok(())
    }

    /// Run the device's post-connect login dialogue.
    pub async fn login(&mut self) -> Result<()> {
        self.require("login", &[SessionState::Connected])?;
        let mut dialogue = Dialogue::new(&mut self.channel, self.timing.dialogue_settle);
        self.kind
            .login(&mut dialogue, &self.credential, &self.prompts)
            .await?;
        self.state = SessionState::LoggedIn;
        debug!("{}: logged in ({})", self.host, self.kind);
        Ok(())
    }

    /// Escalate privileges with `password`.
    pub async fn escalate(&mut self, password: &SecretString) -> Result<()> {
        self.require("escalate", &[SessionState::LoggedIn])?;
        let mut dialogue = Dialogue::new(&mut self.channel, self.timing.dialogue_settle);
        self.kind
            .escalate(&mut dialogue, password, &self.prompts)
            .await?;
        self.state = SessionState::Escalated;
        info!("{}: privileges escalated", self.host);
        Ok(())
    }

    /// Run the command sequence, appending output to `sink`.
    pub async fn run_commands<W: Write + ?Sized>(
        &mut self,
        commands: &[String],
        sink: &mut W,
    ) -> Result<()> {
        self.require(
            "run commands",
            &[SessionState::LoggedIn, SessionState::Escalated],
        )?;
        let mut dialogue = Dialogue::new(&mut self.channel, self.timing.command_settle);
        runner::run_commands(&mut dialogue, commands, sink).await
    }

    /// Run the vendor logout dialogue, then close the channel.
    ///
    /// The channel is closed even when the dialogue fails; the dialogue's
    /// error is still returned. A shell the remote already closed fails
    /// without sending anything.
    pub async fn logout(&mut self) -> Result<()> {
        let dialogue_result = match self.state {
            SessionState::LoggedIn | SessionState::Escalated if !self.channel.is_open() => {
                Err(ChannelError::Closed.into())
            }
            SessionState::LoggedIn | SessionState::Escalated => {
                let mut dialogue = Dialogue::new(&mut self.channel, self.timing.dialogue_settle);
                self.kind.logout(&mut dialogue, &self.prompts).await
            }
            _ => Ok(()),
        };
        self.close().await;
        dialogue_result
    }

    /// Close the channel without any dialogue.
    pub async fn close(&mut self) {
        if matches!(
            self.state,
            SessionState::Disconnected | SessionState::Closed
        ) {
            return;
        }
        self.channel.close().await;
        self.state = SessionState::Closed;
        debug!("{}: closed", self.host);
    }

    fn require(&self, operation: &'static str, allowed: &[SessionState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state.as_str(),
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::scripted::{Event, ScriptedShell};
    use crate::error::Error;

    fn session(shell: ScriptedShell, kind: DeviceKind) -> DeviceSession<ScriptedShell> {
        DeviceSession::new("10.0.0.1", shell, kind, Credential::new("admin", "secret"))
            .with_timing(SessionTiming::new(Duration::ZERO, Duration::ZERO))
    }

    #[tokio::test]
    async fn test_full_lifecycle_ios() {
        let shell = ScriptedShell::new()
            .banner("router>")
            .reply("enable", "Password: ")
            .reply("en4ble", "router#")
            .reply("show version", "IOS 15.2\r\nrouter#");
        let journal = shell.journal();
        let mut session = session(shell, DeviceKind::CiscoIos);

        session.connect().await.unwrap();
        assert_eq!(session.state(), SessionState::Connected);
        session.login().await.unwrap();
        assert_eq!(session.state(), SessionState::LoggedIn);
        session
            .escalate(&SecretString::from("en4ble".to_string()))
            .await
            .unwrap();
        assert_eq!(session.state(), SessionState::Escalated);

        let mut sink = Vec::new();
        session
            .run_commands(&["show version".to_string()], &mut sink)
            .await
            .unwrap();
        assert_eq!(sink, b"IOS 15.2\r\nrouter#");

        session.logout().await.unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(
            journal.sent(),
            vec!["terminal length 0", "enable", "en4ble", "show version", "end", "exit"]
        );
        assert_eq!(journal.events().last(), Some(&Event::Close));
    }

    #[tokio::test]
    async fn test_connect_failure_stays_disconnected() {
        let mut session = session(ScriptedShell::new().unreachable("10.0.0.1"), DeviceKind::Generic);

        assert!(matches!(
            session.connect().await.unwrap_err(),
            Error::Transport(_)
        ));
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_commands_require_login() {
        let mut session = session(ScriptedShell::new(), DeviceKind::Generic);
        session.connect().await.unwrap();

        let err = session
            .run_commands(&["uptime".to_string()], &mut Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::InvalidState { state: "connected", .. })
        ));
    }

    #[tokio::test]
    async fn test_session_is_single_use() {
        let mut session = session(ScriptedShell::new(), DeviceKind::Generic);
        session.connect().await.unwrap();
        session.login().await.unwrap();
        session.logout().await.unwrap();

        assert!(session.connect().await.is_err());
    }

    #[tokio::test]
    async fn test_logout_closes_even_when_dialogue_fails() {
        let shell = ScriptedShell::new();
        let journal = shell.journal();
        let mut session = session(shell, DeviceKind::Linux);
        session.connect().await.unwrap();
        session.login().await.unwrap();

        // Simulate the remote dropping the shell before logout
        session.channel.close().await;

        assert!(matches!(
            session.logout().await.unwrap_err(),
            Error::Channel(ChannelError::Closed)
        ));
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(journal.closes(), 2);
        assert!(journal.sent().is_empty());
    }

    #[tokio::test]
    async fn test_close_after_failed_login_sends_nothing() {
        let shell = ScriptedShell::new().reply("wlcpass", "User: ");
        let journal = shell.journal();
        let mut session = DeviceSession::new(
            "wlc",
            shell,
            DeviceKind::CiscoWlc,
            Credential::new("admin", "wlcpass"),
        )
        .with_timing(SessionTiming::new(Duration::ZERO, Duration::ZERO));

        session.connect().await.unwrap();
        assert!(session.login().await.is_err());
        assert_eq!(session.state(), SessionState::Connected);

        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(journal.sent(), vec!["admin", "wlcpass"]);
    }
}
