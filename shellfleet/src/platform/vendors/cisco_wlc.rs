//! WLC-like wireless controllers.
//!
//! The controller application asks for credentials a second time after the
//! SSH handshake has already authenticated, and asks whether to save the
//! configuration on the way out. Changes are never saved on logout; put
//! `save config` and `y` in the command list to keep them.

use log::debug;

use crate::channel::{Dialogue, ShellChannel};
use crate::error::{Result, SessionError};
use crate::platform::{PromptSet, contains_marker};
use crate::transport::Credential;

/// Disables paging so long outputs arrive in one piece.
pub const DISABLE_PAGING: &str = "config paging disable";

/// Answer the application-level `User:` / `Password:` prompts and expect
/// the controller prompt.
pub async fn login<C: ShellChannel>(
    dialogue: &mut Dialogue<'_, C>,
    credential: &Credential,
    prompts: &PromptSet,
) -> Result<()> {
    dialogue.send(&credential.username).await?;
    dialogue.discard_pending().await?;

    let reply = dialogue.exchange_secret(&credential.password).await?;
    if !contains_marker(&reply, &prompts.controller) {
        return Err(SessionError::PromptNotSeen {
            step: "controller login",
            marker: prompts.controller.clone(),
        }
        .into());
    }

    dialogue.send(DISABLE_PAGING).await
}

/// `end`, `exit`, and decline saving if asked.
pub async fn logout<C: ShellChannel>(
    dialogue: &mut Dialogue<'_, C>,
    prompts: &PromptSet,
) -> Result<()> {
    dialogue.send("end").await?;
    let reply = dialogue.exchange("exit").await?;

    if contains_marker(&reply, &prompts.save_confirm) {
        debug!("Declining to save controller configuration");
        dialogue.send("No").await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::channel::scripted::ScriptedShell;
    use crate::error::Error;

    fn credential() -> Credential {
        Credential::new("admin", "wlcpass")
    }

    async fn open(shell: ScriptedShell) -> ScriptedShell {
        let mut shell = shell;
        shell.connect("wlc", &credential()).await.unwrap();
        shell
    }

    #[tokio::test]
    async fn test_login_resubmits_credentials() {
        let mut shell = open(
            ScriptedShell::new()
                .banner("(Cisco Controller)\r\nUser: ")
                .reply("admin", "admin\r\nPassword:")
                .reply("wlcpass", "\r\n(Cisco Controller) >"),
        )
        .await;
        let journal = shell.journal();
        let mut dialogue = Dialogue::new(&mut shell, Duration::ZERO);

        login(&mut dialogue, &credential(), &PromptSet::default())
            .await
            .unwrap();
        assert_eq!(
            journal.sent(),
            vec![
                "admin".to_string(),
                "wlcpass".to_string(),
                DISABLE_PAGING.to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_login_without_controller_prompt_fails() {
        let mut shell = open(
            ScriptedShell::new()
                .reply("admin", "Password:")
                .reply("wlcpass", "\r\nUser: "),
        )
        .await;
        let journal = shell.journal();
        let mut dialogue = Dialogue::new(&mut shell, Duration::ZERO);

        let err = login(&mut dialogue, &credential(), &PromptSet::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::PromptNotSeen { .. })
        ));
        assert!(!journal.sent().contains(&DISABLE_PAGING.to_string()));
    }

    #[tokio::test]
    async fn test_logout_declines_save() {
        let mut shell = open(
            ScriptedShell::new().reply("exit", "Configuration modified.\r\nWould you like to save? (y/N)"),
        )
        .await;
        let journal = shell.journal();
        let mut dialogue = Dialogue::new(&mut shell, Duration::ZERO);

        logout(&mut dialogue, &PromptSet::default()).await.unwrap();
        assert_eq!(
            journal.sent(),
            vec!["end".to_string(), "exit".to_string(), "No".to_string()]
        );
    }

    #[tokio::test]
    async fn test_logout_without_question() {
        let mut shell = open(ScriptedShell::new().reply("exit", "Connection closed")).await;
        let journal = shell.journal();
        let mut dialogue = Dialogue::new(&mut shell, Duration::ZERO);

        logout(&mut dialogue, &PromptSet::default()).await.unwrap();
        assert_eq!(journal.sent(), vec!["end".to_string(), "exit".to_string()]);
    }
}
