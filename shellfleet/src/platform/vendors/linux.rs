//! Unix-like hosts.
//!
//! Login is the SSH handshake itself; escalation goes through `su` and is
//! confirmed by `root` showing up in the prompt.

use secrecy::SecretString;

use super::password_escalation;
use crate::channel::{Dialogue, ShellChannel};
use crate::error::Result;
use crate::platform::PromptSet;

/// `su`, answer the password prompt, expect a root prompt.
pub async fn escalate<C: ShellChannel>(
    dialogue: &mut Dialogue<'_, C>,
    password: &SecretString,
    prompts: &PromptSet,
) -> Result<()> {
    password_escalation(dialogue, "su", &prompts.password, password, &prompts.root).await
}

/// Type `logout` before the connection is dropped.
pub async fn logout<C: ShellChannel>(dialogue: &mut Dialogue<'_, C>) -> Result<()> {
    dialogue.send("logout").await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::channel::scripted::ScriptedShell;
    use crate::error::{Error, SessionError};
    use crate::transport::Credential;

    fn root_password() -> SecretString {
        SecretString::from("toor".to_string())
    }

    async fn open(shell: ScriptedShell) -> ScriptedShell {
        let mut shell = shell;
        shell
            .connect("box", &Credential::new("ops", "ops"))
            .await
            .unwrap();
        shell
    }

    #[tokio::test]
    async fn test_su_success() {
        let mut shell = open(
            ScriptedShell::new()
                .banner("ops@box:~$ ")
                .reply("su", "Password: ")
                .reply("toor", "\r\nroot@box:/home/ops# "),
        )
        .await;
        let mut dialogue = Dialogue::new(&mut shell, Duration::ZERO);

        escalate(&mut dialogue, &root_password(), &PromptSet::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_su_authentication_failure() {
        let mut shell = open(
            ScriptedShell::new()
                .reply("su", "Password: ")
                .reply("toor", "\r\nsu: Authentication failure\r\nops@box:~$ "),
        )
        .await;
        let mut dialogue = Dialogue::new(&mut shell, Duration::ZERO);

        let err = escalate(&mut dialogue, &root_password(), &PromptSet::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::PromptNotSeen { step: "password", .. })
        ));
    }

    #[tokio::test]
    async fn test_logout_types_logout() {
        let mut shell = open(ScriptedShell::new()).await;
        let journal = shell.journal();
        let mut dialogue = Dialogue::new(&mut shell, Duration::ZERO);

        logout(&mut dialogue).await.unwrap();
        assert_eq!(journal.sent(), vec!["logout".to_string()]);
    }
}
