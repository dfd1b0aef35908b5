//! Vendor-specific login, escalation and logout dialogues.

pub mod cisco_ios;
pub mod cisco_wlc;
pub mod generic;
pub mod linux;

use secrecy::SecretString;

use crate::channel::{Dialogue, ShellChannel};
use crate::error::{Result, SessionError};
use crate::platform::contains_marker;

/// Shared shape of `enable` and `su`: send the command, expect a password
/// prompt, answer it, then expect `success_marker` in the reply.
pub(crate) async fn password_escalation<C: ShellChannel>(
    dialogue: &mut Dialogue<'_, C>,
    command: &'static str,
    password_prompt: &str,
    password: &SecretString,
    success_marker: &str,
) -> Result<()> {
    dialogue.discard_pending().await?;

    let reply = dialogue.exchange(command).await?;
    if !contains_marker(&reply, password_prompt) {
        return Err(SessionError::PromptNotSeen {
            step: command,
            marker: password_prompt.to_string(),
        }
        .into());
    }

    let reply = dialogue.exchange_secret(password).await?;
    if !contains_marker(&reply, success_marker) {
        return Err(SessionError::PromptNotSeen {
            step: "password",
            marker: success_marker.to_string(),
        }
        .into());
    }

    Ok(())
}
