//! IOS-like routers and switches.
//!
//! ```text
//! router>  enable
//! Password: ********
//! router#  ... commands ...
//! router#  end
//! router#  exit
//! ```

use secrecy::SecretString;

use super::password_escalation;
use crate::channel::{Dialogue, ShellChannel};
use crate::error::Result;
use crate::platform::PromptSet;

/// Disables paging so long outputs arrive in one piece.
pub const DISABLE_PAGING: &str = "terminal length 0";

/// Clear the banner and disable paging.
pub async fn login<C: ShellChannel>(dialogue: &mut Dialogue<'_, C>) -> Result<()> {
    dialogue.discard_pending().await?;
    dialogue.send(DISABLE_PAGING).await
}

/// `enable`, answer the password prompt, expect the `#` prompt.
pub async fn escalate<C: ShellChannel>(
    dialogue: &mut Dialogue<'_, C>,
    password: &SecretString,
    prompts: &PromptSet,
) -> Result<()> {
    password_escalation(dialogue, "enable", &prompts.password, password, &prompts.enabled).await
}

/// Leave any configuration mode, then exit the CLI.
pub async fn logout<C: ShellChannel>(dialogue: &mut Dialogue<'_, C>) -> Result<()> {
    dialogue.discard_pending().await?;
    dialogue.send("end").await?;
    dialogue.send("exit").await
}
