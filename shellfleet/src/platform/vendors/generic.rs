//! Generic device: the SSH handshake is the whole login.
//!
//! No escalation concept and no logout dialogue; closing the transport is
//! enough.

use crate::channel::{Dialogue, ShellChannel};
use crate::error::Result;

/// Nothing to do after the handshake.
pub async fn login<C: ShellChannel>(_dialogue: &mut Dialogue<'_, C>) -> Result<()> {
    Ok(())
}

/// Always succeeds.
pub async fn escalate<C: ShellChannel>(_dialogue: &mut Dialogue<'_, C>) -> Result<()> {
    Ok(())
}

/// Nothing is typed before the connection is dropped.
pub async fn logout<C: ShellChannel>(_dialogue: &mut Dialogue<'_, C>) -> Result<()> {
    Ok(())
}
