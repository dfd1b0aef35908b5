//! Command runner: send each command, settle, drain, append to the sink.

use std::io::Write;

use log::debug;

use crate::channel::{Dialogue, ShellChannel};
use crate::error::{Result, SinkError};

/// Run `commands` in order, appending everything drained to `sink`.
///
/// Output already waiting on the channel is written first so the block
/// starts at the current prompt. Stops at the first send failure or
/// undecodable chunk; whatever reached the sink before that stays there.
pub async fn run_commands<C, W>(
    dialogue: &mut Dialogue<'_, C>,
    commands: &[String],
    sink: &mut W,
) -> Result<()>
where
    C: ShellChannel,
    W: Write + ?Sized,
{
    let pending = dialogue.drain().await?;
    append(sink, &pending)?;

    for command in commands {
        debug!("Running: {}", command);
        let output = dialogue.exchange(command).await?;
        append(sink, &output)?;
    }

    Ok(())
}

fn append<W: Write + ?Sized>(sink: &mut W, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    sink.write_all(text.as_bytes())
        .map_err(|source| SinkError::Write {
            kind: "output",
            source,
        })?;
    Ok(())
}
