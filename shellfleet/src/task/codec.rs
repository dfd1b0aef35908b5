//! Reversible password scrambling for task files.
//!
//! The UTF-8 bytes of the secret are XORed with the username's bytes
//! (repeated as needed) and hex-encoded. This keeps passwords from being
//! readable at a glance; it is not encryption.

use crate::error::TaskError;

/// Scramble `secret` with `key` (the task's username).
pub fn encode(secret: &str, key: &str) -> Result<String, TaskError> {
    let mixed = xor_cycle(secret.as_bytes(), key)?;
    Ok(hex::encode(mixed))
}

/// Recover the secret scrambled by [`encode`].
pub fn decode(obfuscated: &str, key: &str) -> Result<String, TaskError> {
    let mixed = hex::decode(obfuscated.trim()).map_err(|e| TaskError::Codec(e.to_string()))?;
    let plain = xor_cycle(&mixed, key)?;
    String::from_utf8(plain).map_err(|e| TaskError::Codec(e.to_string()))
}

fn xor_cycle(data: &[u8], key: &str) -> Result<Vec<u8>, TaskError> {
    if key.is_empty() {
        return Err(TaskError::Codec("username is empty".to_string()));
    }
    Ok(data
        .iter()
        .zip(key.as_bytes().iter().cycle())
        .map(|(d, k)| d ^ k)
        .collect())
}
