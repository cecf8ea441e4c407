//! Endpoint identifiers: random, URL-safe, unguessable.

use std::borrow::Borrow;
use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::capture::errors::CaptureError;

/// Random bytes drawn for every key minted by the HTTP layer (192 bits).
pub const DEFAULT_KEY_BYTES: usize = 24;

/// Keys shorter than this would drop below 128 bits of entropy.
pub const MIN_KEY_BYTES: usize = 16;

/// Opaque tenant key. Doubles as the public path segment of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantKey(String);

impl TenantKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Any path segment is a valid key; unknown keys simply have no history.
impl From<String> for TenantKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TenantKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for TenantKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mint a new key from `byte_len` bytes of OS randomness, base64url encoded without padding.
pub fn generate(byte_len: usize) -> Result<TenantKey, CaptureError> {
    if byte_len < MIN_KEY_BYTES {
        return Err(CaptureError::KeyTooShort {
            requested: byte_len,
            min: MIN_KEY_BYTES,
        });
    }

    let mut buf = vec![0u8; byte_len];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| CaptureError::RandomSourceExhausted(e.to_string()))?;

    Ok(TenantKey(URL_SAFE_NO_PAD.encode(&buf)))
}
