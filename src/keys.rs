//! Key normalization
//!
//! Wallets hand out public keys in three shapes:
//!
//!   compressed    (0x02 | 0x03) || x      33 bytes
//!   raw           x || y                  64 bytes
//!   uncompressed  0x04 || x || y          65 bytes
//!
//! The engine only ever sees the 65-byte form. The lenient normalizer
//! used by [`crate::KeyExchange`] widens and decompresses; the strict one
//! used by the engine refuses raw 64-byte coordinates so internal callers
//! fail loudly.

use alloc::string::String;
use alloc::vec::Vec;

use zeroize::Zeroizing;

use crate::curve::{CurveProvider, SoftwareCurve};
use crate::error::{EciesError, Result};
use crate::wire::{
    COMPRESSED_PUBLIC_KEY_BYTES, PRIVATE_KEY_BYTES, PUBLIC_KEY_BYTES, RAW_PUBLIC_KEY_BYTES,
    UNCOMPRESSED_PREFIX,
};

/// Caller-supplied key input: hex text or raw bytes.
#[derive(Debug, Clone, Copy)]
pub enum KeyMaterial<'a> {
    /// Hex string, `0x` prefix optional.
    Hex(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for KeyMaterial<'a> {
    fn from(s: &'a str) -> Self {
        Self::Hex(s)
    }
}

impl<'a> From<&'a String> for KeyMaterial<'a> {
    fn from(s: &'a String) -> Self {
        Self::Hex(s.as_str())
    }
}

impl<'a> From<&'a Zeroizing<String>> for KeyMaterial<'a> {
    fn from(s: &'a Zeroizing<String>) -> Self {
        Self::Hex(s.as_str())
    }
}

impl<'a> From<&'a [u8]> for KeyMaterial<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::Bytes(b)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for KeyMaterial<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        Self::Bytes(b)
    }
}

impl<'a> From<&'a Vec<u8>> for KeyMaterial<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Self::Bytes(b.as_slice())
    }
}

impl<'a> KeyMaterial<'a> {
    /// Decoded key bytes, copied into a buffer that is wiped on drop.
    fn decode(self) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Self::Bytes(b) => Ok(Zeroizing::new(b.to_vec())),
            Self::Hex(s) => hex::decode(strip_hex_prefix(s.trim()))
                .map(Zeroizing::new)
                .map_err(|_| EciesError::key("not valid hex")),
        }
    }
}

/// Drop a leading `0x` / `0X`.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// Lenient public key normalization (orchestration layer).
///
/// 64-byte raw coordinates gain the 0x04 marker, compressed keys are
/// decompressed, 65-byte keys pass through unchanged.
pub fn normalize_public_key<'a>(key: impl Into<KeyMaterial<'a>>) -> Result<[u8; PUBLIC_KEY_BYTES]> {
    let bytes = key.into().decode()?;

    match bytes.len() {
        PUBLIC_KEY_BYTES => {
            let mut out = [0u8; PUBLIC_KEY_BYTES];
            out.copy_from_slice(&bytes);
            Ok(out)
        }
        RAW_PUBLIC_KEY_BYTES => {
            let mut out = [0u8; PUBLIC_KEY_BYTES];
            out[0] = UNCOMPRESSED_PREFIX;
            out[1..].copy_from_slice(&bytes);
            Ok(out)
        }
        COMPRESSED_PUBLIC_KEY_BYTES if matches!(bytes[0], 0x02 | 0x03) => SoftwareCurve::decompress(&bytes),
        _ => Err(EciesError::key("public key must be 33, 64 or 65 bytes")),
    }
}

/// Strict public key check (engine layer).
///
/// Only the 65-byte uncompressed form is accepted. Raw 64-byte coordinates
/// get their own error so callers can tell they should go through
/// [`normalize_public_key`] instead.
pub fn normalize_public_key_strict<'a>(key: impl Into<KeyMaterial<'a>>) -> Result<[u8; PUBLIC_KEY_BYTES]> {
    let bytes = key.into().decode()?;

    match bytes.len() {
        RAW_PUBLIC_KEY_BYTES => Err(EciesError::UnsupportedKeyLength),
        PUBLIC_KEY_BYTES if bytes[0] == UNCOMPRESSED_PREFIX => {
            let mut out = [0u8; PUBLIC_KEY_BYTES];
            out.copy_from_slice(&bytes);
            Ok(out)
        }
        PUBLIC_KEY_BYTES => Err(EciesError::key("uncompressed public key must start with 0x04")),
        _ => Err(EciesError::key("public key must be 65 bytes uncompressed")),
    }
}

/// Private scalar normalization: exactly 32 bytes after prefix stripping.
pub fn normalize_private_key<'a>(key: impl Into<KeyMaterial<'a>>) -> Result<Zeroizing<[u8; PRIVATE_KEY_BYTES]>> {
    let bytes = key.into().decode()?;

    if bytes.len() != PRIVATE_KEY_BYTES {
        return Err(EciesError::key("private key must be 32 bytes"));
    }

    let mut out = Zeroizing::new([0u8; PRIVATE_KEY_BYTES]);
    out.copy_from_slice(&bytes);
    Ok(out)
}
