//! Wire format
//!
//! Format:
//!   iv[16] || ephemeral_pk[65] || ciphertext[..] || mac[32]
//!
//! No length prefixes; the ciphertext is whatever sits between the fixed
//! header and the fixed trailer.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{EciesError, Result};

// ---------------------------------------------------------------------------
// Component sizes
// ---------------------------------------------------------------------------

pub const IV_BYTES: usize = 16;
pub const AES_BLOCK_BYTES: usize = 16;
pub const AES_KEY_BYTES: usize = 32;
pub const MAC_BYTES: usize = 32;
pub const MAC_KEY_BYTES: usize = 32;

/// SEC1 uncompressed point marker.
pub const UNCOMPRESSED_PREFIX: u8 = 0x04;

/// Uncompressed public key: 0x04 || x[32] || y[32]
pub const PUBLIC_KEY_BYTES: usize = 65;
/// Raw coordinate pair without a format marker: x[32] || y[32]
pub const RAW_PUBLIC_KEY_BYTES: usize = 64;
/// Compressed public key: (0x02 | 0x03) || x[32]
pub const COMPRESSED_PUBLIC_KEY_BYTES: usize = 33;
pub const PRIVATE_KEY_BYTES: usize = 32;

/// Shared secret (ECDH x-coordinate)
pub const SHARED_SECRET_BYTES: usize = 32;

/// Header size: iv + ephemeral_pk
pub const HEADER_BYTES: usize = IV_BYTES + PUBLIC_KEY_BYTES; // 81

/// Smallest blob that can be sliced: header + mac
pub const MIN_ENVELOPE_BYTES: usize = HEADER_BYTES + MAC_BYTES; // 113

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The four fields of an encrypted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    iv: [u8; IV_BYTES],
    ephemeral_public_key: [u8; PUBLIC_KEY_BYTES],
    ciphertext: Vec<u8>,
    mac: [u8; MAC_BYTES],
}

impl EncryptedEnvelope {
    pub fn from_parts(
        iv: [u8; IV_BYTES],
        ephemeral_public_key: [u8; PUBLIC_KEY_BYTES],
        ciphertext: Vec<u8>,
        mac: [u8; MAC_BYTES],
    ) -> Self {
        Self {
            iv,
            ephemeral_public_key,
            ciphertext,
            mac,
        }
    }

    pub fn iv(&self) -> &[u8; IV_BYTES] {
        &self.iv
    }

    pub fn ephemeral_public_key(&self) -> &[u8; PUBLIC_KEY_BYTES] {
        &self.ephemeral_public_key
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn mac(&self) -> &[u8; MAC_BYTES] {
        &self.mac
    }

    /// Length of the serialized form.
    pub fn encoded_len(&self) -> usize {
        MIN_ENVELOPE_BYTES + self.ciphertext.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serialize(self)
    }

    pub fn from_bytes(blob: &[u8]) -> Result<Self> {
        parse(blob)
    }
}

/// Concatenate `iv || ephemeral_pk || ciphertext || mac`.
pub fn serialize(envelope: &EncryptedEnvelope) -> Vec<u8> {
    let mut out = Vec::with_capacity(envelope.encoded_len());
    out.extend_from_slice(&envelope.iv);
    out.extend_from_slice(&envelope.ephemeral_public_key);
    out.extend_from_slice(&envelope.ciphertext);
    out.extend_from_slice(&envelope.mac);
    out
}

/// Split a wire blob back into its fields.
///
/// The length check happens before any slicing.
pub fn parse(blob: &[u8]) -> Result<EncryptedEnvelope> {
    if blob.len() < MIN_ENVELOPE_BYTES {
        return Err(EciesError::MalformedEnvelope);
    }

    let mac_start = blob.len() - MAC_BYTES;

    let iv: [u8; IV_BYTES] = blob[..IV_BYTES]
        .try_into()
        .map_err(|_| EciesError::MalformedEnvelope)?;

    let ephemeral_public_key: [u8; PUBLIC_KEY_BYTES] = blob[IV_BYTES..HEADER_BYTES]
        .try_into()
        .map_err(|_| EciesError::MalformedEnvelope)?;

    let mac: [u8; MAC_BYTES] = blob[mac_start..]
        .try_into()
        .map_err(|_| EciesError::MalformedEnvelope)?;

    Ok(EncryptedEnvelope {
        iv,
        ephemeral_public_key,
        ciphertext: blob[HEADER_BYTES..mac_start].to_vec(),
        mac,
    })
}

// ---------------------------------------------------------------------------
// Hex boundary
// ---------------------------------------------------------------------------

/// Lowercase hex, no `0x` prefix.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode an envelope hex string. A leading `0x` is tolerated.
pub fn from_hex(encoded: &str) -> Result<Vec<u8>> {
    hex::decode(crate::keys::strip_hex_prefix(encoded)).map_err(|_| EciesError::MalformedEnvelope)
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Envelope metadata (extracted without decryption).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeInfo {
    /// Total blob length
    pub total_bytes: usize,
    /// Length of the CBC ciphertext region
    pub ciphertext_bytes: usize,
    /// Upper bound on the plaintext length (padding removes 1..=16 bytes)
    pub max_plaintext_bytes: usize,
    /// Whether the ciphertext length is a whole number of AES blocks
    pub block_aligned: bool,
    /// First byte of the ephemeral public key (0x04 when well-formed)
    pub ephemeral_key_prefix: u8,
}

impl fmt::Display for EnvelopeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ECIES secp256k1 | AES-256-CBC + HMAC-SHA256 | {} bytes ({} ciphertext, <= {} plaintext{})",
            self.total_bytes,
            self.ciphertext_bytes,
            self.max_plaintext_bytes,
            if self.block_aligned { "" } else { ", misaligned" }
        )
    }
}

/// Inspect a wire blob without decrypting it.
///
/// Reveals only lengths and the public ephemeral key marker.
pub fn inspect(blob: &[u8]) -> Result<EnvelopeInfo> {
    let envelope = parse(blob)?;
    let ciphertext_bytes = envelope.ciphertext.len();

    Ok(EnvelopeInfo {
        total_bytes: blob.len(),
        ciphertext_bytes,
        max_plaintext_bytes: ciphertext_bytes.saturating_sub(1),
        block_aligned: ciphertext_bytes > 0 && ciphertext_bytes % AES_BLOCK_BYTES == 0,
        ephemeral_key_prefix: envelope.ephemeral_public_key[0],
    })
}
