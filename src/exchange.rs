//! Key exchange: the caller-facing API.
//!
//! Drives normalization, the selected engine and the wire codec, and
//! speaks hex strings or raw bytes depending on the caller.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use zeroize::Zeroizing;

use crate::engine::EciesEngine;
use crate::error::{EciesError, Result};
use crate::keys::{self, KeyMaterial};
use crate::selector;
use crate::wire::{self, RAW_PUBLIC_KEY_BYTES};

/// Encrypts to wallet public keys and decrypts with wallet private keys.
///
/// # Example
///
/// ```
/// use wallet_ecies::KeyExchange;
///
/// let kx = KeyExchange::new();
/// let (private_key, public_key) = kx.generate_keypair().unwrap();
///
/// let sealed = kx.encrypt_with_public_key("hello vana", &public_key).unwrap();
/// let opened = kx.decrypt_with_private_key(&sealed, &private_key).unwrap();
/// assert_eq!(opened, "hello vana");
/// ```
#[derive(Clone)]
pub struct KeyExchange {
    engine: Arc<dyn EciesEngine>,
}

impl Default for KeyExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for KeyExchange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyExchange").field("engine", &self.engine.name()).finish()
    }
}

impl KeyExchange {
    /// Use the process-wide engine from [`selector::get_engine`].
    pub fn new() -> Self {
        Self {
            engine: selector::get_engine(),
        }
    }

    pub fn with_engine(engine: Arc<dyn EciesEngine>) -> Self {
        Self { engine }
    }

    pub fn engine_name(&self) -> String {
        self.engine.name()
    }

    /// Fresh key pair as `(private_key_hex, public_key_hex)`, no `0x`.
    /// The public key is the 65-byte uncompressed form; the private hex is
    /// wiped when dropped.
    pub fn generate_keypair(&self) -> Result<(Zeroizing<String>, String)> {
        let kp = self.engine.generate_keypair()?;
        Ok((kp.secret_hex(), kp.public_hex()))
    }

    // -----------------------------------------------------------------------
    // Binary
    // -----------------------------------------------------------------------

    /// Encrypt raw bytes; returns the wire blob.
    pub fn encrypt_binary<'a>(&self, plaintext: &[u8], public_key: impl Into<KeyMaterial<'a>>) -> Result<Vec<u8>> {
        let public_key = public_key.into();
        let recipient = keys::normalize_public_key(public_key)?;
        if is_raw_coordinates(public_key) {
            tracing::debug!("widened raw 64-byte public key to uncompressed form");
        }

        let envelope = self.engine.encrypt(&recipient, plaintext)?;
        tracing::debug!(
            engine = %self.engine.name(),
            plaintext_bytes = plaintext.len(),
            envelope_bytes = envelope.encoded_len(),
            "encrypted"
        );
        Ok(wire::serialize(&envelope))
    }

    /// Decrypt a wire blob; returns the raw plaintext.
    pub fn decrypt_binary<'a>(&self, encrypted: &[u8], private_key: impl Into<KeyMaterial<'a>>) -> Result<Vec<u8>> {
        let secret = keys::normalize_private_key(private_key)?;
        let envelope = wire::parse(encrypted)?;
        let plaintext = self.engine.decrypt(&secret[..], &envelope)?;
        tracing::debug!(
            engine = %self.engine.name(),
            envelope_bytes = encrypted.len(),
            plaintext_bytes = plaintext.len(),
            "decrypted"
        );
        Ok(plaintext)
    }

    // -----------------------------------------------------------------------
    // String
    // -----------------------------------------------------------------------

    /// Encrypt UTF-8 text; returns lowercase hex without `0x`.
    pub fn encrypt_with_public_key<'a>(&self, plaintext: &str, public_key: impl Into<KeyMaterial<'a>>) -> Result<String> {
        let blob = self.encrypt_binary(plaintext.as_bytes(), public_key)?;
        Ok(wire::to_hex(&blob))
    }

    /// Decrypt a hex envelope back into UTF-8 text.
    pub fn decrypt_with_private_key<'a>(
        &self,
        encrypted_hex: &str,
        private_key: impl Into<KeyMaterial<'a>>,
    ) -> Result<String> {
        let blob = wire::from_hex(encrypted_hex)?;
        let plaintext = self.decrypt_binary(&blob, private_key)?;
        String::from_utf8(plaintext).map_err(|_| EciesError::InvalidUtf8)
    }

    // -----------------------------------------------------------------------
    // Grant-layer entry points
    // -----------------------------------------------------------------------

    /// Encrypt grant data to a recipient wallet's public key, in whatever
    /// shape the wallet produced it.
    pub fn encrypt_with_wallet_public_key<'a>(
        &self,
        data: &str,
        wallet_public_key: impl Into<KeyMaterial<'a>>,
    ) -> Result<String> {
        self.encrypt_with_public_key(data, wallet_public_key)
    }

    /// Decrypt grant data with the recipient wallet's private key.
    pub fn decrypt_with_wallet_private_key<'a>(
        &self,
        encrypted_hex: &str,
        wallet_private_key: impl Into<KeyMaterial<'a>>,
    ) -> Result<String> {
        self.decrypt_with_private_key(encrypted_hex, wallet_private_key)
    }
}

fn is_raw_coordinates(key: KeyMaterial<'_>) -> bool {
    match key {
        KeyMaterial::Bytes(b) => b.len() == RAW_PUBLIC_KEY_BYTES,
        KeyMaterial::Hex(s) => keys::strip_hex_prefix(s.trim()).len() == RAW_PUBLIC_KEY_BYTES * 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SoftwareEngine;

    fn software() -> KeyExchange {
        KeyExchange::with_engine(Arc::new(SoftwareEngine::new()))
    }

    #[test]
    fn hello_vana() {
        let kx = software();
        let (sk, pk) = kx.generate_keypair().unwrap();
        let sealed = kx.encrypt_with_public_key("hello vana", pk.as_str()).unwrap();
        assert!(!sealed.starts_with("0x"));
        assert_eq!(sealed, sealed.to_lowercase());
        assert_eq!(kx.decrypt_with_private_key(&sealed, sk.as_str()).unwrap(), "hello vana");
    }

    #[test]
    fn hundred_zero_bytes_is_malformed() {
        let kx = software();
        let (sk, _) = kx.generate_keypair().unwrap();
        assert_eq!(kx.decrypt_binary(&[0u8; 100], sk.as_str()), Err(EciesError::MalformedEnvelope));
        assert_eq!(
            kx.decrypt_with_private_key(&"00".repeat(100), sk.as_str()),
            Err(EciesError::MalformedEnvelope)
        );
    }

    #[test]
    fn non_utf8_plaintext() {
        let kx = software();
        let (sk, pk) = kx.generate_keypair().unwrap();
        let blob = kx.encrypt_binary(&[0xFF, 0xFE, 0xFD], pk.as_str()).unwrap();
        assert_eq!(
            kx.decrypt_with_private_key(&wire::to_hex(&blob), sk.as_str()),
            Err(EciesError::InvalidUtf8)
        );
        assert_eq!(kx.decrypt_binary(&blob, sk.as_str()).unwrap(), vec![0xFF, 0xFE, 0xFD]);
    }

    #[test]
    fn widened_key_detection() {
        assert!(is_raw_coordinates(KeyMaterial::Hex(&"ab".repeat(64))));
        assert!(is_raw_coordinates(KeyMaterial::Hex(&format!("0x{}", "ab".repeat(64)))));
        assert!(!is_raw_coordinates(KeyMaterial::Bytes(&[0u8; 65])));
    }

    #[test]
    fn private_hex_is_zeroizing() {
        let kx = software();
        let (sk, pk): (Zeroizing<String>, String) = kx.generate_keypair().unwrap();
        assert_eq!(sk.len(), 64);
        let sealed = kx.encrypt_with_public_key("wiped", &pk).unwrap();
        assert_eq!(kx.decrypt_with_private_key(&sealed, &sk).unwrap(), "wiped");
    }

    #[test]
    fn debug_shows_engine_only() {
        assert_eq!(format!("{:?}", software()), "KeyExchange { engine: \"modern/software\" }");
    }
}
