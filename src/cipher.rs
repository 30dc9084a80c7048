//! Symmetric layer: AES-256-CBC (PKCS#7) + HMAC-SHA256, and the random
//! inputs each encryption needs.

use alloc::vec::Vec;

use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{EciesError, Result};
use crate::wire::{AES_KEY_BYTES, IV_BYTES, MAC_BYTES, MAC_KEY_BYTES, PRIVATE_KEY_BYTES, PUBLIC_KEY_BYTES};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Generate a random 16-byte IV. Used during encryption only.
pub(crate) fn iv() -> Result<[u8; IV_BYTES]> {
    let mut iv = [0u8; IV_BYTES];
    getrandom::getrandom(&mut iv).map_err(|_| EciesError::RandomUnavailable)?;
    Ok(iv)
}

/// 32 fresh bytes from the OS RNG for an ephemeral scalar candidate.
///
/// The caller retries when the candidate is not a valid scalar.
pub(crate) fn scalar_candidate() -> Result<Zeroizing<[u8; PRIVATE_KEY_BYTES]>> {
    let mut bytes = Zeroizing::new([0u8; PRIVATE_KEY_BYTES]);
    OsRng
        .try_fill_bytes(&mut bytes[..])
        .map_err(|_| EciesError::RandomUnavailable)?;
    Ok(bytes)
}

pub(crate) fn cbc_encrypt(key: &[u8; AES_KEY_BYTES], iv: &[u8; IV_BYTES], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256CbcEnc::new_from_slices(key, iv).map_err(|_| EciesError::key("bad AES key length"))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Only called after the MAC has been verified.
pub(crate) fn cbc_decrypt(key: &[u8; AES_KEY_BYTES], iv: &[u8; IV_BYTES], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256CbcDec::new_from_slices(key, iv).map_err(|_| EciesError::AuthenticationFailed)?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| EciesError::AuthenticationFailed)
}

/// HMAC-SHA256(mac_key, iv || ephemeral_pk || ciphertext)
pub(crate) fn mac(
    mac_key: &[u8; MAC_KEY_BYTES],
    iv: &[u8; IV_BYTES],
    ephemeral_public_key: &[u8; PUBLIC_KEY_BYTES],
    ciphertext: &[u8],
) -> Result<[u8; MAC_BYTES]> {
    let mut h = <HmacSha256 as Mac>::new_from_slice(mac_key).map_err(|_| EciesError::key("bad MAC key length"))?;
    h.update(iv);
    h.update(ephemeral_public_key);
    h.update(ciphertext);

    let mut out = [0u8; MAC_BYTES];
    out.copy_from_slice(&h.finalize().into_bytes());
    Ok(out)
}

/// Full-length constant-time comparison.
pub(crate) fn mac_matches(expected: &[u8; MAC_BYTES], received: &[u8; MAC_BYTES]) -> bool {
    bool::from(expected[..].ct_eq(&received[..]))
}
