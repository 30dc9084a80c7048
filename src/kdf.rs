//! KDF
//!
//! hash    = SHA-512(shared_secret)
//! enc_key = hash[0..32]
//! mac_key = hash[32..64]

use sha2::digest::generic_array::GenericArray;
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

use crate::wire::{AES_KEY_BYTES, MAC_KEY_BYTES, SHARED_SECRET_BYTES};

/// How the ECDH x-coordinate is fed to the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SecretForm {
    /// Always 32 bytes, left-padded with zeros.
    Fixed,
    /// Minimal big-endian: leading zero bytes dropped (older writers).
    Minimal,
}

impl SecretForm {
    pub(crate) fn apply(self, x: &[u8; SHARED_SECRET_BYTES]) -> &[u8] {
        match self {
            Self::Fixed => x,
            Self::Minimal => {
                let first = x.iter().position(|&b| b != 0).unwrap_or(SHARED_SECRET_BYTES);
                &x[first..]
            }
        }
    }
}

/// Per-call symmetric keys. Wiped on drop.
pub(crate) struct DerivedKeys {
    pub(crate) enc_key: Zeroizing<[u8; AES_KEY_BYTES]>,
    pub(crate) mac_key: Zeroizing<[u8; MAC_KEY_BYTES]>,
}

pub(crate) fn derive_keys(shared_secret: &[u8]) -> DerivedKeys {
    let mut hash = Zeroizing::new([0u8; 64]);
    let mut hasher = Sha512::new();
    hasher.update(shared_secret);
    hasher.finalize_into(GenericArray::from_mut_slice(&mut hash[..]));

    let mut enc_key = Zeroizing::new([0u8; AES_KEY_BYTES]);
    let mut mac_key = Zeroizing::new([0u8; MAC_KEY_BYTES]);
    enc_key.copy_from_slice(&hash[..AES_KEY_BYTES]);
    mac_key.copy_from_slice(&hash[AES_KEY_BYTES..]);

    DerivedKeys { enc_key, mac_key }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_matches_sha512_halves() {
        let secret = [0x33u8; 32];
        let full = Sha512::digest(secret);
        let keys = derive_keys(&secret);
        assert_eq!(&keys.enc_key[..], &full[..32]);
        assert_eq!(&keys.mac_key[..], &full[32..]);
    }

    #[test]
    fn sha512_empty_vector() {
        // SHA-512("") split in halves
        let keys = derive_keys(b"");
        assert_eq!(
            hex::encode(&keys.enc_key[..]),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce"
        );
        assert_eq!(
            hex::encode(&keys.mac_key[..]),
            "47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn minimal_form_strips_leading_zeros() {
        let mut x = [0xABu8; 32];
        x[0] = 0;
        x[1] = 0;
        assert_eq!(SecretForm::Minimal.apply(&x).len(), 30);
        assert_eq!(SecretForm::Fixed.apply(&x).len(), 32);

        let y = [0x01u8; 32];
        assert_eq!(SecretForm::Minimal.apply(&y), SecretForm::Fixed.apply(&y));
    }

    #[test]
    fn minimal_and_fixed_diverge_only_with_leading_zero() {
        let mut x = [0x5Au8; 32];
        let a = derive_keys(SecretForm::Fixed.apply(&x));
        let b = derive_keys(SecretForm::Minimal.apply(&x));
        assert_eq!(*a.enc_key, *b.enc_key);

        x[0] = 0;
        let a = derive_keys(SecretForm::Fixed.apply(&x));
        let b = derive_keys(SecretForm::Minimal.apply(&x));
        assert_ne!(*a.enc_key, *b.enc_key);
    }
}
