//! Pure-Rust backend (`k256`).

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{ecdh, PublicKey, SecretKey};
use zeroize::Zeroizing;

use super::CurveProvider;
use crate::error::{EciesError, Result};
use crate::wire::{PRIVATE_KEY_BYTES, PUBLIC_KEY_BYTES, SHARED_SECRET_BYTES, UNCOMPRESSED_PREFIX};

/// secp256k1 implemented in software by RustCrypto.
pub struct SoftwareCurve;

fn parse_secret(secret: &[u8; PRIVATE_KEY_BYTES]) -> Result<SecretKey> {
    SecretKey::from_slice(secret).map_err(|_| EciesError::key("private key is not a valid secp256k1 scalar"))
}

fn parse_public(public: &[u8]) -> Result<PublicKey> {
    PublicKey::from_sec1_bytes(public).map_err(|_| EciesError::key("public key is not a point on secp256k1"))
}

fn uncompressed(pk: &PublicKey) -> Result<[u8; PUBLIC_KEY_BYTES]> {
    pk.to_encoded_point(false)
        .as_bytes()
        .try_into()
        .map_err(|_| EciesError::key("unexpected SEC1 encoding length"))
}

impl CurveProvider for SoftwareCurve {
    const NAME: &'static str = "software";

    fn check_secret(secret: &[u8; PRIVATE_KEY_BYTES]) -> Result<()> {
        parse_secret(secret).map(|_| ())
    }

    fn public_key(secret: &[u8; PRIVATE_KEY_BYTES]) -> Result<[u8; PUBLIC_KEY_BYTES]> {
        uncompressed(&parse_secret(secret)?.public_key())
    }

    fn shared_x(
        secret: &[u8; PRIVATE_KEY_BYTES],
        public: &[u8; PUBLIC_KEY_BYTES],
    ) -> Result<Zeroizing<[u8; SHARED_SECRET_BYTES]>> {
        if public[0] != UNCOMPRESSED_PREFIX {
            return Err(EciesError::key("public key must be uncompressed"));
        }
        let sk = parse_secret(secret)?;
        let pk = parse_public(public)?;

        let shared = ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
        let mut x = Zeroizing::new([0u8; SHARED_SECRET_BYTES]);
        x.copy_from_slice(shared.raw_secret_bytes());
        Ok(x)
    }

    fn decompress(public: &[u8]) -> Result<[u8; PUBLIC_KEY_BYTES]> {
        uncompressed(&parse_public(public)?)
    }
}
