//! libsecp256k1 backend (`secp256k1` crate, global context).

use secp256k1::{ecdh, PublicKey, SecretKey};
use zeroize::Zeroizing;

use super::CurveProvider;
use crate::error::{EciesError, Result};
use crate::wire::{PRIVATE_KEY_BYTES, PUBLIC_KEY_BYTES, SHARED_SECRET_BYTES, UNCOMPRESSED_PREFIX};

/// secp256k1 backed by the bundled C library.
pub struct NativeCurve;

fn parse_secret(secret: &[u8; PRIVATE_KEY_BYTES]) -> Result<SecretKey> {
    SecretKey::from_slice(secret).map_err(|_| EciesError::key("private key is not a valid secp256k1 scalar"))
}

fn parse_public(public: &[u8]) -> Result<PublicKey> {
    PublicKey::from_slice(public).map_err(|_| EciesError::key("public key is not a point on secp256k1"))
}

impl CurveProvider for NativeCurve {
    const NAME: &'static str = "native";

    fn check_secret(secret: &[u8; PRIVATE_KEY_BYTES]) -> Result<()> {
        parse_secret(secret).map(|_| ())
    }

    fn public_key(secret: &[u8; PRIVATE_KEY_BYTES]) -> Result<[u8; PUBLIC_KEY_BYTES]> {
        let sk = parse_secret(secret)?;
        Ok(PublicKey::from_secret_key_global(&sk).serialize_uncompressed())
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

        // x[32] || y[32], unhashed
        let point = Zeroizing::new(ecdh::shared_secret_point(&pk, &sk));
        let mut x = Zeroizing::new([0u8; SHARED_SECRET_BYTES]);
        x.copy_from_slice(&point[..SHARED_SECRET_BYTES]);
        Ok(x)
    }

    fn decompress(public: &[u8]) -> Result<[u8; PUBLIC_KEY_BYTES]> {
        Ok(parse_public(public)?.serialize_uncompressed())
    }
}
