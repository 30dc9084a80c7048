//! secp256k1 curve backends
//!
//! The ECIES engine is generic over [`CurveProvider`]. Two backends exist:
//!
//!   SoftwareCurve  -> RustCrypto `k256`, pure Rust, always compiled
//!   NativeCurve    -> libsecp256k1 via `secp256k1`, behind the `native` feature
//!
//! Both must agree bit-for-bit on public key derivation and on the ECDH
//! x-coordinate; everything above this layer is shared code.

use zeroize::Zeroizing;

use crate::error::Result;
use crate::wire::{PRIVATE_KEY_BYTES, PUBLIC_KEY_BYTES, SHARED_SECRET_BYTES};

#[cfg(feature = "native")]
mod native;
mod software;

#[cfg(feature = "native")]
pub use native::NativeCurve;
pub use software::SoftwareCurve;

pub trait CurveProvider {
    /// Short backend name used in engine names and logs.
    const NAME: &'static str;

    /// Fails with `InvalidKeyFormat` unless `secret` is a valid non-zero
    /// scalar below the group order. No point multiplication.
    fn check_secret(secret: &[u8; PRIVATE_KEY_BYTES]) -> Result<()>;

    /// Uncompressed public key for a secret scalar.
    ///
    /// Fails with `InvalidKeyFormat` when the scalar is zero or not below
    /// the group order.
    fn public_key(secret: &[u8; PRIVATE_KEY_BYTES]) -> Result<[u8; PUBLIC_KEY_BYTES]>;

    /// x-coordinate of `secret * public`, big-endian, always 32 bytes.
    ///
    /// `public` must carry the 0x04 prefix; hybrid (0x06 / 0x07) and any
    /// other encoding fail with `InvalidKeyFormat` on every backend.
    fn shared_x(
        secret: &[u8; PRIVATE_KEY_BYTES],
        public: &[u8; PUBLIC_KEY_BYTES],
    ) -> Result<Zeroizing<[u8; SHARED_SECRET_BYTES]>>;

    /// Re-encode any SEC1 public key (33 or 65 bytes) as uncompressed.
    fn decompress(public: &[u8]) -> Result<[u8; PUBLIC_KEY_BYTES]>;
}
