//! ECIES engine
//!
//! encrypt:
//!   eph      = fresh secp256k1 keypair
//!   x        = ECDH(eph.secret, recipient).x
//!   enc||mac = SHA-512(x)
//!   ct       = AES-256-CBC(enc, iv, PKCS#7(plaintext))
//!   tag      = HMAC-SHA256(mac, iv || eph.public || ct)
//!
//! decrypt verifies `tag` in constant time before touching `ct`.
//!
//! The steps are written once, generic over [`CurveProvider`], so the
//! native and software engines cannot drift apart at the byte level.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::marker::PhantomData;

use zeroize::Zeroizing;

use crate::cipher;
use crate::config::EngineMode;
use crate::curve::{CurveProvider, SoftwareCurve};
use crate::error::{EciesError, Result};
use crate::kdf::{self, SecretForm};
use crate::keys;
use crate::wire::{EncryptedEnvelope, IV_BYTES, PRIVATE_KEY_BYTES, PUBLIC_KEY_BYTES, UNCOMPRESSED_PREFIX};

#[cfg(feature = "native")]
use crate::curve::NativeCurve;

// ---------------------------------------------------------------------------
// Key pair
// ---------------------------------------------------------------------------

/// secp256k1 key pair. The secret half is wiped on drop.
pub struct KeyPair {
    secret: Zeroizing<[u8; PRIVATE_KEY_BYTES]>,
    public: [u8; PUBLIC_KEY_BYTES],
}

impl KeyPair {
    pub fn secret(&self) -> &[u8; PRIVATE_KEY_BYTES] {
        &self.secret
    }

    /// Uncompressed, 0x04-prefixed.
    pub fn public(&self) -> &[u8; PUBLIC_KEY_BYTES] {
        &self.public
    }

    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&self.secret[..]))
    }

    pub fn public_hex(&self) -> String {
        hex::encode(self.public)
    }
}

impl core::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyPair")
            .field("secret", &"<redacted>")
            .field("public", &hex::encode(self.public))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Engine trait
// ---------------------------------------------------------------------------

/// One ECIES implementation. All implementations share the wire format.
///
/// Calls are synchronous and CPU-bound; async callers should wrap them in
/// `spawn_blocking`.
pub trait EciesEngine: Send + Sync {
    fn mode(&self) -> EngineMode;

    /// Curve backend name ("native" / "software").
    fn backend(&self) -> &'static str;

    fn name(&self) -> String {
        format!("{}/{}", self.mode(), self.backend())
    }

    fn generate_keypair(&self) -> Result<KeyPair>;

    /// Encrypt to a 65-byte uncompressed public key.
    ///
    /// 64-byte raw coordinates are refused with `UnsupportedKeyLength`.
    fn encrypt(&self, recipient_public_key: &[u8], plaintext: &[u8]) -> Result<EncryptedEnvelope>;

    fn decrypt(&self, recipient_private_key: &[u8], envelope: &EncryptedEnvelope) -> Result<Vec<u8>>;
}

// ---------------------------------------------------------------------------
// Shared steps
// ---------------------------------------------------------------------------

fn random_keypair<C: CurveProvider>() -> Result<KeyPair> {
    loop {
        let secret = cipher::scalar_candidate()?;
        // Zero or >= n: draw again.
        if let Ok(public) = C::public_key(&secret) {
            return Ok(KeyPair { secret, public });
        }
    }
}

/// Deterministic core of `encrypt`: ephemeral key and IV supplied.
pub(crate) fn seal_with<C: CurveProvider>(
    form: SecretForm,
    recipient: &[u8; PUBLIC_KEY_BYTES],
    ephemeral: &KeyPair,
    iv: [u8; IV_BYTES],
    plaintext: &[u8],
) -> Result<EncryptedEnvelope> {
    let shared = C::shared_x(&ephemeral.secret, recipient)?;
    let derived = kdf::derive_keys(form.apply(&shared));

    let ciphertext = cipher::cbc_encrypt(&derived.enc_key, &iv, plaintext)?;
    let mac = cipher::mac(&derived.mac_key, &iv, &ephemeral.public, &ciphertext)?;

    Ok(EncryptedEnvelope::from_parts(iv, ephemeral.public, ciphertext, mac))
}

fn seal<C: CurveProvider>(form: SecretForm, recipient_public_key: &[u8], plaintext: &[u8]) -> Result<EncryptedEnvelope> {
    let recipient = keys::normalize_public_key_strict(recipient_public_key)?;
    let ephemeral = random_keypair::<C>()?;
    let iv = cipher::iv()?;
    seal_with::<C>(form, &recipient, &ephemeral, iv, plaintext)
}

fn open<C: CurveProvider>(form: SecretForm, recipient_private_key: &[u8], envelope: &EncryptedEnvelope) -> Result<Vec<u8>> {
    let secret = keys::normalize_private_key(recipient_private_key)?;
    C::check_secret(&secret)?;

    // A bad ephemeral point is indistinguishable from any other corruption.
    let ephemeral = envelope.ephemeral_public_key();
    if ephemeral[0] != UNCOMPRESSED_PREFIX {
        return Err(EciesError::AuthenticationFailed);
    }
    let shared = C::shared_x(&secret, ephemeral).map_err(|_| EciesError::AuthenticationFailed)?;
    let derived = kdf::derive_keys(form.apply(&shared));

    let expected = cipher::mac(
        &derived.mac_key,
        envelope.iv(),
        envelope.ephemeral_public_key(),
        envelope.ciphertext(),
    )?;
    if !cipher::mac_matches(&expected, envelope.mac()) {
        return Err(EciesError::AuthenticationFailed);
    }

    cipher::cbc_decrypt(&derived.enc_key, envelope.iv(), envelope.ciphertext())
}

// ---------------------------------------------------------------------------
// Modern engine
// ---------------------------------------------------------------------------

/// ECIES with a fixed 32-byte shared secret.
pub struct Ecies<C: CurveProvider> {
    _marker: PhantomData<C>,
}

impl<C: CurveProvider> Default for Ecies<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CurveProvider> Ecies<C> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<C: CurveProvider + Send + Sync> EciesEngine for Ecies<C> {
    fn mode(&self) -> EngineMode {
        EngineMode::Modern
    }

    fn backend(&self) -> &'static str {
        C::NAME
    }

    fn generate_keypair(&self) -> Result<KeyPair> {
        random_keypair::<C>()
    }

    fn encrypt(&self, recipient_public_key: &[u8], plaintext: &[u8]) -> Result<EncryptedEnvelope> {
        seal::<C>(SecretForm::Fixed, recipient_public_key, plaintext)
    }

    fn decrypt(&self, recipient_private_key: &[u8], envelope: &EncryptedEnvelope) -> Result<Vec<u8>> {
        open::<C>(SecretForm::Fixed, recipient_private_key, envelope)
    }
}

// ---------------------------------------------------------------------------
// Legacy engine
// ---------------------------------------------------------------------------

/// ECIES as written by the older library: identical except that the ECDH
/// x-coordinate is hashed in minimal big-endian form.
///
/// About 1 in 256 messages has a shared x with a leading zero byte; only
/// those differ from [`Ecies`].
pub struct LegacyEcies<C: CurveProvider> {
    _marker: PhantomData<C>,
}

impl<C: CurveProvider> Default for LegacyEcies<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CurveProvider> LegacyEcies<C> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<C: CurveProvider + Send + Sync> EciesEngine for LegacyEcies<C> {
    fn mode(&self) -> EngineMode {
        EngineMode::Legacy
    }

    fn backend(&self) -> &'static str {
        C::NAME
    }

    fn generate_keypair(&self) -> Result<KeyPair> {
        random_keypair::<C>()
    }

    fn encrypt(&self, recipient_public_key: &[u8], plaintext: &[u8]) -> Result<EncryptedEnvelope> {
        seal::<C>(SecretForm::Minimal, recipient_public_key, plaintext)
    }

    fn decrypt(&self, recipient_private_key: &[u8], envelope: &EncryptedEnvelope) -> Result<Vec<u8>> {
        open::<C>(SecretForm::Minimal, recipient_private_key, envelope)
    }
}

// ---------------------------------------------------------------------------
// Concrete engines
// ---------------------------------------------------------------------------

pub type SoftwareEngine = Ecies<SoftwareCurve>;
pub type LegacySoftwareEngine = LegacyEcies<SoftwareCurve>;

#[cfg(feature = "native")]
pub type NativeEngine = Ecies<NativeCurve>;
#[cfg(feature = "native")]
pub type LegacyNativeEngine = LegacyEcies<NativeCurve>;

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(i: u32) -> [u8; 32] {
        let mut k = [0u8; 32];
        k[28..].copy_from_slice(&i.to_be_bytes());
        k
    }

    fn fixed_keypair<C: CurveProvider>(i: u32) -> KeyPair {
        let secret = scalar(i);
        KeyPair {
            public: C::public_key(&secret).unwrap(),
            secret: Zeroizing::new(secret),
        }
    }

    /// First ephemeral scalar whose shared x with `recipient` does / does not
    /// start with a zero byte.
    fn find_ephemeral(recipient: &KeyPair, leading_zero: bool) -> KeyPair {
        (1..20_000u32)
            .map(fixed_keypair::<SoftwareCurve>)
            .find(|eph| {
                let x = SoftwareCurve::shared_x(eph.secret(), recipient.public()).unwrap();
                (x[0] == 0) == leading_zero
            })
            .expect("a matching scalar exists in range")
    }

    #[test]
    fn roundtrip_software() {
        let engine = SoftwareEngine::new();
        let kp = engine.generate_keypair().unwrap();
        let env = engine.encrypt(kp.public(), b"hello vana").unwrap();
        assert_eq!(env.ciphertext().len(), 16);
        assert_eq!(engine.decrypt(kp.secret(), &env).unwrap(), b"hello vana");
    }

    #[test]
    fn envelope_shape() {
        let engine = SoftwareEngine::new();
        let kp = engine.generate_keypair().unwrap();
        let env = engine.encrypt(kp.public(), &[0u8; 40]).unwrap();
        assert_eq!(env.ephemeral_public_key()[0], 0x04);
        assert_eq!(env.ciphertext().len(), 48);
        assert_ne!(env.ephemeral_public_key(), kp.public());
    }

    #[test]
    fn fresh_ephemeral_and_iv_each_call() {
        let engine = SoftwareEngine::new();
        let kp = engine.generate_keypair().unwrap();
        let a = engine.encrypt(kp.public(), b"same").unwrap();
        let b = engine.encrypt(kp.public(), b"same").unwrap();
        assert_ne!(a.iv(), b.iv());
        assert_ne!(a.ephemeral_public_key(), b.ephemeral_public_key());
        assert_ne!(a.ciphertext(), b.ciphertext());
    }

    #[test]
    fn strict_engine_refuses_raw_coordinates() {
        let engine = SoftwareEngine::new();
        let kp = engine.generate_keypair().unwrap();
        assert_eq!(
            engine.encrypt(&kp.public()[1..], b"x").unwrap_err(),
            EciesError::UnsupportedKeyLength
        );
    }

    #[test]
    fn off_curve_recipient_is_key_error() {
        let mut bogus = [0u8; 65];
        bogus[0] = 0x04;
        bogus[64] = 7;
        assert!(matches!(
            SoftwareEngine::new().encrypt(&bogus, b"x"),
            Err(EciesError::InvalidKeyFormat { .. })
        ));
    }

    #[test]
    fn corrupt_ephemeral_key_is_authentication_failure() {
        let engine = SoftwareEngine::new();
        let kp = engine.generate_keypair().unwrap();
        let env = engine.encrypt(kp.public(), b"payload").unwrap();

        let mut epk = *env.ephemeral_public_key();
        epk[64] ^= 0x01; // moves the point off the curve
        let bad = EncryptedEnvelope::from_parts(*env.iv(), epk, env.ciphertext().to_vec(), *env.mac());
        assert_eq!(engine.decrypt(kp.secret(), &bad), Err(EciesError::AuthenticationFailed));
    }

    #[test]
    fn invalid_private_scalar_is_key_error() {
        let engine = SoftwareEngine::new();
        let kp = engine.generate_keypair().unwrap();
        let env = engine.encrypt(kp.public(), b"payload").unwrap();
        assert!(matches!(
            engine.decrypt(&[0u8; 32], &env),
            Err(EciesError::InvalidKeyFormat { .. })
        ));
        assert!(matches!(
            engine.decrypt(&[1u8; 31], &env),
            Err(EciesError::InvalidKeyFormat { .. })
        ));
    }

    #[test]
    fn keypair_debug_redacts_secret() {
        let kp = fixed_keypair::<SoftwareCurve>(7);
        let shown = format!("{:?}", kp);
        assert!(shown.contains("<redacted>"));
        assert!(!shown.contains(&hex::encode(kp.secret())));
    }

    #[test]
    fn names() {
        assert_eq!(SoftwareEngine::new().name(), "modern/software");
        assert_eq!(LegacySoftwareEngine::new().name(), "legacy/software");
    }

    #[test]
    fn legacy_matches_modern_without_leading_zero() {
        let recipient = fixed_keypair::<SoftwareCurve>(0x4242);
        let eph = find_ephemeral(&recipient, false);

        let modern = seal_with::<SoftwareCurve>(SecretForm::Fixed, recipient.public(), &eph, [9; 16], b"grant").unwrap();
        let legacy = seal_with::<SoftwareCurve>(SecretForm::Minimal, recipient.public(), &eph, [9; 16], b"grant").unwrap();
        assert_eq!(modern, legacy);

        assert_eq!(LegacySoftwareEngine::new().decrypt(recipient.secret(), &modern).unwrap(), b"grant");
        assert_eq!(SoftwareEngine::new().decrypt(recipient.secret(), &legacy).unwrap(), b"grant");
    }

    #[test]
    fn legacy_diverges_with_leading_zero() {
        let recipient = fixed_keypair::<SoftwareCurve>(0x4242);
        let eph = find_ephemeral(&recipient, true);

        let modern = seal_with::<SoftwareCurve>(SecretForm::Fixed, recipient.public(), &eph, [9; 16], b"grant").unwrap();
        let legacy = seal_with::<SoftwareCurve>(SecretForm::Minimal, recipient.public(), &eph, [9; 16], b"grant").unwrap();
        assert_ne!(modern.mac(), legacy.mac());

        // Each engine reads its own output and rejects the other's.
        assert_eq!(SoftwareEngine::new().decrypt(recipient.secret(), &modern).unwrap(), b"grant");
        assert_eq!(LegacySoftwareEngine::new().decrypt(recipient.secret(), &legacy).unwrap(), b"grant");
        assert_eq!(
            SoftwareEngine::new().decrypt(recipient.secret(), &legacy),
            Err(EciesError::AuthenticationFailed)
        );
        assert_eq!(
            LegacySoftwareEngine::new().decrypt(recipient.secret(), &modern),
            Err(EciesError::AuthenticationFailed)
        );
    }

    #[cfg(feature = "native")]
    #[test]
    fn native_and_software_are_byte_identical() {
        let recipient = fixed_keypair::<SoftwareCurve>(0xBEEF);
        let plaintexts: [&[u8]; 4] = [b"", b"hello vana", &[0xA5; 16], &[0x01; 1000]];

        for (i, pt) in plaintexts.iter().enumerate() {
            let eph = fixed_keypair::<SoftwareCurve>(1000 + i as u32);
            let iv = [i as u8; 16];
            let sw = seal_with::<SoftwareCurve>(SecretForm::Fixed, recipient.public(), &eph, iv, pt).unwrap();
            let nv = seal_with::<NativeCurve>(SecretForm::Fixed, recipient.public(), &eph, iv, pt).unwrap();
            assert_eq!(sw.to_bytes(), nv.to_bytes());
        }
    }

    #[cfg(feature = "native")]
    #[test]
    fn native_and_software_cross_decrypt() {
        let native = NativeEngine::new();
        let software = SoftwareEngine::new();
        let kp = native.generate_keypair().unwrap();

        let from_native = native.encrypt(kp.public(), b"cross").unwrap();
        let from_software = software.encrypt(kp.public(), b"cross").unwrap();
        assert_eq!(software.decrypt(kp.secret(), &from_native).unwrap(), b"cross");
        assert_eq!(native.decrypt(kp.secret(), &from_software).unwrap(), b"cross");
    }

    #[cfg(feature = "native")]
    #[test]
    fn legacy_native_and_software_are_byte_identical() {
        let recipient = fixed_keypair::<SoftwareCurve>(0x4242);
        let eph = find_ephemeral(&recipient, true);
        let sw = seal_with::<SoftwareCurve>(SecretForm::Minimal, recipient.public(), &eph, [3; 16], b"old").unwrap();
        let nv = seal_with::<NativeCurve>(SecretForm::Minimal, recipient.public(), &eph, [3; 16], b"old").unwrap();
        assert_eq!(sw, nv);
        assert_eq!(LegacyNativeEngine::new().decrypt(recipient.secret(), &sw).unwrap(), b"old");
    }

    /// Envelope whose ephemeral key carries `prefix` and whose MAC is valid
    /// over exactly those bytes.
    fn with_ephemeral_prefix(recipient: &KeyPair, prefix: u8) -> EncryptedEnvelope {
        let mut eph = fixed_keypair::<SoftwareCurve>(0x5151);
        eph.public[0] = prefix;
        let shared = SoftwareCurve::shared_x(eph.secret(), recipient.public()).unwrap();
        let derived = kdf::derive_keys(SecretForm::Fixed.apply(&shared));
        let iv = [0x66; IV_BYTES];
        let ciphertext = cipher::cbc_encrypt(&derived.enc_key, &iv, b"hybrid").unwrap();
        let mac = cipher::mac(&derived.mac_key, &iv, &eph.public, &ciphertext).unwrap();
        EncryptedEnvelope::from_parts(iv, eph.public, ciphertext, mac)
    }

    #[test]
    fn non_uncompressed_ephemeral_rejected() {
        let recipient = fixed_keypair::<SoftwareCurve>(0x7777);
        let parity = fixed_keypair::<SoftwareCurve>(0x5151).public[64] & 1;

        for prefix in [0x00, 0x02, 0x03, 0x05, 0x06 | parity, 0x07 ^ parity] {
            let env = with_ephemeral_prefix(&recipient, prefix);
            assert_eq!(
                SoftwareEngine::new().decrypt(recipient.secret(), &env),
                Err(EciesError::AuthenticationFailed),
                "prefix {prefix:#04x}"
            );
        }
    }

    #[cfg(feature = "native")]
    #[test]
    fn backends_agree_on_hybrid_ephemeral() {
        let recipient = fixed_keypair::<SoftwareCurve>(0x7777);
        let parity = fixed_keypair::<SoftwareCurve>(0x5151).public[64] & 1;
        let env = with_ephemeral_prefix(&recipient, 0x06 | parity);

        // libsecp256k1 parses hybrid keys on its own; the engine must not.
        let native = NativeEngine::new().decrypt(recipient.secret(), &env);
        let software = SoftwareEngine::new().decrypt(recipient.secret(), &env);
        assert_eq!(native, Err(EciesError::AuthenticationFailed));
        assert_eq!(native, software);
        assert_eq!(
            LegacyNativeEngine::new().decrypt(recipient.secret(), &env),
            LegacySoftwareEngine::new().decrypt(recipient.secret(), &env)
        );
    }
}
