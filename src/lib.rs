//! # wallet-ecies
//!
//! ECIES over secp256k1 for encrypting secrets to wallet public keys.
//!
//! ## Quick Start
//!
//! ```rust
//! use wallet_ecies::KeyExchange;
//!
//! let kx = KeyExchange::new();
//! let (private_key, public_key) = kx.generate_keypair().unwrap();
//!
//! let sealed = kx.encrypt_with_public_key("grant key", &public_key).unwrap();
//! let opened = kx.decrypt_with_private_key(&sealed, &private_key).unwrap();
//!
//! assert_eq!(opened, "grant key");
//! ```
//!
//! ## Scheme
//!
//! - **Key agreement**: ephemeral secp256k1 ECDH, shared x-coordinate
//! - **KDF**: SHA-512, split into AES key and MAC key
//! - **Cipher**: AES-256-CBC with PKCS#7 padding
//! - **MAC**: HMAC-SHA256 over `iv || ephemeral_pk || ciphertext`, checked in constant time
//! - **Wire format**: `iv[16] || ephemeral_pk[65] || ciphertext || mac[32]`
//!
//! ## Backends
//!
//! The same engine code runs on libsecp256k1 (`native` feature, default)
//! or on pure-Rust `k256`. Output is byte-identical either way. A legacy
//! engine reads and writes data produced by the older ECIES library.
//!
//! ## Concurrency
//!
//! Engines are synchronous and `Send + Sync`. On an async runtime, run
//! encrypt/decrypt through `spawn_blocking` (or your runtime's equivalent).
//!
//! ## What's NOT Provided
//!
//! - Key custody or rotation
//! - Forward secrecy beyond per-message ephemeral keys
//! - Transport or storage

#![deny(unsafe_code)]

extern crate alloc;

// ---------------------------------------------------------------------------
// Internal modules (not part of public API)
// ---------------------------------------------------------------------------

mod cipher;
mod kdf;

// ---------------------------------------------------------------------------
// Public modules
// ---------------------------------------------------------------------------

pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod exchange;
pub mod keys;
pub mod selector;
pub mod wire;

pub use config::{BackendPreference, EngineConfig, EngineMode};
pub use engine::{Ecies, EciesEngine, KeyPair, LegacyEcies, LegacySoftwareEngine, SoftwareEngine};
#[cfg(feature = "native")]
pub use engine::{LegacyNativeEngine, NativeEngine};
pub use error::{EciesError, Result};
pub use exchange::KeyExchange;
pub use keys::{normalize_private_key, normalize_public_key, normalize_public_key_strict, KeyMaterial};
pub use selector::{get_engine, native_available, select_engine};
pub use wire::{inspect, EncryptedEnvelope, EnvelopeInfo, MIN_ENVELOPE_BYTES};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
