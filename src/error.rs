//! Unified error type for wallet ECIES.

use core::fmt;

/// Every failure the crate can report.
///
/// Decrypt-path failures that could act as an oracle (wrong key, tampered
/// ciphertext, corrupted ephemeral key, bad padding) all surface as
/// [`EciesError::AuthenticationFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EciesError {
    /// Key bytes do not match any recognized encoding.
    InvalidKeyFormat { reason: &'static str },
    /// A 64-byte raw coordinate key was handed to the strict engine API.
    UnsupportedKeyLength,
    /// Wire blob is too short to hold the fixed header and trailer, or is not hex.
    MalformedEnvelope,
    /// MAC verification failed.
    AuthenticationFailed,
    /// Decrypted bytes are not valid UTF-8.
    InvalidUtf8,
    /// The OS random source could not be read.
    RandomUnavailable,
}

impl EciesError {
    pub(crate) const fn key(reason: &'static str) -> Self {
        Self::InvalidKeyFormat { reason }
    }
}

impl fmt::Display for EciesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyFormat { reason } => write!(f, "invalid key format: {}", reason),
            Self::UnsupportedKeyLength => write!(
                f,
                "raw 64-byte public key coordinates are not accepted here; normalize to 65-byte uncompressed form"
            ),
            Self::MalformedEnvelope => write!(f, "malformed envelope"),
            Self::AuthenticationFailed => write!(f, "authentication failed"),
            Self::InvalidUtf8 => write!(f, "decrypted data is not valid UTF-8"),
            Self::RandomUnavailable => write!(f, "secure random source unavailable"),
        }
    }
}

impl std::error::Error for EciesError {}

pub type Result<T> = core::result::Result<T, EciesError>;
