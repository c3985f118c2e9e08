//! Error types for envelope operations

use thiserror::Error;

/// Errors from sealing or opening an envelope
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Derived key does not fit the cipher
    #[error("invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize {
        /// Key size the cipher requires
        expected: usize,
        /// Key size that was produced
        actual: usize,
    },

    /// Buffer cannot hold salt, IV and at least one ciphertext block
    #[error("envelope too short: {len} bytes, need at least {min}")]
    EnvelopeTooShort {
        /// Length of the rejected buffer
        len: usize,
        /// Minimum valid envelope length
        min: usize,
    },

    /// Ciphertext is not a whole number of cipher blocks
    #[error("ciphertext length {len} is not a multiple of the block size")]
    MisalignedCiphertext {
        /// Length of the ciphertext section
        len: usize,
    },

    /// Padding check failed after decipherment.
    ///
    /// Either the envelope was corrupted in transit or the password is
    /// wrong. The two cases cannot be told apart.
    #[error("invalid padding")]
    InvalidPadding,

    /// The OS entropy source could not produce salt or IV bytes
    #[error("random source failed: {0}")]
    RandomSource(String),
}

impl EnvelopeError {
    /// Returns true if this error is fatal (unrecoverable)
    ///
    /// Fatal errors indicate a broken implementation or environment.
    /// Non-fatal errors concern a single message, which the caller should
    /// discard.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidKeySize { .. } => true,
            Self::RandomSource(_) => true,

            Self::EnvelopeTooShort { .. } => false,
            Self::MisalignedCiphertext { .. } => false,
            Self::InvalidPadding => false,
        }
    }
}
