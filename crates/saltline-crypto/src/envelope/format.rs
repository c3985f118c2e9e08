//! Envelope wire format: salt ‖ IV ‖ ciphertext

use super::{error::EnvelopeError, padding::BLOCK_SIZE};

/// Size of the per-message salt (16 bytes)
pub const SALT_SIZE: usize = 16;

/// Size of the CBC initialization vector (16 bytes)
pub const IV_SIZE: usize = 16;

/// Size of the cleartext header preceding the ciphertext
pub const HEADER_SIZE: usize = SALT_SIZE + IV_SIZE;

/// Smallest valid envelope: header plus one ciphertext block
pub const MIN_ENVELOPE_SIZE: usize = HEADER_SIZE + BLOCK_SIZE;

/// One encrypted message.
///
/// Salt and IV are public and travel in the clear. The ciphertext is
/// always a non-empty whole number of cipher blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    salt: [u8; SALT_SIZE],
    iv: [u8; IV_SIZE],
    ciphertext: Vec<u8>,
}

impl Envelope {
    pub(crate) fn new(salt: [u8; SALT_SIZE], iv: [u8; IV_SIZE], ciphertext: Vec<u8>) -> Self {
        Self { salt, iv, ciphertext }
    }

    /// Salt the key was derived with.
    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    /// CBC initialization vector.
    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }

    /// Ciphertext, a multiple of [`BLOCK_SIZE`] bytes.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Total serialized length.
    pub fn len(&self) -> usize {
        HEADER_SIZE + self.ciphertext.len()
    }

    /// Always false: a valid envelope carries at least one block.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Serialize as salt ‖ IV ‖ ciphertext.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse an envelope from its wire bytes.
    ///
    /// # Errors
    ///
    /// - `EnvelopeTooShort`: fewer than [`MIN_ENVELOPE_SIZE`] bytes
    /// - `MisalignedCiphertext`: ciphertext is not block-aligned
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        if bytes.len() < MIN_ENVELOPE_SIZE {
            return Err(EnvelopeError::EnvelopeTooShort {
                len: bytes.len(),
                min: MIN_ENVELOPE_SIZE,
            });
        }

        let (salt_bytes, rest) = bytes.split_at(SALT_SIZE);
        let (iv_bytes, ciphertext) = rest.split_at(IV_SIZE);

        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(EnvelopeError::MisalignedCiphertext { len: ciphertext.len() });
        }

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(salt_bytes);
        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(iv_bytes);

        Ok(Self { salt, iv, ciphertext: ciphertext.to_vec() })
    }
}
