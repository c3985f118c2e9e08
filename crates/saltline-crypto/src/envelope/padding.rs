//! PKCS#7 padding to the AES block size

use super::error::EnvelopeError;

/// Cipher block size in bytes (AES).
pub const BLOCK_SIZE: usize = 16;

/// Pad `plaintext` to the next multiple of [`BLOCK_SIZE`].
///
/// Every padding byte holds the padding length. Block-aligned input gains
/// a full block of padding so that removal is never ambiguous.
pub fn pad(plaintext: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - plaintext.len() % BLOCK_SIZE;

    let mut padded = Vec::with_capacity(plaintext.len() + pad_len);
    padded.extend_from_slice(plaintext);
    padded.resize(plaintext.len() + pad_len, pad_len as u8);
    padded
}

/// Strip and validate PKCS#7 padding.
///
/// Rejects buffers that are empty or not block-aligned, a final byte of 0
/// or larger than [`BLOCK_SIZE`], and any padding byte that differs from
/// the final one.
///
/// # Errors
///
/// - `InvalidPadding`: any of the checks above failed
pub fn unpad(padded: &[u8]) -> Result<&[u8], EnvelopeError> {
    if padded.is_empty() || padded.len() % BLOCK_SIZE != 0 {
        return Err(EnvelopeError::InvalidPadding);
    }

    let pad_value = padded[padded.len() - 1];
    let pad_len = usize::from(pad_value);
    if pad_len == 0 || pad_len > BLOCK_SIZE || pad_len > padded.len() {
        return Err(EnvelopeError::InvalidPadding);
    }

    let (body, padding) = padded.split_at(padded.len() - pad_len);

    // Fold over every byte instead of returning at the first mismatch
    let mismatch = padding.iter().fold(0u8, |acc, &byte| acc | (byte ^ pad_value));
    if mismatch != 0 {
        return Err(EnvelopeError::InvalidPadding);
    }

    Ok(body)
}
