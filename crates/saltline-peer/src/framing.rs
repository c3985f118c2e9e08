//! Line framing for envelopes.
//!
//! Each envelope travels as one line of standard base64 terminated by
//! `\n`. [`LineCodec`] combines the framing with the envelope codec so the
//! session only handles text lines and plaintext bytes.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use saltline_crypto::{decrypt, encrypt};
use thiserror::Error;

use crate::{config::Password, error::PeerError};

/// Errors decoding a received line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    /// Line exceeds the configured limit.
    #[error("line too long: {len} bytes, limit {max}")]
    LineTooLong {
        /// Received length
        len: usize,
        /// Configured limit
        max: usize,
    },

    /// Line is not valid base64.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
}

/// Encode envelope bytes as a single line (without the terminator).
pub fn encode_line(envelope: &[u8]) -> String {
    STANDARD.encode(envelope)
}

/// Decode a line back into envelope bytes.
pub fn decode_line(line: &str, max_line_len: usize) -> Result<Vec<u8>, FramingError> {
    if line.len() > max_line_len {
        return Err(FramingError::LineTooLong { len: line.len(), max: max_line_len });
    }

    STANDARD.decode(line.trim_end()).map_err(|e| FramingError::InvalidEncoding(e.to_string()))
}

/// Seals outgoing plaintext into lines and opens incoming lines.
#[derive(Debug, Clone)]
pub struct LineCodec {
    password: Password,
    max_line_len: usize,
}

impl LineCodec {
    /// Create a codec for the shared `password`.
    pub fn new(password: Password, max_line_len: usize) -> Self {
        Self { password, max_line_len }
    }

    /// Encrypt `plaintext` and frame it as one line.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String, PeerError> {
        let envelope = encrypt(plaintext, self.password.as_bytes())?;
        Ok(encode_line(&envelope))
    }

    /// Unframe one line and decrypt it.
    ///
    /// Framing is checked before any key derivation runs.
    pub fn open(&self, line: &str) -> Result<Vec<u8>, PeerError> {
        let envelope = decode_line(line, self.max_line_len)?;
        Ok(decrypt(&envelope, self.password.as_bytes())?)
    }
}
