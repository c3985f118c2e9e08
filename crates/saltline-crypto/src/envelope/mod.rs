//! Envelope codec: key derivation, padding and CBC encipherment
//!
//! # Wire Layout
//!
//! ```text
//! offset 0..16   : salt (random, public)
//! offset 16..32  : IV (random, public)
//! offset 32..end : ciphertext (multiple of 16 bytes)
//! ```
//!
//! The layout is the only bit-exact contract between peers. Transport
//! framing around it belongs to the caller.

pub mod derivation;
pub mod encryption;
pub mod error;
pub mod format;
pub mod padding;

pub use derivation::{DerivedKey, KDF_ITERATIONS, KEY_SIZE, derive_key};
pub use encryption::{decrypt, decrypt_envelope, encrypt, encrypt_with};
pub use error::EnvelopeError;
pub use format::{Envelope, HEADER_SIZE, IV_SIZE, MIN_ENVELOPE_SIZE, SALT_SIZE};
pub use padding::{BLOCK_SIZE, pad, unpad};
