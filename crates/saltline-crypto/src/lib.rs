//! Saltline Cryptographic Core
//!
//! Password-based encipherment of chat messages. Every message is sealed
//! into a self-contained [`Envelope`] carrying the public salt and IV the
//! receiver needs to re-derive the key from the shared password.
//!
//! # Pipeline
//!
//! ```text
//! Password + fresh Salt (16 bytes)
//!        │
//!        ▼
//! PBKDF2-HMAC-SHA256, 10 000 rounds → Key (32 bytes)
//!        │
//!        ▼
//! PKCS#7 pad → AES-256-CBC with fresh IV (16 bytes)
//!        │
//!        ▼
//! Salt ‖ IV ‖ Ciphertext
//! ```
//!
//! Keys and padded buffers live only for the duration of one
//! [`encrypt`]/[`decrypt`] call. Nothing is persisted between calls and
//! nothing here logs.
//!
//! # Security
//!
//! Confidentiality only. There is no MAC and no AEAD mode:
//! - A wrong password is caught only by padding validation, which rejects
//!   roughly 255 out of 256 attempts. The rest decrypt to garbage.
//! - Bit flips in the IV or ciphertext are not detected and propagate into
//!   the recovered plaintext.
//! - There is no sender authentication or replay protection.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod envelope;

pub use envelope::{
    BLOCK_SIZE, DerivedKey, Envelope, EnvelopeError, HEADER_SIZE, IV_SIZE, KDF_ITERATIONS,
    KEY_SIZE, MIN_ENVELOPE_SIZE, SALT_SIZE, decrypt, decrypt_envelope, derive_key, encrypt,
    encrypt_with, pad, unpad,
};
