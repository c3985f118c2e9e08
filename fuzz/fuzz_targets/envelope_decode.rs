//! Fuzz target for envelope parsing and decryption
//!
//! Feeds arbitrary bytes to the decrypt path under an arbitrary password.
//!
//! # Invariants
//!
//! - Decryption never panics
//! - Inputs shorter than header + one block fail with EnvelopeTooShort
//! - Non-aligned ciphertext fails with MisalignedCiphertext
//! - Any accepted input is block-aligned and yields a shorter plaintext

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use saltline_crypto::{decrypt, EnvelopeError, BLOCK_SIZE, HEADER_SIZE, MIN_ENVELOPE_SIZE};

#[derive(Debug, Arbitrary)]
struct DecodeInput {
    password: Vec<u8>,
    envelope: Vec<u8>,
}

fuzz_target!(|input: DecodeInput| {
    let len = input.envelope.len();

    match decrypt(&input.envelope, &input.password) {
        Ok(plaintext) => {
            assert!(len >= MIN_ENVELOPE_SIZE);
            assert_eq!((len - HEADER_SIZE) % BLOCK_SIZE, 0);
            assert!(plaintext.len() < len - HEADER_SIZE, "padding must be stripped");
        },
        Err(EnvelopeError::EnvelopeTooShort { len: reported, min }) => {
            assert_eq!(reported, len);
            assert_eq!(min, MIN_ENVELOPE_SIZE);
            assert!(len < MIN_ENVELOPE_SIZE);
        },
        Err(EnvelopeError::MisalignedCiphertext { len: ciphertext_len }) => {
            assert_eq!(ciphertext_len, len - HEADER_SIZE);
            assert_ne!(ciphertext_len % BLOCK_SIZE, 0);
        },
        Err(EnvelopeError::InvalidPadding) => {},
        Err(other) => panic!("unexpected error: {other}"),
    }
});
