//! Fuzz target for encrypt/decrypt round-trips
//!
//! # Invariants
//!
//! - Encryption with caller-provided salt and IV never fails
//! - Decryption with the same password returns the original plaintext
//! - Ciphertext is the padded length: next multiple of the block size
//! - Serialized envelope parses back to the same envelope

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use saltline_crypto::{
    decrypt, decrypt_envelope, encrypt_with, Envelope, BLOCK_SIZE, IV_SIZE, SALT_SIZE,
};

#[derive(Debug, Arbitrary)]
struct RoundtripInput {
    plaintext: Vec<u8>,
    password: Vec<u8>,
    salt: [u8; SALT_SIZE],
    iv: [u8; IV_SIZE],
}

fuzz_target!(|input: RoundtripInput| {
    let envelope = encrypt_with(&input.plaintext, &input.password, input.salt, input.iv)
        .expect("encryption with valid salt and IV must succeed");

    assert_eq!(
        envelope.ciphertext().len(),
        (input.plaintext.len() / BLOCK_SIZE + 1) * BLOCK_SIZE
    );

    let decrypted = decrypt_envelope(&envelope, &input.password).expect("roundtrip must succeed");
    assert_eq!(decrypted, input.plaintext);

    let bytes = envelope.to_bytes();
    assert_eq!(Envelope::from_bytes(&bytes).as_ref(), Ok(&envelope));
    assert_eq!(decrypt(&bytes, &input.password).as_deref(), Ok(input.plaintext.as_slice()));
});
