//! Message encipherment using AES-256-CBC
//!
//! [`encrypt_with`] and [`decrypt_envelope`] are pure: the caller supplies
//! salt and IV, which keeps them deterministic under test. [`encrypt`] and
//! [`decrypt`] are the byte-level entry points used by the transport and
//! draw fresh salt and IV from the OS.

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
use zeroize::Zeroizing;

use super::{
    derivation::{KEY_SIZE, derive_key},
    error::EnvelopeError,
    format::{Envelope, IV_SIZE, SALT_SIZE},
    padding::{pad, unpad},
};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Encrypt `plaintext` under `password`, returning the wire envelope.
///
/// A fresh salt and a fresh IV are drawn for every call, so encrypting the
/// same message twice never yields the same bytes.
///
/// # Errors
///
/// - `RandomSource`: the OS entropy source failed
/// - `InvalidKeySize`: the derived key does not fit AES-256
pub fn encrypt(plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    let salt: [u8; SALT_SIZE] = random_array()?;
    let iv: [u8; IV_SIZE] = random_array()?;

    encrypt_with(plaintext, password, salt, iv).map(|envelope| envelope.to_bytes())
}

/// Decrypt a wire envelope with `password`.
///
/// # Errors
///
/// - `EnvelopeTooShort`: input cannot hold salt, IV and one block
/// - `MisalignedCiphertext`: ciphertext is not block-aligned
/// - `InvalidPadding`: corrupted input or wrong password
pub fn decrypt(envelope: &[u8], password: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    let envelope = Envelope::from_bytes(envelope)?;
    decrypt_envelope(&envelope, password)
}

/// Encrypt with caller-provided salt and IV.
///
/// # Security
///
/// - Salt and IV MUST be fresh cryptographically secure random bytes in
///   production. Reusing a salt reuses the key.
/// - No integrity protection: the result is confidentiality-only
pub fn encrypt_with(
    plaintext: &[u8],
    password: &[u8],
    salt: [u8; SALT_SIZE],
    iv: [u8; IV_SIZE],
) -> Result<Envelope, EnvelopeError> {
    let key = derive_key(password, &salt);

    // Padded plaintext is wiped if enciphering fails
    let mut buf = Zeroizing::new(pad(plaintext));
    cbc_encrypt(key.as_bytes(), &iv, buf.as_mut_slice())?;

    Ok(Envelope::new(salt, iv, std::mem::take(&mut *buf)))
}

/// Decrypt a parsed envelope.
///
/// A wrong password still deciphers mechanically. Padding validation is
/// the only backstop and lets roughly 1 in 256 wrong guesses through as
/// garbage plaintext.
///
/// # Errors
///
/// - `InvalidPadding`: corrupted input or wrong password
pub fn decrypt_envelope(envelope: &Envelope, password: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    let key = derive_key(password, envelope.salt());

    // Deciphered bytes are wiped on return, including after a padding failure
    let mut buf = Zeroizing::new(envelope.ciphertext().to_vec());
    cbc_decrypt(key.as_bytes(), envelope.iv(), buf.as_mut_slice())?;

    Ok(unpad(&buf)?.to_vec())
}

/// Encipher a block-aligned buffer in place.
fn cbc_encrypt(key: &[u8], iv: &[u8; IV_SIZE], buf: &mut [u8]) -> Result<(), EnvelopeError> {
    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|_| EnvelopeError::InvalidKeySize { expected: KEY_SIZE, actual: key.len() })?;

    let len = buf.len();
    cipher
        .encrypt_padded_mut::<NoPadding>(buf, len)
        .map_err(|_| EnvelopeError::MisalignedCiphertext { len })?;

    Ok(())
}

/// Decipher a block-aligned buffer in place.
fn cbc_decrypt(key: &[u8], iv: &[u8; IV_SIZE], buf: &mut [u8]) -> Result<(), EnvelopeError> {
    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| EnvelopeError::InvalidKeySize { expected: KEY_SIZE, actual: key.len() })?;

    let len = buf.len();
    cipher
        .decrypt_padded_mut::<NoPadding>(buf)
        .map_err(|_| EnvelopeError::MisalignedCiphertext { len })?;

    Ok(())
}

fn random_array<const N: usize>() -> Result<[u8; N], EnvelopeError> {
    let mut bytes = [0u8; N];
    getrandom::fill(&mut bytes).map_err(|e| EnvelopeError::RandomSource(e.to_string()))?;
    Ok(bytes)
}
