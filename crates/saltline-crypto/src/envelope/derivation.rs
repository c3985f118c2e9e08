//! Password key stretching using PBKDF2-HMAC-SHA256

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

/// Size of a derived key in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// PBKDF2 round count.
///
/// Both peers must use the same value or they derive different keys from
/// the same password and salt.
pub const KDF_ITERATIONS: u32 = 10_000;

/// A symmetric key derived from a password and salt.
///
/// Held only for the duration of one encrypt or decrypt call. The bytes
/// are zeroized on drop and never appear in `Debug` output. There is no
/// `Clone` or `PartialEq`; compare [`DerivedKey::as_bytes`] where needed.
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey").field("key", &"<redacted>").finish()
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Derive a 32-byte key from `password` and `salt`.
///
/// The salt is 16 bytes by convention of the envelope format, but any
/// length is accepted. Same inputs always produce the same key, which is
/// what lets the receiver re-derive the sender's key from the transmitted
/// salt.
pub fn derive_key(password: &[u8], salt: &[u8]) -> DerivedKey {
    derive_key_with_iterations(password, salt, KDF_ITERATIONS)
}

pub(crate) fn derive_key_with_iterations(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> DerivedKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    DerivedKey { key }
}
