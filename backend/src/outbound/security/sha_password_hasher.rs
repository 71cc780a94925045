//! Salted SHA-256 implementation of the `PasswordHasher` port.
//!
//! Stored form is `{salt_hex}${digest_hex}` where the digest covers the salt
//! followed by the password bytes. The seam exists so a slower KDF can be
//! swapped in without touching the domain.

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::ports::PasswordHasher;

const SALT_BYTES: usize = 16;
const SEPARATOR: char = '$';

/// Salted SHA-256 password hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShaPasswordHasher;

fn digest_with_salt(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl PasswordHasher for ShaPasswordHasher {
    fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt);
        format!(
            "{}{SEPARATOR}{}",
            hex::encode(salt),
            digest_with_salt(&salt, password)
        )
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let Some((salt_hex, digest_hex)) = stored.split_once(SEPARATOR) else {
            return false;
        };
        let Ok(salt) = hex::decode(salt_hex) else {
            return false;
        };
        digest_with_salt(&salt, password) == digest_hex
    }
}
