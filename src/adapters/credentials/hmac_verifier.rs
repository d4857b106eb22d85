//! Peppered HMAC-SHA256 password digests.
//!
//! Stored format: `<salt_hex>$<digest_hex>` where
//! `digest = HMAC-SHA256(key = pepper, salt || password)`.
//!
//! # Security
//!
//! - The pepper lives only in configuration, never next to the digests
//! - Digests are compared in constant time

use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::ports::PasswordVerifier;

type HmacSha256 = Hmac<Sha256>;

const SALT_LEN: usize = 16;

/// Verifies and produces peppered password digests.
pub struct HmacPasswordVerifier {
    pepper: SecretString,
}

impl HmacPasswordVerifier {
    pub fn new(pepper: SecretString) -> Self {
        Self { pepper }
    }

    /// Digests a password under a fresh random salt.
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        self.hash_with_salt(password, &salt)
    }

    /// Digests a password under the given salt.
    pub fn hash_with_salt(&self, password: &str, salt: &[u8]) -> String {
        format!("{}${}", hex::encode(salt), hex::encode(self.digest(salt, password)))
    }

    fn digest(&self, salt: &[u8], password: &str) -> Vec<u8> {
        // HMAC accepts keys of any length, so construction cannot fail.
        let Ok(mut mac) = HmacSha256::new_from_slice(self.pepper.expose_secret().as_bytes()) else {
            return Vec::new();
        };
        mac.update(salt);
        mac.update(password.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

impl PasswordVerifier for HmacPasswordVerifier {
    fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let Some((salt_hex, digest_hex)) = stored_hash.split_once('$') else {
            tracing::warn!("Stored password digest has no salt separator");
            return false;
        };
        let (salt, expected) = match (hex::decode(salt_hex.trim()), hex::decode(digest_hex.trim())) {
            (Ok(salt), Ok(expected)) => (salt, expected),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Stored password digest is not valid hex");
                return false;
            }
        };

        let actual = self.digest(&salt, password);
        !actual.is_empty() && actual.ct_eq(&expected).unwrap_u8() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier(pepper: &str) -> HmacPasswordVerifier {
        HmacPasswordVerifier::new(SecretString::new(pepper.to_string()))
    }

    #[test]
    fn hashed_password_verifies() {
        let v = verifier("pepper");
        let stored = v.hash("hunter2");
        assert!(v.verify("hunter2", &stored));
    }

    #[test]
    fn wrong_password_fails() {
        let v = verifier("pepper");
        let stored = v.hash("hunter2");
        assert!(!v.verify("hunter3", &stored));
    }

    #[test]
    fn different_pepper_fails() {
        let stored = verifier("one").hash("hunter2");
        assert!(!verifier("two").verify("hunter2", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let v = verifier("pepper");
        assert_ne!(v.hash("same"), v.hash("same"));
    }

    #[test]
    fn fixed_salt_is_deterministic() {
        let v = verifier("pepper");
        assert_eq!(v.hash_with_salt("pw", b"salt"), v.hash_with_salt("pw", b"salt"));
        assert!(v.hash_with_salt("pw", b"salt").starts_with("73616c74$"));
    }

    #[test]
    fn malformed_digest_never_verifies() {
        let v = verifier("pepper");
        assert!(!v.verify("pw", "no-separator"));
        assert!(!v.verify("pw", "zz$zz"));
        assert!(!v.verify("pw", "abc$def"));
        assert!(!v.verify("pw", ""));
    }

    #[test]
    fn stored_digest_is_lowercase_hex() {
        let stored = verifier("pepper").hash_with_salt("pw", &[0xde, 0xad, 0xbe, 0xef]);
        let (salt, digest) = stored.split_once('$').unwrap();
        assert_eq!(salt, "deadbeef");
        assert_eq!(digest.len(), 64);
        assert_eq!(hex::decode(digest).unwrap().len(), 32);
    }

    #[test]
    fn odd_length_hex_never_verifies() {
        let v = verifier("pepper");
        let stored = v.hash("pw");
        let truncated = &stored[..stored.len() - 1];
        assert!(!v.verify("pw", truncated));
    }
}
