//! Password verification adapters.

mod hmac_verifier;

pub use hmac_verifier::HmacPasswordVerifier;
