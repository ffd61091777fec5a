//! Hash-based building blocks.
//!
//! SHA-256 itself comes from the `sha2` crate. On top of it this module
//! provides:
//!
//! - `hmac`: HMAC-SHA256 (RFC 2104).
//! - `rfc6979`: the HMAC-SHA256 deterministic random bit generator of
//!   RFC 6979 §3.2, used for ECDSA nonces, context blinding and range
//!   proof nonce streams.

pub mod hmac;
pub mod rfc6979;

pub use hmac::HmacSha256;
pub use rfc6979::HmacDrbg;

use sha2::{Digest, Sha256};

/// One-shot SHA-256.
pub fn sha256(input: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(input);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}
