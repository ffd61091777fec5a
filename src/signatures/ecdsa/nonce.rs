//! Nonce derivation for ECDSA signing.
//!
//! Signing asks a [`NonceFunction`] for candidate nonces with an increasing
//! attempt counter until one produces a valid signature. The function must
//! be deterministic in its inputs and return `None` only to abort signing.
//!
//! [`Rfc6979`] is the default: HMAC-DRBG seeded with
//! `key32 ‖ msg32 [‖ extra]`, where attempt `i` returns the `(i + 1)`-th
//! output block.

use zeroize::Zeroize;

use crate::hash::HmacDrbg;

/// Derives a 32-byte nonce candidate.
pub trait NonceFunction {
    /// Returns the candidate for `attempt`, or `None` to abort signing.
    fn nonce(
        &self,
        msg32: &[u8; 32],
        key32: &[u8; 32],
        attempt: u32,
        extra: Option<&[u8; 32]>,
    ) -> Option<[u8; 32]>;
}

impl<F> NonceFunction for F
where
    F: Fn(&[u8; 32], &[u8; 32], u32, Option<&[u8; 32]>) -> Option<[u8; 32]>,
{
    fn nonce(
        &self,
        msg32: &[u8; 32],
        key32: &[u8; 32],
        attempt: u32,
        extra: Option<&[u8; 32]>,
    ) -> Option<[u8; 32]> {
        self(msg32, key32, attempt, extra)
    }
}

/// Deterministic nonces per RFC 6979 with HMAC-SHA256.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rfc6979;

impl NonceFunction for Rfc6979 {
    fn nonce(
        &self,
        msg32: &[u8; 32],
        key32: &[u8; 32],
        attempt: u32,
        extra: Option<&[u8; 32]>,
    ) -> Option<[u8; 32]> {
        let mut seed = [0u8; 96];
        seed[..32].copy_from_slice(key32);
        seed[32..64].copy_from_slice(msg32);
        let len = match extra {
            Some(data) => {
                seed[64..].copy_from_slice(data);
                96
            }
            None => 64,
        };

        let mut drbg = HmacDrbg::new(&seed[..len]);
        seed.zeroize();

        let mut out = [0u8; 32];
        for _ in 0..=attempt {
            drbg.generate(&mut out);
        }
        Some(out)
    }
}
