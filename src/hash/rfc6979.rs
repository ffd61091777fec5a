//! HMAC-SHA256 DRBG from RFC 6979 §3.2.
//!
//! The generator is seeded once with arbitrary key material (for ECDSA
//! nonces: secret key ‖ message hash ‖ optional extra data) and then emits
//! as many bytes as requested. Every call to [`HmacDrbg::generate`] after
//! the first performs the §3.2.h "retry" update before producing output,
//! so the n-th call yields the n-th RFC 6979 candidate.

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::hmac::HmacSha256;

/// RFC 6979 HMAC-DRBG state.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HmacDrbg {
    v: [u8; 32],
    k: [u8; 32],
    retry: bool,
}

impl HmacDrbg {
    /// Instantiates the generator from `seed` (steps b to g).
    pub fn new(seed: &[u8]) -> Self {
        let mut v = [0x01u8; 32];
        let k = HmacSha256::mac(&[0u8; 32], &[&v[..], &[0x00u8], seed]);
        v = HmacSha256::mac(&k, &[&v[..]]);
        let k = HmacSha256::mac(&k, &[&v[..], &[0x01u8], seed]);
        v = HmacSha256::mac(&k, &[&v[..]]);

        Self { v, k, retry: false }
    }

    /// Fills `out` with the next output block(s).
    pub fn generate(&mut self, out: &mut [u8]) {
        if self.retry {
            self.k = HmacSha256::mac(&self.k, &[&self.v[..], &[0x00u8]]);
            self.v = HmacSha256::mac(&self.k, &[&self.v[..]]);
        }

        for chunk in out.chunks_mut(32) {
            self.v = HmacSha256::mac(&self.k, &[&self.v[..]]);
            chunk.copy_from_slice(&self.v[..chunk.len()]);
        }

        self.retry = true;
    }
}
