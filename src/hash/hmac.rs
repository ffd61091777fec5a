//! HMAC-SHA256.
//!
//! ```text
//! HMAC(K, m) = H((K' ⊕ opad) ‖ H((K' ⊕ ipad) ‖ m))
//! ```
//!
//! where `K'` is the key zero-padded to the 64-byte block size, or its
//! hash when longer than a block.

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

const BLOCK_SIZE: usize = 64;
const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5C;

/// Incremental HMAC-SHA256.
#[derive(Clone)]
pub struct HmacSha256 {
    inner: Sha256,
    outer: Sha256,
}

impl HmacSha256 {
    pub fn new(key: &[u8]) -> Self {
        let mut block = [0u8; BLOCK_SIZE];
        if key.len() > BLOCK_SIZE {
            block[..32].copy_from_slice(&Sha256::digest(key));
        } else {
            block[..key.len()].copy_from_slice(key);
        }

        let mut pad = [0u8; BLOCK_SIZE];
        for (p, b) in pad.iter_mut().zip(block.iter()) {
            *p = b ^ IPAD;
        }
        let mut inner = Sha256::new();
        inner.update(pad);

        for (p, b) in pad.iter_mut().zip(block.iter()) {
            *p = b ^ OPAD;
        }
        let mut outer = Sha256::new();
        outer.update(pad);

        pad.zeroize();
        block.zeroize();
        Self { inner, outer }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    pub fn finalize(self) -> [u8; 32] {
        let Self { inner, mut outer } = self;
        outer.update(inner.finalize());
        let mut out = [0u8; 32];
        out.copy_from_slice(&outer.finalize());
        out
    }

    /// One-shot MAC over the concatenation of `parts`.
    pub fn mac(key: &[u8], parts: &[&[u8]]) -> [u8; 32] {
        let mut h = Self::new(key);
        for part in parts {
            h.update(part);
        }
        h.finalize()
    }
}
