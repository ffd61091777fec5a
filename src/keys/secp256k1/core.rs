//! Core secp256k1 key types.
//!
//! [`SecretKey`] wraps a non-zero scalar below the group order and wipes it
//! on drop. [`PublicKey`] wraps a finite curve point; it does not remember
//! which encoding it was parsed from, so callers pick the compression when
//! serializing.

use std::fmt;

use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::secp256k1::group::{Affine, UNCOMPRESSED_SIZE};
use crate::secp256k1::scalar::Scalar;

/// Secret key length in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// A secp256k1 secret key: a scalar in `[1, n − 1]`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Scalar);

impl SecretKey {
    /// Parses a 32-byte big-endian secret key.
    ///
    /// Rejects zero and any value not below the group order.
    pub fn from_bytes(bytes: &[u8; SECRET_KEY_SIZE]) -> Result<Self> {
        let (mut s, overflow) = Scalar::from_bytes_reduced(bytes);
        if overflow || bool::from(s.is_zero()) {
            s.zeroize();
            return Err(Error::InvalidSecretKey);
        }
        Ok(Self(s))
    }

    /// Draws a uniformly random secret key.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; SECRET_KEY_SIZE];
        loop {
            rng.fill_bytes(&mut bytes);
            if let Ok(key) = Self::from_bytes(&bytes) {
                bytes.zeroize();
                return key;
            }
        }
    }

    /// Draws a secret key from the operating system's entropy source.
    #[cfg(feature = "os-rng")]
    pub fn generate() -> Self {
        Self::random(&mut rand_core::OsRng)
    }

    pub fn to_bytes(&self) -> [u8; SECRET_KEY_SIZE] {
        self.0.to_bytes()
    }

    pub(crate) fn from_scalar(s: Scalar) -> Self {
        Self(s)
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SecretKey {}

/// A secp256k1 public key: a point on the curve other than infinity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(Affine);

impl PublicKey {
    /// Parses a compressed, uncompressed or hybrid encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Affine::from_bytes(bytes)
            .map(Self)
            .ok_or(Error::InvalidPublicKey)
    }

    /// Serializes as 33 (compressed) or 65 (uncompressed) bytes.
    pub fn serialize(&self, compressed: bool) -> Vec<u8> {
        self.0.to_bytes(compressed)
    }

    pub fn to_compressed(&self) -> [u8; 33] {
        self.0.to_compressed()
    }

    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_SIZE] {
        self.0.to_uncompressed()
    }

    /// Wraps a point, rejecting infinity.
    pub(crate) fn from_point(p: Affine) -> Result<Self> {
        if p.is_infinity() {
            return Err(Error::PointAtInfinity);
        }
        Ok(Self(p))
    }

    pub fn point(&self) -> &Affine {
        &self.0
    }
}

/// Returns whether `bytes` is a valid secret key.
pub fn seckey_verify(bytes: &[u8; SECRET_KEY_SIZE]) -> bool {
    SecretKey::from_bytes(bytes).is_ok()
}

/// Returns whether `bytes` is a valid public key encoding.
pub fn pubkey_verify(bytes: &[u8]) -> bool {
    PublicKey::from_bytes(bytes).is_ok()
}

/// Computes the public key `d·G` of a secret key in constant time.
pub fn pubkey_create(ctx: &Context, secret: &SecretKey) -> Result<PublicKey> {
    let gen_ctx = ctx.gen_ctx()?;
    let mut pj = gen_ctx.ecmult_gen(secret.scalar());
    let p = pj.to_affine();
    pj.zeroize();
    PublicKey::from_point(p)
}

/// Re-encodes any accepted public key encoding as 65 uncompressed bytes.
pub fn pubkey_decompress(bytes: &[u8]) -> Result<[u8; UNCOMPRESSED_SIZE]> {
    Ok(PublicKey::from_bytes(bytes)?.to_uncompressed())
}
