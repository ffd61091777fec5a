//! ECDSA signature types and encodings.
//!
//! ## Compact
//!
//! 64 bytes: `r ‖ s`, each a 32-byte big-endian integer below `n`. The
//! recovery id travels separately.
//!
//! ## DER
//!
//! ```text
//! 30 len 02 len(r) r 02 len(s) s
//! ```
//!
//! Serialization emits the minimal encoding (at most 72 bytes). Parsing
//! is lenient in the same way deployed verifiers historically were: it
//! checks that the declared lengths are consistent with the buffer, skips
//! leading zero bytes of each integer and ignores trailing data after the
//! sequence. Integers longer than 32 significant bytes, or not below `n`,
//! are rejected.

use subtle::ConditionallySelectable;

use crate::error::{Error, Result};
use crate::secp256k1::scalar::Scalar;

/// Compact signature length.
pub const COMPACT_SIGNATURE_SIZE: usize = 64;

/// Longest DER signature this crate produces.
pub const MAX_DER_SIGNATURE_SIZE: usize = 72;

const DER_SEQUENCE: u8 = 0x30;
const DER_INTEGER: u8 = 0x02;

/// An ECDSA signature `(r, s)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    r: Scalar,
    s: Scalar,
}

impl Signature {
    pub(crate) fn new(r: Scalar, s: Scalar) -> Self {
        Self { r, s }
    }

    pub(crate) fn r(&self) -> &Scalar {
        &self.r
    }

    pub(crate) fn s(&self) -> &Scalar {
        &self.s
    }

    /// Parses `r ‖ s`, rejecting components not below `n`.
    pub fn from_compact(bytes: &[u8; COMPACT_SIGNATURE_SIZE]) -> Result<Self> {
        let (r_bytes, s_bytes) = split_halves(bytes);
        let r = Scalar::from_bytes(&r_bytes).ok_or(Error::InvalidSignature)?;
        let s = Scalar::from_bytes(&s_bytes).ok_or(Error::InvalidSignature)?;
        Ok(Self { r, s })
    }

    pub fn to_compact(&self) -> [u8; COMPACT_SIGNATURE_SIZE] {
        let mut out = [0u8; COMPACT_SIGNATURE_SIZE];
        out[..32].copy_from_slice(&self.r.to_bytes());
        out[32..].copy_from_slice(&self.s.to_bytes());
        out
    }

    /// Parses a DER signature.
    pub fn from_der(sig: &[u8]) -> Result<Self> {
        let size = sig.len();
        if size < 6 || sig[0] != DER_SEQUENCE {
            return Err(Error::InvalidSignature);
        }

        let lenr = sig[3] as usize;
        if 5 + lenr >= size {
            return Err(Error::InvalidSignature);
        }
        let lens = sig[lenr + 5] as usize;
        if sig[1] as usize != lenr + lens + 4 || lenr + lens + 6 > size {
            return Err(Error::InvalidSignature);
        }
        if sig[2] != DER_INTEGER || lenr == 0 || sig[lenr + 4] != DER_INTEGER || lens == 0 {
            return Err(Error::InvalidSignature);
        }

        let r = parse_der_integer(&sig[4..4 + lenr])?;
        let s = parse_der_integer(&sig[6 + lenr..6 + lenr + lens])?;
        Ok(Self { r, s })
    }

    /// Serializes as minimal DER.
    pub fn to_der(&self) -> Vec<u8> {
        let r = der_integer(&self.r);
        let s = der_integer(&self.s);

        let mut out = Vec::with_capacity(6 + r.len() + s.len());
        out.push(DER_SEQUENCE);
        out.push((4 + r.len() + s.len()) as u8);
        out.push(DER_INTEGER);
        out.push(r.len() as u8);
        out.extend_from_slice(&r);
        out.push(DER_INTEGER);
        out.push(s.len() as u8);
        out.extend_from_slice(&s);
        out
    }

    /// Returns whether `s ≤ n / 2`.
    pub fn is_low_s(&self) -> bool {
        !bool::from(self.s.is_high())
    }

    /// Replaces a high `s` by `n − s`, which yields an equally valid
    /// signature. Returns whether the signature changed.
    pub fn normalize_s(&mut self) -> bool {
        let high = self.s.is_high();
        self.s = Scalar::conditional_select(&self.s, &-self.s, high);
        high.into()
    }
}

fn split_halves(bytes: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut a = [0u8; 32];
    let mut b = [0u8; 32];
    a.copy_from_slice(&bytes[..32]);
    b.copy_from_slice(&bytes[32..]);
    (a, b)
}

fn parse_der_integer(mut bytes: &[u8]) -> Result<Scalar> {
    while let [0, rest @ ..] = bytes {
        bytes = rest;
    }
    if bytes.len() > 32 {
        return Err(Error::InvalidSignature);
    }

    let mut buf = [0u8; 32];
    buf[32 - bytes.len()..].copy_from_slice(bytes);
    Scalar::from_bytes(&buf).ok_or(Error::InvalidSignature)
}

/// Minimal big-endian two's-complement body of a non-negative integer.
fn der_integer(s: &Scalar) -> Vec<u8> {
    let mut buf = [0u8; 33];
    buf[1..].copy_from_slice(&s.to_bytes());

    let mut start = 0;
    while start < 32 && buf[start] == 0 && buf[start + 1] < 0x80 {
        start += 1;
    }
    buf[start..].to_vec()
}

/// Recovery id: bit 0 is the parity of `R.y`, bit 1 says `R.x` was not
/// below `n` before reduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveryId(pub(crate) u8);

impl RecoveryId {
    pub fn new(id: u8) -> Result<Self> {
        if id > 3 {
            return Err(Error::InvalidRecoveryId);
        }
        Ok(Self(id))
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }

    pub(crate) fn is_y_odd(self) -> bool {
        self.0 & 1 == 1
    }

    pub(crate) fn is_x_reduced(self) -> bool {
        self.0 & 2 == 2
    }
}

impl TryFrom<i32> for RecoveryId {
    type Error = Error;

    fn try_from(id: i32) -> Result<Self> {
        u8::try_from(id)
            .map_err(|_| Error::InvalidRecoveryId)
            .and_then(Self::new)
    }
}

/// A signature together with the recovery id needed to rebuild the
/// signer's public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    sig: Signature,
    recid: RecoveryId,
}

impl RecoverableSignature {
    pub(crate) fn new(sig: Signature, recid: RecoveryId) -> Self {
        Self { sig, recid }
    }

    pub fn from_compact(bytes: &[u8; COMPACT_SIGNATURE_SIZE], recid: RecoveryId) -> Result<Self> {
        Ok(Self {
            sig: Signature::from_compact(bytes)?,
            recid,
        })
    }

    pub fn to_compact(&self) -> ([u8; COMPACT_SIGNATURE_SIZE], RecoveryId) {
        (self.sig.to_compact(), self.recid)
    }

    pub fn recovery_id(&self) -> RecoveryId {
        self.recid
    }

    /// Drops the recovery id.
    pub fn to_standard(&self) -> Signature {
        self.sig
    }
}
