//! Crate-wide error type.
//!
//! Every fallible operation reports one of these variants. Verification
//! answers are `Ok(true)` or `Ok(false)`; they only fail with an error when
//! the context is missing a table.

use std::fmt;

/// A precomputed table a [`Context`](crate::Context) may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Sign,
    Verify,
    Commit,
    RangeProof,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Sign => "sign",
            Capability::Verify => "verify",
            Capability::Commit => "commit",
            Capability::RangeProof => "range proof",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("secret key is zero or not below the group order")]
    InvalidSecretKey,
    #[error("public key encoding is malformed or not on the curve")]
    InvalidPublicKey,
    #[error("signature encoding is malformed or out of range")]
    InvalidSignature,
    #[error("recovery id must be in 0..=3")]
    InvalidRecoveryId,
    #[error("tweak is not below the group order or yields an invalid key")]
    InvalidTweak,
    #[error("commitment encoding is malformed")]
    InvalidCommitment,
    #[error("blinding factor is not below the group order")]
    InvalidBlindingFactor,
    #[error("range proof is malformed")]
    InvalidRangeProof,
    #[error("range proof parameters are out of bounds")]
    InvalidProofParameters,
    #[error("embedded message does not fit in the proof")]
    InvalidMessageLength,
    #[error("result is the point at infinity")]
    PointAtInfinity,
    #[error("nonce function failed")]
    NonceFunctionFailed,
    #[error("range proof signing hit a degenerate ring, retry with a different nonce")]
    RangeProofSigningFailed,
    #[error("range proof does not open with this nonce")]
    RewindFailed,
    #[error("context was built without the {0} capability")]
    MissingCapability(Capability),
}

pub type Result<T> = core::result::Result<T, Error>;
