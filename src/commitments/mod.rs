//! Confidential amounts.
//!
//! A Pedersen commitment hides a 64-bit amount `v` behind a blinding
//! factor `r`:
//!
//! ```text
//! C = r·G + v·H
//! ```
//!
//! where `H` is a second generator with no known discrete log relative to
//! `G`. Commitments add up like the values and blinds they hide, which is
//! what tally verification checks.
//!
//! A range proof shows that a commitment opens to a value in a public
//! range without revealing it. The proof splits the value into base-4
//! digits, commits to each digit and proves with a Borromean ring
//! signature that every digit commitment hides one of its allowed digits.
//! Whoever knows the proof nonce can rewind the proof to read back the
//! value, the blinding factor and an optional embedded message.

/// Borromean ring signatures over digit commitments.
pub(crate) mod borromean;

/// Commit, blind sums and tally verification.
pub mod pedersen;

/// Range proof signing, verification, rewinding and header inspection.
pub mod rangeproof;

pub use pedersen::*;
pub use rangeproof::{ProvenRange, RangeProofInfo, RangeProofParams, RewoundProof, MAX_PROOF_SIZE};
