//! ECDSA over secp256k1.
//!
//! Signing walks a small state machine per attempt:
//!
//! ```text
//! start → nonce requested → nonce validated → signature computed → done
//!                ↑                  │                   │
//!                └──── attempt + 1 ─┴───────────────────┘
//! ```
//!
//! A nonce candidate that is zero or not below `n`, or that yields `r = 0`
//! or `s = 0`, is skipped by asking the nonce function for the next
//! attempt. A nonce function that reports failure aborts signing.
//!
//! Produced signatures always carry a low `s` (at most `n / 2`), and
//! verification rejects high-`s` signatures; [`Signature::normalize_s`]
//! converts third-party signatures first.

/// Signature, recovery id and their byte encodings.
pub(crate) mod core;

/// Pluggable nonce derivation.
pub(crate) mod nonce;

/// Signing.
pub(crate) mod sign;

/// Verification and public key recovery.
pub(crate) mod verify;

pub use self::core::*;
pub use nonce::*;
pub use sign::*;
pub use verify::*;
