//! Key material.
//!
//! This module defines secret and public keys for the secp256k1 curve,
//! their byte encodings and the operations that transform them:
//!
//! - creation of a public key from a secret key,
//! - validation of encoded keys,
//! - additive and multiplicative tweaks of either key,
//! - Diffie–Hellman style point multiplication.
//!
//! No signing or verification logic lives here; see
//! [`signatures`](crate::signatures) for ECDSA.
//!
//! ## Encodings
//!
//! Secret keys are 32-byte big-endian integers in `[1, n − 1]`. Public keys
//! accept the three SEC 1 encodings (compressed, uncompressed, hybrid) and
//! serialize as compressed or uncompressed on request.

pub mod secp256k1;

pub use secp256k1::*;
