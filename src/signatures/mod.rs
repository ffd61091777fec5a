//! Digital signature schemes.
//!
//! This module groups signature algorithms built on top of the curve
//! arithmetic in [`secp256k1`](crate::secp256k1). Each submodule is
//! responsible for its own signature types, signing logic and verification
//! rules.
//!
//! ## ECDSA
//!
//! The `ecdsa` module implements ECDSA over secp256k1 with deterministic
//! RFC 6979 nonces, low-S canonical signatures, public key recovery, and
//! the compact (64-byte) and DER encodings.

pub mod ecdsa;
