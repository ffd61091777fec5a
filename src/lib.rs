//! secp256k1 elliptic-curve cryptography
//!
//! This crate implements the secp256k1 curve and the protocols built on it
//! that wallets and blockchain nodes rely on: ECDSA signatures with public
//! key recovery, Diffie-Hellman point multiplication, key tweaking, and
//! Pedersen commitments with Borromean range proofs.
//!
//! The focus is on **exact arithmetic and constant-time handling of secret
//! data**. Everything that touches a secret key, a nonce or a blinding
//! factor runs without secret-dependent branches or table indices;
//! operations on public data use faster variable-time code and are marked
//! as such.
//!
//! # Module overview
//!
//! - `secp256k1`
//!   The arithmetic engine: field elements mod `p`, scalars mod `n`, affine
//!   and Jacobian points, and three scalar multiplication engines
//!   (blinded fixed-base, variable-time wNAF, constant-time arbitrary
//!   point).
//!
//! - `context`
//!   The [`Context`] holding the precomputed tables. Each table is a
//!   capability selected with [`ContextFlags`] and checked by every
//!   operation that needs it.
//!
//! - `hash`
//!   HMAC-SHA256 and the RFC 6979 HMAC-DRBG, on top of `sha2`.
//!
//! - `keys`
//!   Secret and public keys, their encodings, tweaks and ECDH point
//!   multiplication. No signing logic lives here.
//!
//! - `signatures`
//!   ECDSA signing, verification and recovery, with low-S normalization
//!   and the compact and DER encodings.
//!
//! - `commitments`
//!   Pedersen commitments, blinding factor sums, tally verification and
//!   range proofs.
//!
//! # Usage
//!
//! ```no_run
//! use cryptal_secp256k1::keys::{SecretKey, pubkey_create};
//! use cryptal_secp256k1::signatures::ecdsa;
//! use cryptal_secp256k1::{Context, ContextFlags};
//!
//! let ctx = Context::new(ContextFlags::SIGN | ContextFlags::VERIFY);
//! let secret = SecretKey::from_bytes(&[1u8; 32])?;
//! let public = pubkey_create(&ctx, &secret)?;
//!
//! let msg = [7u8; 32];
//! let sig = ecdsa::sign(&ctx, &msg, &secret)?;
//! assert!(ecdsa::verify(&ctx, &msg, &sig, &public)?);
//! # Ok::<(), cryptal_secp256k1::Error>(())
//! ```
//!
//! # Design goals
//!
//! - Constant-time handling of every secret value
//! - Precomputation paid once per context, shared read-only afterwards
//! - Explicit capability checks instead of undefined behavior
//! - Secrets wiped from memory when no longer needed

pub mod commitments;
pub mod context;
pub mod error;
pub mod hash;
pub mod keys;
pub mod secp256k1;
pub mod signatures;

pub use context::{Context, ContextFlags};
pub use error::{Capability, Error, Result};
