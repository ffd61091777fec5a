//! secp256k1 curve arithmetic.
//!
//! The curve is `y² = x³ + 7` over the prime field of order
//!
//! ```text
//! p = 2²⁵⁶ − 2³² − 977
//! ```
//!
//! with a prime-order group of order
//!
//! ```text
//! n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141
//! ```
//!
//! ## Layers
//!
//! - `field`: elements mod `p` with lazy reduction (magnitude tracking)
//! - `scalar`: integers mod `n`
//! - `group`: affine and Jacobian points, SEC 1 encodings, the generators
//!   `G` and `H`
//! - `ecmult`: variable-time `a·A + g·G` for public inputs
//! - `ecmult_gen`: constant-time blinded `k·G` and unblinded `v·H`
//! - `ecmult_const`: constant-time `k·A` for an arbitrary point
//!
//! ## Constant-time contract
//!
//! Field and scalar arithmetic, `Jacobian::double`, `Jacobian::add_affine`
//! and the `ecmult_gen` / `ecmult_const` engines run in time independent
//! of their operand values. Functions with a `_var` suffix, and the whole
//! `ecmult` module, branch on their inputs and must only see public data.

pub mod ecmult;
pub mod ecmult_const;
pub mod ecmult_gen;
pub mod field;
pub mod group;
pub mod scalar;

pub(crate) mod ct;
