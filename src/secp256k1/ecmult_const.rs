//! Constant-time multiplication of an arbitrary point.
//!
//! Used for ECDH-style point multiplication and multiplicative tweaks,
//! where the point is public but the scalar is secret. The scalar is walked
//! in fixed 4-bit windows from the top, with four doublings and one masked
//! table lookup per window regardless of its bits.

use zeroize::Zeroize;

use super::ct;
use super::group::{Affine, Jacobian};
use super::scalar::Scalar;

const WINDOW_BITS: usize = 4;
const TABLE_SIZE: usize = 1 << WINDOW_BITS;
const WINDOWS: usize = 256 / WINDOW_BITS;

/// Computes `k·a` without branching on `k`.
///
/// The table `[0·a, 1·a, …, 15·a]` depends on `a` only. A finite `a` of
/// prime order never produces infinity in entries 1 to 15.
pub fn ecmult_const(a: &Affine, k: &Scalar) -> Jacobian {
    if a.is_infinity() {
        return Jacobian::INFINITY;
    }

    let mut table = Vec::with_capacity(TABLE_SIZE);
    table.push(Jacobian::INFINITY);
    let aj = Jacobian::from_affine(a);
    table.push(aj);
    for i in 2..TABLE_SIZE {
        let prev: Jacobian = table[i - 1];
        table.push(prev.add_affine_var(a));
    }
    let table = Affine::batch_from_jacobian(&table);

    let mut r = Jacobian::INFINITY;
    for w in (0..WINDOWS).rev() {
        for _ in 0..WINDOW_BITS {
            r = r.double();
        }
        let bits = k.get_bits(w * WINDOW_BITS, WINDOW_BITS);
        let mut add = ct::select_affine(&table, bits);
        r = r.add_affine(&add);
        add.zeroize();
    }
    r
}
