//! Constant-time helpers shared by the fixed-base and ECDH engines.

use subtle::{ConditionallySelectable, ConstantTimeEq};

use super::group::Affine;

/// Returns `table[index]`, touching every entry.
///
/// The memory access pattern and running time depend on `table.len()`
/// only, never on `index`.
pub(crate) fn select_affine(table: &[Affine], index: u32) -> Affine {
    let mut r = Affine::INFINITY;
    for (i, entry) in table.iter().enumerate() {
        r.conditional_assign(entry, (i as u32).ct_eq(&index));
    }
    r
}
