//! Variable-time multi-scalar multiplication.
//!
//! Computes linear combinations `Σ aᵢ·Aᵢ + g·G` as needed by signature
//! verification, public key recovery, tweaks of public keys and Borromean
//! ring verification. Every input here is public, so the code freely
//! branches on scalar digits.
//!
//! ## Algorithm
//!
//! Straus' interleaving over width-`w` non-adjacent forms:
//!
//! - each scalar is recoded into signed odd digits in `(−2ʷ⁻¹, 2ʷ⁻¹)`
//!   with at least `w − 1` zeros between non-zero digits;
//! - every arbitrary point gets a small table of its odd multiples
//!   `A, 3A, …, (2ʷ⁻¹ − 1)A` (window [`WINDOW_A`]);
//! - the generator uses a much larger affine table built once per context
//!   (window [`WINDOW_G`]);
//! - a single doubling chain walks all digit streams from the top bit.

use tracing::debug;

use super::group::{Affine, G, Jacobian};
use super::scalar::Scalar;

/// wNAF window for points only known at call time.
pub const WINDOW_A: usize = 5;

/// wNAF window for the generator, backed by the context table.
pub const WINDOW_G: usize = 12;

const TABLE_SIZE_A: usize = 1 << (WINDOW_A - 2);
const TABLE_SIZE_G: usize = 1 << (WINDOW_G - 2);

/// Digit capacity. One more than the scalar width so a final carry fits.
const WNAF_BITS: usize = 257;

/// Precomputed odd multiples of `G` for verification.
#[derive(Clone)]
pub struct EcmultContext {
    pre_g: Vec<Affine>,
}

impl EcmultContext {
    /// Builds the table `G, 3G, 5G, …, (2·TABLE_SIZE_G − 1)G`.
    pub fn new() -> Self {
        let pre = odd_multiples(&Jacobian::from_affine(&G), TABLE_SIZE_G);
        let pre_g = Affine::batch_from_jacobian(&pre);
        debug!(entries = pre_g.len(), "built verification table");
        Self { pre_g }
    }

    /// Computes `na·a + ng·G`.
    pub fn ecmult(&self, a: &Jacobian, na: &Scalar, ng: &Scalar) -> Jacobian {
        self.ecmult_multi(&[(*a, *na)], ng)
    }

    /// Computes `Σ sᵢ·Pᵢ + ng·G`.
    pub fn ecmult_multi(&self, terms: &[(Jacobian, Scalar)], ng: &Scalar) -> Jacobian {
        struct Stream {
            wnaf: [i32; WNAF_BITS],
            table: Vec<Jacobian>,
        }

        let mut bits = 0;
        let mut streams = Vec::with_capacity(terms.len());
        for (point, scalar) in terms {
            if point.is_infinity() || bool::from(scalar.is_zero()) {
                continue;
            }
            let mut wnaf = [0i32; WNAF_BITS];
            let len = wnaf_recode(&mut wnaf, scalar, WINDOW_A);
            bits = bits.max(len);
            streams.push(Stream {
                wnaf,
                table: odd_multiples(point, TABLE_SIZE_A),
            });
        }

        let mut wnaf_g = [0i32; WNAF_BITS];
        let bits_g = wnaf_recode(&mut wnaf_g, ng, WINDOW_G);
        bits = bits.max(bits_g);

        let mut r = Jacobian::INFINITY;
        for i in (0..bits).rev() {
            r = r.double();
            for stream in &streams {
                let n = stream.wnaf[i];
                if n != 0 {
                    r = r.add_var(&lookup_jacobian(&stream.table, n));
                }
            }
            let n = wnaf_g[i];
            if n != 0 {
                r = r.add_affine_var(&lookup_affine(&self.pre_g, n));
            }
        }
        r
    }
}

impl Default for EcmultContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns `a, 3a, 5a, …` (`count` entries).
pub(crate) fn odd_multiples(a: &Jacobian, count: usize) -> Vec<Jacobian> {
    let mut pre = Vec::with_capacity(count);
    pre.push(*a);
    let d = a.double();
    for i in 1..count {
        pre.push(pre[i - 1].add_var(&d));
    }
    pre
}

fn lookup_jacobian(table: &[Jacobian], n: i32) -> Jacobian {
    if n > 0 {
        table[((n - 1) / 2) as usize]
    } else {
        -table[((-n - 1) / 2) as usize]
    }
}

fn lookup_affine(table: &[Affine], n: i32) -> Affine {
    if n > 0 {
        table[((n - 1) / 2) as usize]
    } else {
        -table[((-n - 1) / 2) as usize]
    }
}

/// Reads up to `count` bits at `offset`, treating bits past 255 as zero.
fn bits_var(s: &Scalar, offset: usize, count: usize) -> i32 {
    if offset >= 256 {
        return 0;
    }
    s.get_bits_var(offset, count.min(256 - offset)) as i32
}

/// Recodes `a` into width-`w` NAF digits, returning the index one past the
/// highest non-zero digit.
///
/// Scalars above `n / 2` are negated first so the recoded magnitude stays
/// below 2²⁵⁵; the digits are then negated back.
pub(crate) fn wnaf_recode(wnaf: &mut [i32; WNAF_BITS], a: &Scalar, w: usize) -> usize {
    wnaf.fill(0);

    let mut s = *a;
    let mut sign = 1;
    if bits_var(&s, 255, 1) == 1 {
        s = -s;
        sign = -1;
    }

    let mut last_set_bit: Option<usize> = None;
    let mut carry = 0;
    let mut bit = 0;
    while bit < WNAF_BITS {
        if bits_var(&s, bit, 1) == carry {
            bit += 1;
            continue;
        }

        let now = w.min(WNAF_BITS - bit);
        let mut word = bits_var(&s, bit, now) + carry;
        carry = (word >> (w - 1)) & 1;
        word -= carry << w;

        wnaf[bit] = sign * word;
        last_set_bit = Some(bit);
        bit += now;
    }

    last_set_bit.map_or(0, |b| b + 1)
}
