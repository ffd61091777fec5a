//! Finite field arithmetic for secp256k1.
//!
//! This module implements arithmetic in the prime field
//!
//! ```text
//! 𝔽ₚ where p = 2²⁵⁶ − 2³² − 977
//! ```
//!
//! over which the secp256k1 curve `y² = x³ + 7` is defined.
//!
//! ## Representation
//!
//! Field elements are stored as five unsigned 64-bit limbs in radix 2⁵²:
//!
//! ```text
//! value = n[0] + n[1]·2⁵² + n[2]·2¹⁰⁴ + n[3]·2¹⁵⁶ + n[4]·2²⁰⁸
//! ```
//!
//! The twelve spare bits of each limb absorb carries, so additions and
//! negations never propagate anything. Every element carries two pieces of
//! bookkeeping alongside its limbs:
//!
//! - `magnitude`: an upper bound `m` such that every limb is at most
//!   `2·m·(2⁵² − 1)` (`2·m·(2⁴⁸ − 1)` for the top limb).
//! - `normalized`: whether the limbs hold the unique representative in
//!   `[0, p)`.
//!
//! Both are derived from the sequence of operations only, never from the
//! value itself, so tracking them does not leak anything about secrets.
//! Debug builds assert the bounds each operation relies on.
//!
//! ## Reduction
//!
//! Since `2²⁵⁶ ≡ 2³² + 977 (mod p)`, a value spilling over bit 256 is folded
//! back by multiplying the overflow with `0x1000003D1`. Products fold their
//! upper half with `R = 0x1000003D10` (the same constant shifted by the four
//! bits that separate `2²⁶⁰` from `2²⁵⁶`).
//!
//! ## Constant time
//!
//! Every operation except the ones suffixed with `_var` runs in time
//! independent of the limb values.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

const M52: u64 = 0xF_FFFF_FFFF_FFFF;
const M48: u64 = 0xFFFF_FFFF_FFFF;
const R: u64 = 0x10_0000_3D10;
const R_FOLD: u64 = 0x1_0000_03D1;

/// Limbs of `p` in radix 2⁵².
const P0: u64 = 0xF_FFFE_FFFF_FC2F;
const P4: u64 = M48;

/// Largest magnitude accepted by [`FieldElement::mul`] and
/// [`FieldElement::square`].
const MAX_MUL_MAGNITUDE: u32 = 8;

/// Largest magnitude any element may ever reach.
const MAX_MAGNITUDE: u32 = 32;

/// An element of 𝔽ₚ in lazily reduced 5×52 representation.
#[derive(Clone, Copy, Debug, Zeroize)]
pub struct FieldElement {
    n: [u64; 5],
    magnitude: u32,
    normalized: bool,
}

impl FieldElement {
    pub const ZERO: Self = Self::from_words([0, 0, 0, 0, 0, 0, 0, 0]);
    pub const ONE: Self = Self::from_words([0, 0, 0, 0, 0, 0, 0, 1]);

    /// The curve constant `b = 7`.
    pub const B: Self = Self::from_words([0, 0, 0, 0, 0, 0, 0, 7]);

    /// Builds a normalized constant from eight big-endian 32-bit words.
    ///
    /// The caller guarantees the value is below `p`.
    pub const fn from_words(w: [u32; 8]) -> Self {
        let (d0, d1, d2, d3) = (w[7] as u64, w[6] as u64, w[5] as u64, w[4] as u64);
        let (d4, d5, d6, d7) = (w[3] as u64, w[2] as u64, w[1] as u64, w[0] as u64);
        Self {
            n: [
                d0 | ((d1 & 0xFFFFF) << 32),
                (d1 >> 20) | (d2 << 12) | ((d3 & 0xFF) << 44),
                (d3 >> 8) | ((d4 & 0xFFF_FFFF) << 24),
                (d4 >> 28) | (d5 << 4) | ((d6 & 0xFFFF) << 36),
                (d6 >> 16) | (d7 << 16),
            ],
            magnitude: 1,
            normalized: true,
        }
    }

    /// Builds a normalized element from a small integer.
    pub const fn from_u32(v: u32) -> Self {
        Self::from_words([0, 0, 0, 0, 0, 0, 0, v])
    }

    /// Returns the current magnitude bound.
    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }

    /// Returns `true` when the limbs hold the canonical representative.
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Decodes a 32-byte big-endian value.
    ///
    /// Returns `None` when the value is not below `p`. Rejecting overflow
    /// keeps public key and signature parsing canonical.
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        let word = |i: usize| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[24 - 8 * i..32 - 8 * i]);
            u64::from_be_bytes(buf)
        };
        let (w0, w1, w2, w3) = (word(0), word(1), word(2), word(3));

        let r = Self {
            n: [
                w0 & M52,
                ((w0 >> 52) | (w1 << 12)) & M52,
                ((w1 >> 40) | (w2 << 24)) & M52,
                ((w2 >> 28) | (w3 << 36)) & M52,
                w3 >> 16,
            ],
            magnitude: 1,
            normalized: true,
        };

        let overflow = (r.n[4] == P4) & ((r.n[3] & r.n[2] & r.n[1]) == M52) & (r.n[0] >= P0);
        if overflow { None } else { Some(r) }
    }

    /// Encodes the canonical representative as 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut t = *self;
        t.normalize();
        let n = t.n;

        let words = [
            n[0] | (n[1] << 52),
            (n[1] >> 12) | (n[2] << 40),
            (n[2] >> 24) | (n[3] << 28),
            (n[3] >> 36) | (n[4] << 16),
        ];

        let mut out = [0u8; 32];
        for (i, w) in words.iter().enumerate() {
            out[24 - 8 * i..32 - 8 * i].copy_from_slice(&w.to_be_bytes());
        }
        out
    }

    /// Fully reduces the element to its canonical representative.
    ///
    /// Two carry passes are needed: the first folds everything above bit
    /// 256 back into the low limb, the second subtracts `p` once if the
    /// result still lands in `[p, 2²⁵⁶)`.
    pub fn normalize(&mut self) {
        let [mut t0, mut t1, mut t2, mut t3, mut t4] = self.n;

        let mut x = t4 >> 48;
        t4 &= M48;

        t0 += x * R_FOLD;
        t1 += t0 >> 52;
        t0 &= M52;
        t2 += t1 >> 52;
        t1 &= M52;
        let mut m = t1;
        t3 += t2 >> 52;
        t2 &= M52;
        m &= t2;
        t4 += t3 >> 52;
        t3 &= M52;
        m &= t3;

        x = (t4 >> 48) | ((t4 == M48) as u64 & (m == M52) as u64 & (t0 >= P0) as u64);

        t0 += x * R_FOLD;
        t1 += t0 >> 52;
        t0 &= M52;
        t2 += t1 >> 52;
        t1 &= M52;
        t3 += t2 >> 52;
        t2 &= M52;
        t4 += t3 >> 52;
        t3 &= M52;
        t4 &= M48;

        self.n = [t0, t1, t2, t3, t4];
        self.magnitude = 1;
        self.normalized = true;
    }

    /// Reduces the magnitude to 1 without producing the canonical form.
    pub fn normalize_weak(&mut self) {
        let [mut t0, mut t1, mut t2, mut t3, mut t4] = self.n;

        let x = t4 >> 48;
        t4 &= M48;

        t0 += x * R_FOLD;
        t1 += t0 >> 52;
        t0 &= M52;
        t2 += t1 >> 52;
        t1 &= M52;
        t3 += t2 >> 52;
        t2 &= M52;
        t4 += t3 >> 52;
        t3 &= M52;

        self.n = [t0, t1, t2, t3, t4];
        self.magnitude = 1;
    }

    /// Returns the normalized copy of `self`.
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Checks whether the element is congruent to zero without
    /// normalizing it.
    ///
    /// After one carry pass the only two representations of zero that
    /// can remain are `0` and `p` itself.
    pub fn normalizes_to_zero(&self) -> Choice {
        let [mut t0, mut t1, mut t2, mut t3, mut t4] = self.n;

        let x = t4 >> 48;
        t4 &= M48;

        t0 += x * R_FOLD;
        t1 += t0 >> 52;
        t0 &= M52;
        let mut z0 = t0;
        let mut z1 = t0 ^ 0x1_0000_03D0;
        t2 += t1 >> 52;
        t1 &= M52;
        z0 |= t1;
        z1 &= t1;
        t3 += t2 >> 52;
        t2 &= M52;
        z0 |= t2;
        z1 &= t2;
        t4 += t3 >> 52;
        t3 &= M52;
        z0 |= t3;
        z1 &= t3;
        z0 |= t4;
        z1 &= t4 ^ 0xF_0000_0000_0000;

        z0.ct_eq(&0) | z1.ct_eq(&M52)
    }

    /// Variable-time form of [`normalizes_to_zero`](Self::normalizes_to_zero).
    pub fn normalizes_to_zero_var(&self) -> bool {
        self.normalizes_to_zero().into()
    }

    /// Returns whether a normalized element is zero.
    pub fn is_zero(&self) -> Choice {
        debug_assert!(self.normalized);
        (self.n[0] | self.n[1] | self.n[2] | self.n[3] | self.n[4]).ct_eq(&0)
    }

    /// Returns whether a normalized element is odd.
    pub fn is_odd(&self) -> Choice {
        debug_assert!(self.normalized);
        Choice::from((self.n[0] & 1) as u8)
    }

    /// Compares two normalized elements as integers.
    pub fn cmp_var(&self, other: &Self) -> Ordering {
        debug_assert!(self.normalized && other.normalized);
        for i in (0..5).rev() {
            match self.n[i].cmp(&other.n[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Returns `p − self` scaled to stay non-negative, for an element of
    /// magnitude at most `m`. The result has magnitude `m + 1`.
    pub fn negate(&self, m: u32) -> Self {
        debug_assert!(self.magnitude <= m);
        let k = 2 * (m as u64 + 1);
        Self {
            n: [
                k * P0 - self.n[0],
                k * M52 - self.n[1],
                k * M52 - self.n[2],
                k * M52 - self.n[3],
                k * P4 - self.n[4],
            ],
            magnitude: m + 1,
            normalized: false,
        }
    }

    /// Multiplies by a small integer without reducing.
    pub fn mul_int(&self, k: u32) -> Self {
        let magnitude = self.magnitude * k;
        debug_assert!(magnitude <= MAX_MAGNITUDE);
        let k = k as u64;
        Self {
            n: self.n.map(|l| l * k),
            magnitude,
            normalized: false,
        }
    }

    /// Squares the element.
    pub fn square(&self) -> Self {
        self.mul(*self)
    }

    /// Squares the element `n` times.
    pub fn n_square(&self, n: usize) -> Self {
        let mut r = *self;
        for _ in 0..n {
            r = r.square();
        }
        r
    }

    /// Shared prefix of the inversion and square root addition chains.
    ///
    /// Returns `(x2, x22, x223)` where `xk = self^(2ᵏ − 1)`.
    fn pow_chain_prefix(&self) -> (Self, Self, Self) {
        let a = *self;
        let x2 = a.square() * a;
        let x3 = x2.square() * a;
        let x6 = x3.n_square(3) * x3;
        let x9 = x6.n_square(3) * x3;
        let x11 = x9.n_square(2) * x2;
        let x22 = x11.n_square(11) * x11;
        let x44 = x22.n_square(22) * x22;
        let x88 = x44.n_square(44) * x44;
        let x176 = x88.n_square(88) * x88;
        let x220 = x176.n_square(44) * x44;
        let x223 = x220.n_square(3) * x3;
        (x2, x22, x223)
    }

    /// Computes `self^(p − 2)`, the multiplicative inverse of a non-zero
    /// element. Zero maps to zero.
    ///
    /// The exponent `p − 2` has the bit pattern
    /// `[1]²²³ 0 [1]²² 0000 1 0 11 0 1`, which the chain below walks with
    /// 255 squarings and 15 multiplications.
    pub fn invert(&self) -> Self {
        let (x2, x22, x223) = self.pow_chain_prefix();
        let mut t = x223.n_square(23) * x22;
        t = t.n_square(5) * *self;
        t = t.n_square(3) * x2;
        t.n_square(2) * *self
    }

    /// Computes a square root, if one exists.
    ///
    /// Because `p ≡ 3 (mod 4)`, a candidate root is `self^((p + 1) / 4)`;
    /// squaring it back tells whether `self` was a quadratic residue.
    pub fn sqrt(&self) -> Option<Self> {
        let (x2, x22, x223) = self.pow_chain_prefix();
        let mut t = x223.n_square(23) * x22;
        t = t.n_square(6) * x2;
        let r = t.n_square(2);

        if r.square() == *self { Some(r) } else { None }
    }

    /// Inverts a batch of elements with a single field inversion.
    ///
    /// Every input must be non-zero.
    pub fn batch_invert(inputs: &[Self]) -> Vec<Self> {
        if inputs.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(inputs.len());
        let mut acc = inputs[0];
        out.push(acc);
        for x in &inputs[1..] {
            acc = acc * *x;
            out.push(acc);
        }

        let mut inv = acc.invert();
        for i in (1..inputs.len()).rev() {
            let prefix = out[i - 1];
            out[i] = inv * prefix;
            inv = inv * inputs[i];
        }
        out[0] = inv;
        out
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Lazy addition. The magnitudes add up and no carry is propagated.
impl Add for FieldElement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let magnitude = self.magnitude + rhs.magnitude;
        debug_assert!(magnitude <= MAX_MAGNITUDE);
        Self {
            n: [
                self.n[0] + rhs.n[0],
                self.n[1] + rhs.n[1],
                self.n[2] + rhs.n[2],
                self.n[3] + rhs.n[3],
                self.n[4] + rhs.n[4],
            ],
            magnitude,
            normalized: false,
        }
    }
}

impl AddAssign for FieldElement {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Neg for FieldElement {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate(self.magnitude)
    }
}

impl Sub for FieldElement {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

/// Field multiplication.
///
/// The 10-limb schoolbook product is accumulated in two 128-bit
/// accumulators: `c` walks the low half upwards while `d` walks the high
/// half, folding each high limb into the low half with `R` as soon as it is
/// complete. Both inputs must have magnitude at most 8; the output has
/// magnitude 1.
impl Mul for FieldElement {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        debug_assert!(self.magnitude <= MAX_MUL_MAGNITUDE);
        debug_assert!(rhs.magnitude <= MAX_MUL_MAGNITUDE);

        macro_rules! m {
            ($a:expr, $b:expr) => {
                ($a as u128) * ($b as u128)
            };
        }

        let [a0, a1, a2, a3, a4] = self.n;
        let b = rhs.n;
        let mm = M52 as u128;
        let rr = R as u128;
        let mut r = [0u64; 5];

        let mut d = m!(a0, b[3]) + m!(a1, b[2]) + m!(a2, b[1]) + m!(a3, b[0]);
        let mut c = m!(a4, b[4]);
        d += (c & mm) * rr;
        c >>= 52;
        let t3 = (d & mm) as u64;
        d >>= 52;

        d += m!(a0, b[4]) + m!(a1, b[3]) + m!(a2, b[2]) + m!(a3, b[1]) + m!(a4, b[0]);
        d += c * rr;
        let mut t4 = (d & mm) as u64;
        d >>= 52;
        let tx = t4 >> 48;
        t4 &= M48;

        c = m!(a0, b[0]);
        d += m!(a1, b[4]) + m!(a2, b[3]) + m!(a3, b[2]) + m!(a4, b[1]);
        let mut u0 = (d & mm) as u64;
        d >>= 52;
        u0 = (u0 << 4) | tx;
        c += m!(u0, R >> 4);
        r[0] = (c & mm) as u64;
        c >>= 52;

        c += m!(a0, b[1]) + m!(a1, b[0]);
        d += m!(a2, b[4]) + m!(a3, b[3]) + m!(a4, b[2]);
        c += (d & mm) * rr;
        d >>= 52;
        r[1] = (c & mm) as u64;
        c >>= 52;

        c += m!(a0, b[2]) + m!(a1, b[1]) + m!(a2, b[0]);
        d += m!(a3, b[4]) + m!(a4, b[3]);
        c += (d & mm) * rr;
        d >>= 52;

        r[2] = (c & mm) as u64;
        c >>= 52;
        c += d * rr + t3 as u128;
        r[3] = (c & mm) as u64;
        c >>= 52;
        c += t4 as u128;
        r[4] = c as u64;

        Self {
            n: r,
            magnitude: 1,
            normalized: false,
        }
    }
}

impl MulAssign for FieldElement {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut n = [0u64; 5];
        for (i, limb) in n.iter_mut().enumerate() {
            *limb = u64::conditional_select(&a.n[i], &b.n[i], choice);
        }
        Self {
            n,
            magnitude: a.magnitude.max(b.magnitude),
            normalized: a.normalized && b.normalized,
        }
    }
}

/// Equality modulo `p`, regardless of representation.
impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        let mut diff = *self - *other;
        diff.normalize_weak();
        diff.normalizes_to_zero()
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for FieldElement {}
