//! Scalar arithmetic modulo the secp256k1 group order.
//!
//! Scalars are integers modulo
//!
//! ```text
//! n = 0xFFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141
//! ```
//!
//! and serve as secret keys, nonces, blinding factors, signature components
//! and multipliers of curve points.
//!
//! ## Representation
//!
//! A scalar is four little-endian 64-bit limbs, always fully reduced. Since
//! `2²⁵⁶ − n` (`N_C` below) is only 129 bits wide, reduction of a wide
//! product folds its upper half back as `lo + hi·N_C` until nothing is left
//! above bit 256, then subtracts `n` at most once.
//!
//! All arithmetic is constant time. Helpers suffixed with `_var` may branch
//! on the value and are only used on public data.

use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

/// The group order `n`, little-endian limbs.
const N: [u64; 4] = [
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// `2²⁵⁶ − n`.
const N_C: [u64; 3] = [0x402D_A173_2FC9_BEBF, 0x4551_2319_50B7_5FC4, 1];

/// `⌊n / 2⌋`.
const N_HALF: [u64; 4] = [
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
];

/// `n − 2`, the Fermat inversion exponent.
const N_MINUS_2: [u64; 4] = [
    0xBFD2_5E8C_D036_413F,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// Subtract with borrow. `borrow` is 0 or 1 on input and output.
#[inline(always)]
fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let t = (a as u128).wrapping_sub(b as u128 + borrow as u128);
    (t as u64, (t >> 127) as u64)
}

/// Add with carry. `carry` is 0 or 1 on input and output.
#[inline(always)]
fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let t = a as u128 + b as u128 + carry as u128;
    (t as u64, (t >> 64) as u64)
}

/// Returns `a − b` and the final borrow.
fn sub_borrow(a: &[u64; 4], b: &[u64; 4]) -> ([u64; 4], u64) {
    let mut r = [0u64; 4];
    let mut borrow = 0;
    for i in 0..4 {
        (r[i], borrow) = sbb(a[i], b[i], borrow);
    }
    (r, borrow)
}

/// Returns 1 when the 256-bit integer `a` is at least `n`.
fn check_overflow(a: &[u64; 4]) -> u64 {
    let (_, borrow) = sub_borrow(a, &N);
    borrow ^ 1
}

/// A scalar modulo the group order.
#[derive(Clone, Copy, Debug, Default, Zeroize)]
pub struct Scalar {
    d: [u64; 4],
}

impl Scalar {
    pub const ZERO: Self = Self { d: [0; 4] };
    pub const ONE: Self = Self { d: [1, 0, 0, 0] };

    pub const fn from_u64(v: u64) -> Self {
        Self { d: [v, 0, 0, 0] }
    }

    /// Subtracts `n` when `overflow` is 1, by adding `2²⁵⁶ − n` and
    /// dropping the carry.
    fn reduce(mut self, overflow: u64) -> Self {
        let mask = overflow.wrapping_neg();
        let mut carry = 0;
        (self.d[0], carry) = adc(self.d[0], N_C[0] & mask, carry);
        (self.d[1], carry) = adc(self.d[1], N_C[1] & mask, carry);
        (self.d[2], carry) = adc(self.d[2], N_C[2] & mask, carry);
        (self.d[3], _) = adc(self.d[3], 0, carry);
        self
    }

    /// Decodes 32 big-endian bytes, reducing modulo `n`.
    ///
    /// The second value reports whether the input was at least `n`.
    pub fn from_bytes_reduced(bytes: &[u8; 32]) -> (Self, bool) {
        let mut d = [0u64; 4];
        for (i, limb) in d.iter_mut().enumerate() {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[24 - 8 * i..32 - 8 * i]);
            *limb = u64::from_be_bytes(buf);
        }

        let overflow = check_overflow(&d);
        (Self { d }.reduce(overflow), overflow == 1)
    }

    /// Decodes 32 big-endian bytes, rejecting values that are not below `n`.
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        match Self::from_bytes_reduced(bytes) {
            (s, false) => Some(s),
            (_, true) => None,
        }
    }

    /// Encodes the scalar as 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, limb) in self.d.iter().enumerate() {
            out[24 - 8 * i..32 - 8 * i].copy_from_slice(&limb.to_be_bytes());
        }
        out
    }

    pub fn is_zero(&self) -> Choice {
        (self.d[0] | self.d[1] | self.d[2] | self.d[3]).ct_eq(&0)
    }

    pub fn is_one(&self) -> Choice {
        ((self.d[0] ^ 1) | self.d[1] | self.d[2] | self.d[3]).ct_eq(&0)
    }

    pub fn is_even(&self) -> Choice {
        Choice::from((!self.d[0] & 1) as u8)
    }

    /// Returns whether the scalar is above `n / 2`.
    pub fn is_high(&self) -> Choice {
        let (_, borrow) = sub_borrow(&N_HALF, &self.d);
        Choice::from(borrow as u8)
    }

    /// Adds two scalars and reports whether the integer sum reached `n`.
    ///
    /// Tweaking uses the flag to tell when a result wrapped around.
    pub fn add_overflowing(&self, rhs: &Self) -> (Self, bool) {
        let mut d = [0u64; 4];
        let mut carry = 0;
        for i in 0..4 {
            (d[i], carry) = adc(self.d[i], rhs.d[i], carry);
        }
        let overflow = carry | check_overflow(&d);
        (Self { d }.reduce(overflow), overflow == 1)
    }

    /// Negates the scalar when `flag` is set.
    pub fn cond_negate(&self, flag: Choice) -> Self {
        Self::conditional_select(self, &-*self, flag)
    }

    /// Extracts `count` bits starting at `offset`. The range must not cross
    /// a limb boundary and `count` must be below 32.
    pub fn get_bits(&self, offset: usize, count: usize) -> u32 {
        debug_assert!((offset + count - 1) >> 6 == offset >> 6);
        ((self.d[offset >> 6] >> (offset & 0x3F)) & ((1u64 << count) - 1)) as u32
    }

    /// Extracts `count` bits starting at `offset`, possibly crossing a limb.
    pub fn get_bits_var(&self, offset: usize, count: usize) -> u32 {
        debug_assert!(count < 32 && offset + count <= 256);
        if (offset + count - 1) >> 6 == offset >> 6 {
            self.get_bits(offset, count)
        } else {
            let lo = self.d[offset >> 6] >> (offset & 0x3F);
            let hi = self.d[(offset >> 6) + 1] << (64 - (offset & 0x3F));
            ((lo | hi) & ((1u64 << count) - 1)) as u32
        }
    }

    /// Computes the multiplicative inverse by Fermat's little theorem,
    /// `a⁻¹ = a^(n − 2)`. Zero maps to zero.
    ///
    /// A fixed 4-bit window walks the public exponent, so the sequence of
    /// operations never depends on `self`.
    pub fn invert(&self) -> Self {
        let mut table = [Self::ONE; 16];
        for i in 1..16 {
            table[i] = table[i - 1] * *self;
        }

        let mut r = Self::ONE;
        for limb in N_MINUS_2.iter().rev() {
            for nibble in (0..16).rev() {
                for _ in 0..4 {
                    r = r * r;
                }
                r = r * table[((limb >> (4 * nibble)) & 0xF) as usize];
            }
        }
        r
    }

    /// Reduces a 512-bit little-endian integer modulo `n`.
    fn reduce_wide(l: [u64; 8]) -> Self {
        // Four folds always bring the value below 2²⁵⁶.
        let mut w = l;
        for _ in 0..4 {
            w = fold(&w);
        }
        let d = [w[0], w[1], w[2], w[3]];
        Self { d }.reduce(check_overflow(&d))
    }
}

/// Computes `lo + hi·N_C` for a 512-bit integer split into two 256-bit
/// halves. The result is congruent modulo `n` and much shorter.
fn fold(l: &[u64; 8]) -> [u64; 8] {
    let mut r = [0u64; 8];
    r[..4].copy_from_slice(&l[..4]);

    for i in 0..4 {
        let h = l[4 + i] as u128;
        let mut carry: u128 = 0;
        for (j, c) in N_C.iter().enumerate() {
            let t = r[i + j] as u128 + h * (*c as u128) + carry;
            r[i + j] = t as u64;
            carry = t >> 64;
        }
        for limb in r.iter_mut().skip(i + 3) {
            let t = *limb as u128 + carry;
            *limb = t as u64;
            carry = t >> 64;
        }
    }
    r
}

impl Add for Scalar {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.add_overflowing(&rhs).0
    }
}

impl AddAssign for Scalar {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// `n − a`, with zero mapping to zero.
impl Neg for Scalar {
    type Output = Self;

    fn neg(self) -> Self::Output {
        let nonzero = ((!self.is_zero()).unwrap_u8() as u64).wrapping_neg();
        let (d, _) = sub_borrow(&N, &self.d);
        Self {
            d: d.map(|x| x & nonzero),
        }
    }
}

impl Sub for Scalar {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl Mul for Scalar {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut l = [0u64; 8];
        for i in 0..4 {
            let mut carry: u128 = 0;
            for j in 0..4 {
                let t = l[i + j] as u128 + (self.d[i] as u128) * (rhs.d[j] as u128) + carry;
                l[i + j] = t as u64;
                carry = t >> 64;
            }
            l[i + 4] = carry as u64;
        }
        Self::reduce_wide(l)
    }
}

impl MulAssign for Scalar {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            d: [
                u64::conditional_select(&a.d[0], &b.d[0], choice),
                u64::conditional_select(&a.d[1], &b.d[1], choice),
                u64::conditional_select(&a.d[2], &b.d[2], choice),
                u64::conditional_select(&a.d[3], &b.d[3], choice),
            ],
        }
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.d[..].ct_eq(&other.d[..])
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Self::from_u64(v)
    }
}
