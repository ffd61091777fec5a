//! secp256k1 group operations.
//!
//! The curve is the short Weierstrass curve
//!
//! ```text
//! E : y² = x³ + 7  over 𝔽ₚ
//! ```
//!
//! whose rational points form a cyclic group of prime order `n`, generated
//! by `G`. A second generator `H` (also written `G2`) with no known
//! discrete-log relation to `G` is used by Pedersen commitments.
//!
//! ## Coordinate systems
//!
//! - [`Affine`]: `(x, y)` plus an explicit infinity flag. Coordinates of a
//!   finite affine point are always normalized. Used for inputs, outputs and
//!   precomputed tables.
//! - [`Jacobian`]: `(X : Y : Z)` representing `(X/Z², Y/Z³)`. All
//!   accumulation happens here, so no inversion is needed until the very end.
//!   Coordinates are kept at magnitude 1 between operations.
//!
//! ## Constant time
//!
//! [`Jacobian::add_affine`] and [`Jacobian::double`] are branch-free with
//! respect to coordinates; they are the only formulas the constant-time
//! engines use. The `_var` additions branch on the intermediate values and
//! are reserved for public data.
//!
//! ## Encodings
//!
//! Points are encoded as in SEC 1: compressed (`02`/`03` ‖ x), uncompressed
//! (`04` ‖ x ‖ y) and hybrid (`06`/`07` ‖ x ‖ y, where the prefix parity has
//! to agree with y).

use subtle::{Choice, ConditionallySelectable};
use zeroize::Zeroize;

use super::field::FieldElement;

/// Compressed encoding length.
pub const COMPRESSED_SIZE: usize = 33;

/// Uncompressed and hybrid encoding length.
pub const UNCOMPRESSED_SIZE: usize = 65;

const TAG_EVEN: u8 = 0x02;
const TAG_ODD: u8 = 0x03;
const TAG_UNCOMPRESSED: u8 = 0x04;
const TAG_HYBRID_EVEN: u8 = 0x06;
const TAG_HYBRID_ODD: u8 = 0x07;

/// A point in affine coordinates, or the point at infinity.
#[derive(Clone, Copy, Debug, Zeroize)]
pub struct Affine {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) infinity: bool,
}

/// The generator `G` of secp256k1.
pub const G: Affine = Affine {
    x: FieldElement::from_words([
        0x79BE667E, 0xF9DCBBAC, 0x55A06295, 0xCE870B07, 0x029BFCDB, 0x2DCE28D9, 0x59F2815B,
        0x16F81798,
    ]),
    y: FieldElement::from_words([
        0x483ADA77, 0x26A3C465, 0x5DA4FBFC, 0x0E1108A8, 0xFD17B448, 0xA6855419, 0x9C47D08F,
        0xFB10D4B8,
    ]),
    infinity: false,
};

/// The second generator `H`, used as the value base of Pedersen
/// commitments.
///
/// Its x-coordinate is the SHA-256 of the uncompressed encoding of `G`,
/// which is on the curve, so nobody knows `log_G(H)`.
pub const H: Affine = Affine {
    x: FieldElement::from_words([
        0x50929B74, 0xC1A04954, 0xB78B4B60, 0x35E97A5E, 0x078A5A0F, 0x28EC96D5, 0x47BFEE9A,
        0xCE803AC0,
    ]),
    y: FieldElement::from_words([
        0x31D3C686, 0x3973926E, 0x049E637C, 0xB1B5F40A, 0x36DAC28A, 0xF1766968, 0xC30C2313,
        0xF3A38904,
    ]),
    infinity: false,
};

impl Affine {
    pub const INFINITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        infinity: true,
    };

    /// Builds a point from coordinates, or `None` when `(x, y)` is not on
    /// the curve.
    pub fn new(x: FieldElement, y: FieldElement) -> Option<Self> {
        let p = Self {
            x: x.normalized(),
            y: y.normalized(),
            infinity: false,
        };
        p.is_valid_var().then_some(p)
    }

    pub fn x(&self) -> &FieldElement {
        &self.x
    }

    pub fn y(&self) -> &FieldElement {
        &self.y
    }

    pub fn is_infinity(&self) -> bool {
        self.infinity
    }

    /// Recovers the point with the given x-coordinate and y parity.
    ///
    /// Returns `None` when `x³ + 7` is not a square, i.e. no such point.
    pub fn from_x(x: &FieldElement, odd: bool) -> Option<Self> {
        let x = x.normalized();
        let rhs = x.square() * x + FieldElement::B;
        let mut y = rhs.sqrt()?.normalized();
        if bool::from(y.is_odd()) != odd {
            y = (-y).normalized();
        }
        Some(Self {
            x,
            y,
            infinity: false,
        })
    }

    /// Checks the curve equation. Infinity is not a valid point here.
    pub fn is_valid_var(&self) -> bool {
        if self.infinity {
            return false;
        }
        let y2 = self.y.square();
        let x3 = self.x.square() * self.x;
        y2 == x3 + FieldElement::B
    }

    /// Converts a Jacobian point, inverting its `Z` coordinate.
    pub fn from_jacobian(p: &Jacobian) -> Self {
        if p.infinity {
            return Self::INFINITY;
        }
        let zi = p.z.invert();
        let zi2 = zi.square();
        let zi3 = zi2 * zi;
        Self {
            x: (p.x * zi2).normalized(),
            y: (p.y * zi3).normalized(),
            infinity: false,
        }
    }

    /// Converts many Jacobian points at the cost of one field inversion.
    pub fn batch_from_jacobian(points: &[Jacobian]) -> Vec<Self> {
        let zs: Vec<FieldElement> = points
            .iter()
            .map(|p| if p.infinity { FieldElement::ONE } else { p.z })
            .collect();
        let inverses = FieldElement::batch_invert(&zs);

        points
            .iter()
            .zip(inverses)
            .map(|(p, zi)| {
                if p.infinity {
                    return Self::INFINITY;
                }
                let zi2 = zi.square();
                let zi3 = zi2 * zi;
                Self {
                    x: (p.x * zi2).normalized(),
                    y: (p.y * zi3).normalized(),
                    infinity: false,
                }
            })
            .collect()
    }

    /// Parses a SEC 1 encoding: compressed, uncompressed or hybrid.
    ///
    /// Rejects any other length or prefix, coordinates not below `p`, points
    /// off the curve and hybrid prefixes that disagree with the y parity.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match (bytes.len(), bytes.first().copied()?) {
            (COMPRESSED_SIZE, tag @ (TAG_EVEN | TAG_ODD)) => {
                let x = FieldElement::from_bytes(bytes[1..33].try_into().ok()?)?;
                Self::from_x(&x, tag == TAG_ODD)
            }
            (UNCOMPRESSED_SIZE, tag @ (TAG_UNCOMPRESSED | TAG_HYBRID_EVEN | TAG_HYBRID_ODD)) => {
                let x = FieldElement::from_bytes(bytes[1..33].try_into().ok()?)?;
                let y = FieldElement::from_bytes(bytes[33..65].try_into().ok()?)?;
                if tag != TAG_UNCOMPRESSED && bool::from(y.is_odd()) != (tag == TAG_HYBRID_ODD) {
                    return None;
                }
                Self::new(x, y)
            }
            _ => None,
        }
    }

    /// Encodes a finite point as `02`/`03` ‖ x.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_SIZE] {
        debug_assert!(!self.infinity);
        let mut out = [0u8; COMPRESSED_SIZE];
        out[0] = if bool::from(self.y.is_odd()) {
            TAG_ODD
        } else {
            TAG_EVEN
        };
        out[1..].copy_from_slice(&self.x.to_bytes());
        out
    }

    /// Encodes a finite point as `04` ‖ x ‖ y.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_SIZE] {
        debug_assert!(!self.infinity);
        let mut out = [0u8; UNCOMPRESSED_SIZE];
        out[0] = TAG_UNCOMPRESSED;
        out[1..33].copy_from_slice(&self.x.to_bytes());
        out[33..].copy_from_slice(&self.y.to_bytes());
        out
    }

    /// Encodes with the requested compression.
    pub fn to_bytes(&self, compressed: bool) -> Vec<u8> {
        if compressed {
            self.to_compressed().to_vec()
        } else {
            self.to_uncompressed().to_vec()
        }
    }
}

impl std::ops::Neg for Affine {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            x: self.x,
            y: (-self.y).normalized(),
            infinity: self.infinity,
        }
    }
}

impl PartialEq for Affine {
    fn eq(&self, other: &Self) -> bool {
        match (self.infinity, other.infinity) {
            (true, true) => true,
            (false, false) => self.x == other.x && self.y == other.y,
            _ => false,
        }
    }
}

impl Eq for Affine {}

fn select_flag(a: bool, b: bool, choice: Choice) -> bool {
    u8::conditional_select(&(a as u8), &(b as u8), choice) != 0
}

impl ConditionallySelectable for Affine {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            infinity: select_flag(a.infinity, b.infinity, choice),
        }
    }
}

/// A point in Jacobian coordinates.
#[derive(Clone, Copy, Debug, Zeroize)]
pub struct Jacobian {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) z: FieldElement,
    pub(crate) infinity: bool,
}

impl Jacobian {
    pub const INFINITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        z: FieldElement::ZERO,
        infinity: true,
    };

    pub fn from_affine(a: &Affine) -> Self {
        Self {
            x: a.x,
            y: a.y,
            z: FieldElement::ONE,
            infinity: a.infinity,
        }
    }

    pub fn is_infinity(&self) -> bool {
        self.infinity
    }

    pub fn to_affine(&self) -> Affine {
        Affine::from_jacobian(self)
    }

    fn weak(mut self) -> Self {
        self.x.normalize_weak();
        self.y.normalize_weak();
        self.z.normalize_weak();
        self
    }

    /// Point doubling.
    ///
    /// ```text
    /// Z' = 2·Y·Z
    /// X' = 9X⁴ − 8XY²
    /// Y' = 3X²·(12XY² − 9X⁴) − 8Y⁴
    /// ```
    ///
    /// secp256k1 has no point of order two, so `Y = 0` never occurs for a
    /// finite input and the formula needs no special case.
    pub fn double(&self) -> Self {
        let z = (self.y * self.z).mul_int(2);
        let t1 = self.x.square().mul_int(3);
        let t2 = t1.square();
        let t3 = self.y.square().mul_int(2);
        let t4 = t3.square().mul_int(2);
        let t3 = t3 * self.x;

        let x = -t3.mul_int(4) + t2;
        let t3 = t3.mul_int(6) + (-t2);
        let y = t1 * t3 + (-t4);

        Self {
            x,
            y,
            z,
            infinity: self.infinity,
        }
        .weak()
    }

    /// The generic sum `self + (x2·Z₂², y2·Z₂³, Z₂)`, given the cross
    /// products already brought to a common denominator.
    ///
    /// Returns the sum together with `h` and `i`; the sum is only
    /// meaningful when `h ≠ 0`.
    fn add_inner(
        u1: FieldElement,
        u2: FieldElement,
        s1: FieldElement,
        s2: FieldElement,
        z: FieldElement,
    ) -> (Self, FieldElement, FieldElement) {
        let h = u2 - u1;
        let i = s2 - s1;

        let i2 = i.square();
        let h2 = h.square();
        let h3 = h * h2;
        let t = u1 * h2;

        let x = -(t.mul_int(2) + h3) + i2;
        let y = (-x + t) * i + (-(h3 * s1));

        let sum = Self {
            x,
            y,
            z: z * h,
            infinity: false,
        }
        .weak();
        (sum, h, i)
    }

    /// Variable-time addition of two Jacobian points.
    pub fn add_var(&self, b: &Self) -> Self {
        if self.infinity {
            return *b;
        }
        if b.infinity {
            return *self;
        }

        let z22 = b.z.square();
        let z12 = self.z.square();
        let u1 = self.x * z22;
        let u2 = b.x * z12;
        let s1 = self.y * z22 * b.z;
        let s2 = b.y * z12 * self.z;

        let (sum, h, i) = Self::add_inner(u1, u2, s1, s2, self.z * b.z);
        if h.normalizes_to_zero_var() {
            return if i.normalizes_to_zero_var() {
                self.double()
            } else {
                Self::INFINITY
            };
        }
        sum
    }

    /// Variable-time addition of an affine point.
    pub fn add_affine_var(&self, b: &Affine) -> Self {
        if self.infinity {
            return Self::from_affine(b);
        }
        if b.infinity {
            return *self;
        }

        let z12 = self.z.square();
        let u2 = b.x * z12;
        let s2 = b.y * z12 * self.z;

        let (sum, h, i) = Self::add_inner(self.x, u2, self.y, s2, self.z);
        if h.normalizes_to_zero_var() {
            return if i.normalizes_to_zero_var() {
                self.double()
            } else {
                Self::INFINITY
            };
        }
        sum
    }

    /// Constant-time addition of an affine point.
    ///
    /// Both the generic sum and the doubling are computed, then the right
    /// one is selected with masks, including when either operand is the
    /// point at infinity or the two cancel out.
    pub fn add_affine(&self, b: &Affine) -> Self {
        let z12 = self.z.square();
        let u2 = b.x * z12;
        let s2 = b.y * z12 * self.z;

        let (sum, h, i) = Self::add_inner(self.x, u2, self.y, s2, self.z);
        let dbl = self.double();

        let h_zero = h.normalizes_to_zero();
        let i_zero = i.normalizes_to_zero();

        let mut r = Self::conditional_select(&sum, &dbl, h_zero & i_zero);
        r.infinity = select_flag(r.infinity, true, h_zero & !i_zero);

        let from_b = Self::from_affine(b);
        let r = Self::conditional_select(&r, &from_b, Choice::from(self.infinity as u8));
        Self::conditional_select(&r, self, Choice::from(b.infinity as u8))
    }

    /// Multiplies the projective coordinates by `s`, leaving the point
    /// unchanged. Used to randomize intermediate representations.
    pub fn rescale(&self, s: &FieldElement) -> Self {
        let zz = s.square();
        Self {
            x: self.x * zz,
            y: self.y * zz * *s,
            z: self.z * *s,
            infinity: self.infinity,
        }
    }

    /// Checks whether the affine x-coordinate equals `x`, without
    /// inverting `Z`. `x` must be normalized.
    pub fn eq_x_var(&self, x: &FieldElement) -> bool {
        debug_assert!(!self.infinity);
        let r = *x * self.z.square();
        r == self.x
    }
}

impl std::ops::Neg for Jacobian {
    type Output = Self;

    fn neg(self) -> Self::Output {
        let mut y = -self.y;
        y.normalize_weak();
        Self { y, ..self }
    }
}

impl ConditionallySelectable for Jacobian {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
            infinity: select_flag(a.infinity, b.infinity, choice),
        }
    }
}

impl PartialEq for Jacobian {
    fn eq(&self, other: &Self) -> bool {
        self.to_affine() == other.to_affine()
    }
}
