//! Constant-time fixed-base multiplication.
//!
//! Multiplication of a secret scalar by a fixed generator, used for public
//! key creation, signing nonces and Pedersen commitments.
//!
//! ## Table layout
//!
//! The scalar is split into 4-bit windows. Window `j` has a row of 16
//! affine points
//!
//! ```text
//! prec[j][i] = i·16ʲ·B + 2ʲ·U      (j < W − 1)
//! prec[W−1][i] = i·16ᵂ⁻¹·B + (1 − 2ᵂ⁻¹)·U
//! ```
//!
//! where `B` is the base and `U` is the other generator plus `B`, a point
//! whose discrete log with respect to `B` nobody knows.
//! The `U` offsets cancel over a full walk, and keep every table entry
//! away from infinity so the constant-time addition never meets a
//! degenerate case in practice.
//!
//! ## Blinding
//!
//! The `G` context holds a secret scalar `b` and the point `initial = −b·G`.
//! A multiplication computes `initial + (k + b)·G`, so the table indices
//! are those of `k + b` and say nothing directly about `k`. The blind is
//! replaced with [`EcmultGenContext::randomize`].
//!
//! The `H` context multiplies 64-bit amounts only and is not blinded.

use tracing::debug;
use zeroize::Zeroize;

use super::ct;
use super::field::FieldElement;
use super::group::{Affine, G, H, Jacobian};
use super::scalar::Scalar;
use crate::hash::HmacDrbg;

/// Entries per window.
const WINDOW_SIZE: usize = 16;

/// Windows covering a 256-bit scalar.
const SCALAR_WINDOWS: usize = 64;

/// Windows covering a 64-bit amount.
const AMOUNT_WINDOWS: usize = 16;

type Row = [Affine; WINDOW_SIZE];

/// Builds the windowed table for `base` with `windows` rows, offset by
/// multiples of `U = other + base`.
fn build_table(base: &Affine, other: &Affine, windows: usize) -> Vec<Row> {
    let nums = Jacobian::from_affine(other).add_affine_var(base);

    let mut precj = Vec::with_capacity(windows * WINDOW_SIZE);
    let mut gbase = Jacobian::from_affine(base);
    let mut numsbase = nums;

    for j in 0..windows {
        precj.push(numsbase);
        for i in 1..WINDOW_SIZE {
            let prev: Jacobian = precj[j * WINDOW_SIZE + i - 1];
            precj.push(prev.add_var(&gbase));
        }

        for _ in 0..4 {
            gbase = gbase.double();
        }

        numsbase = numsbase.double();
        if j == windows - 2 {
            numsbase = (-numsbase).add_var(&nums);
        }
    }

    Affine::batch_from_jacobian(&precj)
        .chunks_exact(WINDOW_SIZE)
        .map(|chunk| {
            let mut row = [Affine::INFINITY; WINDOW_SIZE];
            row.copy_from_slice(chunk);
            row
        })
        .collect()
}

/// Fixed-base table for `G` plus the blinding state.
#[derive(Clone)]
pub struct EcmultGenContext {
    prec: Vec<Row>,
    blind: Scalar,
    initial: Jacobian,
}

impl EcmultGenContext {
    /// Builds the table and puts the blind in its reset state.
    pub fn new() -> Self {
        let prec = build_table(&G, &H, SCALAR_WINDOWS);
        debug!(windows = prec.len(), "built generator table");
        let mut ctx = Self {
            prec,
            blind: Scalar::ONE,
            initial: Jacobian::INFINITY,
        };
        ctx.reset_blind();
        ctx
    }

    /// Reset state: `b = 1`, `initial = −G`.
    fn reset_blind(&mut self) {
        self.blind = Scalar::ONE;
        self.initial = -Jacobian::from_affine(&G);
    }

    /// Computes `k·G` in constant time.
    ///
    /// A zero scalar walks the whole table like any other and yields the
    /// point at infinity.
    pub fn ecmult_gen(&self, k: &Scalar) -> Jacobian {
        let mut r = self.initial;
        let mut gnb = *k + self.blind;

        for (j, row) in self.prec.iter().enumerate() {
            let bits = gnb.get_bits(j * 4, 4);
            let mut add = ct::select_affine(row, bits);
            r = r.add_affine(&add);
            add.zeroize();
        }
        gnb.zeroize();
        r
    }

    /// Replaces the blind.
    ///
    /// With a seed, the new blind and a projective rescaling factor are
    /// drawn from an HMAC-DRBG keyed with the current blind and the seed,
    /// so successive seeds chain. Without a seed the context returns to
    /// the reset state `b = 1`, `initial = −G`.
    pub fn randomize(&mut self, seed: Option<&[u8; 32]>) {
        let Some(seed) = seed else {
            self.reset_blind();
            debug!("generator blind reset");
            return;
        };

        let mut keydata = [0u8; 64];
        keydata[..32].copy_from_slice(&self.blind.to_bytes());
        keydata[32..].copy_from_slice(seed);
        let mut rng = HmacDrbg::new(&keydata);
        keydata.zeroize();

        let mut buf = [0u8; 32];
        // A field element or scalar out of range is cryptographically
        // unreachable; loop anyway for uniformity.
        let mut s = loop {
            rng.generate(&mut buf);
            if let Some(s) = FieldElement::from_bytes(&buf) {
                if !bool::from(s.is_zero()) {
                    break s;
                }
            }
        };
        self.initial = self.initial.rescale(&s);
        s.zeroize();

        let mut b = loop {
            rng.generate(&mut buf);
            if let Some(b) = Scalar::from_bytes(&buf) {
                if !bool::from(b.is_zero()) {
                    break b;
                }
            }
        };
        buf.zeroize();

        let gb = self.ecmult_gen(&b);
        self.blind = -b;
        self.initial = gb;
        b.zeroize();
        debug!("generator blind re-randomized");
    }
}

impl Drop for EcmultGenContext {
    fn drop(&mut self) {
        self.blind.zeroize();
        self.initial.zeroize();
    }
}

/// Fixed-base table for the value generator `H`.
#[derive(Clone)]
pub struct EcmultGen2Context {
    prec: Vec<Row>,
}

impl EcmultGen2Context {
    pub fn new() -> Self {
        let prec = build_table(&H, &G, AMOUNT_WINDOWS);
        debug!(windows = prec.len(), "built value generator table");
        Self { prec }
    }

    /// Computes `acc + v·H` in constant time.
    pub fn ecmult_add(&self, acc: &Jacobian, v: u64) -> Jacobian {
        let mut r = *acc;
        for (j, row) in self.prec.iter().enumerate() {
            let bits = ((v >> (j * 4)) & 0xF) as u32;
            let mut add = ct::select_affine(row, bits);
            r = r.add_affine(&add);
            add.zeroize();
        }
        r
    }

    /// Computes `v·H` in constant time.
    pub fn ecmult_small(&self, v: u64) -> Jacobian {
        self.ecmult_add(&Jacobian::INFINITY, v)
    }
}
