//! Precomputation context.
//!
//! A [`Context`] bundles the precomputed tables the curve operations rely
//! on. Each table is an independent capability selected with
//! [`ContextFlags`]:
//!
//! | Flag         | Table                                   | Needed by                       |
//! |--------------|-----------------------------------------|---------------------------------|
//! | `SIGN`       | blinded 4-bit windows of `G`            | key creation, signing, commits  |
//! | `VERIFY`     | odd multiples of `G` for wNAF           | verification, recovery, tweaks  |
//! | `COMMIT`     | 4-bit windows of the value generator `H`| Pedersen commitments            |
//! | `RANGEPROOF` | scaled multiples of `H` per digit ring  | range proofs                    |
//!
//! Building is idempotent and order-independent: [`Context::build`] only
//! adds the tables that are still missing. Operations fail with
//! [`Error::MissingCapability`] when a table they need was never built.
//!
//! ## Sharing
//!
//! Once built, a context is only read by operations, so `&Context` can be
//! shared across threads freely. [`Context::randomize`] and
//! [`Context::build`] take `&mut self`, which makes the borrow checker
//! enforce that setup completes before concurrent use. `Clone` makes a deep,
//! independent copy. Dropping a context wipes the signing blind.

use std::ops::{BitOr, BitOrAssign};

use rand_core::{CryptoRng, RngCore};
use tracing::debug;
use zeroize::Zeroize;

use crate::commitments::rangeproof::RangeProofTable;
use crate::error::{Capability, Error, Result};
use crate::secp256k1::ecmult::EcmultContext;
use crate::secp256k1::ecmult_gen::{EcmultGen2Context, EcmultGenContext};

/// Selects which tables a [`Context`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextFlags(u8);

impl ContextFlags {
    pub const NONE: Self = Self(0);
    pub const SIGN: Self = Self(1 << 0);
    pub const VERIFY: Self = Self(1 << 1);
    pub const COMMIT: Self = Self(1 << 2);
    pub const RANGEPROOF: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);

    /// Returns `true` when every flag of `other` is set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ContextFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ContextFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Bundle of independently built precomputed tables.
pub struct Context {
    gen_ctx: Option<Box<EcmultGenContext>>,
    verify_ctx: Option<Box<EcmultContext>>,
    commit_ctx: Option<Box<EcmultGen2Context>>,
    rangeproof_ctx: Option<Box<RangeProofTable>>,
}

impl Context {
    /// Creates a context with the tables selected by `flags`.
    pub fn new(flags: ContextFlags) -> Self {
        let mut ctx = Self {
            gen_ctx: None,
            verify_ctx: None,
            commit_ctx: None,
            rangeproof_ctx: None,
        };
        ctx.build(flags);
        ctx
    }

    /// Builds the tables selected by `flags` that are not built yet.
    pub fn build(&mut self, flags: ContextFlags) {
        if flags.contains(ContextFlags::SIGN) && self.gen_ctx.is_none() {
            self.gen_ctx = Some(Box::new(EcmultGenContext::new()));
        }
        if flags.contains(ContextFlags::VERIFY) && self.verify_ctx.is_none() {
            self.verify_ctx = Some(Box::new(EcmultContext::new()));
        }
        if flags.contains(ContextFlags::COMMIT) && self.commit_ctx.is_none() {
            self.commit_ctx = Some(Box::new(EcmultGen2Context::new()));
        }
        if flags.contains(ContextFlags::RANGEPROOF) && self.rangeproof_ctx.is_none() {
            self.rangeproof_ctx = Some(Box::new(RangeProofTable::new()));
        }
        debug!(flags = ?self.flags(), "context built");
    }

    /// Returns the capabilities currently built.
    pub fn flags(&self) -> ContextFlags {
        let mut flags = ContextFlags::NONE;
        if self.gen_ctx.is_some() {
            flags |= ContextFlags::SIGN;
        }
        if self.verify_ctx.is_some() {
            flags |= ContextFlags::VERIFY;
        }
        if self.commit_ctx.is_some() {
            flags |= ContextFlags::COMMIT;
        }
        if self.rangeproof_ctx.is_some() {
            flags |= ContextFlags::RANGEPROOF;
        }
        flags
    }

    /// Re-randomizes the blinding of generator multiplication.
    ///
    /// With `Some(seed)`, a new blind is derived from the previous one and
    /// the seed. With `None`, the blind returns to its reset state: blind
    /// scalar 1 and initial point `−G`, the same state a freshly built
    /// context starts in.
    pub fn randomize(&mut self, seed: Option<&[u8; 32]>) -> Result<()> {
        let gen_ctx = self
            .gen_ctx
            .as_deref_mut()
            .ok_or(Error::MissingCapability(Capability::Sign))?;
        gen_ctx.randomize(seed);
        Ok(())
    }

    /// Re-randomizes the blinding with 32 bytes drawn from `rng`.
    pub fn randomize_with_rng<R: RngCore + CryptoRng>(&mut self, rng: &mut R) -> Result<()> {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        let result = self.randomize(Some(&seed));
        seed.zeroize();
        result
    }

    pub(crate) fn gen_ctx(&self) -> Result<&EcmultGenContext> {
        self.gen_ctx
            .as_deref()
            .ok_or(Error::MissingCapability(Capability::Sign))
    }

    pub(crate) fn verify_ctx(&self) -> Result<&EcmultContext> {
        self.verify_ctx
            .as_deref()
            .ok_or(Error::MissingCapability(Capability::Verify))
    }

    pub(crate) fn commit_ctx(&self) -> Result<&EcmultGen2Context> {
        self.commit_ctx
            .as_deref()
            .ok_or(Error::MissingCapability(Capability::Commit))
    }

    pub(crate) fn rangeproof_ctx(&self) -> Result<&RangeProofTable> {
        self.rangeproof_ctx
            .as_deref()
            .ok_or(Error::MissingCapability(Capability::RangeProof))
    }
}

impl Clone for Context {
    fn clone(&self) -> Self {
        debug!(flags = ?self.flags(), "context cloned");
        Self {
            gen_ctx: self.gen_ctx.clone(),
            verify_ctx: self.verify_ctx.clone(),
            commit_ctx: self.commit_ctx.clone(),
            rangeproof_ctx: self.rangeproof_ctx.clone(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(ContextFlags::NONE)
    }
}
