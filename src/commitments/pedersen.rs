use zeroize::Zeroize;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::secp256k1::ecmult_gen::{EcmultGen2Context, EcmultGenContext};
use crate::secp256k1::group::{Affine, Jacobian};
use crate::secp256k1::scalar::Scalar;

/// Serialized commitment length: a compressed point.
pub const COMMITMENT_SIZE: usize = 33;

/// A Pedersen commitment `r·G + v·H`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commitment(Affine);

impl Commitment {
    /// Parses a 33-byte compressed point.
    pub fn from_bytes(bytes: &[u8; COMMITMENT_SIZE]) -> Result<Self> {
        Affine::from_bytes(bytes)
            .map(Self)
            .ok_or(Error::InvalidCommitment)
    }

    pub fn to_bytes(&self) -> [u8; COMMITMENT_SIZE] {
        self.0.to_compressed()
    }

    pub(crate) fn point(&self) -> &Affine {
        &self.0
    }
}

/// `blind·G + value·H`, both halves in constant time.
pub(crate) fn pedersen_ecmult(
    gen_ctx: &EcmultGenContext,
    gen2_ctx: &EcmultGen2Context,
    blind: &Scalar,
    value: u64,
) -> Jacobian {
    let mut rj = gen_ctx.ecmult_gen(blind);
    let r = gen2_ctx.ecmult_add(&rj, value);
    rj.zeroize();
    r
}

/// Commits to `value` with the 32-byte blinding factor `blind`.
///
/// Requires the `SIGN` and `COMMIT` capabilities. A blinding factor not
/// below the group order is rejected; a zero blind together with a zero
/// value gives the point at infinity and fails.
pub fn commit(ctx: &Context, blind: &[u8; 32], value: u64) -> Result<Commitment> {
    let gen_ctx = ctx.gen_ctx()?;
    let gen2_ctx = ctx.commit_ctx()?;

    let mut sec = Scalar::from_bytes(blind).ok_or(Error::InvalidBlindingFactor)?;
    let mut rj = pedersen_ecmult(gen_ctx, gen2_ctx, &sec, value);
    sec.zeroize();

    if rj.is_infinity() {
        return Err(Error::PointAtInfinity);
    }
    let r = rj.to_affine();
    rj.zeroize();
    Ok(Commitment(r))
}

/// Sums blinding factors: the first `npositive` are added, the rest
/// subtracted.
///
/// The result is the blinding factor that balances a transaction whose
/// inputs are the positive set and outputs the negative one. Any factor not
/// below the group order aborts the whole sum.
pub fn blind_sum(blinds: &[[u8; 32]], npositive: usize) -> Result<[u8; 32]> {
    let mut acc = Scalar::ZERO;
    for (i, blind) in blinds.iter().enumerate() {
        let Some(mut x) = Scalar::from_bytes(blind) else {
            acc.zeroize();
            return Err(Error::InvalidBlindingFactor);
        };
        if i >= npositive {
            x = -x;
        }
        acc += x;
        x.zeroize();
    }
    let out = acc.to_bytes();
    acc.zeroize();
    Ok(out)
}

/// Checks `Σ positive − Σ negative − excess·H = 0`.
///
/// This holds exactly when the blinding factors and the values on both
/// sides balance, `excess` being the public value difference. Requires the
/// `COMMIT` capability.
pub fn verify_tally(
    ctx: &Context,
    positive: &[Commitment],
    negative: &[Commitment],
    excess: i64,
) -> Result<bool> {
    let gen2_ctx = ctx.commit_ctx()?;

    let mut acc = Jacobian::INFINITY;
    if excess != 0 {
        acc = gen2_ctx.ecmult_small(excess.unsigned_abs());
        if excess < 0 {
            acc = -acc;
        }
    }
    for c in negative {
        acc = acc.add_affine_var(c.point());
    }
    acc = -acc;
    for c in positive {
        acc = acc.add_affine_var(c.point());
    }
    Ok(acc.is_infinity())
}
