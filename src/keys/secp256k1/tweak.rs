//! Additive and multiplicative tweaks.
//!
//! A tweak is a 32-byte big-endian scalar. Tweaks not below the group order
//! are rejected, as is any result that would be zero or infinity. The
//! secret and public variants commute with key creation:
//!
//! ```text
//! pub(d + t) = pub(d) + t·G
//! pub(d · t) = t · pub(d)
//! ```

use zeroize::Zeroize;

use super::core::{PublicKey, SecretKey};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::secp256k1::group::Jacobian;
use crate::secp256k1::scalar::Scalar;

fn parse_tweak(tweak: &[u8; 32]) -> Result<Scalar> {
    Scalar::from_bytes(tweak).ok_or(Error::InvalidTweak)
}

/// Replaces `secret` with `secret + tweak`.
pub fn privkey_tweak_add(secret: &mut SecretKey, tweak: &[u8; 32]) -> Result<()> {
    let mut term = parse_tweak(tweak)?;
    let mut sum = *secret.scalar() + term;
    term.zeroize();

    if bool::from(sum.is_zero()) {
        sum.zeroize();
        return Err(Error::InvalidTweak);
    }
    *secret = SecretKey::from_scalar(sum);
    sum.zeroize();
    Ok(())
}

/// Replaces `secret` with `secret · tweak`. A zero tweak is rejected.
pub fn privkey_tweak_mul(secret: &mut SecretKey, tweak: &[u8; 32]) -> Result<()> {
    let mut factor = parse_tweak(tweak)?;
    if bool::from(factor.is_zero()) {
        return Err(Error::InvalidTweak);
    }
    let mut product = *secret.scalar() * factor;
    factor.zeroize();

    *secret = SecretKey::from_scalar(product);
    product.zeroize();
    Ok(())
}

/// Replaces `public` with `public + tweak·G`.
pub fn pubkey_tweak_add(ctx: &Context, public: &mut PublicKey, tweak: &[u8; 32]) -> Result<()> {
    let verify_ctx = ctx.verify_ctx()?;
    let term = parse_tweak(tweak)?;

    let pj = Jacobian::from_affine(public.point());
    let r = verify_ctx.ecmult(&pj, &Scalar::ONE, &term);
    if r.is_infinity() {
        return Err(Error::InvalidTweak);
    }
    *public = PublicKey::from_point(r.to_affine())?;
    Ok(())
}

/// Replaces `public` with `tweak · public`. A zero tweak is rejected.
pub fn pubkey_tweak_mul(ctx: &Context, public: &mut PublicKey, tweak: &[u8; 32]) -> Result<()> {
    let verify_ctx = ctx.verify_ctx()?;
    let factor = parse_tweak(tweak)?;
    if bool::from(factor.is_zero()) {
        return Err(Error::InvalidTweak);
    }

    let pj = Jacobian::from_affine(public.point());
    let r = verify_ctx.ecmult(&pj, &factor, &Scalar::ZERO);
    *public = PublicKey::from_point(r.to_affine())?;
    Ok(())
}
