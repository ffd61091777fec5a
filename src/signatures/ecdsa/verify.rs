use std::cmp::Ordering;

use super::core::{RecoverableSignature, Signature};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::keys::PublicKey;
use crate::secp256k1::ecmult::EcmultContext;
use crate::secp256k1::field::FieldElement;
use crate::secp256k1::group::{Affine, Jacobian};
use crate::secp256k1::scalar::Scalar;

/// The group order `n` as a field element.
const ORDER_AS_FE: FieldElement = FieldElement::from_words([
    0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFE, 0xBAAEDCE6, 0xAF48A03B, 0xBFD25E8C, 0xD0364141,
]);

/// `p − n`. An x-coordinate below this may have been reduced mod `n`.
const P_MINUS_ORDER: FieldElement = FieldElement::from_words([
    0, 0, 0, 1, 0x45512319, 0x50B75FC4, 0x402DA172, 0x2FC9BAEE,
]);

/// Verifies `sig` over a 32-byte message hash.
///
/// Signatures with a high `s` are rejected; call
/// [`Signature::normalize_s`] first to accept them. Requires the `VERIFY`
/// capability.
pub fn verify(ctx: &Context, msg32: &[u8; 32], sig: &Signature, pubkey: &PublicKey) -> Result<bool> {
    let verify_ctx = ctx.verify_ctx()?;
    if !sig.is_low_s() {
        return Ok(false);
    }
    let (msg, _) = Scalar::from_bytes_reduced(msg32);
    Ok(sig_verify(verify_ctx, sig.r(), sig.s(), pubkey.point(), &msg))
}

fn sig_verify(ecmult: &EcmultContext, r: &Scalar, s: &Scalar, pubkey: &Affine, msg: &Scalar) -> bool {
    if bool::from(r.is_zero()) || bool::from(s.is_zero()) {
        return false;
    }

    let sn = s.invert();
    let u1 = sn * *msg;
    let u2 = sn * *r;
    let pr = ecmult.ecmult(&Jacobian::from_affine(pubkey), &u2, &u1);
    if pr.is_infinity() {
        return false;
    }

    let Some(mut xr) = FieldElement::from_bytes(&r.to_bytes()) else {
        return false;
    };
    if pr.eq_x_var(&xr) {
        return true;
    }

    // R.x may have been in [n, p) before reduction.
    if xr.cmp_var(&P_MINUS_ORDER) != Ordering::Less {
        return false;
    }
    xr += ORDER_AS_FE;
    xr.normalize();
    pr.eq_x_var(&xr)
}

/// Recovers the public key that produced `sig` over `msg32`.
///
/// High-`s` signatures are accepted here. Requires the `VERIFY`
/// capability.
pub fn recover(ctx: &Context, msg32: &[u8; 32], sig: &RecoverableSignature) -> Result<PublicKey> {
    let verify_ctx = ctx.verify_ctx()?;
    let standard = sig.to_standard();
    let (r, s) = (standard.r(), standard.s());
    let recid = sig.recovery_id();

    if bool::from(r.is_zero()) || bool::from(s.is_zero()) {
        return Err(Error::InvalidSignature);
    }

    let mut fx = FieldElement::from_bytes(&r.to_bytes()).ok_or(Error::InvalidSignature)?;
    if recid.is_x_reduced() {
        if fx.cmp_var(&P_MINUS_ORDER) != Ordering::Less {
            return Err(Error::InvalidSignature);
        }
        fx += ORDER_AS_FE;
        fx.normalize();
    }
    let x = Affine::from_x(&fx, recid.is_y_odd()).ok_or(Error::InvalidSignature)?;

    let (msg, _) = Scalar::from_bytes_reduced(msg32);
    let rn = r.invert();
    let u1 = -(rn * msg);
    let u2 = rn * *s;
    let q = verify_ctx.ecmult(&Jacobian::from_affine(&x), &u2, &u1);
    if q.is_infinity() {
        return Err(Error::InvalidSignature);
    }
    PublicKey::from_point(q.to_affine())
}
