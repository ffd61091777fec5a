use subtle::ConditionallySelectable;
use tracing::trace;
use zeroize::Zeroize;

use super::core::{RecoverableSignature, RecoveryId, Signature};
use super::nonce::{NonceFunction, Rfc6979};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::keys::SecretKey;
use crate::secp256k1::ecmult_gen::EcmultGenContext;
use crate::secp256k1::scalar::Scalar;

/// Signs a 32-byte message hash with RFC 6979 nonces.
///
/// The result always has a low `s`. Requires the `SIGN` capability.
pub fn sign(ctx: &Context, msg32: &[u8; 32], secret: &SecretKey) -> Result<Signature> {
    sign_with(ctx, msg32, secret, &Rfc6979, None)
}

/// Signs with a caller-provided nonce function and optional extra data
/// passed through to it.
pub fn sign_with<N: NonceFunction + ?Sized>(
    ctx: &Context,
    msg32: &[u8; 32],
    secret: &SecretKey,
    noncefn: &N,
    extra: Option<&[u8; 32]>,
) -> Result<Signature> {
    sign_recoverable_with(ctx, msg32, secret, noncefn, extra).map(|sig| sig.to_standard())
}

/// Signs and keeps the recovery id.
pub fn sign_recoverable(
    ctx: &Context,
    msg32: &[u8; 32],
    secret: &SecretKey,
) -> Result<RecoverableSignature> {
    sign_recoverable_with(ctx, msg32, secret, &Rfc6979, None)
}

pub fn sign_recoverable_with<N: NonceFunction + ?Sized>(
    ctx: &Context,
    msg32: &[u8; 32],
    secret: &SecretKey,
    noncefn: &N,
    extra: Option<&[u8; 32]>,
) -> Result<RecoverableSignature> {
    let gen_ctx = ctx.gen_ctx()?;
    let (msg, _) = Scalar::from_bytes_reduced(msg32);
    let mut key32 = secret.to_bytes();

    let mut attempt: u32 = 0;
    let result = loop {
        let Some(mut candidate) = noncefn.nonce(msg32, &key32, attempt, extra) else {
            break Err(Error::NonceFunctionFailed);
        };

        let (mut k, overflow) = Scalar::from_bytes_reduced(&candidate);
        candidate.zeroize();

        let signed = if overflow || bool::from(k.is_zero()) {
            None
        } else {
            sig_sign(gen_ctx, secret.scalar(), &msg, &k)
        };
        k.zeroize();

        if let Some((sig, recid)) = signed {
            break Ok(RecoverableSignature::new(sig, recid));
        }

        trace!(attempt, "nonce rejected, retrying");
        attempt = match attempt.checked_add(1) {
            Some(next) => next,
            None => break Err(Error::NonceFunctionFailed),
        };
    };

    key32.zeroize();
    result
}

/// One signing attempt with nonce `k`. Returns `None` when `r` or `s`
/// comes out zero, so the caller moves on to the next nonce.
fn sig_sign(
    gen_ctx: &EcmultGenContext,
    seckey: &Scalar,
    msg: &Scalar,
    k: &Scalar,
) -> Option<(Signature, RecoveryId)> {
    let mut rj = gen_ctx.ecmult_gen(k);
    let mut rp = rj.to_affine();
    rj.zeroize();

    let (r, overflow) = Scalar::from_bytes_reduced(&rp.x().to_bytes());
    let y_odd = bool::from(rp.y().is_odd());
    rp.zeroize();
    if bool::from(r.is_zero()) {
        return None;
    }
    let mut recid = (u8::from(overflow) << 1) | u8::from(y_odd);

    let mut n = r * *seckey + *msg;
    let mut s = k.invert() * n;
    n.zeroize();
    if bool::from(s.is_zero()) {
        return None;
    }

    let high = s.is_high();
    s = Scalar::conditional_select(&s, &-s, high);
    recid ^= high.unwrap_u8();

    Some((Signature::new(r, s), RecoveryId(recid)))
}
