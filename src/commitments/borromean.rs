//! Borromean ring signatures.
//!
//! Several rings of public keys are signed at once; for each ring the
//! signer knows the secret key of exactly one member. All rings share a
//! single starting challenge `e0`, which is the hash of the last `R` of
//! every ring:
//!
//! ```text
//! e(i, 0)     = H(e0 ‖ m ‖ i ‖ 0)
//! R(i, j)     = s(i, j)·G + e(i, j)·P(i, j)
//! e(i, j + 1) = H(R(i, j) ‖ m ‖ i ‖ j + 1)
//! e0          = SHA256(R(0, last) ‖ … ‖ R(rings − 1, last) ‖ m)
//! ```
//!
//! Points enter hashes in compressed form and ring indices as 32-bit
//! big-endian integers. Keys of all rings sit in one flat slice; ring `i`
//! occupies the `rsizes[i]` entries after the previous rings.
//!
//! Signing is not memory uniform: forged members take the variable-time
//! multiplication path, so timing may reveal which members are forged but
//! never a secret key.

use sha2::{Digest, Sha256};

use crate::secp256k1::ecmult::EcmultContext;
use crate::secp256k1::ecmult_gen::EcmultGenContext;
use crate::secp256k1::group::Jacobian;
use crate::secp256k1::scalar::Scalar;

fn borromean_hash(m: &[u8], e: &[u8], ridx: usize, eidx: usize) -> [u8; 32] {
    let mut sha = Sha256::new();
    sha.update(e);
    sha.update(m);
    sha.update((ridx as u32).to_be_bytes());
    sha.update((eidx as u32).to_be_bytes());
    sha.finalize().into()
}

/// Challenge scalar from a hash, rejecting zero and overflow.
fn challenge(hash: &[u8; 32]) -> Option<Scalar> {
    Scalar::from_bytes(hash).filter(|e| !bool::from(e.is_zero()))
}

/// `s·G + e·P`, compressed. `None` when the result is infinity.
fn ring_link(ecmult: &EcmultContext, p: &Jacobian, e: &Scalar, s: &Scalar) -> Option<[u8; 33]> {
    let r = ecmult.ecmult(p, e, s);
    if r.is_infinity() {
        return None;
    }
    Some(r.to_affine().to_compressed())
}

/// Completes a Borromean signature and returns `e0`.
///
/// On entry `s` holds random values for every forged member; the entries
/// at `secidx` are overwritten with the real responses. `k` holds one
/// nonce per ring and `sec` the secret key of member `secidx[i]` of ring
/// `i`. Returns `None` on a degenerate challenge or point, which happens
/// with negligible probability.
#[allow(clippy::too_many_arguments)]
pub(crate) fn sign(
    ecmult: &EcmultContext,
    gen_ctx: &EcmultGenContext,
    s: &mut [Scalar],
    pubs: &[Jacobian],
    k: &[Scalar],
    sec: &[Scalar],
    rsizes: &[usize],
    secidx: &[usize],
    m: &[u8],
) -> Option<[u8; 32]> {
    let mut sha_e0 = Sha256::new();
    let mut count = 0;

    for (i, &size) in rsizes.iter().enumerate() {
        let rj = gen_ctx.ecmult_gen(&k[i]);
        if rj.is_infinity() {
            return None;
        }
        let mut link = rj.to_affine().to_compressed();

        for j in secidx[i] + 1..size {
            let e = challenge(&borromean_hash(m, &link, i, j))?;
            link = ring_link(ecmult, &pubs[count + j], &e, &s[count + j])?;
        }
        sha_e0.update(link);
        count += size;
    }
    sha_e0.update(m);
    let e0: [u8; 32] = sha_e0.finalize().into();

    count = 0;
    for (i, &size) in rsizes.iter().enumerate() {
        let mut e = challenge(&borromean_hash(m, &e0, i, 0))?;
        for j in 0..secidx[i] {
            let link = ring_link(ecmult, &pubs[count + j], &e, &s[count + j])?;
            e = challenge(&borromean_hash(m, &link, i, j + 1))?;
        }

        let real = count + secidx[i];
        s[real] = k[i] - e * sec[i];
        if bool::from(s[real].is_zero()) {
            return None;
        }
        count += size;
    }

    Some(e0)
}

/// Verifies a Borromean signature.
///
/// When `evalues` is given it receives the challenge used for every
/// member, which lets the signer recover nonces and secrets later.
pub(crate) fn verify(
    ecmult: &EcmultContext,
    mut evalues: Option<&mut [Scalar]>,
    e0: &[u8; 32],
    s: &[Scalar],
    pubs: &[Jacobian],
    rsizes: &[usize],
    m: &[u8],
) -> bool {
    let mut sha_e0 = Sha256::new();
    let mut count = 0;

    for (i, &size) in rsizes.iter().enumerate() {
        let mut ens = Scalar::from_bytes(&borromean_hash(m, e0, i, 0));
        for j in 0..size {
            let Some(e) = ens.filter(|e| !bool::from(e.is_zero())) else {
                return false;
            };
            if bool::from(s[count].is_zero()) || pubs[count].is_infinity() {
                return false;
            }
            if let Some(ev) = evalues.as_deref_mut() {
                ev[count] = e;
            }

            let Some(link) = ring_link(ecmult, &pubs[count], &e, &s[count]) else {
                return false;
            };
            if j + 1 < size {
                ens = Scalar::from_bytes(&borromean_hash(m, &link, i, j + 1));
            } else {
                sha_e0.update(link);
            }
            count += 1;
        }
    }
    sha_e0.update(m);
    let expected: [u8; 32] = sha_e0.finalize().into();
    expected == *e0
}
