//! Point multiplication for shared secrets.
//!
//! Multiplies a public point by a secret scalar in constant time and
//! returns the product in the same encoding width as the input point.

use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::secp256k1::ecmult_const::ecmult_const;
use crate::secp256k1::group::{Affine, COMPRESSED_SIZE};
use crate::secp256k1::scalar::Scalar;

/// Computes `scalar · point`.
///
/// `point` is any accepted public key encoding; the result is compressed
/// when the input was 33 bytes and uncompressed otherwise. A scalar not
/// below the group order is rejected, and a zero scalar fails with
/// [`Error::PointAtInfinity`].
pub fn point_multiply(point: &[u8], scalar: &[u8; 32]) -> Result<Vec<u8>> {
    let pt = Affine::from_bytes(point).ok_or(Error::InvalidPublicKey)?;
    let mut s = Scalar::from_bytes(scalar).ok_or(Error::InvalidSecretKey)?;

    let mut res = ecmult_const(&pt, &s);
    s.zeroize();
    let out = res.to_affine();
    res.zeroize();

    if out.is_infinity() {
        return Err(Error::PointAtInfinity);
    }
    Ok(out.to_bytes(point.len() <= COMPRESSED_SIZE))
}
