//! Range proofs over Pedersen commitments.
//!
//! ## Shape
//!
//! A value `value` with public offset `min_value` and public scale
//! `10^exp` is written as
//!
//! ```text
//! value = min_value + v · 10^exp,      v < 2^mantissa
//! ```
//!
//! and `v` is split into base-4 digits, one ring per digit (the top ring
//! has two members when `mantissa` is odd). Digit `i` gets its own
//! commitment `D_i = x_i·G + d_i·10^exp·4^i·H`; the ring for digit `i`
//! holds `D_i − j·10^exp·4^i·H` for every allowed digit `j`, and exactly
//! one of those is a multiple of `G` alone. The last digit commitment is
//! not sent: the verifier derives it from the main commitment.
//!
//! With `exp = −1` the proof has a single one-member ring and only shows
//! that the commitment opens to `min_value`, the exact value.
//!
//! ## Wire format
//!
//! ```text
//! byte 0      : 0x40 | exp when a mantissa is present, | 0x20 when min_value ≠ 0
//! byte 1      : mantissa − 1                 (mantissa present only)
//! 8 bytes     : min_value, big-endian        (0x20 only)
//! sign bits   : (rings + 6) / 8 bytes, y parity of each sent digit commitment
//! points      : (rings − 1) × 32-byte x-coordinates of digit commitments
//! e0          : 32 bytes
//! s           : 32 bytes per ring member
//! ```
//!
//! ## Rewinding
//!
//! Every random value of the prover comes from an HMAC-DRBG seeded with
//! `nonce ‖ commit ‖ header`. One forged response of the top ring carries
//! `v` in the clear once that stream is removed, and the nonces of the
//! lower rings carry the optional message. Knowing the nonce therefore
//! gives back the value, the blinding factor and the message.

use sha2::{Digest, Sha256};
use subtle::{Choice, ConstantTimeEq};
use tracing::{debug, trace};
use zeroize::{Zeroize, Zeroizing};

use super::borromean;
use super::pedersen::{Commitment, pedersen_ecmult};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::hash::HmacDrbg;
use crate::secp256k1::ecmult_gen::EcmultGen2Context;
use crate::secp256k1::group::{Affine, H, Jacobian};
use crate::secp256k1::scalar::Scalar;

/// Largest proof this crate produces or accepts.
pub const MAX_PROOF_SIZE: usize = 5134;

const MAX_RINGS: usize = 32;
const MAX_EXP: i32 = 18;
const MIN_PROOF_SIZE: usize = 65;

const FLAG_MANTISSA: u8 = 0x40;
const FLAG_MIN_VALUE: u8 = 0x20;
const FLAG_RESERVED: u8 = 0x80;

/// Bytes of message a ring can carry.
const MESSAGE_BYTES_PER_RING: usize = 128;

/// Digit multiples of `−10^exp · 4^ring · H`, for `j = 1, 2, 3`.
#[derive(Clone)]
pub struct RangeProofTable {
    prec: Vec<[Affine; 3]>,
}

impl RangeProofTable {
    pub fn new() -> Self {
        let mut precj = Vec::with_capacity((MAX_EXP as usize + 1) * MAX_RINGS * 3);

        let mut one = -Jacobian::from_affine(&H);
        for _ in 0..=MAX_EXP {
            let mut g = one;
            for _ in 0..MAX_RINGS {
                let g2 = g.double();
                precj.push(g);
                precj.push(g2);
                precj.push(g2.add_var(&g));
                g = g2.double();
            }

            let two = one.double();
            let eight = two.double().double();
            one = eight.add_var(&two);
        }

        let prec = Affine::batch_from_jacobian(&precj)
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect::<Vec<_>>();
        debug!(entries = prec.len() * 3, "built range proof table");
        Self { prec }
    }

    fn digit_basis(&self, exp: usize, ring: usize) -> &[Affine; 3] {
        &self.prec[exp * MAX_RINGS + ring]
    }

    /// Fills every ring member from the first one: member `j` of ring `i`
    /// becomes `pubs[first] − j·10^exp·4^i·H`.
    fn expand(&self, pubs: &mut [Jacobian], exp: i32, rsizes: &[usize]) {
        let exp = exp.max(0) as usize;
        let mut npub = 0;
        for (i, &size) in rsizes.iter().enumerate() {
            let basis = self.digit_basis(exp, i);
            for j in 1..size {
                pubs[npub + j] = pubs[npub].add_affine_var(&basis[j - 1]);
            }
            npub += size;
        }
    }
}

impl Default for RangeProofTable {
    fn default() -> Self {
        Self::new()
    }
}

/// How a proof is shaped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeProofParams {
    /// Publicly revealed lower bound.
    pub min_value: u64,
    /// Base-10 exponent in `-1..=18`. Digits below `10^exp` become public;
    /// `-1` reveals the exact value.
    pub exp: i32,
    /// Bits of the value to keep private, `0` for as few as needed.
    pub min_bits: u32,
}

impl Default for RangeProofParams {
    fn default() -> Self {
        Self {
            min_value: 0,
            exp: 0,
            min_bits: 0,
        }
    }
}

/// Header fields, readable without verifying the proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeProofInfo {
    /// `-1` when the proof reveals the exact value.
    pub exp: i32,
    /// Number of bits covered by the proof.
    pub mantissa: u32,
    pub min_value: u64,
    pub max_value: u64,
}

/// The range a verified proof places the committed value in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProvenRange {
    pub min_value: u64,
    pub max_value: u64,
}

/// What the holder of the proof nonce reads back from a proof.
///
/// Equality runs in constant time over every field, including the blind.
#[derive(Clone)]
pub struct RewoundProof {
    pub value: u64,
    pub blind: [u8; 32],
    /// The embedded message, zero padded to the proof's message capacity.
    pub message: Vec<u8>,
    pub min_value: u64,
    pub max_value: u64,
}

impl std::fmt::Debug for RewoundProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewoundProof")
            .field("value", &self.value)
            .field("message_len", &self.message.len())
            .field("min_value", &self.min_value)
            .field("max_value", &self.max_value)
            .finish_non_exhaustive()
    }
}

impl ConstantTimeEq for RewoundProof {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.value.ct_eq(&other.value)
            & self.blind[..].ct_eq(&other.blind[..])
            & self.message.as_slice().ct_eq(other.message.as_slice())
            & self.min_value.ct_eq(&other.min_value)
            & self.max_value.ct_eq(&other.max_value)
    }
}

impl PartialEq for RewoundProof {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for RewoundProof {}

impl Drop for RewoundProof {
    fn drop(&mut self) {
        self.blind.zeroize();
        self.message.zeroize();
    }
}

/// Parsed header plus its length in bytes.
struct Header {
    info: RangeProofInfo,
    scale: u64,
    len: usize,
}

fn parse_header(proof: &[u8]) -> Option<Header> {
    if proof.len() < MIN_PROOF_SIZE || proof[0] & FLAG_RESERVED != 0 {
        return None;
    }
    let has_mantissa = proof[0] & FLAG_MANTISSA != 0;
    let has_min = proof[0] & FLAG_MIN_VALUE != 0;

    let mut offset = 1;
    let mut exp = -1;
    let mut mantissa = 0u32;
    let mut max_value = 0u64;
    if has_mantissa {
        exp = i32::from(proof[0] & 0x1F);
        if exp > MAX_EXP {
            return None;
        }
        mantissa = u32::from(proof[1]) + 1;
        if mantissa > 64 {
            return None;
        }
        max_value = u64::MAX >> (64 - mantissa);
        offset += 1;
    }

    let mut scale = 1u64;
    for _ in 0..exp.max(0) {
        max_value = max_value.checked_mul(10)?;
        scale *= 10;
    }

    let mut min_value = 0u64;
    if has_min {
        let bytes: [u8; 8] = proof.get(offset..offset + 8)?.try_into().ok()?;
        min_value = u64::from_be_bytes(bytes);
        offset += 8;
    }
    let max_value = max_value.checked_add(min_value)?;

    Some(Header {
        info: RangeProofInfo {
            exp,
            mantissa,
            min_value,
            max_value,
        },
        scale,
        len: offset,
    })
}

/// Ring sizes implied by a mantissa. Zero means the exact-value proof.
fn ring_sizes(mantissa: u32) -> Vec<usize> {
    if mantissa == 0 {
        return vec![1];
    }
    let mut rsizes = vec![4; (mantissa >> 1) as usize];
    if mantissa & 1 == 1 {
        rsizes.push(2);
    }
    rsizes
}

/// Bytes of sign flags for the sent digit commitments.
fn sign_bytes(rings: usize) -> usize {
    (rings + 6) >> 3
}

/// Decodes the header of `proof`.
pub fn info(proof: &[u8]) -> Result<RangeProofInfo> {
    parse_header(proof)
        .map(|h| h.info)
        .ok_or(Error::InvalidRangeProof)
}

/// The prover's deterministic randomness for one proof.
struct ProofRandomness {
    /// Digit blinding factors; the last one is minus the sum of the rest.
    sec: Zeroizing<Vec<Scalar>>,
    /// One 32-byte block per ring member.
    stream: Zeroizing<Vec<[u8; 32]>>,
}

fn gen_rand(nonce: &[u8; 32], commit: &[u8; 33], header: &[u8], rsizes: &[usize]) -> ProofRandomness {
    let mut seed = Zeroizing::new(Vec::with_capacity(32 + 33 + header.len()));
    seed.extend_from_slice(nonce);
    seed.extend_from_slice(commit);
    seed.extend_from_slice(header);
    let mut rng = HmacDrbg::new(&seed);

    let rings = rsizes.len();
    let mut sec = Zeroizing::new(Vec::with_capacity(rings));
    let mut stream = Zeroizing::new(Vec::with_capacity(rsizes.iter().sum()));
    let mut acc = Scalar::ZERO;
    let mut tmp = [0u8; 32];

    for (i, &size) in rsizes.iter().enumerate() {
        if i + 1 < rings {
            let x = loop {
                rng.generate(&mut tmp);
                match Scalar::from_bytes(&tmp) {
                    Some(x) if !bool::from(x.is_zero()) => break x,
                    _ => continue,
                }
            };
            acc += x;
            sec.push(x);
        } else {
            sec.push(-acc);
        }
        for _ in 0..size {
            rng.generate(&mut tmp);
            stream.push(tmp);
        }
    }

    acc.zeroize();
    tmp.zeroize();
    ProofRandomness { sec, stream }
}

fn xor32(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b)) {
        *o = x ^ y;
    }
    out
}

/// Proof-shape decisions derived from the value and the requested
/// parameters.
struct ProveParams {
    v: u64,
    rsizes: Vec<usize>,
    secidx: Vec<usize>,
    min_value: u64,
    mantissa: u32,
    scale: u64,
    exp: i32,
}

fn prove_params(value: u64, params: &RangeProofParams) -> Option<ProveParams> {
    let mut min_value = params.min_value;
    let mut exp = params.exp;
    let mut min_bits = params.min_bits;
    if min_value == u64::MAX {
        exp = -1;
    }

    if exp < 0 {
        return Some(ProveParams {
            v: 0,
            rsizes: vec![1],
            secidx: vec![0],
            min_value: value,
            mantissa: 0,
            scale: 1,
            exp: 0,
        });
    }

    const HALF: u64 = i64::MAX as u64;
    // The proven range must stay below 2^64.
    if (min_value != 0 && value > HALF) || (value != 0 && min_value >= HALF) {
        return None;
    }
    let mut v = value - min_value;

    let max_bits = if min_value != 0 {
        min_value.leading_zeros()
    } else {
        64
    };
    min_bits = min_bits.min(max_bits);
    if min_bits > 61 || value > HALF {
        exp = 0;
    }

    // Hide the least significant digits behind the public offset.
    let mut v2 = if min_bits != 0 {
        u64::MAX >> (64 - min_bits)
    } else {
        0
    };
    let mut shifted = 0;
    while shifted < exp && v2 <= u64::MAX / 10 {
        v /= 10;
        v2 *= 10;
        shifted += 1;
    }
    let exp = shifted;

    let mut scale = 1u64;
    for _ in 0..exp {
        scale *= 10;
    }
    let min_value = value - v * scale;

    let mut mantissa = if v != 0 { 64 - v.leading_zeros() } else { 1 };
    mantissa = mantissa.max(min_bits);

    let rsizes = ring_sizes(mantissa);
    let secidx = (0..rsizes.len())
        .map(|i| ((v >> (i * 2)) & 3) as usize)
        .collect();

    Some(ProveParams {
        v,
        rsizes,
        secidx,
        min_value,
        mantissa,
        scale,
        exp,
    })
}

/// Creates a proof that `commit` opens to a value in a public range.
///
/// `commit` must be the commitment to `value` under `blind`. The nonce
/// seeds every random choice of the prover; sharing it with a recipient
/// lets them [`rewind`] the proof. An optional `message` of at most
/// `128 × (rings − 1)` bytes is embedded for them.
///
/// Requires the `SIGN`, `VERIFY`, `COMMIT` and `RANGEPROOF` capabilities.
/// Fails with [`Error::RangeProofSigningFailed`] with negligible
/// probability; retry with a different nonce or blinding factor.
pub fn sign(
    ctx: &Context,
    commit: &Commitment,
    blind: &[u8; 32],
    nonce: &[u8; 32],
    value: u64,
    params: &RangeProofParams,
    message: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let gen_ctx = ctx.gen_ctx()?;
    let ecmult = ctx.verify_ctx()?;
    let gen2_ctx = ctx.commit_ctx()?;
    let table = ctx.rangeproof_ctx()?;

    if params.min_value > value
        || params.min_bits > 64
        || params.exp < -1
        || params.exp > MAX_EXP
    {
        return Err(Error::InvalidProofParameters);
    }
    let ProveParams {
        v,
        rsizes,
        secidx,
        min_value,
        mantissa,
        scale,
        exp,
    } = prove_params(value, params).ok_or(Error::InvalidProofParameters)?;
    let rings = rsizes.len();

    let message = message.unwrap_or(&[]);
    if message.len() > MESSAGE_BYTES_PER_RING * (rings - 1) {
        return Err(Error::InvalidMessageLength);
    }

    let mut proof = Vec::with_capacity(MAX_PROOF_SIZE);
    let has_mantissa = rsizes[0] > 1;
    let mut flags = if min_value != 0 { FLAG_MIN_VALUE } else { 0 };
    if has_mantissa {
        flags |= FLAG_MANTISSA | exp as u8;
    }
    proof.push(flags);
    if has_mantissa {
        proof.push((mantissa - 1) as u8);
    }
    if min_value != 0 {
        proof.extend_from_slice(&min_value.to_be_bytes());
    }
    let header_len = proof.len();

    let commit_bytes = commit.to_bytes();
    let mut sha_m = Sha256::new();
    sha_m.update(commit_bytes);
    sha_m.update(&proof);

    let offsets = ring_offsets(&rsizes);
    let npub = offsets[rings - 1] + rsizes[rings - 1];

    // Plaintext hidden in each member's random block.
    let mut prep = Zeroizing::new(vec![[0u8; 32]; npub]);
    for (chunk, slot) in message.chunks(32).zip(prep.iter_mut()) {
        slot[..chunk.len()].copy_from_slice(chunk);
    }
    if rsizes[rings - 1] > 1 {
        let last = rings - 1;
        let mut idx = rsizes[last] - 1;
        if secidx[last] == idx {
            idx -= 1;
        }
        prep[offsets[last] + idx] = value_block(v);
    }

    let rand = gen_rand(nonce, &commit_bytes, &proof, &rsizes);
    let mut s = Zeroizing::new(Vec::with_capacity(npub));
    for (block, plain) in rand.stream.iter().zip(prep.iter()) {
        match Scalar::from_bytes(&xor32(block, plain)) {
            Some(x) if !bool::from(x.is_zero()) => s.push(x),
            _ => return Err(Error::RangeProofSigningFailed),
        }
    }

    // The real member's random response becomes the ring nonce.
    let mut k = Zeroizing::new(Vec::with_capacity(rings));
    for i in 0..rings {
        let real = offsets[i] + secidx[i];
        k.push(s[real]);
        s[real] = Scalar::ZERO;
    }

    let mut sec = rand.sec;
    let blind_scalar =
        Zeroizing::new(Scalar::from_bytes(blind).ok_or(Error::InvalidBlindingFactor)?);
    sec[rings - 1] += *blind_scalar;
    if bool::from(sec[rings - 1].is_zero()) {
        return Err(Error::RangeProofSigningFailed);
    }

    let signs_at = proof.len();
    proof.resize(signs_at + sign_bytes(rings), 0);

    let mut pubs = vec![Jacobian::INFINITY; npub];
    for i in 0..rings {
        let digit = (secidx[i] as u64 * scale) << (i * 2);
        let d = pedersen_ecmult(gen_ctx, gen2_ctx, &sec[i], digit);
        if d.is_infinity() {
            return Err(Error::RangeProofSigningFailed);
        }
        pubs[offsets[i]] = d;

        if i + 1 < rings {
            let enc = d.to_affine().to_compressed();
            sha_m.update(enc);
            if enc[0] == 0x03 {
                proof[signs_at + (i >> 3)] |= 1 << (i & 7);
            }
            proof.extend_from_slice(&enc[1..]);
        }
    }
    table.expand(&mut pubs, exp, &rsizes);
    let m: [u8; 32] = sha_m.finalize().into();

    let e0 = borromean::sign(ecmult, gen_ctx, &mut s, &pubs, &k, &sec, &rsizes, &secidx, &m)
        .ok_or(Error::RangeProofSigningFailed)?;
    proof.extend_from_slice(&e0);
    for si in s.iter() {
        proof.extend_from_slice(&si.to_bytes());
    }

    trace!(
        rings,
        mantissa,
        exp,
        header_len,
        len = proof.len(),
        "range proof signed"
    );
    Ok(proof)
}

/// Member index where each ring starts.
fn ring_offsets(rsizes: &[usize]) -> Vec<usize> {
    rsizes
        .iter()
        .scan(0, |acc, &size| {
            let start = *acc;
            *acc += size;
            Some(start)
        })
        .collect()
}

/// `0x80`, seven zero bytes, then `v` big-endian three times.
fn value_block(v: u64) -> [u8; 32] {
    let mut block = [0u8; 32];
    let be = v.to_be_bytes();
    block[8..16].copy_from_slice(&be);
    block[16..24].copy_from_slice(&be);
    block[24..32].copy_from_slice(&be);
    block[0] = 0x80;
    block
}

fn parse_value_block(block: &[u8; 32]) -> Option<u64> {
    if block[0] & 0x80 == 0 || block[8..16] != block[16..24] || block[16..24] != block[24..32] {
        return None;
    }
    let mut be = [0u8; 8];
    be.copy_from_slice(&block[24..32]);
    Some(u64::from_be_bytes(be))
}

/// Everything the verifier reconstructs from the proof bytes.
struct Parsed {
    header: Header,
    rsizes: Vec<usize>,
    pubs: Vec<Jacobian>,
    s: Vec<Scalar>,
    e0: [u8; 32],
    m: [u8; 32],
}

fn parse_proof(
    table: &RangeProofTable,
    gen2_ctx: &EcmultGen2Context,
    commit: &Commitment,
    proof: &[u8],
) -> Option<Parsed> {
    let header = parse_header(proof)?;
    let rsizes = ring_sizes(header.info.mantissa);
    let rings = rsizes.len();
    let npub: usize = rsizes.iter().sum();

    let mut offset = header.len;
    let body = 32 * (npub + rings - 1) + 32 + sign_bytes(rings);
    if proof.len() - offset < body {
        trace!(len = proof.len(), "range proof truncated");
        return None;
    }

    let commit_bytes = commit.to_bytes();
    let mut sha_m = Sha256::new();
    sha_m.update(commit_bytes);
    sha_m.update(&proof[..offset]);

    let signs = &proof[offset..offset + sign_bytes(rings)];
    offset += sign_bytes(rings);
    let used_bits = (rings - 1) & 7;
    if used_bits != 0 && signs[signs.len() - 1] >> used_bits != 0 {
        trace!("range proof has stray sign bits");
        return None;
    }

    let mut acc = Jacobian::INFINITY;
    if header.info.min_value != 0 {
        acc = gen2_ctx.ecmult_small(header.info.min_value);
    }

    let mut pubs = vec![Jacobian::INFINITY; npub];
    let mut npub_at = 0;
    for (i, size) in rsizes.iter().take(rings - 1).enumerate() {
        let mut enc = [0u8; 33];
        enc[0] = 0x02 | ((signs[i >> 3] >> (i & 7)) & 1);
        enc[1..].copy_from_slice(&proof[offset..offset + 32]);
        let c = Affine::from_bytes(&enc)?;
        sha_m.update(enc);
        pubs[npub_at] = Jacobian::from_affine(&c);
        acc = acc.add_affine_var(&c);
        offset += 32;
        npub_at += size;
    }

    acc = (-acc).add_affine_var(commit.point());
    if acc.is_infinity() {
        trace!("range proof last digit commitment is infinity");
        return None;
    }
    pubs[npub_at] = acc;
    table.expand(&mut pubs, header.info.exp, &rsizes);

    let mut e0 = [0u8; 32];
    e0.copy_from_slice(&proof[offset..offset + 32]);
    offset += 32;

    let mut s = Vec::with_capacity(npub);
    for _ in 0..npub {
        let bytes: [u8; 32] = proof[offset..offset + 32].try_into().ok()?;
        s.push(Scalar::from_bytes(&bytes)?);
        offset += 32;
    }
    if offset != proof.len() {
        trace!(extra = proof.len() - offset, "range proof has trailing data");
        return None;
    }

    Some(Parsed {
        header,
        rsizes,
        pubs,
        s,
        e0,
        m: sha_m.finalize().into(),
    })
}

/// Verifies `proof` against `commit` and returns the proven range.
///
/// Requires the `VERIFY`, `COMMIT` and `RANGEPROOF` capabilities.
pub fn verify(ctx: &Context, commit: &Commitment, proof: &[u8]) -> Result<ProvenRange> {
    let ecmult = ctx.verify_ctx()?;
    let gen2_ctx = ctx.commit_ctx()?;
    let table = ctx.rangeproof_ctx()?;

    let parsed = parse_proof(table, gen2_ctx, commit, proof).ok_or(Error::InvalidRangeProof)?;
    if !borromean::verify(
        ecmult,
        None,
        &parsed.e0,
        &parsed.s,
        &parsed.pubs,
        &parsed.rsizes,
        &parsed.m,
    ) {
        return Err(Error::InvalidRangeProof);
    }
    Ok(ProvenRange {
        min_value: parsed.header.info.min_value,
        max_value: parsed.header.info.max_value,
    })
}

/// Verifies `proof` and opens it with the prover's `nonce`.
///
/// Fails with [`Error::InvalidRangeProof`] when the proof does not verify
/// and with [`Error::RewindFailed`] when it verifies but `nonce` is not the
/// one it was made with. Requires the `SIGN`, `VERIFY`, `COMMIT` and
/// `RANGEPROOF` capabilities.
pub fn rewind(ctx: &Context, nonce: &[u8; 32], commit: &Commitment, proof: &[u8]) -> Result<RewoundProof> {
    let gen_ctx = ctx.gen_ctx()?;
    let ecmult = ctx.verify_ctx()?;
    let gen2_ctx = ctx.commit_ctx()?;
    let table = ctx.rangeproof_ctx()?;

    let parsed = parse_proof(table, gen2_ctx, commit, proof).ok_or(Error::InvalidRangeProof)?;
    let mut evalues = vec![Scalar::ZERO; parsed.s.len()];
    if !borromean::verify(
        ecmult,
        Some(evalues.as_mut_slice()),
        &parsed.e0,
        &parsed.s,
        &parsed.pubs,
        &parsed.rsizes,
        &parsed.m,
    ) {
        return Err(Error::InvalidRangeProof);
    }

    let header = &parsed.header;
    let (v, blind, message) = rewind_inner(
        &evalues,
        &parsed.s,
        &parsed.rsizes,
        nonce,
        &commit.to_bytes(),
        &proof[..header.len],
    )
    .ok_or(Error::RewindFailed)?;

    let value = v
        .checked_mul(header.scale)
        .and_then(|x| x.checked_add(header.info.min_value))
        .ok_or(Error::RewindFailed)?;
    let rebuilt = pedersen_ecmult(gen_ctx, gen2_ctx, &blind, value);
    if rebuilt.is_infinity() || rebuilt.to_affine() != *commit.point() {
        trace!("rewound opening does not match the commitment");
        return Err(Error::RewindFailed);
    }

    Ok(RewoundProof {
        value,
        blind: blind.to_bytes(),
        message: message.to_vec(),
        min_value: header.info.min_value,
        max_value: header.info.max_value,
    })
}

/// `x = (k − s) / e` for a member whose response was computed.
fn recover_x(k: &Scalar, e: &Scalar, s: &Scalar) -> Scalar {
    (*k - *s) * e.invert()
}

/// `k = s + e·x` for a member whose response was computed.
fn recover_k(x: &Scalar, e: &Scalar, s: &Scalar) -> Scalar {
    *s + *e * *x
}

fn rewind_inner(
    evalues: &[Scalar],
    s: &[Scalar],
    rsizes: &[usize],
    nonce: &[u8; 32],
    commit: &[u8; 33],
    header: &[u8],
) -> Option<(u64, Zeroizing<Scalar>, Zeroizing<Vec<u8>>)> {
    let rand = gen_rand(nonce, commit, header, rsizes);
    let rings = rsizes.len();
    let offsets = ring_offsets(rsizes);
    let stream_scalar = |idx: usize| Scalar::from_bytes(&rand.stream[idx]);

    if rings == 1 && rsizes[0] == 1 {
        let k = stream_scalar(0)?;
        let x = recover_x(&k, &evalues[0], &s[0]);
        return Some((0, Zeroizing::new(x), Zeroizing::new(Vec::new())));
    }

    // The value sits in one of the top two members of the last ring.
    let last = rings - 1;
    let top = offsets[last] + rsizes[last] - 1;
    let v = [top, top - 1].into_iter().find_map(|idx| {
        let plain = xor32(&s[idx].to_bytes(), &rand.stream[idx]);
        parse_value_block(&plain)
    })?;

    let last_digit = (v >> (last * 2)) as usize;
    if last_digit >= rsizes[last] {
        return None;
    }
    let real = offsets[last] + last_digit;
    let k = stream_scalar(real)?;
    let x = recover_x(&k, &evalues[real], &s[real]);
    let blind = Zeroizing::new(x - rand.sec[last]);

    let mut message = Zeroizing::new(Vec::with_capacity(MESSAGE_BYTES_PER_RING * last));
    for i in 0..last {
        let digit = ((v >> (i * 2)) & 3) as usize;
        for j in 0..rsizes[i] {
            let idx = offsets[i] + j;
            let carried = if j == digit {
                recover_k(&rand.sec[i], &evalues[idx], &s[idx])
            } else {
                s[idx]
            };
            message.extend_from_slice(&xor32(&carried.to_bytes(), &rand.stream[idx]));
        }
    }

    Some((v, blind, message))
}
