use std::cell::Cell;

use cryptal_secp256k1::keys::{PublicKey, SecretKey, pubkey_create};
use cryptal_secp256k1::signatures::ecdsa::{
    self, NonceFunction, RecoverableSignature, RecoveryId, Rfc6979, Signature,
};
use cryptal_secp256k1::{Capability, Context, ContextFlags, Error};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sha2::{Digest, Sha256};

const N_HEX: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

fn one() -> SecretKey {
    let mut k = [0u8; 32];
    k[31] = 1;
    SecretKey::from_bytes(&k).unwrap()
}

fn ctx() -> Context {
    Context::new(ContextFlags::SIGN | ContextFlags::VERIFY)
}

/// Negates `s` of a compact signature, producing the high-S twin.
fn flip_s(compact: &[u8; 64]) -> [u8; 64] {
    let n: [u8; 32] = hex::decode(N_HEX).unwrap().try_into().unwrap();
    let mut out = *compact;
    let mut borrow = 0u16;
    for i in (0..32).rev() {
        let sub = u16::from(compact[32 + i]) + borrow;
        let cur = u16::from(n[i]);
        borrow = u16::from(cur < sub);
        out[32 + i] = (cur + (borrow << 8) - sub) as u8;
    }
    out
}

#[test]
fn ecdsa_rfc6979_golden_vector() {
    let ctx = ctx();
    let msg = sha256(b"Satoshi Nakamoto");
    let sig = ecdsa::sign(&ctx, &msg, &one()).unwrap();

    let compact = sig.to_compact();
    assert_eq!(
        hex::encode(&compact[..32]),
        "934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8"
    );
    assert_eq!(
        hex::encode(&compact[32..]),
        "2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5"
    );

    let public = pubkey_create(&ctx, &one()).unwrap();
    assert!(ecdsa::verify(&ctx, &msg, &sig, &public).unwrap());
}

#[test]
fn ecdsa_signing_is_deterministic() {
    let ctx = ctx();
    let msg = sha256(b"deterministic");
    let a = ecdsa::sign(&ctx, &msg, &one()).unwrap();
    let b = ecdsa::sign(&ctx, &msg, &one()).unwrap();
    assert_eq!(a, b);

    let extra = [9u8; 32];
    let c = ecdsa::sign_with(&ctx, &msg, &one(), &Rfc6979, Some(&extra)).unwrap();
    assert_ne!(a, c, "extra entropy changes the nonce");
}

#[test]
fn ecdsa_verify_rejects_tampering() {
    let ctx = ctx();
    let mut rng = StdRng::seed_from_u64(1);
    let secret = SecretKey::random(&mut rng);
    let public = pubkey_create(&ctx, &secret).unwrap();
    let other = pubkey_create(&ctx, &SecretKey::random(&mut rng)).unwrap();

    let msg = sha256(b"Hello, world!");
    let sig = ecdsa::sign(&ctx, &msg, &secret).unwrap();
    assert!(ecdsa::verify(&ctx, &msg, &sig, &public).unwrap());

    let mut wrong_msg = msg;
    wrong_msg[0] ^= 1;
    assert!(!ecdsa::verify(&ctx, &wrong_msg, &sig, &public).unwrap());
    assert!(!ecdsa::verify(&ctx, &msg, &sig, &other).unwrap());

    let mut compact = sig.to_compact();
    compact[10] ^= 0x10;
    let mangled = Signature::from_compact(&compact).unwrap();
    assert!(!ecdsa::verify(&ctx, &msg, &mangled, &public).unwrap());
}

#[test]
fn ecdsa_high_s_is_rejected_until_normalized() {
    let ctx = ctx();
    let msg = sha256(b"malleable");
    let secret = one();
    let public = pubkey_create(&ctx, &secret).unwrap();

    let sig = ecdsa::sign(&ctx, &msg, &secret).unwrap();
    assert!(sig.is_low_s());

    let mut high = Signature::from_compact(&flip_s(&sig.to_compact())).unwrap();
    assert!(!high.is_low_s());
    assert!(!ecdsa::verify(&ctx, &msg, &high, &public).unwrap());

    assert!(high.normalize_s(), "a high-S signature changes");
    assert_eq!(high, sig);
    assert!(!high.normalize_s(), "a low-S signature stays put");
    assert!(ecdsa::verify(&ctx, &msg, &high, &public).unwrap());
}

#[test]
fn ecdsa_zero_components_never_verify() {
    let ctx = ctx();
    let public = pubkey_create(&ctx, &one()).unwrap();
    let msg = [1u8; 32];

    let mut compact = [0u8; 64];
    compact[63] = 1;
    let zero_r = Signature::from_compact(&compact).unwrap();
    assert!(!ecdsa::verify(&ctx, &msg, &zero_r, &public).unwrap());

    let mut compact = [0u8; 64];
    compact[31] = 1;
    let zero_s = Signature::from_compact(&compact).unwrap();
    assert!(!ecdsa::verify(&ctx, &msg, &zero_s, &public).unwrap());
}

#[test]
fn compact_encoding_rejects_overflow() {
    let n = hex::decode(N_HEX).unwrap();
    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&n);
    compact[63] = 1;
    assert_eq!(Signature::from_compact(&compact), Err(Error::InvalidSignature));

    let mut compact = [0u8; 64];
    compact[31] = 1;
    compact[32..].copy_from_slice(&n);
    assert_eq!(Signature::from_compact(&compact), Err(Error::InvalidSignature));
}

#[test]
fn der_encoding_of_golden_signature() {
    let ctx = ctx();
    let msg = sha256(b"Satoshi Nakamoto");
    let sig = ecdsa::sign(&ctx, &msg, &one()).unwrap();

    let der = sig.to_der();
    assert_eq!(
        hex::encode(&der),
        "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8\
         02202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5"
    );
    assert_eq!(Signature::from_der(&der).unwrap(), sig);
}

#[test]
fn der_encoding_is_minimal_for_small_values() {
    let mut compact = [0u8; 64];
    compact[31] = 0x7F;
    compact[63] = 0x80;
    let sig = Signature::from_compact(&compact).unwrap();

    let der = sig.to_der();
    assert_eq!(hex::encode(&der), "300702017f02020080");
    assert_eq!(Signature::from_der(&der).unwrap(), sig);
}

#[test]
fn der_parsing_is_lenient_about_padding() {
    // r = 1 padded with two zero bytes, s = 2, plus trailing garbage.
    let padded = hex::decode("30080203000001020102ffff").unwrap();
    let sig = Signature::from_der(&padded).unwrap();
    let compact = sig.to_compact();
    assert_eq!(compact[31], 1);
    assert_eq!(compact[63], 2);
    assert_eq!(compact.iter().filter(|b| **b != 0).count(), 2);
}

#[test]
fn der_parsing_rejects_malformed_input() {
    for bad in [
        "",
        "31060201010201020000",
        "300602010103010200",
        "3006020001020102",
        "30060201010200",
    ] {
        let bytes = hex::decode(bad).unwrap();
        assert!(Signature::from_der(&bytes).is_err(), "accepted {bad}");
    }

    // 33 significant bytes.
    let mut long = vec![0x30, 0x26, 0x02, 0x21];
    long.extend_from_slice(&[0x01; 33]);
    long.extend_from_slice(&[0x02, 0x01, 0x01]);
    assert!(Signature::from_der(&long).is_err());
}

#[test]
fn recovery_id_range() {
    for id in 0..4u8 {
        assert_eq!(RecoveryId::new(id).unwrap().to_u8(), id);
    }
    assert_eq!(RecoveryId::new(4), Err(Error::InvalidRecoveryId));
    assert_eq!(RecoveryId::try_from(-1), Err(Error::InvalidRecoveryId));
    assert_eq!(RecoveryId::try_from(2).unwrap().to_u8(), 2);
}

#[test]
fn recoverable_signature_compact_round_trip() {
    let ctx = ctx();
    let msg = sha256(b"recover me");
    let rsig = ecdsa::sign_recoverable(&ctx, &msg, &one()).unwrap();

    let (compact, recid) = rsig.to_compact();
    let parsed = RecoverableSignature::from_compact(&compact, recid).unwrap();
    assert_eq!(parsed, rsig);
    assert_eq!(parsed.to_standard(), ecdsa::sign(&ctx, &msg, &one()).unwrap());

    let public = ecdsa::recover(&ctx, &msg, &parsed).unwrap();
    assert_eq!(public, pubkey_create(&ctx, &one()).unwrap());
}

#[test]
fn recovery_with_wrong_id_gives_another_key() {
    let ctx = ctx();
    let msg = sha256(b"wrong parity");
    let rsig = ecdsa::sign_recoverable(&ctx, &msg, &one()).unwrap();
    let (compact, recid) = rsig.to_compact();

    let flipped = RecoveryId::new(recid.to_u8() ^ 1).unwrap();
    let other = RecoverableSignature::from_compact(&compact, flipped).unwrap();
    let recovered = ecdsa::recover(&ctx, &msg, &other).unwrap();
    assert_ne!(recovered, pubkey_create(&ctx, &one()).unwrap());
}

#[test]
fn nonce_function_failure_aborts_signing() {
    let ctx = ctx();
    let refuse =
        |_: &[u8; 32], _: &[u8; 32], _: u32, _: Option<&[u8; 32]>| -> Option<[u8; 32]> { None };
    assert_eq!(
        ecdsa::sign_with(&ctx, &[1u8; 32], &one(), &refuse, None),
        Err(Error::NonceFunctionFailed)
    );
}

#[test]
fn invalid_nonces_are_skipped() {
    let ctx = ctx();
    let attempts = Cell::new(0u32);
    let n: [u8; 32] = hex::decode(N_HEX).unwrap().try_into().unwrap();

    // Zero, then n, then a usable nonce.
    let picky = |msg: &[u8; 32], key: &[u8; 32], attempt: u32, extra: Option<&[u8; 32]>| {
        attempts.set(attempt + 1);
        match attempt {
            0 => Some([0u8; 32]),
            1 => Some(n),
            _ => Rfc6979.nonce(msg, key, attempt, extra),
        }
    };

    let msg = sha256(b"retry");
    let sig = ecdsa::sign_with(&ctx, &msg, &one(), &picky, None).unwrap();
    assert_eq!(attempts.get(), 3);

    let public = pubkey_create(&ctx, &one()).unwrap();
    assert!(ecdsa::verify(&ctx, &msg, &sig, &public).unwrap());
}

#[test]
fn operations_report_missing_capabilities() {
    let sign_only = Context::new(ContextFlags::SIGN);
    let verify_only = Context::new(ContextFlags::VERIFY);
    let msg = [3u8; 32];

    let sig = ecdsa::sign(&sign_only, &msg, &one()).unwrap();
    let public = PublicKey::from_bytes(
        &hex::decode("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798").unwrap(),
    )
    .unwrap();

    assert_eq!(
        ecdsa::verify(&sign_only, &msg, &sig, &public),
        Err(Error::MissingCapability(Capability::Verify))
    );
    assert_eq!(
        ecdsa::sign(&verify_only, &msg, &one()),
        Err(Error::MissingCapability(Capability::Sign))
    );
    assert!(ecdsa::verify(&verify_only, &msg, &sig, &public).unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sign_verify_recover(seed in any::<u64>(), msg in any::<[u8; 32]>()) {
        let ctx = ctx();
        let mut rng = StdRng::seed_from_u64(seed);
        let secret = SecretKey::random(&mut rng);
        let public = pubkey_create(&ctx, &secret).unwrap();

        let rsig = ecdsa::sign_recoverable(&ctx, &msg, &secret).unwrap();
        let sig = rsig.to_standard();

        prop_assert!(sig.is_low_s());
        prop_assert!(ecdsa::verify(&ctx, &msg, &sig, &public).unwrap());
        prop_assert_eq!(ecdsa::recover(&ctx, &msg, &rsig).unwrap(), public);

        prop_assert_eq!(Signature::from_der(&sig.to_der()).unwrap(), sig);
        prop_assert!(sig.to_der().len() <= ecdsa::MAX_DER_SIGNATURE_SIZE);
        prop_assert_eq!(Signature::from_compact(&sig.to_compact()).unwrap(), sig);
    }
}
