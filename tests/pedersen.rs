use cryptal_secp256k1::commitments::{self, COMMITMENT_SIZE, Commitment};
use cryptal_secp256k1::{Capability, Context, ContextFlags, Error};
use proptest::prelude::*;

const N_HEX: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

fn ctx() -> Context {
    Context::new(ContextFlags::SIGN | ContextFlags::COMMIT)
}

fn blind(byte: u8) -> [u8; 32] {
    let mut b = [0u8; 32];
    b[31] = byte;
    b[0] = 0x11;
    b
}

#[test]
fn commitment_to_one_without_blind_is_h() {
    let c = commitments::commit(&ctx(), &[0u8; 32], 1).unwrap();
    assert_eq!(
        hex::encode(c.to_bytes()),
        "0250929b74c1a04954b78b4b6035e97a5e078a5a0f28ec96d547bfee9ace803ac0"
    );
}

#[test]
fn commitment_to_zero_is_blind_times_g() {
    let mut one = [0u8; 32];
    one[31] = 1;
    let c = commitments::commit(&ctx(), &one, 0).unwrap();
    assert_eq!(
        hex::encode(c.to_bytes()),
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
    );
}

#[test]
fn empty_commitment_is_rejected() {
    assert_eq!(
        commitments::commit(&ctx(), &[0u8; 32], 0),
        Err(Error::PointAtInfinity)
    );
}

#[test]
fn out_of_range_blind_is_rejected() {
    let n: [u8; 32] = hex::decode(N_HEX).unwrap().try_into().unwrap();
    assert_eq!(
        commitments::commit(&ctx(), &n, 5),
        Err(Error::InvalidBlindingFactor)
    );
    assert_eq!(
        commitments::blind_sum(&[blind(1), [0xFF; 32]], 1),
        Err(Error::InvalidBlindingFactor)
    );
}

#[test]
fn commitment_encoding_round_trip() {
    let c = commitments::commit(&ctx(), &blind(7), 1_000).unwrap();
    let bytes: [u8; COMMITMENT_SIZE] = c.to_bytes();
    assert_eq!(Commitment::from_bytes(&bytes).unwrap(), c);

    let mut bad = bytes;
    bad[0] = 0x04;
    assert_eq!(Commitment::from_bytes(&bad), Err(Error::InvalidCommitment));
}

#[test]
fn balanced_transaction_tallies() {
    let ctx = ctx();
    let inputs = [(blind(1), 10u64), (blind(2), 20)];
    let first_out = (blind(3), 25u64);

    let last_blind = commitments::blind_sum(&[inputs[0].0, inputs[1].0, first_out.0], 2).unwrap();
    let outputs = [first_out, (last_blind, 5)];

    let pos: Vec<_> = inputs
        .iter()
        .map(|(b, v)| commitments::commit(&ctx, b, *v).unwrap())
        .collect();
    let neg: Vec<_> = outputs
        .iter()
        .map(|(b, v)| commitments::commit(&ctx, b, *v).unwrap())
        .collect();

    assert!(commitments::verify_tally(&ctx, &pos, &neg, 0).unwrap());
    assert!(commitments::verify_tally(&ctx, &neg, &pos, 0).unwrap());

    let off_by_one = [outputs[0], (last_blind, 6)]
        .iter()
        .map(|(b, v)| commitments::commit(&ctx, b, *v).unwrap())
        .collect::<Vec<_>>();
    assert!(!commitments::verify_tally(&ctx, &pos, &off_by_one, 0).unwrap());

    let mut one = [0u8; 32];
    one[31] = 1;
    let bumped_blind = commitments::blind_sum(&[last_blind, one], 2).unwrap();
    let blind_off_by_one = [outputs[0], (bumped_blind, 5)]
        .iter()
        .map(|(b, v)| commitments::commit(&ctx, b, *v).unwrap())
        .collect::<Vec<_>>();
    assert!(!commitments::verify_tally(&ctx, &pos, &blind_off_by_one, 0).unwrap());
}

#[test]
fn tally_with_public_excess() {
    let ctx = ctx();
    let big = commitments::commit(&ctx, &blind(9), 100).unwrap();
    let small = commitments::commit(&ctx, &blind(9), 60).unwrap();

    assert!(commitments::verify_tally(&ctx, &[big], &[small], 40).unwrap());
    assert!(commitments::verify_tally(&ctx, &[small], &[big], -40).unwrap());
    assert!(!commitments::verify_tally(&ctx, &[big], &[small], 39).unwrap());
    assert!(!commitments::verify_tally(&ctx, &[big], &[small], -40).unwrap());
}

#[test]
fn empty_tally_balances() {
    assert!(commitments::verify_tally(&ctx(), &[], &[], 0).unwrap());
    assert!(!commitments::verify_tally(&ctx(), &[], &[], 1).unwrap());
}

#[test]
fn blind_sum_cancels() {
    let b = blind(42);
    assert_eq!(commitments::blind_sum(&[b, b], 1).unwrap(), [0u8; 32]);
    assert_eq!(commitments::blind_sum(&[b], 1).unwrap(), b);
    assert_eq!(commitments::blind_sum(&[], 0).unwrap(), [0u8; 32]);
}

#[test]
fn commitments_report_missing_capabilities() {
    let sign_only = Context::new(ContextFlags::SIGN);
    assert_eq!(
        commitments::commit(&sign_only, &blind(1), 1),
        Err(Error::MissingCapability(Capability::Commit))
    );
    assert_eq!(
        commitments::verify_tally(&sign_only, &[], &[], 0),
        Err(Error::MissingCapability(Capability::Commit))
    );

    let commit_only = Context::new(ContextFlags::COMMIT);
    assert_eq!(
        commitments::commit(&commit_only, &blind(1), 1),
        Err(Error::MissingCapability(Capability::Sign))
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn commitments_are_additive(
        b1 in 1u8..=255,
        b2 in 1u8..=255,
        v1 in 0u64..u64::MAX / 2,
        v2 in 0u64..u64::MAX / 2,
    ) {
        let ctx = ctx();
        let c1 = commitments::commit(&ctx, &blind(b1), v1).unwrap();
        let c2 = commitments::commit(&ctx, &blind(b2), v2).unwrap();

        let sum = commitments::blind_sum(&[blind(b1), blind(b2)], 2).unwrap();
        let total = commitments::commit(&ctx, &sum, v1 + v2).unwrap();

        prop_assert!(commitments::verify_tally(&ctx, &[c1, c2], &[total], 0).unwrap());
    }
}
