use cryptal_secp256k1::secp256k1::ecmult::EcmultContext;
use cryptal_secp256k1::secp256k1::ecmult_const::ecmult_const;
use cryptal_secp256k1::secp256k1::ecmult_gen::{EcmultGen2Context, EcmultGenContext};
use cryptal_secp256k1::secp256k1::field::FieldElement;
use cryptal_secp256k1::secp256k1::group::{Affine, G, H, Jacobian};
use cryptal_secp256k1::secp256k1::scalar::Scalar;
use proptest::prelude::*;

const G_COMPRESSED: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
const G_UNCOMPRESSED: &str = "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
                              483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";
const TWO_G_COMPRESSED: &str = "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";
const H_COMPRESSED: &str = "0250929b74c1a04954b78b4b6035e97a5e078a5a0f28ec96d547bfee9ace803ac0";

fn scalar(seed: [u8; 32]) -> Scalar {
    Scalar::from_bytes_reduced(&seed).0
}

#[test]
fn generators_are_on_the_curve() {
    assert!(G.is_valid_var());
    assert!(H.is_valid_var());
    assert_eq!(hex::encode(G.to_compressed()), G_COMPRESSED);
    assert_eq!(hex::encode(G.to_uncompressed()), G_UNCOMPRESSED);
    assert_eq!(hex::encode(H.to_compressed()), H_COMPRESSED);
}

#[test]
fn doubling_matches_addition() {
    let gj = Jacobian::from_affine(&G);
    let doubled = gj.double().to_affine();
    assert_eq!(hex::encode(doubled.to_compressed()), TWO_G_COMPRESSED);

    assert_eq!(gj.add_var(&gj).to_affine(), doubled);
    assert_eq!(gj.add_affine_var(&G).to_affine(), doubled);
    assert_eq!(gj.add_affine(&G).to_affine(), doubled);
}

#[test]
fn infinity_is_the_identity() {
    let gj = Jacobian::from_affine(&G);

    assert_eq!(Jacobian::INFINITY.add_affine(&G).to_affine(), G);
    assert_eq!(gj.add_affine(&Affine::INFINITY).to_affine(), G);
    assert_eq!(Jacobian::INFINITY.add_affine_var(&G).to_affine(), G);
    assert_eq!(Jacobian::INFINITY.add_var(&gj).to_affine(), G);

    assert!(gj.add_affine(&-G).is_infinity());
    assert!(gj.add_affine_var(&-G).is_infinity());
    assert!(gj.add_var(&-gj).is_infinity());
    assert!(Jacobian::INFINITY.double().is_infinity());
}

#[test]
fn point_encodings_round_trip() {
    let compressed = hex::decode(G_COMPRESSED).unwrap();
    let uncompressed = hex::decode(G_UNCOMPRESSED).unwrap();
    let mut hybrid = uncompressed.clone();
    hybrid[0] = 0x06;

    let from_c = Affine::from_bytes(&compressed).expect("compressed G");
    let from_u = Affine::from_bytes(&uncompressed).expect("uncompressed G");
    let from_h = Affine::from_bytes(&hybrid).expect("hybrid G, even y");
    assert_eq!(from_c, G);
    assert_eq!(from_u, G);
    assert_eq!(from_h, G);

    assert_eq!(from_c.to_bytes(true), compressed);
    assert_eq!(from_c.to_bytes(false), uncompressed);
}

#[test]
fn point_parsing_rejects_malformed_input() {
    let uncompressed = hex::decode(G_UNCOMPRESSED).unwrap();

    let mut wrong_parity = uncompressed.clone();
    wrong_parity[0] = 0x07;
    assert!(Affine::from_bytes(&wrong_parity).is_none());

    let mut off_curve = uncompressed.clone();
    off_curve[64] ^= 1;
    assert!(Affine::from_bytes(&off_curve).is_none());

    let mut bad_tag = uncompressed.clone();
    bad_tag[0] = 0x05;
    assert!(Affine::from_bytes(&bad_tag).is_none());

    assert!(Affine::from_bytes(&uncompressed[..33]).is_none(), "04 with 33 bytes");
    assert!(Affine::from_bytes(&[]).is_none());
    assert!(Affine::from_bytes(&[0x02; 34]).is_none());

    let mut x_too_big = vec![0x02];
    x_too_big.extend_from_slice(&[0xFF; 32]);
    assert!(Affine::from_bytes(&x_too_big).is_none());
}

#[test]
fn point_construction_checks_the_curve() {
    let p = Affine::new(*G.x(), *G.y()).expect("G is on the curve");
    assert_eq!(p, G);
    assert!(Affine::new(*G.x(), *H.y()).is_none());
    assert!(Affine::new(FieldElement::ZERO, FieldElement::ZERO).is_none());
}

#[test]
fn batch_conversion_matches_single() {
    let mut points = vec![Jacobian::from_affine(&G)];
    for i in 1..10 {
        let next = points[i - 1].double().add_affine_var(&H);
        points.push(next);
    }
    points.push(Jacobian::INFINITY);

    let batch = Affine::batch_from_jacobian(&points);
    for (p, a) in points.iter().zip(&batch) {
        assert_eq!(p.to_affine(), *a);
    }
    assert!(batch[10].is_infinity());
}

#[test]
fn generator_multiplication_edge_scalars() {
    let gen_ctx = EcmultGenContext::new();

    assert!(gen_ctx.ecmult_gen(&Scalar::ZERO).is_infinity());
    assert_eq!(gen_ctx.ecmult_gen(&Scalar::ONE).to_affine(), G);
    assert_eq!(gen_ctx.ecmult_gen(&-Scalar::ONE).to_affine(), -G);
    assert_eq!(
        hex::encode(gen_ctx.ecmult_gen(&Scalar::from_u64(2)).to_affine().to_compressed()),
        TWO_G_COMPRESSED
    );
}

#[test]
fn generator_blinding_does_not_change_results() {
    let mut gen_ctx = EcmultGenContext::new();
    let k = Scalar::from_u64(0xDEAD_BEEF);
    let expected = gen_ctx.ecmult_gen(&k).to_affine();

    gen_ctx.randomize(Some(&[0x42; 32]));
    assert_eq!(gen_ctx.ecmult_gen(&k).to_affine(), expected);

    gen_ctx.randomize(Some(&[0x17; 32]));
    assert_eq!(gen_ctx.ecmult_gen(&k).to_affine(), expected);

    gen_ctx.randomize(None);
    assert_eq!(gen_ctx.ecmult_gen(&k).to_affine(), expected);
}

#[test]
fn value_generator_multiplication() {
    let gen2 = EcmultGen2Context::new();
    let hj = Jacobian::from_affine(&H);

    assert!(gen2.ecmult_small(0).is_infinity());
    assert_eq!(gen2.ecmult_small(1).to_affine(), H);
    assert_eq!(gen2.ecmult_small(2).to_affine(), hj.double().to_affine());

    let g_plus_3h = gen2.ecmult_add(&Jacobian::from_affine(&G), 3);
    let expected = hj.double().add_affine_var(&H).add_affine_var(&G);
    assert_eq!(g_plus_3h.to_affine(), expected.to_affine());

    let verify = EcmultContext::new();
    let big = u64::MAX;
    assert_eq!(
        gen2.ecmult_small(big).to_affine(),
        verify.ecmult(&hj, &Scalar::from_u64(big), &Scalar::ZERO).to_affine()
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn multiplication_engines_agree(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
        let gen_ctx = EcmultGenContext::new();
        let verify = EcmultContext::new();
        let (a, b) = (scalar(a), scalar(b));

        let ag = gen_ctx.ecmult_gen(&a);
        let ag_affine = ag.to_affine();

        // a·G by every engine.
        prop_assert_eq!(verify.ecmult(&Jacobian::INFINITY, &Scalar::ZERO, &a).to_affine(), ag_affine);
        prop_assert_eq!(ecmult_const(&G, &a).to_affine(), ag_affine);

        // b·(a·G) = (a·b)·G.
        let bag = gen_ctx.ecmult_gen(&(a * b)).to_affine();
        prop_assert_eq!(verify.ecmult(&ag, &b, &Scalar::ZERO).to_affine(), bag);
        prop_assert_eq!(ecmult_const(&ag_affine, &b).to_affine(), bag);

        // b·(a·G) + a·G = (a·b + a)·G.
        let combined = gen_ctx.ecmult_gen(&(a * b + a)).to_affine();
        prop_assert_eq!(verify.ecmult(&ag, &b, &a).to_affine(), combined);
    }

    #[test]
    fn multi_multiplication_matches_sum(a in any::<[u8; 32]>(), b in any::<[u8; 32]>(), c in any::<[u8; 32]>()) {
        let verify = EcmultContext::new();
        let (a, b, c) = (scalar(a), scalar(b), scalar(c));
        let gj = Jacobian::from_affine(&G);
        let hj = Jacobian::from_affine(&H);

        let multi = verify.ecmult_multi(&[(gj, a), (hj, b)], &c);
        let separate = verify
            .ecmult(&gj, &a, &c)
            .add_var(&verify.ecmult(&hj, &b, &Scalar::ZERO));
        prop_assert_eq!(multi.to_affine(), separate.to_affine());
    }
}
