use cryptal_secp256k1::keys::{SecretKey, pubkey_create};
use cryptal_secp256k1::signatures::ecdsa;
use cryptal_secp256k1::{Capability, Context, ContextFlags, Error};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn secret() -> SecretKey {
    SecretKey::from_bytes(&[0x24; 32]).unwrap()
}

#[test]
fn flags_combine() {
    let both = ContextFlags::SIGN | ContextFlags::VERIFY;
    assert!(both.contains(ContextFlags::SIGN));
    assert!(both.contains(ContextFlags::VERIFY));
    assert!(!both.contains(ContextFlags::COMMIT));
    assert!(ContextFlags::ALL.contains(both | ContextFlags::COMMIT | ContextFlags::RANGEPROOF));
    assert!(ContextFlags::NONE.is_empty());
    assert!(!both.is_empty());
}

#[test]
fn context_reports_built_tables() {
    assert_eq!(Context::default().flags(), ContextFlags::NONE);
    assert_eq!(Context::new(ContextFlags::SIGN).flags(), ContextFlags::SIGN);
    assert_eq!(Context::new(ContextFlags::ALL).flags(), ContextFlags::ALL);
}

#[test]
fn build_adds_missing_tables_only() {
    let mut ctx = Context::new(ContextFlags::SIGN);
    ctx.randomize(Some(&[7u8; 32])).unwrap();
    let before = ecdsa::sign(&ctx, &[1u8; 32], &secret()).unwrap();

    ctx.build(ContextFlags::SIGN | ContextFlags::VERIFY);
    assert_eq!(ctx.flags(), ContextFlags::SIGN | ContextFlags::VERIFY);
    ctx.build(ContextFlags::VERIFY);
    assert_eq!(ctx.flags(), ContextFlags::SIGN | ContextFlags::VERIFY);

    let after = ecdsa::sign(&ctx, &[1u8; 32], &secret()).unwrap();
    assert_eq!(before, after);
    let public = pubkey_create(&ctx, &secret()).unwrap();
    assert!(ecdsa::verify(&ctx, &[1u8; 32], &after, &public).unwrap());
}

#[test]
fn randomize_requires_signing_table() {
    let mut ctx = Context::new(ContextFlags::VERIFY);
    assert_eq!(
        ctx.randomize(Some(&[1u8; 32])),
        Err(Error::MissingCapability(Capability::Sign))
    );
    assert_eq!(
        ctx.randomize(None),
        Err(Error::MissingCapability(Capability::Sign))
    );
}

#[test]
fn blinding_never_changes_results() {
    let mut ctx = Context::new(ContextFlags::SIGN | ContextFlags::VERIFY);
    let msg = [0x5Eu8; 32];
    let public = pubkey_create(&ctx, &secret()).unwrap();
    let sig = ecdsa::sign(&ctx, &msg, &secret()).unwrap();

    ctx.randomize(Some(&[0xA5; 32])).unwrap();
    assert_eq!(pubkey_create(&ctx, &secret()).unwrap(), public);
    assert_eq!(ecdsa::sign(&ctx, &msg, &secret()).unwrap(), sig);

    let mut rng = StdRng::seed_from_u64(99);
    ctx.randomize_with_rng(&mut rng).unwrap();
    assert_eq!(ecdsa::sign(&ctx, &msg, &secret()).unwrap(), sig);

    ctx.randomize(None).unwrap();
    assert_eq!(pubkey_create(&ctx, &secret()).unwrap(), public);
    assert_eq!(ecdsa::sign(&ctx, &msg, &secret()).unwrap(), sig);
}

#[test]
fn clones_are_independent() {
    let mut original = Context::new(ContextFlags::SIGN | ContextFlags::VERIFY);
    let copy = original.clone();
    assert_eq!(copy.flags(), original.flags());

    original.randomize(Some(&[3u8; 32])).unwrap();
    drop(original);

    let msg = [0x10u8; 32];
    let sig = ecdsa::sign(&copy, &msg, &secret()).unwrap();
    let public = pubkey_create(&copy, &secret()).unwrap();
    assert!(ecdsa::verify(&copy, &msg, &sig, &public).unwrap());
}

#[test]
fn context_is_shareable_across_threads() {
    let ctx = Context::new(ContextFlags::SIGN | ContextFlags::VERIFY);
    let public = pubkey_create(&ctx, &secret()).unwrap();

    std::thread::scope(|scope| {
        for i in 0..4u8 {
            let ctx = &ctx;
            let public = &public;
            scope.spawn(move || {
                let msg = [i; 32];
                let sig = ecdsa::sign(ctx, &msg, &secret()).unwrap();
                assert!(ecdsa::verify(ctx, &msg, &sig, public).unwrap());
            });
        }
    });
}
