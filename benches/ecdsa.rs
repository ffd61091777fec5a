use cryptal_secp256k1::keys::{SecretKey, pubkey_create};
use cryptal_secp256k1::signatures::ecdsa;
use cryptal_secp256k1::{Context, ContextFlags};

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

pub fn bench_ecdsa(c: &mut Criterion) {
    let ctx = Context::new(ContextFlags::SIGN | ContextFlags::VERIFY);
    let secret = SecretKey::from_bytes(&[0x42; 32]).unwrap();
    let public = pubkey_create(&ctx, &secret).unwrap();
    let msg = [0x17u8; 32];
    let sig = ecdsa::sign(&ctx, &msg, &secret).unwrap();
    let rsig = ecdsa::sign_recoverable(&ctx, &msg, &secret).unwrap();

    c.bench_function("ecdsa sign", |b| {
        b.iter(|| ecdsa::sign(&ctx, black_box(&msg), &secret))
    });
    c.bench_function("ecdsa verify", |b| {
        b.iter(|| ecdsa::verify(&ctx, black_box(&msg), &sig, &public))
    });
    c.bench_function("ecdsa recover", |b| {
        b.iter(|| ecdsa::recover(&ctx, black_box(&msg), &rsig))
    });
}

criterion_group!(benches, bench_ecdsa);
criterion_main!(benches);
