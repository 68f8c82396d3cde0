//! Criterion benchmarks for shadowy-core critical operations.
//!
//! Covers: seeded ML-DSA-87 key generation, sign/verify, address
//! derivation and validation, and canonical transaction hashing.

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use shadowy_core::address::{derive_address, is_valid_address};
use shadowy_core::crypto::KeyPair;
use shadowy_core::types::{TransactionDraft, TxInput, TxOutput};

fn sample_draft(inputs: usize) -> TransactionDraft {
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    TransactionDraft::new(
        (0..inputs)
            .map(|i| TxInput {
                txid: format!("{i:064x}"),
                vout: 0,
                script_sig: String::new(),
                sequence: u32::MAX,
            })
            .collect(),
        vec![TxOutput {
            value: 50 * 100_000_000,
            script_pubkey: "OP_DUP OP_HASH160 00 OP_EQUALVERIFY OP_CHECKSIG".into(),
            address: "S".repeat(51),
        }],
        ts,
    )
}

fn bench_keygen(c: &mut Criterion) {
    let seed = [0x5Au8; 64];
    c.bench_function("ml_dsa_87_keygen_from_seed", |b| {
        b.iter(|| KeyPair::from_seed(black_box(&seed)).unwrap())
    });
}

fn bench_sign_verify(c: &mut Criterion) {
    let kp = KeyPair::from_seed(&[0x11u8; 64]).unwrap();
    let msg = sample_draft(4).canonical_bytes().unwrap();
    let sig = kp.sign(&msg).unwrap();

    c.bench_function("ml_dsa_87_sign", |b| {
        b.iter(|| kp.sign(black_box(&msg)).unwrap())
    });
    c.bench_function("ml_dsa_87_verify", |b| {
        b.iter(|| kp.public_key().verify(black_box(&msg), black_box(&sig)).unwrap())
    });
}

fn bench_address(c: &mut Criterion) {
    let kp = KeyPair::from_seed(&[0x22u8; 64]).unwrap();
    let pk = kp.public_key().as_bytes().to_vec();
    let encoded = derive_address(&pk).encode();

    c.bench_function("derive_address", |b| {
        b.iter(|| derive_address(black_box(&pk)))
    });
    c.bench_function("is_valid_address", |b| {
        b.iter(|| is_valid_address(black_box(&encoded)))
    });
}

fn bench_tx_hash(c: &mut Criterion) {
    let draft = sample_draft(16);
    c.bench_function("draft_hash_16_inputs", |b| {
        b.iter(|| black_box(&draft).hash().unwrap())
    });
}

criterion_group!(benches, bench_keygen, bench_sign_verify, bench_address, bench_tx_hash);
criterion_main!(benches);
