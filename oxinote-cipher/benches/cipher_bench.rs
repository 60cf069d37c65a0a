//! Benchmarks for the block ciphers and modes.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxinote_cipher::{Aes, Mode, Rc2};
use oxinote_core::codec::bytes;
use oxinote_core::{BitArray, BlockCipher};
use std::hint::black_box;

fn bench_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("block");

    for key_bytes in [16usize, 24, 32] {
        let aes = Aes::new(&bytes::to_bits(&vec![0x11; key_bytes])).expect("key");
        let block = [1, 2, 3, 4];
        group.bench_function(BenchmarkId::new("aes_encrypt", key_bytes * 8), |b| {
            b.iter(|| black_box(aes.encrypt_block(black_box(&block))));
        });
    }

    group.bench_function("aes_key_schedule", |b| {
        let key = bytes::to_bits(&[0x22; 16]);
        b.iter(|| black_box(Aes::new(black_box(&key))));
    });

    let rc2 = Rc2::new(&[0x33; 16], 64).expect("key");
    group.bench_function("rc2_decrypt", |b| {
        b.iter(|| black_box(rc2.decrypt_block(black_box(&[0u8; 8]))));
    });

    group.finish();
}

fn bench_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("modes");
    let aes = Aes::new(&bytes::to_bits(&[0x44; 16])).expect("key");
    let iv = bytes::to_bits(&[0x55; 16]);
    let pt = bytes::to_bits(&vec![0x66; 4096]);

    group.throughput(Throughput::Bytes(4096));
    for mode in Mode::ALL {
        group.bench_with_input(BenchmarkId::new("encrypt", mode), &pt, |b, pt| {
            b.iter(|| black_box(mode.encrypt(&aes, black_box(pt), &iv, &BitArray::new(), 128)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_block, bench_modes);
criterion_main!(benches);
