//! Benchmarks for bit-array codecs and CRC-32.
//!
//! - base64 encode/decode throughput (the container formats are base64 text)
//! - byte packing into and out of bit arrays
//! - unaligned bit slicing, used when splitting containers into fields
//! - CRC-32 over legacy-sized payloads

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxinote_core::codec::{Base64, bytes};
use oxinote_core::crc::Crc32;
use std::hint::black_box;

/// Standard data sizes for benchmarking
mod data_sizes {
    pub const SMALL: usize = 256; // 256 B, a short note
    pub const MEDIUM: usize = 4 * 1024; // 4 KB
    pub const LARGE: usize = 64 * 1024; // 64 KB
}

fn sample(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed: u64 = 0x0123_4567_89AB_CDEF;
    for _ in 0..size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }
    data
}

const SIZES: [(&str, usize); 3] = [
    ("256B", data_sizes::SMALL),
    ("4KB", data_sizes::MEDIUM),
    ("64KB", data_sizes::LARGE),
];

fn bench_base64(c: &mut Criterion) {
    let mut group = c.benchmark_group("base64");

    for (size_name, size) in SIZES {
        let bits = bytes::to_bits(&sample(size));
        let text = Base64::STANDARD.encode(&bits);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encode", size_name), &bits, |b, bits| {
            b.iter(|| black_box(Base64::STANDARD.encode(black_box(bits))));
        });
        group.bench_with_input(BenchmarkId::new("decode", size_name), &text, |b, text| {
            b.iter(|| black_box(Base64::STANDARD.decode(black_box(text))));
        });
    }

    group.finish();
}

fn bench_bytes(c: &mut Criterion) {
    let mut group = c.benchmark_group("bytes");

    for (size_name, size) in SIZES {
        let data = sample(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("to_bits", size_name), &data, |b, data| {
            b.iter(|| black_box(bytes::to_bits(black_box(data))));
        });
    }

    group.finish();
}

fn bench_unaligned_slice(c: &mut Criterion) {
    let mut group = c.benchmark_group("bit_slice");
    let bits = bytes::to_bits(&sample(data_sizes::MEDIUM));

    group.bench_function("aligned", |b| {
        b.iter(|| black_box(bits.bit_slice(black_box(416), bits.bit_length() - 256)));
    });
    group.bench_function("unaligned", |b| {
        b.iter(|| black_box(bits.bit_slice(black_box(420), bits.bit_length() - 256)));
    });

    group.finish();
}

fn bench_crc32(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32");

    for (size_name, size) in SIZES {
        let data = sample(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_name), &data, |b, data| {
            b.iter(|| black_box(Crc32::compute(black_box(data))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_base64,
    bench_bytes,
    bench_unaligned_slice,
    bench_crc32,
);
criterion_main!(benches);
