// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::cast_precision_loss)] // Stats/metrics need this
#![allow(clippy::cast_possible_truncation)] // Test parameters
#![allow(clippy::missing_panics_doc)] // Benchmarks panic on failure

//! Codec and validator throughput.
//!
//! Measures:
//! - binary encode/decode of configurations of growing size
//! - XML encode/decode of the same payloads
//! - zero-copy array decoding
//! - validation of a device-sized configuration

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use karabo_data::schema::LeafDescriptor;
use karabo_data::{
    BinaryCodec, Context, DecodeMode, Hash, NdArray, SchemaBuilder, Validator, XmlCodec,
};

// ============================================================================
// Payloads
// ============================================================================

/// A device-like configuration: `blocks` nested nodes of mixed leaves.
fn configuration(blocks: usize) -> Hash {
    let mut h = Hash::new();
    for i in 0..blocks {
        let prefix = format!("block{i}");
        h.set(&format!("{prefix}.deviceId"), format!("SA1/MOTOR/{i}"))
            .expect("id");
        h.set(&format!("{prefix}.speed"), i as i32).expect("speed");
        h.set(&format!("{prefix}.position"), i as f64 * 0.25)
            .expect("position");
        h.set(&format!("{prefix}.enabled"), i % 2 == 0).expect("enabled");
        h.set(&format!("{prefix}.history"), vec![i as f64; 16])
            .expect("history");
        h.set_attribute(&format!("{prefix}.speed"), "unit", "m/s")
            .expect("attr");
    }
    h
}

fn image(side: u64) -> Hash {
    let pixels: Vec<u16> = (0..side * side).map(|p| (p % 4096) as u16).collect();
    let mut h = Hash::new();
    h.set(
        "image",
        NdArray::from_slice(vec![side, side], &pixels).expect("array"),
    )
    .expect("image");
    h
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_binary(c: &mut Criterion) {
    let codec = BinaryCodec::default();
    let mut group = c.benchmark_group("binary");
    for blocks in [1usize, 16, 256] {
        let config = configuration(blocks);
        let encoded = codec.encode(&config).expect("encode");
        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", blocks), &config, |b, config| {
            let mut out = Vec::with_capacity(encoded.len());
            b.iter(|| {
                out.clear();
                codec.encode_into(black_box(config), &mut out).expect("encode");
            });
        });
        group.bench_with_input(BenchmarkId::new("decode", blocks), &encoded, |b, encoded| {
            b.iter(|| codec.decode(black_box(encoded)).expect("decode"));
        });
    }
    group.finish();
}

fn bench_xml(c: &mut Criterion) {
    let codec = XmlCodec::default();
    let mut group = c.benchmark_group("xml");
    for blocks in [1usize, 16, 256] {
        let config = configuration(blocks);
        let encoded = codec.encode(&config).expect("encode");
        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", blocks), &config, |b, config| {
            b.iter(|| codec.encode(black_box(config)).expect("encode"));
        });
        group.bench_with_input(BenchmarkId::new("decode", blocks), &encoded, |b, encoded| {
            b.iter(|| codec.decode(black_box(encoded)).expect("decode"));
        });
    }
    group.finish();
}

fn bench_arrays(c: &mut Criterion) {
    let copying = BinaryCodec::default();
    let borrowing = BinaryCodec::default().with_mode(DecodeMode::Borrowed);
    let mut group = c.benchmark_group("ndarray_decode");
    for side in [64u64, 1024] {
        let encoded = Bytes::from(copying.encode(&image(side)).expect("encode"));
        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::new("copy", side), &encoded, |b, encoded| {
            b.iter(|| copying.decode_bytes(black_box(encoded)).expect("decode"));
        });
        group.bench_with_input(BenchmarkId::new("borrowed", side), &encoded, |b, encoded| {
            b.iter(|| borrowing.decode_bytes(black_box(encoded)).expect("decode"));
        });
    }
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut builder = SchemaBuilder::new("Motor");
    for i in 0..64 {
        builder = builder
            .add(
                LeafDescriptor::int32(format!("speed{i}"))
                    .reconfigurable()
                    .min_inc(0)
                    .max_inc(1000)
                    .default_value(1),
            )
            .add(LeafDescriptor::string(format!("label{i}")).default_value("x"));
    }
    let schema = builder.build().expect("schema");
    let mut input = Hash::new();
    for i in 0..32 {
        input.set(&format!("speed{i}"), i64::from(i)).expect("speed");
    }
    let validator = Validator::default();
    let ctx = Context::new(1);

    c.bench_function("validate_128_parameters", |b| {
        b.iter(|| {
            validator
                .validate(&schema, black_box(&input), &ctx)
                .expect("valid")
        });
    });
}

criterion_group!(benches, bench_binary, bench_xml, bench_arrays, bench_validate);
criterion_main!(benches);
