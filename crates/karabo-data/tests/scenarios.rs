// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::missing_panics_doc)] // Tests panic on failure
#![allow(clippy::too_many_lines)] // Test code

//! End-to-end scenarios: container basics, merging, both wire forms and
//! validation.

use karabo_data::schema::LeafDescriptor;
use karabo_data::{
    BinaryCodec, Context, ErrorCode, Hash, MergePolicy, NdArray, SchemaBuilder, ValidationRules,
    Validator, Value, XmlCodec,
};

fn mixed_payload() -> Hash {
    let mut h = Hash::new();
    h.set("numbers", vec![1i32, -2, 3]).expect("numbers");
    h.set("greeting", "héllo").expect("greeting");
    h.set("nested.x", 1.5f64).expect("nested");
    let array = NdArray::from_slice(vec![2, 3], &[1i16, 2, 3, 4, 5, 6]).expect("array");
    h.set("image", array).expect("image");
    h
}

#[test]
fn simple_set_get() {
    let mut c = Hash::new();
    c.set("a.b.c", 42i32).expect("set");

    assert!(c.has("a.b.c"));
    assert_eq!(c.get::<i32>("a.b.c").expect("get"), 42);
    assert!(c.has("a.b"));

    let root: Vec<_> = c.iter().collect();
    assert_eq!(root.len(), 1);
    assert_eq!(root[0].key(), "a");
    assert!(matches!(root[0].value(), Value::Hash(_)));
    assert!(root[0].attributes().is_empty());
}

#[test]
fn merge_replace() {
    let mut c1 = Hash::new();
    c1.set("a", 1i32).expect("a");
    c1.set("b.c", 2i32).expect("b.c");
    let mut c2 = Hash::new();
    c2.set("a", 3i32).expect("a");
    c2.set("b.d", 4i32).expect("b.d");

    c1.merge(&c2, MergePolicy::Replace).expect("merge");

    let mut expected = Hash::new();
    expected.set("a", 3i32).expect("a");
    expected.set("b.c", 2i32).expect("b.c");
    expected.set("b.d", 4i32).expect("b.d");
    assert_eq!(c1, expected);
}

#[test]
fn binary_round_trip_of_mixed_payload() {
    let codec = BinaryCodec::default();
    let input = mixed_payload();
    let bytes = codec.encode(&input).expect("encode");
    assert_eq!(codec.decode(&bytes).expect("decode"), input);
}

#[test]
fn xml_round_trip_of_mixed_payload() {
    let codec = XmlCodec::default();
    let input = mixed_payload();
    let text = codec.encode(&input).expect("encode");
    assert!(roxmltree::Document::parse(&text).is_ok(), "{text}");

    let back = codec.decode(&text).expect("decode");
    assert_eq!(back, input);
    let x = back.get::<f64>("nested.x").expect("x");
    assert_eq!(x.to_bits(), 1.5f64.to_bits());
}

fn speed_schema() -> karabo_data::Schema {
    SchemaBuilder::new("Motor")
        .add(
            LeafDescriptor::int32("speed")
                .min_inc(0)
                .max_inc(100)
                .default_value(10)
                .reconfigurable(),
        )
        .build()
        .expect("schema")
}

#[test]
fn validator_happy_path() {
    let mut input = Hash::new();
    input.set("speed", 50i32).expect("speed");
    let ctx = Context::new(1).with_strict(true).with_state("ON");

    let validated = Validator::new(ValidationRules::default())
        .validate(&speed_schema(), &input, &ctx)
        .expect("valid");
    assert_eq!(validated.config, input);
    assert!(validated.report.is_ok());
    assert_eq!(validated.report.errors().count(), 0);
}

#[test]
fn validator_rejects_out_of_range() {
    let mut input = Hash::new();
    input.set("speed", 150i32).expect("speed");
    let ctx = Context::new(1).with_state("ON");

    let report = Validator::default()
        .validate(&speed_schema(), &input, &ctx)
        .expect_err("out of range");
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::OutOfRange);
    assert_eq!(errors[0].path, "speed");
}
