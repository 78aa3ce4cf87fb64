// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::cast_possible_truncation)] // Test parameters
#![allow(clippy::cast_precision_loss)] // Random test data
#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Randomized checks of the container laws: codec round-trips, insertion
//! order, path composition, flattening and validator stability.

use karabo_data::schema::{
    ChoiceDescriptor, LeafDescriptor, ListDescriptor, NodeDescriptor, TableDescriptor,
};
use karabo_data::{
    BinaryCodec, Context, Hash, NdArray, Schema, SchemaBuilder, ValidationRules, Validator, Value,
    XmlCodec,
};
use num_complex::Complex64;

const CASES: usize = 64;

/// Seeded generator of arbitrary containers.
struct Gen {
    rng: fastrand::Rng,
}

impl Gen {
    fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    fn key(&mut self) -> String {
        let len = self.rng.usize(1..8);
        let mut key: String = (0..len).map(|_| self.rng.alphabetic()).collect();
        match self.rng.u8(0..10) {
            // not a valid XML name
            0 => key.insert(0, '7'),
            1 => key.push('-'),
            _ => {}
        }
        key
    }

    fn text(&mut self) -> String {
        const ALPHABET: &[&str] = &["a", "Z", "é", " ", ",", "<", "&", "\"", "\n", "ß", "9"];
        let len = self.rng.usize(0..12);
        (0..len)
            .map(|_| ALPHABET[self.rng.usize(..ALPHABET.len())])
            .collect()
    }

    fn double(&mut self) -> f64 {
        (self.rng.f64() - 0.5) * 10f64.powi(self.rng.i32(-8..12))
    }

    fn scalar(&mut self) -> Value {
        match self.rng.u8(0..14) {
            0 => Value::Bool(self.rng.bool()),
            1 => Value::Int8(self.rng.i8(..)),
            2 => Value::Uint16(self.rng.u16(..)),
            3 => Value::Int32(self.rng.i32(..)),
            4 => Value::Uint32(self.rng.u32(..)),
            5 => Value::Int64(self.rng.i64(..)),
            6 => Value::Uint64(self.rng.u64(..)),
            7 => Value::Float(self.double() as f32),
            8 => Value::Double(self.double()),
            9 => Value::ComplexDouble(Complex64::new(self.double(), self.double())),
            10 => Value::String(self.text()),
            11 => Value::Bytes((0..self.rng.usize(0..16)).map(|_| self.rng.u8(..)).collect()),
            12 => Value::None,
            _ => Value::Char(self.rng.u8(..)),
        }
    }

    fn vector(&mut self) -> Value {
        let len = self.rng.usize(0..6);
        match self.rng.u8(0..6) {
            0 => Value::VectorBool((0..len).map(|_| self.rng.bool()).collect()),
            1 => Value::VectorInt32((0..len).map(|_| self.rng.i32(..)).collect()),
            2 => Value::VectorUint64((0..len).map(|_| self.rng.u64(..)).collect()),
            3 => Value::VectorDouble((0..len).map(|_| self.double()).collect()),
            4 => Value::VectorString((0..len).map(|_| self.text()).collect()),
            _ => {
                let data: Vec<i16> = (0..len * 2).map(|_| self.rng.i16(..)).collect();
                match NdArray::from_slice(vec![len as u64, 2], &data) {
                    Ok(array) => Value::NdArray(array),
                    Err(e) => panic!("array: {e}"),
                }
            }
        }
    }

    fn attributes(&mut self, hash: &mut Hash, key: &str) {
        for _ in 0..self.rng.usize(0..3) {
            // attribute names must stay XML names
            let name: String = (0..self.rng.usize(1..6)).map(|_| self.rng.alphabetic()).collect();
            let value = match self.rng.u8(0..3) {
                0 => Value::Int32(self.rng.i32(..)),
                1 => Value::String(self.text()),
                _ => Value::VectorDouble(vec![self.double(); self.rng.usize(0..3)]),
            };
            hash.set_attribute(key, &name, value).expect("attribute");
        }
    }

    fn hash(&mut self, depth: usize) -> Hash {
        let mut hash = Hash::new();
        for _ in 0..self.rng.usize(0..6) {
            let key = self.key();
            let value = match self.rng.u8(0..10) {
                0 | 1 if depth > 0 => Value::Hash(self.hash(depth - 1)),
                2 if depth > 0 => {
                    Value::VectorHash((0..self.rng.usize(0..3)).map(|_| self.hash(depth - 1)).collect())
                }
                3 | 4 => self.vector(),
                _ => self.scalar(),
            };
            hash.set(&key, value).expect("set");
            self.attributes(&mut hash, &key);
        }
        hash
    }
}

#[test]
fn binary_round_trip() {
    let codec = BinaryCodec::default();
    for seed in 0..CASES as u64 {
        let c = Gen::new(seed).hash(3);
        let bytes = codec.encode(&c).expect("encode");
        assert_eq!(codec.decode(&bytes).expect("decode"), c, "seed {seed}");
    }
}

#[test]
fn xml_round_trip() {
    let codec = XmlCodec::default();
    for seed in 0..CASES as u64 {
        let c = Gen::new(seed).hash(3);
        let text = codec.encode(&c).expect("encode");
        let back = codec.decode(&text).expect("decode");
        assert_eq!(back, c, "seed {seed}\n{text}");
    }
}

#[test]
fn insertion_order_preserved() {
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..CASES {
        let mut c = Hash::new();
        let mut first_seen: Vec<String> = Vec::new();
        for _ in 0..rng.usize(1..20) {
            // small alphabet so keys repeat
            let key = ((b'a' + rng.u8(0..8)) as char).to_string();
            c.set(&key, rng.i32(..)).expect("set");
            if !first_seen.contains(&key) {
                first_seen.push(key);
            }
        }
        let keys: Vec<_> = c.keys().collect();
        assert_eq!(keys, first_seen);
    }
}

#[test]
fn path_composition() {
    let mut c = Hash::new();
    c.set("a.b.c", 1i32).expect("set");
    c.set("a.b.d.e", "deep").expect("set");
    c.set("t[1].x", 2.5f64).expect("table");
    for (prefix, rest) in [("a.b", "c"), ("a", "b.d.e"), ("a.b.d", "e"), ("t[1]", "x")] {
        let whole = c.get_value(&format!("{prefix}.{rest}")).expect("whole");
        let part = c.get_hash(prefix).expect("prefix").get_value(rest).expect("rest");
        assert_eq!(whole, part, "{prefix}.{rest}");
    }
}

#[test]
fn flatten_inverse() {
    for seed in 0..CASES as u64 {
        let c = Gen::new(seed).hash(3);
        assert_eq!(c.flatten().unflatten().expect("unflatten"), c, "seed {seed}");
    }
}

fn sample_schema() -> Schema {
    let row = SchemaBuilder::new("Row")
        .add(LeafDescriptor::string("name").default_value("n"))
        .add(LeafDescriptor::double("gain").min_exc(0.0).default_value(1.0))
        .build()
        .expect("row");
    SchemaBuilder::new("Camera")
        .add(LeafDescriptor::string("deviceId").default_value("cam"))
        .add(LeafDescriptor::string("state").read_only().default_value("INIT"))
        .add(LeafDescriptor::uint32("exposure").reconfigurable().max_inc(1000u32).default_value(20u32))
        .add(LeafDescriptor::vector_int32("roi").min_size(4).max_size(4).default_value(vec![0i32, 0, 100, 100]))
        .add(NodeDescriptor::new("geometry"))
        .add(LeafDescriptor::double("geometry.pixel").default_value(0.5))
        .add(TableDescriptor::new("channels", row).reconfigurable())
        .add(
            ChoiceDescriptor::new("trigger")
                .option(NodeDescriptor::new("Internal"))
                .option(NodeDescriptor::new("External"))
                .default_option("Internal"),
        )
        .add(LeafDescriptor::double("trigger.Internal.rate").default_value(10.0))
        .add(LeafDescriptor::string("trigger.External.line").default_value("A"))
        .add(
            ListDescriptor::new("plugins")
                .option(NodeDescriptor::new("Rotate"))
                .option(NodeDescriptor::new("Crop"))
                .default_list(["Crop", "Rotate"]),
        )
        .add(LeafDescriptor::int32("plugins.Rotate.angle").default_value(90))
        .build()
        .expect("camera")
}

#[test]
fn validator_idempotent() {
    let schema = sample_schema();
    let v = Validator::default();
    let ctx = Context::new(2).with_state("ON");

    let mut inputs = vec![Hash::new()];
    let mut given = Hash::new();
    given.set("exposure", 500i64).expect("exposure");
    given.set("trigger", "External").expect("trigger");
    given
        .set("channels", vec![Hash::new(), Hash::new()])
        .expect("channels");
    given.set("channels[1].gain", 3i32).expect("gain");
    inputs.push(given);

    for input in inputs {
        let first = v.validate(&schema, &input, &ctx).expect("first pass");
        let second = v.validate(&schema, &first.config, &ctx).expect("second pass");
        assert_eq!(second.config, first.config);
    }
}

#[test]
fn defaults_stable() {
    let schema = sample_schema();
    let v = Validator::new(ValidationRules {
        allow_missing_keys: true,
        ..ValidationRules::default()
    });
    let ctx = Context::new(0);
    let first = v.validate(&schema, &Hash::new(), &ctx).expect("defaults");
    for _ in 0..8 {
        let again = v.validate(&schema, &Hash::new(), &ctx).expect("defaults");
        assert_eq!(again.config, first.config);
    }
    assert_eq!(first.config.get::<u32>("exposure").expect("exposure"), 20);
    assert_eq!(first.config.get::<f64>("trigger.Internal.rate").expect("rate"), 10.0);
    assert!(!first.config.has("channels"));
}
