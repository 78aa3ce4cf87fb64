// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![cfg(feature = "serde")]

//! Settings and reports travel as JSON between tools.

use karabo_data::schema::{AccessLevel, LeafDescriptor};
use karabo_data::validator::{Origin, Severity};
use karabo_data::{
    Context, ErrorCode, Hash, Kind, MergePolicy, Report, SchemaBuilder, TimePoint,
    ValidationRules, Validator, XmlConfig,
};

#[test]
fn rules_and_context_round_trip() {
    let rules = ValidationRules::reconfiguration();
    let json = serde_json::to_string(&rules).expect("rules");
    assert!(json.contains("\"reject_init_only\":true"), "{json}");
    assert_eq!(serde_json::from_str::<ValidationRules>(&json).expect("back"), rules);

    let ctx = Context::new(AccessLevel::Expert.level())
        .with_state("ON")
        .with_origin(Origin::Device)
        .with_timestamp(TimePoint::new(10, 20, 30).expect("t"));
    let json = serde_json::to_string(&ctx).expect("context");
    assert_eq!(serde_json::from_str::<Context>(&json).expect("back"), ctx);
}

#[test]
fn timestamps_checked_on_the_way_in() {
    let t: TimePoint =
        serde_json::from_str(r#"{"sec":5,"frac":999999999999999999,"tid":2}"#).expect("largest fraction");
    assert_eq!(t.frac(), 999_999_999_999_999_999);
    assert_eq!(t.tid(), 2);

    let err = serde_json::from_str::<TimePoint>(r#"{"sec":0,"frac":5000000000000000000,"tid":0}"#)
        .expect_err("fraction of a full second or more");
    assert!(err.to_string().contains("10^18"), "{err}");

    let json = serde_json::to_string(&t).expect("timestamp");
    let back: TimePoint = serde_json::from_str(&json).expect("back");
    assert_eq!((back.sec(), back.frac(), back.tid()), (5, t.frac(), 2));
}

#[test]
fn report_serializes_records() {
    let schema = SchemaBuilder::new("Pump")
        .add(LeafDescriptor::double("pressure").reconfigurable().max_inc(2.0))
        .build()
        .expect("schema");
    let mut input = Hash::new();
    input.set("pressure", 3.0f64).expect("set");
    input.set("colour", "blue").expect("set");

    let report = Validator::default()
        .validate(&schema, &input, &Context::new(1).with_strict(false))
        .expect_err("out of range");
    let value = serde_json::to_value(&report).expect("json");
    let records = value["records"].as_array().expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["code"], "OutOfRange");
    assert_eq!(records[0]["path"], "pressure");
    assert_eq!(records[1]["severity"], "Warning");

    let back: Report = serde_json::from_value(value).expect("back");
    assert_eq!(back, report);
    assert_eq!(back.records()[1].severity, Severity::Warning);
    assert_eq!(back.records()[1].code, ErrorCode::UnknownKey);
}

#[test]
fn plain_settings() {
    assert_eq!(serde_json::to_string(&Kind::VectorHash).expect("kind"), "\"VECTOR_HASH\"");
    assert_eq!(
        serde_json::from_str::<Kind>("\"INT32\"").expect("kind"),
        Kind::Int32
    );
    assert!(serde_json::from_str::<Kind>("\"INT33\"").is_err());

    let policy: MergePolicy = serde_json::from_str("\"Reject\"").expect("policy");
    assert_eq!(policy, MergePolicy::Reject);

    let config = XmlConfig::compact();
    let json = serde_json::to_string(&config).expect("xml config");
    assert_eq!(serde_json::from_str::<XmlConfig>(&json).expect("back"), config);
}
