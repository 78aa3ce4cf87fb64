// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Validator rule tests.

use super::*;
use crate::config::{TIMESTAMP_FRAC, TIMESTAMP_SEC, TIMESTAMP_TID};
use crate::schema::{
    AccessLevel, ChoiceDescriptor, Configurable, LeafDescriptor, ListDescriptor, NodeDescriptor,
    SchemaBuilder, SlotDescriptor, TableDescriptor,
};
use crate::types::Value;
use crate::ErrorCode;

struct Limits;

impl Configurable for Limits {
    const CLASS_ID: &'static str = "Limits";

    fn expected_parameters(s: SchemaBuilder) -> SchemaBuilder {
        s.add(LeafDescriptor::double("lower").reconfigurable().default_value(0.0))
            .add(LeafDescriptor::double("upper").reconfigurable().default_value(10.0))
    }
}

struct Motor;

impl Configurable for Motor {
    const CLASS_ID: &'static str = "Motor";

    fn expected_parameters(s: SchemaBuilder) -> SchemaBuilder {
        s.add(LeafDescriptor::string("deviceId").assignment_mandatory())
            .add(LeafDescriptor::string("state").read_only().default_value("OFF"))
            .add(
                LeafDescriptor::int32("speed")
                    .reconfigurable()
                    .min_inc(0)
                    .max_inc(100)
                    .default_value(10)
                    .allowed_states(["ON", "STOPPED"]),
            )
            .add(
                LeafDescriptor::string("mode")
                    .reconfigurable()
                    .options("fast,slow")
                    .default_value("slow"),
            )
            .add(LeafDescriptor::uint16("port").default_value(4000u16))
            .add(
                LeafDescriptor::int32("calibration")
                    .reconfigurable()
                    .required_access_level(AccessLevel::Expert)
                    .default_value(0),
            )
            .add(LeafDescriptor::int32("heartbeats").assignment_internal().default_value(0))
            .add(NodeDescriptor::of::<Limits>("limits"))
            .add(SlotDescriptor::new("stop"))
    }
}

fn motor() -> Schema {
    Motor::class_schema().expect("motor schema")
}

fn speed_only() -> Schema {
    SchemaBuilder::new("Motor")
        .add(
            LeafDescriptor::int32("speed")
                .reconfigurable()
                .min_inc(0)
                .max_inc(100)
                .default_value(10),
        )
        .build()
        .expect("schema")
}

fn input(entries: &[(&str, Value)]) -> Hash {
    let mut hash = Hash::new();
    for (path, value) in entries {
        hash.set(path, value.clone()).expect("set");
    }
    hash
}

fn codes(report: &Report) -> Vec<(String, ErrorCode)> {
    report
        .errors()
        .map(|r| (r.path.clone(), r.code))
        .collect()
}

fn one_error(report: &Report) -> (String, ErrorCode) {
    let errors = codes(report);
    assert_eq!(errors.len(), 1, "{report}");
    errors[0].clone()
}

#[test]
fn test_happy_path() {
    let ctx = Context::new(1).with_state("ON");
    let out = Validator::new(ValidationRules {
        inject_defaults: false,
        ..ValidationRules::default()
    })
    .validate(&speed_only(), &input(&[("speed", Value::Int32(50))]), &ctx)
    .expect("valid");

    assert_eq!(out.config, input(&[("speed", Value::Int32(50))]));
    assert!(out.report.is_empty());
    assert!(out.has_reconfigurable);
}

#[test]
fn test_out_of_range_is_one_error() {
    let report = Validator::default()
        .validate(
            &speed_only(),
            &input(&[("speed", Value::Int32(150))]),
            &Context::new(1).with_state("ON"),
        )
        .unwrap_err();
    assert_eq!(one_error(&report), ("speed".to_string(), ErrorCode::OutOfRange));
}

#[test]
fn test_defaults_injected_in_schema_order() {
    let out = Validator::default()
        .validate(&motor(), &input(&[("deviceId", "m1".into())]), &Context::new(1))
        .expect("valid");
    let keys: Vec<_> = out.config.keys().collect();
    assert_eq!(
        keys,
        ["deviceId", "state", "speed", "mode", "port", "calibration", "heartbeats", "limits"]
    );
    assert_eq!(out.config.get::<i32>("speed").unwrap(), 10);
    assert_eq!(out.config.get::<f64>("limits.upper").unwrap(), 10.0);
    assert!(!out.has_reconfigurable);
}

#[test]
fn test_values_converted_exactly() {
    let v = Validator::default();
    let ctx = Context::new(1);
    let out = v
        .validate(
            &motor(),
            &input(&[("deviceId", "m1".into()), ("port", Value::Int64(8080))]),
            &ctx,
        )
        .expect("valid");
    assert_eq!(out.config.get_value("port").unwrap(), &Value::Uint16(8080));

    // lossy conversions are refused
    let report = v
        .validate(
            &motor(),
            &input(&[("deviceId", "m1".into()), ("port", Value::Int32(-1))]),
            &ctx,
        )
        .unwrap_err();
    assert_eq!(one_error(&report), ("port".to_string(), ErrorCode::KindMismatch));

    let report = v
        .validate(
            &motor(),
            &input(&[("deviceId", "m1".into()), ("speed", "fast".into())]),
            &ctx,
        )
        .unwrap_err();
    assert_eq!(one_error(&report).1, ErrorCode::KindMismatch);
}

#[test]
fn test_options_enforced() {
    let v = Validator::default();
    let ctx = Context::new(1);
    assert!(v
        .validate(&motor(), &input(&[("deviceId", "m".into()), ("mode", "fast".into())]), &ctx)
        .is_ok());
    let report = v
        .validate(&motor(), &input(&[("deviceId", "m".into()), ("mode", "warp".into())]), &ctx)
        .unwrap_err();
    assert_eq!(one_error(&report), ("mode".to_string(), ErrorCode::NotInOptions));
}

#[test]
fn test_missing_mandatory() {
    let report = Validator::default()
        .validate(&motor(), &Hash::new(), &Context::new(1))
        .unwrap_err();
    assert_eq!(
        one_error(&report),
        ("deviceId".to_string(), ErrorCode::MissingMandatory)
    );

    let rules = ValidationRules {
        allow_missing_keys: true,
        ..ValidationRules::default()
    };
    assert!(Validator::new(rules)
        .validate(&motor(), &Hash::new(), &Context::new(1))
        .is_ok());
}

#[test]
fn test_unknown_keys() {
    let given = input(&[("deviceId", "m".into()), ("colour", "red".into()), ("limits.middle", Value::Double(5.0))]);

    let report = Validator::default()
        .validate(&motor(), &given, &Context::new(1))
        .unwrap_err();
    assert_eq!(
        codes(&report),
        [
            ("limits.middle".to_string(), ErrorCode::UnknownKey),
            ("colour".to_string(), ErrorCode::UnknownKey)
        ]
    );

    let out = Validator::default()
        .validate(&motor(), &given, &Context::new(1).with_strict(false))
        .expect("lenient");
    assert_eq!(out.report.warnings().count(), 2);
    assert!(!out.config.has("colour"));
    assert!(!out.config.has("limits.middle"));
}

#[test]
fn test_read_only_and_internal() {
    let v = Validator::default();
    let ctx = Context::new(4);
    let report = v
        .validate(&motor(), &input(&[("deviceId", "m".into()), ("state", "ON".into())]), &ctx)
        .unwrap_err();
    assert_eq!(one_error(&report), ("state".to_string(), ErrorCode::WriteToReadOnly));

    let report = v
        .validate(
            &motor(),
            &input(&[("deviceId", "m".into()), ("heartbeats", Value::Int32(3))]),
            &ctx,
        )
        .unwrap_err();
    assert_eq!(
        one_error(&report),
        ("heartbeats".to_string(), ErrorCode::WriteToReadOnly)
    );

    // the device publishes its own read-only values
    let out = v
        .validate(
            &motor(),
            &input(&[("deviceId", "m".into()), ("state", "ON".into()), ("heartbeats", Value::Int32(3))]),
            &ctx.clone().with_origin(Origin::Device),
        )
        .expect("device origin");
    assert_eq!(out.config.get::<String>("state").unwrap(), "ON");
}

#[test]
fn test_access_level() {
    let given = input(&[("deviceId", "m".into()), ("calibration", Value::Int32(7))]);
    let report = Validator::default()
        .validate(&motor(), &given, &Context::new(AccessLevel::Operator.level()))
        .unwrap_err();
    assert_eq!(
        one_error(&report),
        ("calibration".to_string(), ErrorCode::AccessDenied)
    );
    assert!(Validator::default()
        .validate(&motor(), &given, &Context::new(AccessLevel::Expert.level()))
        .is_ok());
}

#[test]
fn test_allowed_states() {
    let given = input(&[("deviceId", "m".into()), ("speed", Value::Int32(20))]);
    let v = Validator::default();
    let report = v
        .validate(&motor(), &given, &Context::new(1).with_state("MOVING"))
        .unwrap_err();
    assert_eq!(one_error(&report), ("speed".to_string(), ErrorCode::StateForbidden));

    assert!(v.validate(&motor(), &given, &Context::new(1).with_state("STOPPED")).is_ok());
    // no state known, nothing to check
    assert!(v.validate(&motor(), &given, &Context::new(1)).is_ok());
}

#[test]
fn test_default_values_pass_access_rules() {
    // the validated output, including injected read-only defaults, validates again
    let given = input(&[
        ("deviceId", "m".into()),
        ("state", "OFF".into()),
        ("calibration", Value::Int32(0)),
    ]);
    assert!(Validator::default()
        .validate(&motor(), &given, &Context::new(1).with_state("MOVING"))
        .is_ok());
}

#[test]
fn test_reconfiguration_preset() {
    let v = Validator::new(ValidationRules::reconfiguration());
    let ctx = Context::new(1).with_state("ON");

    let out = v
        .validate(&motor(), &input(&[("speed", Value::Int32(30))]), &ctx)
        .expect("reconfigure");
    assert_eq!(out.config, input(&[("speed", Value::Int32(30))]));
    assert!(out.has_reconfigurable);

    let report = v
        .validate(&motor(), &input(&[("port", Value::Uint16(1))]), &ctx)
        .unwrap_err();
    assert_eq!(one_error(&report), ("port".to_string(), ErrorCode::WriteToReadOnly));
}

fn guarded() -> Schema {
    SchemaBuilder::new("Guarded")
        .add(
            LeafDescriptor::int32("speed")
                .reconfigurable()
                .required_access_level(AccessLevel::Expert)
                .allowed_states(["OFF"])
                .default_value(10),
        )
        .add(LeafDescriptor::int32("temp").read_only().default_value(0))
        .add(LeafDescriptor::uint16("port").default_value(4000u16))
        .build()
        .expect("guarded schema")
}

#[test]
fn test_reconfiguring_to_default_is_a_write() {
    let v = Validator::new(ValidationRules::reconfiguration());
    let given = input(&[
        ("speed", Value::Int32(10)),
        ("temp", Value::Int32(0)),
        ("port", Value::Uint16(4000)),
    ]);

    let report = v
        .validate(&guarded(), &given, &Context::new(0).with_state("MOVING"))
        .unwrap_err();
    assert_eq!(
        codes(&report),
        [
            ("speed".to_string(), ErrorCode::AccessDenied),
            ("temp".to_string(), ErrorCode::WriteToReadOnly),
            ("port".to_string(), ErrorCode::WriteToReadOnly),
        ]
    );

    let speed = input(&[("speed", Value::Int32(10))]);
    let expert = AccessLevel::Expert.level();
    let report = v
        .validate(&guarded(), &speed, &Context::new(expert).with_state("MOVING"))
        .unwrap_err();
    assert_eq!(one_error(&report), ("speed".to_string(), ErrorCode::StateForbidden));
    assert!(v
        .validate(&guarded(), &speed, &Context::new(expert).with_state("OFF"))
        .is_ok());

    // the device still publishes its own read-only values
    let temp = input(&[("temp", Value::Int32(0))]);
    assert!(v
        .validate(&guarded(), &temp, &Context::new(0).with_origin(Origin::Device))
        .is_ok());
}

#[test]
fn test_rooted_input() {
    let mut rooted = Hash::new();
    rooted
        .set("Motor", input(&[("deviceId", "m".into())]))
        .expect("set");
    let out = Validator::default()
        .validate(&motor(), &rooted, &Context::new(1))
        .expect("rooted");
    assert_eq!(out.config.get::<String>("deviceId").unwrap(), "m");

    let rules = ValidationRules {
        allow_unrooted_configuration: false,
        ..ValidationRules::default()
    };
    let v = Validator::new(rules);
    assert!(v.validate(&motor(), &rooted, &Context::new(1)).is_ok());
    let report = v
        .validate(&motor(), &input(&[("deviceId", "m".into())]), &Context::new(1))
        .unwrap_err();
    assert_eq!(one_error(&report), (String::new(), ErrorCode::UnknownKey));
}

#[test]
fn test_nested_node_errors_carry_full_path() {
    let given = input(&[("deviceId", "m".into()), ("limits", "flat".into())]);
    let report = Validator::default()
        .validate(&motor(), &given, &Context::new(1))
        .unwrap_err();
    assert_eq!(one_error(&report), ("limits".to_string(), ErrorCode::KindMismatch));

    let given = input(&[("deviceId", "m".into()), ("limits.upper", "high".into())]);
    let report = Validator::default()
        .validate(&motor(), &given, &Context::new(1))
        .unwrap_err();
    assert_eq!(
        one_error(&report),
        ("limits.upper".to_string(), ErrorCode::KindMismatch)
    );
}

#[test]
fn test_slots_take_no_value() {
    let given = input(&[("deviceId", "m".into()), ("stop", Value::Bool(true))]);
    let report = Validator::default()
        .validate(&motor(), &given, &Context::new(1))
        .unwrap_err();
    assert_eq!(one_error(&report), ("stop".to_string(), ErrorCode::WriteToReadOnly));
}

#[test]
fn test_errors_accumulate() {
    let given = input(&[
        ("speed", Value::Int32(-5)),
        ("mode", "warp".into()),
        ("extra", Value::Bool(true)),
    ]);
    let report = Validator::default()
        .validate(&motor(), &given, &Context::new(1))
        .unwrap_err();
    assert_eq!(
        codes(&report),
        [
            ("deviceId".to_string(), ErrorCode::MissingMandatory),
            ("speed".to_string(), ErrorCode::OutOfRange),
            ("mode".to_string(), ErrorCode::NotInOptions),
            ("extra".to_string(), ErrorCode::UnknownKey),
        ]
    );
}

#[test]
fn test_leaf_reports_every_violation() {
    let schema = SchemaBuilder::new("Gain")
        .add(LeafDescriptor::int32("gain").reconfigurable().max_inc(25).options("10,20,30"))
        .build()
        .expect("schema");
    let report = Validator::default()
        .validate(&schema, &input(&[("gain", Value::Int32(40))]), &Context::new(1))
        .unwrap_err();
    assert_eq!(
        codes(&report),
        [
            ("gain".to_string(), ErrorCode::OutOfRange),
            ("gain".to_string(), ErrorCode::NotInOptions),
        ]
    );
}

#[test]
fn test_timestamps() {
    let t = TimePoint::new(100, 5, 9).expect("t");
    let mut given = input(&[("deviceId", "m".into()), ("speed", Value::Int32(20))]);
    given.set_attribute("speed", TIMESTAMP_SEC, 1u64).expect("attr");
    given.set_attribute("speed", TIMESTAMP_FRAC, 0u64).expect("attr");
    given.set_attribute("speed", TIMESTAMP_TID, 0u64).expect("attr");

    let rules = ValidationRules {
        inject_timestamps: true,
        ..ValidationRules::default()
    };
    let ctx = Context::new(1).with_timestamp(t);
    let out = Validator::new(rules).validate(&motor(), &given, &ctx).expect("valid");
    let stamp = |path: &str| TimePoint::from_attributes(out.config.attributes(path).unwrap()).unwrap();
    assert_eq!(stamp("deviceId"), Some(t));
    assert_eq!(stamp("port"), Some(t));
    // an existing stamp is kept
    assert_eq!(stamp("speed").map(|s| s.sec()), Some(1));

    let forced = ValidationRules {
        force_injected_timestamp: true,
        ..rules
    };
    let out = Validator::new(forced).validate(&motor(), &given, &ctx).expect("valid");
    let speed = TimePoint::from_attributes(out.config.attributes("speed").unwrap()).unwrap();
    assert_eq!(speed, Some(t));

    // without a context timestamp nothing is stamped
    let out = Validator::new(rules)
        .validate(&motor(), &given, &Context::new(1))
        .expect("valid");
    assert!(out.config.attributes("deviceId").unwrap().is_empty());
}

fn equipment() -> Schema {
    let row = SchemaBuilder::new("Row")
        .add(LeafDescriptor::string("name"))
        .add(LeafDescriptor::int32("count").min_inc(0).default_value(1))
        .build()
        .expect("row");
    SchemaBuilder::new("Equipment")
        .add(TableDescriptor::new("rows", row).max_size(2).reconfigurable())
        .add(
            ChoiceDescriptor::new("connection")
                .option(NodeDescriptor::new("Tcp"))
                .option(NodeDescriptor::of::<Limits>("Serial"))
                .default_option("Tcp"),
        )
        .add(LeafDescriptor::string("connection.Tcp.host").default_value("localhost"))
        .add(
            ListDescriptor::new("filters")
                .option_of::<Limits>()
                .option(NodeDescriptor::new("Median"))
                .default_list(["Limits"])
                .max_size(2),
        )
        .build()
        .expect("equipment")
}

fn row(name: &str, count: i64) -> Hash {
    input(&[("name", name.into()), ("count", Value::Int64(count))])
}

#[test]
fn test_table_rows_validated() {
    let v = Validator::default();
    let ctx = Context::new(1);
    let given = input(&[("rows", Value::VectorHash(vec![row("a", 3), input(&[("name", "b".into())])]))]);
    let out = v.validate(&equipment(), &given, &ctx).expect("valid");
    let Value::VectorHash(rows) = out.config.get_value("rows").unwrap() else {
        panic!("rows are a table");
    };
    assert_eq!(rows[0].get_value("count").unwrap(), &Value::Int32(3));
    assert_eq!(rows[1].get::<i32>("count").unwrap(), 1);

    let given = input(&[("rows", Value::VectorHash(vec![row("a", -1)]))]);
    let report = v.validate(&equipment(), &given, &ctx).unwrap_err();
    assert_eq!(one_error(&report), ("rows[0].count".to_string(), ErrorCode::OutOfRange));

    let given = input(&[("rows", Value::VectorHash(vec![row("a", 1); 3]))]);
    let report = v.validate(&equipment(), &given, &ctx).unwrap_err();
    assert_eq!(one_error(&report), ("rows".to_string(), ErrorCode::OutOfRange));
}

#[test]
fn test_choice() {
    let v = Validator::default();
    let ctx = Context::new(1);

    let out = v.validate(&equipment(), &Hash::new(), &ctx).expect("defaults");
    assert_eq!(out.config.get::<String>("connection.Tcp.host").unwrap(), "localhost");
    assert_eq!(out.config.get_hash("connection").unwrap().len(), 1);

    let out = v
        .validate(&equipment(), &input(&[("connection", "Serial".into())]), &ctx)
        .expect("by name");
    assert_eq!(out.config.get::<f64>("connection.Serial.upper").unwrap(), 10.0);

    let out = v
        .validate(
            &equipment(),
            &input(&[("connection.Serial.upper", Value::Double(3.0))]),
            &ctx,
        )
        .expect("by node");
    assert_eq!(out.config.get::<f64>("connection.Serial.upper").unwrap(), 3.0);

    let report = v
        .validate(&equipment(), &input(&[("connection", "Usb".into())]), &ctx)
        .unwrap_err();
    assert_eq!(one_error(&report), ("connection".to_string(), ErrorCode::NotInOptions));

    let mut two = Hash::new();
    two.set("connection.Tcp.host", "h").expect("set");
    two.set("connection.Serial.upper", 1.0).expect("set");
    let report = v.validate(&equipment(), &two, &ctx).unwrap_err();
    assert_eq!(one_error(&report), ("connection".to_string(), ErrorCode::NotInOptions));
}

#[test]
fn test_list() {
    let v = Validator::default();
    let ctx = Context::new(1);

    let out = v.validate(&equipment(), &Hash::new(), &ctx).expect("defaults");
    let Value::VectorHash(entries) = out.config.get_value("filters").unwrap() else {
        panic!("list of nodes");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].get::<f64>("Limits.lower").unwrap(), 0.0);

    let mut limits = Hash::new();
    limits.set("Limits.upper", 2.0).expect("set");
    let given = input(&[(
        "filters",
        Value::VectorHash(vec![input(&[("Median", Hash::new().into())]), limits]),
    )]);
    let out = v.validate(&equipment(), &given, &ctx).expect("rows");
    let Value::VectorHash(entries) = out.config.get_value("filters").unwrap() else {
        panic!("list of nodes");
    };
    assert!(entries[0].has("Median"));
    assert_eq!(entries[1].get::<f64>("Limits.upper").unwrap(), 2.0);

    let given = input(&[("filters", vec!["Limits".to_string(), "Mean".to_string()].into())]);
    let report = v.validate(&equipment(), &given, &ctx).unwrap_err();
    assert_eq!(one_error(&report), ("filters[1]".to_string(), ErrorCode::NotInOptions));

    let given = input(&[("filters", vec!["Median".to_string(); 3].into())]);
    let report = v.validate(&equipment(), &given, &ctx).unwrap_err();
    assert_eq!(one_error(&report), ("filters".to_string(), ErrorCode::OutOfRange));
}

#[test]
fn test_idempotent() {
    let ctx = Context::new(1).with_timestamp(TimePoint::new(7, 0, 1).expect("t"));
    let rules = ValidationRules {
        inject_timestamps: true,
        ..ValidationRules::default()
    };
    let v = Validator::new(rules);

    for (schema, given) in [
        (motor(), input(&[("deviceId", "m".into()), ("speed", Value::Int64(42))])),
        (equipment(), input(&[("connection", "Serial".into()), ("rows", Value::VectorHash(vec![row("x", 2)]))])),
    ] {
        let first = v.validate(&schema, &given, &ctx).expect("first");
        let second = v.validate(&schema, &first.config, &ctx).expect("second");
        assert_eq!(first.config, second.config);
    }
}

#[test]
fn test_output_independent_of_input() {
    let mut given = input(&[("deviceId", "m".into())]);
    let out = Validator::default()
        .validate(&motor(), &given, &Context::new(1))
        .expect("valid");
    given.set("deviceId", "changed").expect("set");
    assert_eq!(out.config.get::<String>("deviceId").unwrap(), "m");
}
