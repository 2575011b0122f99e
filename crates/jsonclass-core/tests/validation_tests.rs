//! Validation Tests
//!
//! Aggregation modes, keypaths, enums and input strictness.

use jsonclass_core::prelude::*;
use jsonclass_core::ValidationError;
use jsonclass_test_utils::{graph, schema_with, validation_schema};
use pretty_assertions::assert_eq;
use serde_json::json;

fn validation_error(result: Result<(), Error>) -> ValidationError {
    match result {
        Err(Error::Validation(e)) => e,
        other => panic!("expected validation error, got {other:?}"),
    }
}

fn bad_input() -> serde_json::Value {
    json!({"title": "ab", "score": 11, "counts": [1, -2, -3], "ratios": {"a": 2.0}})
}

#[test]
fn test_collect_all_reports_every_field() {
    let mut g = graph(validation_schema());
    let id = g.create("Analysis", bad_input()).unwrap();
    let err = validation_error(g.validate(id));
    let keypaths: Vec<_> = err.keypaths().collect();
    assert_eq!(
        keypaths,
        vec!["title", "score", "counts.1", "counts.2", "ratios.a"]
    );
    assert_eq!(err.root(), Some(id));
}

#[test]
fn test_fail_fast_reports_first_failure() {
    let mut g = graph(validation_schema());
    let id = g.create("Report", bad_input()).unwrap();
    let err = validation_error(g.validate(id));
    assert_eq!(err.len(), 1);
    assert_eq!(
        err.get("title"),
        Some("Length of value 'ab' at 'title' should not be less than 3.")
    );
}

#[test]
fn test_pass_option_overrides_class_mode() {
    let mut g = graph(validation_schema());
    let id = g.create("Report", bad_input()).unwrap();
    let err = validation_error(g.validate_with(id, &PassOptions::new().with_all_fields(true)));
    assert_eq!(err.len(), 5);

    let id = g.create("Analysis", bad_input()).unwrap();
    let err = validation_error(g.validate_with(id, &PassOptions::new().with_all_fields(false)));
    assert_eq!(err.len(), 1);
}

#[test]
fn test_valid_input_passes() {
    let mut g = graph(validation_schema());
    let id = g
        .create(
            "Analysis",
            json!({"title": "abc", "score": 3, "counts": [1, 2], "ratios": {"a": 0.5}}),
        )
        .unwrap();
    assert!(g.validate(id).is_ok());
}

#[test]
fn test_hexcolor() {
    let mut g = graph(validation_schema());
    let ok = g.create("Theme", json!({"name": "dark", "color": "#a1b2c3"})).unwrap();
    assert!(g.validate(ok).is_ok());
    let short = g.create("Theme", json!({"name": "dark", "color": "fff"})).unwrap();
    assert!(g.validate(short).is_ok());
    let plain = g.create("Theme", json!({"name": "dark", "color": "01FD6F"})).unwrap();
    assert!(g.validate(plain).is_ok());
    let bad = g.create("Theme", json!({"name": "dark", "color": "ZZZZZZ"})).unwrap();
    let err = validation_error(g.validate(bad));
    assert_eq!(err.keypaths().collect::<Vec<_>>(), vec!["color"]);
}

#[test]
fn test_two_invalid_leaves() {
    let mut g = graph(validation_schema());
    let input = json!({"title": "abc", "counts": [1, -2, 3, -4]});

    let id = g.create("Analysis", input.clone()).unwrap();
    let err = validation_error(g.validate(id));
    assert_eq!(err.keypaths().collect::<Vec<_>>(), vec!["counts.1", "counts.3"]);

    let id = g.create("Report", input).unwrap();
    let err = validation_error(g.validate(id));
    assert_eq!(err.keypaths().collect::<Vec<_>>(), vec!["counts.1"]);
}

#[test]
fn test_enum_round_trip() {
    let mut g = graph(validation_schema());
    let id = g.create("Person", json!({"name": "Kat", "gender": "FEMALE"})).unwrap();
    assert!(g.validate(id).is_ok());
    assert_eq!(g.to_json(id).unwrap(), json!({"name": "Kat", "gender": "FEMALE"}));

    let err = g
        .create("Person", json!({"name": "Kat", "gender": "OTHER"}))
        .unwrap_err();
    assert_eq!(
        err.as_validation().unwrap().get("gender"),
        Some("unknown enum value")
    );
}

fn sized_schema() -> std::sync::Arc<Schema> {
    Schema::builder()
        .enumeration(
            EnumDef::new("Size")
                .with_member("SMALL", 1)
                .with_member("LARGE", 2),
        )
        .class(
            ClassDef::new("ByValue")
                .field("size", types().enumeration("Size").inputvalue().outputvalue()),
        )
        .class(
            ClassDef::new("ByLowercase")
                .field("size", types().enumeration("Size").inputlname().outputlname()),
        )
        .class(
            ClassDef::new("Mixed")
                .field("size", types().enumeration("Size").inputvalue().outputlname()),
        )
        .build()
        .unwrap()
}

#[test]
fn test_enum_value_and_lowercase_modes() {
    let mut g = graph(sized_schema());

    let id = g.create("ByValue", json!({"size": 2})).unwrap();
    assert!(g.validate(id).is_ok());
    assert_eq!(g.to_json(id).unwrap(), json!({"size": 2}));

    let id = g.create("ByLowercase", json!({"size": "small"})).unwrap();
    assert_eq!(g.to_json(id).unwrap(), json!({"size": "small"}));

    let id = g.create("Mixed", json!({"size": 2})).unwrap();
    assert_eq!(g.to_json(id).unwrap(), json!({"size": "large"}));
}

#[test]
fn test_enum_rejects_literals_outside_accepted_mode() {
    let mut g = graph(sized_schema());
    for (class, input) in [
        ("ByValue", json!("LARGE")),
        ("ByValue", json!(3)),
        ("ByLowercase", json!("SMALL")),
        ("ByLowercase", json!(1)),
    ] {
        let err = g.create(class, json!({ "size": input })).unwrap_err();
        let err = err.as_validation().unwrap();
        assert_eq!(err.len(), 1);
        assert_eq!(err.get("size"), Some("unknown enum value"));
    }
}

#[test]
fn test_strict_and_unstrict_input() {
    let mut g = graph(validation_schema());
    let err = g
        .create("Theme", json!({"name": "dark", "color": "fff", "extra": 1}))
        .unwrap_err();
    assert!(err.is_validation());

    let note = g.create("LooseNote", json!({"text": "t", "extra": 1})).unwrap();
    assert_eq!(g.get(note, "text").unwrap(), Value::from("t"));
}

#[test]
fn test_camelization_can_be_disabled() {
    let schema = schema_with(
        SchemaConfig::new().with_camelize_json_keys(false),
        [ClassDef::new("Entry").field("created_by", types().str())],
    );
    let mut g = graph(schema);
    let id = g.create("Entry", json!({"created_by": "x"})).unwrap();
    assert_eq!(g.to_json(id).unwrap(), json!({"created_by": "x"}));
}

#[test]
fn test_nested_keypaths_are_absolute() {
    let schema = schema_with(
        SchemaConfig::new().with_validate_all_fields(true),
        [
            ClassDef::new("Order").field("lines", types().listof(types().instanceof("Line"))),
            ClassDef::new("Line").field("unit_price", types().float().positive().required()),
        ],
    );
    let mut g = graph(schema);
    let id = g
        .create("Order", json!({"lines": [{"unitPrice": 1.5}, {"unitPrice": -1.0}, {}]}))
        .unwrap();
    let err = validation_error(g.validate(id));
    let keypaths: Vec<_> = err.keypaths().collect();
    assert_eq!(keypaths, vec!["lines.1.unitPrice", "lines.2.unitPrice"]);
}
