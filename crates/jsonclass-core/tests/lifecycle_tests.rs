//! Lifecycle Tests
//!
//! Save pass, operator assignment, passwords and change tracking.

use jsonclass_core::prelude::*;
use jsonclass_core::verify_password;
use jsonclass_test_utils::{account_schema, graph, schema_with};
use serde_json::json;

fn new_account(g: &mut Graph) -> ObjectId {
    g.create_with(
        "Account",
        json!({"id": "a1", "email": "kat@example.com", "password": "hunter22"}),
        &PassOptions::new().with_fill_blanks(true).with_operator("op-1"),
    )
    .unwrap()
}

#[test]
fn test_operator_fields_are_assigned() {
    let mut g = graph(account_schema());
    let id = new_account(&mut g);
    assert_eq!(g.get(id, "owner").unwrap(), Value::from("op-1"));
    assert!(g.validate(id).is_ok());
}

#[test]
fn test_missing_operator_fails_validation() {
    let mut g = graph(account_schema());
    let id = g
        .create("Account", json!({"email": "kat@example.com", "password": "hunter22"}))
        .unwrap();
    let err = g.validate(id).unwrap_err();
    assert_eq!(
        err.as_validation().unwrap().get("owner"),
        Some("no operator being assigned")
    );
    assert!(matches!(
        g.assign_operator(id, None),
        Err(Error::Unauthorized { .. })
    ));
}

#[test]
fn test_password_is_salted_and_hidden() {
    let mut g = graph(account_schema());
    let id = new_account(&mut g);
    let stored = g.get(id, "password").unwrap();
    let stored = stored.as_str().unwrap();
    assert_ne!(stored, "hunter22");
    assert!(verify_password(stored, "hunter22"));

    let output = g.to_json(id).unwrap();
    assert!(output.get("password").is_none());
    assert_eq!(output["code"].as_str().unwrap().len(), 6);
}

#[test]
fn test_set_on_save_runs_setters() {
    let mut g = graph(account_schema());
    let id = new_account(&mut g);
    assert_eq!(g.get(id, "visits").unwrap(), Value::Int(0));
    let created = g.get(id, "updated_at").unwrap();

    g.set_on_save(id).unwrap();
    assert_eq!(g.get(id, "visits").unwrap(), Value::Int(1));
    assert!(matches!(g.get(id, "updated_at").unwrap(), Value::Datetime(_)));
    assert!(matches!(created, Value::Datetime(_)));

    g.mark_saved(id).unwrap();
    g.set_on_save(id).unwrap();
    assert_eq!(g.get(id, "visits").unwrap(), Value::Int(2));
    assert!(g.modified_fields(id).unwrap().contains(&"visits"));
}

#[test]
fn test_validators_after_setter_only_run_on_save() {
    let schema = schema_with(
        SchemaConfig::new(),
        [ClassDef::new("Counter").field(
            "value",
            types().int().setonsave(|_| Value::Int(-1)).nonnegative(),
        )],
    );
    let mut g = graph(schema);
    let id = g.create("Counter", json!({"value": 3})).unwrap();
    assert!(g.validate(id).is_ok());
    let err = g.set_on_save(id).unwrap_err();
    assert!(err.as_validation().unwrap().get("value").is_some());
}

#[test]
fn test_compare_sees_previous_value() {
    let schema = schema_with(
        SchemaConfig::new(),
        [ClassDef::new("Level").field(
            "rank",
            types()
                .int()
                .compare(|old, new| old.as_i64().unwrap_or(0) <= new.as_i64().unwrap_or(0)),
        )],
    );
    let mut g = graph(schema);
    let id = g.load("Level", json!({"rank": 5})).unwrap();
    g.set(id, json!({"rank": 7})).unwrap();
    assert!(g.validate(id).is_ok());
    g.set(id, json!({"rank": 2})).unwrap();
    assert!(g.validate(id).is_err());
    assert_eq!(g.previous_value(id, "rank").unwrap(), Some(&Value::Int(5)));
}

#[test]
fn test_temp_fields_clear_on_save() {
    let schema = schema_with(
        SchemaConfig::new(),
        [ClassDef::new("Login")
            .field("password", types().str().salt())
            .field("confirm", types().str().temp().checkpw("password"))],
    );
    let mut g = graph(schema);
    let id = g
        .create("Login", json!({"password": "pw1234", "confirm": "pw1234"}))
        .unwrap();
    assert!(g.validate(id).is_ok());
    g.set(id, json!({"confirm": "nope"})).unwrap();
    assert!(g.validate(id).is_err());
    g.mark_saved(id).unwrap();
    assert_eq!(g.get(id, "confirm").unwrap(), Value::Null);
}
