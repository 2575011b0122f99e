//! Relationship Tests
//!
//! Both sides of every declared relationship stay in sync after assignment.

use jsonclass_core::prelude::*;
use jsonclass_test_utils::{graph, linked_schema};
use serde_json::json;

fn ids(graph: &Graph, id: ObjectId, field: &str) -> Vec<ObjectId> {
    graph.get(id, field).unwrap().object_ids()
}

#[test]
fn test_one_to_one_assign_and_clear() {
    let mut g = graph(linked_schema());
    let user = g.create("User", json!({"name": "Kat"})).unwrap();
    let profile = g.create("Profile", json!({"bio": "hi"})).unwrap();

    g.assign(user, "profile", profile).unwrap();
    assert_eq!(g.get(profile, "user").unwrap(), Value::Object(user));

    g.assign(profile, "user", Value::Null).unwrap();
    assert_eq!(g.get(user, "profile").unwrap(), Value::Null);
    assert_eq!(g.detached(profile, "user").unwrap(), &[user]);
    assert_eq!(g.detached(user, "profile").unwrap(), &[profile]);
}

#[test]
fn test_one_to_one_steals_from_previous_holder() {
    let mut g = graph(linked_schema());
    let a = g.create("User", json!({"name": "a"})).unwrap();
    let b = g.create("User", json!({"name": "b"})).unwrap();
    let profile = g.create("Profile", json!({})).unwrap();

    g.assign(a, "profile", profile).unwrap();
    g.assign(b, "profile", profile).unwrap();

    assert_eq!(g.get(profile, "user").unwrap(), Value::Object(b));
    assert_eq!(g.get(a, "profile").unwrap(), Value::Null);
    assert_eq!(g.detached(a, "profile").unwrap(), &[profile]);
}

#[test]
fn test_one_to_many_from_list_side() {
    let mut g = graph(linked_schema());
    let user = g.create("User", json!({"name": "Kat"})).unwrap();
    let first = g.create("Article", json!({"title": "one"})).unwrap();
    let second = g.create("Article", json!({"title": "two"})).unwrap();

    g.extend(user, "articles", [first, second]).unwrap();
    assert_eq!(g.get(first, "author").unwrap(), Value::Object(user));
    assert_eq!(g.get(second, "author").unwrap(), Value::Object(user));

    g.assign(user, "articles", Vec::<ObjectId>::new()).unwrap();
    assert_eq!(g.get(first, "author").unwrap(), Value::Null);
    assert_eq!(g.get(second, "author").unwrap(), Value::Null);
    assert_eq!(g.detached(user, "articles").unwrap(), &[first, second]);
}

#[test]
fn test_one_to_many_from_single_side() {
    let mut g = graph(linked_schema());
    let user = g.create("User", json!({"name": "Kat"})).unwrap();
    let article = g.create("Article", json!({"title": "one"})).unwrap();

    g.assign(article, "author", user).unwrap();
    assert_eq!(ids(&g, user, "articles"), vec![article]);

    g.assign(article, "author", user).unwrap();
    assert_eq!(ids(&g, user, "articles"), vec![article]);
}

#[test]
fn test_many_to_many_symmetry() {
    let mut g = graph(linked_schema());
    let c1 = g.create("Customer", json!({"name": "c1"})).unwrap();
    let c2 = g.create("Customer", json!({"name": "c2"})).unwrap();
    let p1 = g.create("Product", json!({"name": "p1"})).unwrap();
    let p2 = g.create("Product", json!({"name": "p2"})).unwrap();

    g.extend(c1, "products", [p1, p2]).unwrap();
    g.extend(c2, "products", [p1]).unwrap();
    assert_eq!(ids(&g, p1, "customers"), vec![c1, c2]);
    assert_eq!(ids(&g, p2, "customers"), vec![c1]);

    g.extend(c2, "products", [p1]).unwrap();
    assert_eq!(ids(&g, c2, "products"), vec![p1]);

    g.assign(c1, "products", vec![p2]).unwrap();
    assert_eq!(ids(&g, p1, "customers"), vec![c2]);
    assert_eq!(ids(&g, p2, "customers"), vec![c1]);
    assert_eq!(g.detached(c1, "products").unwrap(), &[p1]);
    assert_eq!(g.detached(p1, "customers").unwrap(), &[c1]);
}

#[test]
fn test_detachment_resets_on_next_assignment() {
    let mut g = graph(linked_schema());
    let user = g.create("User", json!({"name": "Kat"})).unwrap();
    let article = g.create("Article", json!({"title": "one"})).unwrap();
    g.extend(user, "articles", [article]).unwrap();
    g.assign(user, "articles", Vec::<ObjectId>::new()).unwrap();
    assert_eq!(g.detached(user, "articles").unwrap().len(), 1);

    g.extend(user, "articles", [article]).unwrap();
    assert!(g.detached(user, "articles").unwrap().is_empty());
}

#[test]
fn test_nested_input_links_and_dedups_by_primary_key() {
    let mut g = graph(linked_schema());
    let user = g
        .create(
            "User",
            json!({
                "id": "u1",
                "name": "Kat",
                "articles": [
                    {"id": "a1", "title": "one"},
                    {"id": "a2", "title": "two", "author": {"id": "u1"}}
                ]
            }),
        )
        .unwrap();
    let articles = ids(&g, user, "articles");
    assert_eq!(articles.len(), 2);
    for article in articles {
        assert_eq!(g.get(article, "author").unwrap(), Value::Object(user));
    }
    assert!(g.validate(user).is_ok());
}

#[test]
fn test_reference_keys_in_output() {
    let mut g = graph(linked_schema());
    let user = g
        .create(
            "User",
            json!({"id": "u1", "name": "Kat", "articles": [{"id": "a1", "title": "one"}]}),
        )
        .unwrap();
    let output = g.to_json(user).unwrap();
    let article = &output["articles"][0];
    assert_eq!(article["authorId"], json!("u1"));
    assert_eq!(article["author"]["name"], json!("Kat"));
    assert!(article["author"].get("articles").is_none());
}

#[test]
fn test_linked_list_keeps_non_object_items_for_validation() {
    let mut g = graph(linked_schema());
    let user = g
        .create("User", json!({"name": "Kat", "articles": [5, null, "x"]}))
        .unwrap();
    assert_eq!(
        g.get(user, "articles").unwrap(),
        Value::from(json!([5, null, "x"]))
    );
    let err = g.validate(user).unwrap_err();
    assert_eq!(
        err.as_validation().unwrap().get("articles.0"),
        Some("Value at 'articles.0' should be instance of 'Article'.")
    );
}

#[test]
fn test_linked_single_field_keeps_non_object_value() {
    let mut g = graph(linked_schema());
    let user = g.create("User", json!({"name": "Kat", "profile": 5})).unwrap();
    assert_eq!(g.get(user, "profile").unwrap(), Value::Int(5));
    let err = g.validate(user).unwrap_err();
    assert!(err.as_validation().unwrap().get("profile").is_some());
}
