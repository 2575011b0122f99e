//! Testing utilities for JSON classes workspace
//!
//! Shared fixture schemas and tracing setup.

#![allow(missing_docs)]

use std::sync::{Arc, Once};

use jsonclass_core::{
    types, ClassConfig, ClassDef, EnumDef, Graph, Schema, SchemaBuilder, SchemaConfig, Value,
};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a fmt subscriber once, filtered by `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Users with a profile (one-to-one), authors with articles (one-to-many)
/// and customers with products (many-to-many)
pub fn linked_schema() -> Arc<Schema> {
    Schema::builder()
        .class(
            ClassDef::new("User")
                .field("id", types().str().primary())
                .field("name", types().str().required())
                .field("profile", types().instanceof("Profile").linkedby("user"))
                .field(
                    "articles",
                    types()
                        .listof(types().instanceof("Article"))
                        .linkedby("author")
                        .nonnull(),
                ),
        )
        .class(
            ClassDef::new("Profile")
                .field("id", types().str().primary())
                .field("bio", types().str())
                .field("user", types().instanceof("User").linkto()),
        )
        .class(
            ClassDef::new("Article")
                .field("id", types().str().primary())
                .field("title", types().str().required())
                .field("author", types().instanceof("User").linkto().required()),
        )
        .class(
            ClassDef::new("Customer")
                .field("name", types().str().required())
                .field(
                    "products",
                    types()
                        .listof(types().instanceof("Product"))
                        .linkedthru("customers"),
                ),
        )
        .class(
            ClassDef::new("Product")
                .field("name", types().str().required())
                .field(
                    "customers",
                    types()
                        .listof(types().instanceof("Customer"))
                        .linkedthru("products"),
                ),
        )
        .build()
        .unwrap()
}

/// Classes exercising validation and aggregation
///
/// `Analysis` collects every failure, `Report` stops at the first.
pub fn validation_schema() -> Arc<Schema> {
    let checks = |class: &str| {
        ClassDef::new(class)
            .field("title", types().str().minlength(3).required())
            .field("score", types().int().min(0.0).max(10.0))
            .field("counts", types().listof(types().int().positive()))
            .field("ratios", types().dictof(types().float().max(1.0)))
    };
    Schema::builder()
        .class(
            checks("Analysis")
                .with_config(ClassConfig::new().with_validate_all_fields(true)),
        )
        .class(checks("Report"))
        .class(
            ClassDef::new("Theme")
                .field("name", types().str().required())
                .field("color", types().str().hexcolor().required()),
        )
        .enumeration(
            EnumDef::new("Gender")
                .with_member("MALE", "male")
                .with_member("FEMALE", "female"),
        )
        .class(
            ClassDef::new("Person")
                .field("name", types().str().required())
                .field("gender", types().enumeration("Gender").required()),
        )
        .class(
            ClassDef::new("LooseNote")
                .field("text", types().str())
                .with_config(ClassConfig::new().with_strict_input(false)),
        )
        .build()
        .unwrap()
}

/// Accounts with passwords, update stamps and operator-owned fields
pub fn account_schema() -> Arc<Schema> {
    Schema::builder()
        .class(
            ClassDef::new("Account")
                .field("id", types().str().primary())
                .field("email", types().str().email().required())
                .field("password", types().str().writeonly().salt().required())
                .field("code", types().str().randomdigits(6))
                .field("updated_at", types().datetime().tsupdated())
                .field(
                    "visits",
                    types()
                        .int()
                        .default(0)
                        .setonsave(|v| v.as_i64().map_or(v.clone(), |n| Value::Int(n + 1))),
                )
                .field("owner", types().str().asop(|op| op.clone()).required()),
        )
        .build()
        .unwrap()
}

/// Schema built under a custom configuration
pub fn schema_with(config: SchemaConfig, classes: impl IntoIterator<Item = ClassDef>) -> Arc<Schema> {
    classes
        .into_iter()
        .fold(SchemaBuilder::new(config), |builder, class| builder.class(class))
        .build()
        .unwrap()
}

/// Empty graph over a fixture schema
pub fn graph(schema: Arc<Schema>) -> Graph {
    init_tracing();
    Graph::new(schema)
}
