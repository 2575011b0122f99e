//! Presence validators
//!
//! These run even when the value is null, which is the only case most of
//! them care about.

use jsonclass_value::{Dict, Value};

use crate::ctx::Ctx;
use crate::error::Result;
use crate::fdef::{Fdef, FieldStorage, FieldType, Nullability};
use crate::graph::Graph;
use crate::modifier::Modifier;

/// Name of the field the context belongs to
fn field_name(ctx: &Ctx) -> Option<&str> {
    ctx.keypath_owner.segments().first().map(String::as_str)
}

/// Local key stored on the owner for the current field
fn has_local_key(ctx: &Ctx, graph: &Graph) -> Result<bool> {
    let (Some(owner), Some(field)) = (ctx.owner, field_name(ctx)) else {
        return Ok(false);
    };
    Ok(graph
        .object(owner)?
        .local_key(field)
        .is_some_and(|key| !key.is_null()))
}

/// Sibling field value, null without an owner
fn sibling(ctx: &Ctx, graph: &Graph, key: &str) -> Result<Value> {
    match ctx.owner {
        Some(owner) => graph.get(owner, key),
        None => Ok(Value::Null),
    }
}

/// Value must not be null
#[derive(Debug, Clone, Copy)]
pub(crate) struct Required;

impl Modifier for Required {
    fn define(&self, fdef: &mut Fdef) {
        fdef.item_nullability = Nullability::Required;
    }

    fn checks_presence(&self) -> bool {
        true
    }

    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        if !ctx.value.is_null() {
            return Ok(());
        }
        let satisfied = match ctx.fdef.storage {
            // the other side holds the key
            FieldStorage::ForeignKey => true,
            FieldStorage::LocalKey => has_local_key(ctx, graph)?,
            FieldStorage::Embedded | FieldStorage::Temp => false,
        };
        if satisfied {
            Ok(())
        } else {
            Err(ctx.fail(format!("Value at '{}' should not be None.", ctx.keypath_root)))
        }
    }
}

/// Value must be present, reference lists must not be empty
#[derive(Debug, Clone, Copy)]
pub(crate) struct Present;

impl Modifier for Present {
    fn checks_presence(&self) -> bool {
        true
    }

    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        let present = match &ctx.value {
            Value::Null => {
                ctx.fdef.storage == FieldStorage::LocalKey && has_local_key(ctx, graph)?
            }
            Value::List(items) if ctx.fdef.is_reference() => !items.is_empty(),
            _ => true,
        };
        if present {
            Ok(())
        } else {
            Err(ctx.fail(format!("Value at '{}' should be present.", ctx.keypath_root)))
        }
    }
}

/// Value required whenever a sibling field is set
#[derive(Debug, Clone)]
pub(crate) struct PresentWith {
    key: String,
}

impl PresentWith {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Modifier for PresentWith {
    fn checks_presence(&self) -> bool {
        true
    }

    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        if !ctx.value.is_null() || sibling(ctx, graph, &self.key)?.is_null() {
            return Ok(());
        }
        Err(ctx.fail(format!(
            "Value at '{}' should be present since it's referring value is presented.",
            ctx.keypath_root
        )))
    }
}

/// Value required whenever every listed sibling field is unset
#[derive(Debug, Clone)]
pub(crate) struct PresentWithout {
    keys: Vec<String>,
}

impl PresentWithout {
    pub(crate) fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }
}

impl Modifier for PresentWithout {
    fn checks_presence(&self) -> bool {
        true
    }

    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        if !ctx.value.is_null() || ctx.owner.is_none() {
            return Ok(());
        }
        for key in &self.keys {
            if !sibling(ctx, graph, key)?.is_null() {
                return Ok(());
            }
        }
        Err(ctx.fail(format!(
            "Value at '{}' should be present since it's referring values are not presented.",
            ctx.keypath_root
        )))
    }
}

/// Any non-null value is rejected
#[derive(Debug, Clone, Copy)]
pub(crate) struct Invalid;

impl Modifier for Invalid {
    fn validate(&self, ctx: &Ctx, _graph: &Graph) -> Result<()> {
        Err(ctx.fail(format!("Value at '{}' is invalid.", ctx.keypath_root)))
    }
}

/// Null collections become empty
#[derive(Debug, Clone, Copy)]
pub(crate) struct Nonnull;

impl Modifier for Nonnull {
    fn define(&self, fdef: &mut Fdef) {
        fdef.collection_nullability = Nullability::Nonnull;
    }

    fn eager(&self) -> bool {
        true
    }

    fn transform(&self, ctx: &Ctx, _graph: &mut Graph) -> Result<Value> {
        if !ctx.value.is_null() {
            return Ok(ctx.value.clone());
        }
        Ok(match ctx.fdef.field_type {
            FieldType::List => Value::List(Vec::new()),
            FieldType::Dict | FieldType::Shape => Value::Dict(Dict::new()),
            _ => Value::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::Graph;
    use crate::schema::{ClassDef, Schema};
    use crate::types::types;
    use serde_json::json;

    fn graph() -> Graph {
        let schema = Schema::builder()
            .class(
                ClassDef::new("Contact")
                    .field("email", types().str())
                    .field("phone", types().str().presentwithout(["email"]))
                    .field("phone_ext", types().str().presentwith("phone"))
                    .field("tags", types().listof(types().str()).nonnull())
                    .field("note", types().str().invalid()),
            )
            .build()
            .unwrap();
        Graph::new(schema)
    }

    fn message(g: &Graph, id: jsonclass_value::ObjectId, keypath: &str) -> Option<String> {
        g.validate(id)
            .err()
            .and_then(|e| e.as_validation().and_then(|v| v.get(keypath)).map(str::to_string))
    }

    #[test]
    fn present_without_siblings() {
        let mut g = graph();
        let id = g.create("Contact", json!({})).unwrap();
        assert_eq!(
            message(&g, id, "phone").as_deref(),
            Some("Value at 'phone' should be present since it's referring values are not presented.")
        );
        let id = g.create("Contact", json!({"email": "a@b.co"})).unwrap();
        assert!(g.validate(id).is_ok());
    }

    #[test]
    fn present_with_sibling() {
        let mut g = graph();
        let id = g.create("Contact", json!({"phone": "123"})).unwrap();
        assert_eq!(
            message(&g, id, "phoneExt").as_deref(),
            Some("Value at 'phoneExt' should be present since it's referring value is presented.")
        );
    }

    #[test]
    fn nonnull_fills_empty_list() {
        let mut g = graph();
        let id = g.create("Contact", json!({"email": "a@b.co"})).unwrap();
        assert_eq!(g.get(id, "tags").unwrap(), jsonclass_value::Value::List(vec![]));
    }

    #[test]
    fn invalid_rejects_any_value() {
        let mut g = graph();
        let id = g.create("Contact", json!({"email": "a@b.co", "note": "x"})).unwrap();
        assert_eq!(
            message(&g, id, "note").as_deref(),
            Some("Value at 'note' is invalid.")
        );
    }
}
