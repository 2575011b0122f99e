//! Fixed-key dicts

use std::sync::Arc;

use indexmap::IndexMap;
use jsonclass_value::keys::{camelize, underscore};
use jsonclass_value::{Dict, Value};

use super::collection::camelizes;
use crate::ctx::Ctx;
use crate::error::{Result, ValidationError};
use crate::fdef::{Fdef, FieldType, Strictness};
use crate::graph::Graph;
use crate::modifier::Modifier;
use crate::types::Types;

/// Dict with one pipeline per declared key
#[derive(Debug, Clone)]
pub(crate) struct Shape {
    keys: Arc<IndexMap<String, Types>>,
}

impl Shape {
    pub(crate) fn new(keys: IndexMap<String, Types>) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    /// Input value for a declared key, looked up raw then camelized
    fn lookup(input: &Dict, key: &str, camel: bool) -> Value {
        input
            .get(key)
            .or_else(|| camel.then(|| input.get(&camelize(key))).flatten())
            .cloned()
            .unwrap_or_default()
    }
}

impl Modifier for Shape {
    fn define(&self, fdef: &mut Fdef) {
        fdef.field_type = FieldType::Shape;
        fdef.shape_types = Some(Arc::clone(&self.keys));
    }

    fn transform(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        let Value::Dict(input) = &ctx.value else {
            return Ok(ctx.value.clone());
        };
        let camel = camelizes(ctx, graph);
        if ctx.fdef.strictness == Strictness::Strict {
            for key in input.keys() {
                let key = if camel { underscore(key) } else { key.clone() };
                if !self.keys.contains_key(&key) {
                    return Err(ctx.fail(format!(
                        "Unallowed key '{key}' at '{}'.",
                        ctx.keypath_root
                    )));
                }
            }
        }
        let mut out = Dict::with_capacity(self.keys.len());
        for (key, types) in self.keys.iter() {
            let raw = Self::lookup(input, key, camel);
            let value = types.run_transform(&ctx.descend(raw, key)?, graph)?;
            out.insert(key.clone(), value);
        }
        Ok(Value::Dict(out))
    }

    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        let Value::Dict(input) = &ctx.value else {
            return Err(ctx.fail(format!("Value at '{}' should be dict.", ctx.keypath_root)));
        };
        let collect = ctx.collect_items();
        let mut errors = ValidationError::new(ctx.root);
        for (key, types) in self.keys.iter() {
            let value = input.get(key).cloned().unwrap_or_default();
            let step = ctx
                .descend(value, key)
                .and_then(|key_ctx| types.run_validate(&key_ctx, graph));
            errors.absorb(step, collect)?;
        }
        errors.into_result()
    }

    fn tojson(&self, ctx: &Ctx, graph: &Graph) -> Result<Value> {
        let Value::Dict(input) = &ctx.value else {
            return Ok(ctx.value.clone());
        };
        let camel = camelizes(ctx, graph);
        let mut out = Dict::with_capacity(self.keys.len());
        for (key, types) in self.keys.iter() {
            let value = input.get(key).cloned().unwrap_or_default();
            let json_key = if camel { camelize(key) } else { key.clone() };
            out.insert(json_key, types.run_tojson(&ctx.with_value(value), graph)?);
        }
        Ok(Value::Dict(out))
    }

    fn serialize(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        let Value::Dict(input) = &ctx.value else {
            self.validate(ctx, graph)?;
            return Ok(ctx.value.clone());
        };
        let collect = ctx.collect_items();
        let mut errors = ValidationError::new(ctx.root);
        let mut out = input.clone();
        for (key, types) in self.keys.iter() {
            let value = input.get(key).cloned().unwrap_or_default();
            let step = ctx
                .descend(value, key)
                .and_then(|key_ctx| types.run_serialize(&key_ctx, graph));
            match errors.absorb(step, collect)? {
                Some(value) if !value.is_null() || out.contains_key(key) => {
                    out.insert(key.clone(), value);
                }
                _ => {}
            }
        }
        errors.into_result()?;
        Ok(Value::Dict(out))
    }
}
