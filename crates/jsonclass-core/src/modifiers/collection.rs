//! List and dict fields

use jsonclass_value::keys::{camelize, underscore};
use jsonclass_value::{Dict, Value};

use crate::ctx::Ctx;
use crate::error::{Result, ValidationError};
use crate::fdef::{Fdef, FieldType, Nullability};
use crate::graph::Graph;
use crate::modifier::Modifier;
use crate::types::Types;

/// Output keys are camelized for the owning class
pub(super) fn camelizes(ctx: &Ctx, graph: &Graph) -> bool {
    ctx.cdef_owner.as_ref().map_or_else(
        || graph.schema().config().camelize_json_keys,
        |cdef| cdef.camelize_json_keys(),
    )
}

/// Items default to required unless declared otherwise
fn item_pipeline(item: Types) -> Types {
    if item.fdef().item_nullability == Nullability::Undefined {
        item.required()
    } else {
        item
    }
}

/// List of items sharing one pipeline
#[derive(Debug, Clone)]
pub(crate) struct ListOf {
    item: Types,
}

impl ListOf {
    pub(crate) fn new(item: Types) -> Self {
        Self {
            item: item_pipeline(item),
        }
    }
}

impl Modifier for ListOf {
    fn define(&self, fdef: &mut Fdef) {
        fdef.field_type = FieldType::List;
        fdef.item_types = Some(self.item.clone());
    }

    fn transform(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        let Value::List(items) = &ctx.value else {
            return Ok(ctx.value.clone());
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_ctx = ctx.descend(item.clone(), i)?;
            out.push(self.item.run_transform(&item_ctx, graph)?);
        }
        Ok(Value::List(out))
    }

    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        let Value::List(items) = &ctx.value else {
            return Err(ctx.fail(format!("Value at '{}' should be list.", ctx.keypath_root)));
        };
        let collect = ctx.collect_items();
        let mut errors = ValidationError::new(ctx.root);
        for (i, item) in items.iter().enumerate() {
            let step = ctx
                .descend(item.clone(), i)
                .and_then(|item_ctx| self.item.run_validate(&item_ctx, graph));
            errors.absorb(step, collect)?;
        }
        errors.into_result()
    }

    fn tojson(&self, ctx: &Ctx, graph: &Graph) -> Result<Value> {
        let Value::List(items) = &ctx.value else {
            return Ok(ctx.value.clone());
        };
        items
            .iter()
            .map(|item| self.item.run_tojson(&ctx.with_value(item.clone()), graph))
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }

    fn serialize(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        let Value::List(items) = &ctx.value else {
            self.validate(ctx, graph)?;
            return Ok(ctx.value.clone());
        };
        let collect = ctx.collect_items();
        let mut errors = ValidationError::new(ctx.root);
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let step = ctx
                .descend(item.clone(), i)
                .and_then(|item_ctx| self.item.run_serialize(&item_ctx, graph));
            out.push(errors.absorb(step, collect)?.unwrap_or_else(|| item.clone()));
        }
        errors.into_result()?;
        Ok(Value::List(out))
    }
}

/// Dict of values sharing one pipeline
///
/// Keys are stored underscored and output camelized when the owning class
/// camelizes its keys.
#[derive(Debug, Clone)]
pub(crate) struct DictOf {
    item: Types,
}

impl DictOf {
    pub(crate) fn new(item: Types) -> Self {
        Self {
            item: item_pipeline(item),
        }
    }
}

impl Modifier for DictOf {
    fn define(&self, fdef: &mut Fdef) {
        fdef.field_type = FieldType::Dict;
        fdef.item_types = Some(self.item.clone());
    }

    fn transform(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        let Value::Dict(entries) = &ctx.value else {
            return Ok(ctx.value.clone());
        };
        let camel = camelizes(ctx, graph);
        let mut out = Dict::with_capacity(entries.len());
        for (key, item) in entries {
            let key = if camel { underscore(key) } else { key.clone() };
            let item_ctx = ctx.descend(item.clone(), &key)?;
            let value = self.item.run_transform(&item_ctx, graph)?;
            out.insert(key, value);
        }
        Ok(Value::Dict(out))
    }

    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        let Value::Dict(entries) = &ctx.value else {
            return Err(ctx.fail(format!("Value at '{}' should be dict.", ctx.keypath_root)));
        };
        let collect = ctx.collect_items();
        let mut errors = ValidationError::new(ctx.root);
        for (key, item) in entries {
            let step = ctx
                .descend(item.clone(), key)
                .and_then(|item_ctx| self.item.run_validate(&item_ctx, graph));
            errors.absorb(step, collect)?;
        }
        errors.into_result()
    }

    fn tojson(&self, ctx: &Ctx, graph: &Graph) -> Result<Value> {
        let Value::Dict(entries) = &ctx.value else {
            return Ok(ctx.value.clone());
        };
        let camel = camelizes(ctx, graph);
        let mut out = Dict::with_capacity(entries.len());
        for (key, item) in entries {
            let key = if camel { camelize(key) } else { key.clone() };
            out.insert(key, self.item.run_tojson(&ctx.with_value(item.clone()), graph)?);
        }
        Ok(Value::Dict(out))
    }

    fn serialize(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        let Value::Dict(entries) = &ctx.value else {
            self.validate(ctx, graph)?;
            return Ok(ctx.value.clone());
        };
        let collect = ctx.collect_items();
        let mut errors = ValidationError::new(ctx.root);
        let mut out = Dict::with_capacity(entries.len());
        for (key, item) in entries {
            let step = ctx
                .descend(item.clone(), key)
                .and_then(|item_ctx| self.item.run_serialize(&item_ctx, graph));
            let value = errors.absorb(step, collect)?.unwrap_or_else(|| item.clone());
            out.insert(key.clone(), value);
        }
        errors.into_result()?;
        Ok(Value::Dict(out))
    }
}
