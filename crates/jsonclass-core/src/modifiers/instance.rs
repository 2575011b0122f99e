//! Nested objects
//!
//! Transform turns input dicts into graph objects, reusing objects already
//! seen under the same primary key in this pass. Validate, tojson and
//! serialize recurse field by field.

use std::sync::Arc;

use jsonclass_value::{Dict, ObjectId, Value};
use tracing::trace;

use crate::cdef::{Cdef, JField};
use crate::ctx::Ctx;
use crate::error::{Result, ValidationError};
use crate::fdef::{Fdef, FieldStorage, FieldType, Nullability, ReadRule, Strictness, WriteRule};
use crate::graph::{Graph, Object};
use crate::modifier::Modifier;

/// Object of a registered class
#[derive(Debug, Clone)]
pub(crate) struct InstanceOf {
    class: String,
}

impl InstanceOf {
    pub(crate) fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }

    fn strict(ctx: &Ctx, cdef: &Cdef) -> bool {
        match ctx.fdef.strictness {
            Strictness::Strict => true,
            Strictness::Unstrict => false,
            Strictness::Undefined => cdef.strict_input(),
        }
    }

    /// Object to write input into, and whether it was found by primary key
    fn destination(ctx: &Ctx, graph: &mut Graph, cdef: &Arc<Cdef>, input: &Dict) -> Result<(ObjectId, bool)> {
        let pk = cdef
            .primary_field()
            .and_then(|field| cdef.input_value(input, field))
            .filter(|pk| !pk.is_null());
        if let Some(dest) = ctx.dest {
            if let Some(pk) = pk {
                ctx.put(cdef.name(), pk, dest);
            }
            return Ok((dest, false));
        }
        if let Some(existing) = pk.and_then(|pk| ctx.fetch(cdef.name(), pk)) {
            trace!(class = cdef.name(), %existing, "lookup hit");
            return Ok((existing, true));
        }
        let dest = graph.alloc(Arc::clone(cdef))?;
        if let Some(pk) = pk {
            ctx.put(cdef.name(), pk, dest);
        }
        Ok((dest, false))
    }

    fn fill_default(ctx: &Ctx, graph: &mut Graph, dest: ObjectId, cdef: &Arc<Cdef>, field: &JField) -> Result<()> {
        if !graph.get(dest, field.name())?.is_null() {
            return Ok(());
        }
        let value = match field.default() {
            Some(value) => value.clone(),
            None => {
                let field_ctx = ctx.for_field(dest, cdef, field, Value::Null)?;
                field.types().run_transform(&field_ctx, graph)?
            }
        };
        graph.assign_field(dest, field.name(), value)
    }

    fn writable(graph: &Graph, dest: ObjectId, field: &JField, raw: &Value) -> Result<bool> {
        Ok(match field.fdef().write_rule {
            WriteRule::Writable => true,
            WriteRule::NoWrite => false,
            WriteRule::WriteOnce => graph.get(dest, field.name())?.is_null(),
            WriteRule::WriteNonnull => !raw.is_null(),
        })
    }
}

impl Modifier for InstanceOf {
    fn define(&self, fdef: &mut Fdef) {
        fdef.field_type = FieldType::Instance;
        fdef.instance_class = Some(self.class.clone());
    }

    fn transform(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        let Value::Dict(input) = &ctx.value else {
            return Ok(ctx.dest.map_or_else(|| ctx.value.clone(), Value::Object));
        };
        let cdef = Arc::clone(graph.schema().cdef(&self.class)?);
        if Self::strict(ctx, &cdef) {
            if let Some(key) = input.keys().find(|key| !cdef.accepts_key(key)) {
                return Err(ctx.fail(format!(
                    "Key '{key}' at '{}' is not allowed.",
                    ctx.keypath_root
                )));
            }
        }
        let (dest, soft) = Self::destination(ctx, graph, &cdef, input)?;

        let mut nonnull_lists = Vec::new();
        for field in cdef.fields() {
            let fdef = field.fdef();
            let Some(raw) = cdef.input_value(input, field) else {
                if fdef.is_reference() {
                    if let Some(key) = cdef.reference_input(input, field) {
                        graph.set_local_key(dest, field.name(), key.clone())?;
                    }
                    if fdef.is_many() && fdef.collection_nullability == Nullability::Nonnull {
                        nonnull_lists.push(field.name());
                    }
                } else if ctx.fill_blanks && !soft {
                    Self::fill_default(ctx, graph, dest, &cdef, field)?;
                }
                continue;
            };
            if !Self::writable(graph, dest, field, raw)? {
                if ctx.fill_blanks {
                    Self::fill_default(ctx, graph, dest, &cdef, field)?;
                }
                continue;
            }
            let field_ctx = ctx.for_field(dest, &cdef, field, raw.clone())?;
            let value = field.types().run_transform(&field_ctx, graph)?;
            graph.assign_field(dest, field.name(), value)?;
        }
        for name in nonnull_lists {
            if graph.get(dest, name)?.is_null() {
                graph.assign_field(dest, name, Value::List(Vec::new()))?;
            }
        }
        Ok(Value::Object(dest))
    }

    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        let Some((id, object)) = ctx
            .value
            .as_object()
            .and_then(|id| graph.object(id).ok().map(|object| (id, object)))
            .filter(|(_, object)| object.class().name() == self.class)
        else {
            return Err(ctx.fail(format!(
                "Value at '{}' should be instance of '{}'.",
                ctx.keypath_root, self.class
            )));
        };
        let cdef = Arc::clone(object.class());
        if let Some(pk) = cdef
            .primary_field()
            .and_then(|field| object.value(field.name()))
            .filter(|pk| !pk.is_null())
        {
            if ctx.fetch(cdef.name(), pk).is_some() {
                return Ok(());
            }
            ctx.put(cdef.name(), pk, id);
        }
        if !ctx.visit(id) {
            return Ok(());
        }

        let modified_only = !object.is_new();
        let collect = ctx.collect_all(&cdef);
        let mut errors = ValidationError::new(ctx.root);
        for field in cdef.fields() {
            if modified_only
                && field.fdef().storage == FieldStorage::Embedded
                && !object.is_modified(field.name())
            {
                continue;
            }
            let value = object.value(field.name()).cloned().unwrap_or_default();
            let step = ctx
                .for_field(id, &cdef, field, value)
                .and_then(|field_ctx| field.types().run_validate(&field_ctx, graph));
            errors.absorb(step, collect)?;
        }
        errors.into_result()
    }

    fn tojson(&self, ctx: &Ctx, graph: &Graph) -> Result<Value> {
        let Some(id) = ctx.value.as_object() else {
            return Ok(ctx.value.clone());
        };
        let object = graph.object(id)?;
        let cdef = object.class();
        let no_refs = ctx.entity_chain.iter().any(|name| name == cdef.name());
        let mut chained = ctx.clone();
        chained.entity_chain.push_back(cdef.name().to_string());

        let mut out = Dict::with_capacity(cdef.fields().len());
        for field in cdef.fields() {
            let fdef = field.fdef();
            if fdef.read_rule == ReadRule::NoRead && !ctx.ignore_writeonly {
                continue;
            }
            let value = object.value(field.name()).cloned().unwrap_or_default();
            if fdef.storage == FieldStorage::LocalKey {
                if let Some(key) = cdef.reference_json_key(field) {
                    let reference = reference_of(graph, object, field, &value)?;
                    if !reference.is_null() {
                        out.insert(key, reference);
                    }
                }
            }
            if fdef.is_reference() && no_refs {
                continue;
            }
            let field_ctx = chained.for_field(id, cdef, field, value)?;
            out.insert(
                field.json_name().to_string(),
                field.types().run_tojson(&field_ctx, graph)?,
            );
        }
        Ok(Value::Dict(out))
    }

    fn serialize(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        let Some(id) = ctx.value.as_object() else {
            self.validate(ctx, graph)?;
            return Ok(ctx.value.clone());
        };
        if !ctx.visit(id) {
            return Ok(ctx.value.clone());
        }
        let cdef = Arc::clone(graph.object(id)?.class());
        let collect = ctx.collect_all(&cdef);
        let mut errors = ValidationError::new(ctx.root);
        for field in cdef.fields() {
            let value = graph.get(id, field.name())?;
            let step = ctx
                .for_field(id, &cdef, field, value.clone())
                .and_then(|field_ctx| field.types().run_serialize(&field_ctx, graph));
            if let Some(next) = errors.absorb(step, collect)? {
                if next != value {
                    graph.write(id, field.name(), next)?;
                }
            }
        }
        errors.into_result()?;
        Ok(ctx.value.clone())
    }
}

/// Reference key output of a local-key field: the linked objects' primary
/// keys, or the stored key when nothing is linked
fn reference_of(graph: &Graph, object: &Object, field: &JField, value: &Value) -> Result<Value> {
    let pk_of = |id: ObjectId| -> Result<Value> {
        let linked = graph.object(id)?;
        Ok(linked
            .class()
            .primary_field()
            .and_then(|pk| linked.value(pk.name()))
            .cloned()
            .unwrap_or_default())
    };
    match value {
        Value::Object(id) => pk_of(*id),
        Value::List(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(pk_of)
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        _ => Ok(object.local_key(field.name()).cloned().unwrap_or_default()),
    }
}
