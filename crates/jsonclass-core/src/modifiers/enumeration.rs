//! Enum fields

use jsonclass_value::{EnumValue, Value};

use crate::ctx::Ctx;
use crate::error::Result;
use crate::fdef::{EnumOutput, Fdef, FieldType};
use crate::graph::Graph;
use crate::modifier::Modifier;
use crate::schema::EnumDef;

/// Member of a registered enum
#[derive(Debug, Clone)]
pub(crate) struct EnumOf {
    name: String,
}

impl EnumOf {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Member matching `input` under the accepted encodings
    fn resolve(&self, def: &EnumDef, fdef: &Fdef, input: &Value) -> Option<EnumValue> {
        let accepted = fdef.effective_enum_input();
        if let Value::Enum(member) = input {
            return (member.enum_name == self.name && def.member(&member.name).is_some())
                .then(|| member.clone());
        }
        let by_value = || accepted.value.then(|| def.by_value(input)).flatten();
        let by_name = || {
            let s = input.as_str()?;
            accepted.name.then(|| def.member(s)).flatten()
        };
        let by_lowercase = || {
            let s = input.as_str()?;
            accepted.lowercase_name.then(|| def.by_lowercase_name(s)).flatten()
        };
        by_value().or_else(by_name).or_else(by_lowercase)
    }
}

impl Modifier for EnumOf {
    fn define(&self, fdef: &mut Fdef) {
        fdef.field_type = FieldType::Enum;
        fdef.enum_class = Some(self.name.clone());
    }

    fn transform(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        let def = graph.schema().enum_def(&self.name)?;
        self.resolve(def, &ctx.fdef, &ctx.value)
            .map(Value::Enum)
            .ok_or_else(|| ctx.fail("unknown enum value"))
    }

    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        let def = graph.schema().enum_def(&self.name)?;
        match &ctx.value {
            Value::Enum(member)
                if member.enum_name == self.name && def.member(&member.name).is_some() =>
            {
                Ok(())
            }
            _ => Err(ctx.fail("invalid enum value")),
        }
    }

    fn tojson(&self, ctx: &Ctx, _graph: &Graph) -> Result<Value> {
        let Value::Enum(member) = &ctx.value else {
            return Ok(ctx.value.clone());
        };
        Ok(match ctx.fdef.effective_enum_output() {
            EnumOutput::Name => Value::Str(member.name.clone()),
            EnumOutput::LowercaseName => Value::Str(member.name.to_lowercase()),
            EnumOutput::Value => (*member.value).clone(),
        })
    }
}
