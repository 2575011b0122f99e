//! Cross-field modifiers

use jsonclass_value::Value;

use crate::ctx::Ctx;
use crate::error::Result;
use crate::graph::Graph;
use crate::modifier::Modifier;

/// Takes the value of a sibling field
#[derive(Debug, Clone)]
pub(crate) struct Fval {
    field: String,
}

impl Fval {
    pub(crate) fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Modifier for Fval {
    fn eager(&self) -> bool {
        true
    }

    fn transform(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        match ctx.owner {
            Some(owner) => graph.get(owner, &self.field),
            None => Ok(ctx.value.clone()),
        }
    }
}

/// Value must equal a literal
#[derive(Debug, Clone)]
pub(crate) struct Equals {
    expected: Value,
}

impl Equals {
    pub(crate) fn new(expected: Value) -> Self {
        Self { expected }
    }
}

impl Modifier for Equals {
    fn validate(&self, ctx: &Ctx, _graph: &Graph) -> Result<()> {
        if ctx.value == self.expected {
            return Ok(());
        }
        Err(ctx.fail(format!(
            "Value '{}' at '{}' should equal '{}'.",
            ctx.value, ctx.keypath_root, self.expected
        )))
    }
}

/// Value must equal a sibling field
#[derive(Debug, Clone)]
pub(crate) struct EqualsField {
    field: String,
}

impl EqualsField {
    pub(crate) fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Modifier for EqualsField {
    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        let Some(owner) = ctx.owner else {
            return Ok(());
        };
        if graph.get(owner, &self.field)? == ctx.value {
            return Ok(());
        }
        Err(ctx.fail(format!(
            "Value at '{}' should equal value of field '{}'.",
            ctx.keypath_root, self.field
        )))
    }
}
