//! The modifier capability set
//!
//! Every rule attached to a field is a [`Modifier`]. A modifier records its
//! effect on field metadata once, when it is appended to a pipeline, and is a
//! pure function of the context afterwards. Capabilities a modifier does not
//! use fall back to pass-through defaults.

use std::fmt::Debug;

use jsonclass_value::Value;

use crate::ctx::Ctx;
use crate::error::Result;
use crate::fdef::Fdef;
use crate::graph::Graph;

/// One composable field rule
pub trait Modifier: Debug + Send + Sync {
    /// Record this modifier's effect on a fresh copy of the field definition
    fn define(&self, _fdef: &mut Fdef) {}

    /// Transform runs on null values too
    fn eager(&self) -> bool {
        false
    }

    /// Validation runs on null values too
    fn checks_presence(&self) -> bool {
        false
    }

    /// Validation of the regular pass stops before this modifier
    fn is_preserialize(&self) -> bool {
        false
    }

    /// Produce the next value
    ///
    /// # Errors
    /// Returns an error when input cannot be turned into a value
    fn transform(&self, ctx: &Ctx, _graph: &mut Graph) -> Result<Value> {
        Ok(ctx.value.clone())
    }

    /// Accept or reject the value
    ///
    /// # Errors
    /// Returns a validation error describing the rejected value
    fn validate(&self, _ctx: &Ctx, _graph: &Graph) -> Result<()> {
        Ok(())
    }

    /// Produce the output form of the value
    ///
    /// # Errors
    /// Returns an error when nested objects cannot be serialized
    fn tojson(&self, ctx: &Ctx, _graph: &Graph) -> Result<Value> {
        Ok(ctx.value.clone())
    }

    /// Pre-save pass: validate, then pass the value on
    ///
    /// # Errors
    /// Returns a validation error describing the rejected value
    fn serialize(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        self.validate(ctx, graph)?;
        Ok(ctx.value.clone())
    }
}
