//! User callbacks

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use jsonclass_value::Value;

use crate::ctx::Ctx;
use crate::error::Result;
use crate::graph::Graph;
use crate::modifier::Modifier;

/// Outcome of a user validation callback
///
/// Callbacks may return `bool`, `()`, a message, or an optional message;
/// each converts into a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Accepted
    Valid,
    /// Rejected with the generic message
    Invalid,
    /// Rejected with a custom message
    Message(String),
}

impl Verdict {
    fn into_result(self, ctx: &Ctx) -> Result<()> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid => Err(ctx.fail("invalid value")),
            Self::Message(message) => Err(ctx.fail(message)),
        }
    }
}

impl From<bool> for Verdict {
    fn from(valid: bool) -> Self {
        if valid {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

impl From<()> for Verdict {
    fn from((): ()) -> Self {
        Self::Valid
    }
}

impl From<&str> for Verdict {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<String> for Verdict {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<Option<String>> for Verdict {
    fn from(message: Option<String>) -> Self {
        message.map_or(Self::Valid, Self::Message)
    }
}

type Predicate = dyn Fn(&Value) -> Verdict + Send + Sync;
type Comparison = dyn Fn(&Value, &Value) -> Verdict + Send + Sync;
type Setter = dyn Fn(&Value) -> Value + Send + Sync;
type Hook = dyn Fn(&Value) + Send + Sync;

/// Opaque shared closure
pub(crate) struct Callback<F: ?Sized>(Arc<F>);

impl<F: ?Sized> Clone for Callback<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<F: ?Sized> Debug for Callback<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Custom validation
#[derive(Debug, Clone)]
pub(crate) struct ValidateWith(Callback<Predicate>);

impl ValidateWith {
    pub(crate) fn new(f: impl Fn(&Value) -> Verdict + Send + Sync + 'static) -> Self {
        Self(Callback(Arc::new(f)))
    }
}

impl Modifier for ValidateWith {
    fn validate(&self, ctx: &Ctx, _graph: &Graph) -> Result<()> {
        (self.0 .0)(&ctx.value).into_result(ctx)
    }
}

/// Validation of a change against the previously saved value
///
/// Runs only for persisted owners whose field was modified.
#[derive(Debug, Clone)]
pub(crate) struct Compare(Callback<Comparison>);

impl Compare {
    pub(crate) fn new(f: impl Fn(&Value, &Value) -> Verdict + Send + Sync + 'static) -> Self {
        Self(Callback(Arc::new(f)))
    }
}

impl Modifier for Compare {
    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        let (Some(owner), Some(field)) = (ctx.owner, ctx.keypath_owner.segments().first()) else {
            return Ok(());
        };
        let object = graph.object(owner)?;
        if object.is_new() || !object.is_modified(field) {
            return Ok(());
        }
        let old = object.previous(field).cloned().unwrap_or_default();
        (self.0 .0)(&old, &ctx.value).into_result(ctx)
    }
}

/// Boundary between regular validation and save-time modifiers
#[derive(Debug, Clone, Copy)]
pub(crate) struct Preserialize;

impl Modifier for Preserialize {
    fn is_preserialize(&self) -> bool {
        true
    }
}

/// Replaces the value when the object is saved
#[derive(Debug, Clone)]
pub(crate) struct SetOnSave(Callback<Setter>);

impl SetOnSave {
    pub(crate) fn new(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        Self(Callback(Arc::new(f)))
    }
}

impl Modifier for SetOnSave {
    fn eager(&self) -> bool {
        true
    }

    fn serialize(&self, ctx: &Ctx, _graph: &mut Graph) -> Result<Value> {
        Ok((self.0 .0)(&ctx.value))
    }
}

/// Side effect when the object is saved
#[derive(Debug, Clone)]
pub(crate) struct OnSave(Callback<Hook>);

impl OnSave {
    pub(crate) fn new(f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        Self(Callback(Arc::new(f)))
    }
}

impl Modifier for OnSave {
    fn eager(&self) -> bool {
        true
    }

    fn serialize(&self, ctx: &Ctx, _graph: &mut Graph) -> Result<Value> {
        (self.0 .0)(&ctx.value);
        Ok(ctx.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_conversions() {
        assert_eq!(Verdict::from(true), Verdict::Valid);
        assert_eq!(Verdict::from(false), Verdict::Invalid);
        assert_eq!(Verdict::from(()), Verdict::Valid);
        assert_eq!(Verdict::from("bad"), Verdict::Message("bad".into()));
        assert_eq!(Verdict::from(None::<String>), Verdict::Valid);
    }

    #[test]
    fn verdict_messages() {
        let ctx = Ctx::new(Value::Null, 4).descend(Value::Int(1), "n").unwrap();
        let err = Verdict::Invalid.into_result(&ctx).unwrap_err();
        assert_eq!(err.as_validation().unwrap().get("n"), Some("invalid value"));
        let err = Verdict::Message("too big".into()).into_result(&ctx).unwrap_err();
        assert_eq!(err.as_validation().unwrap().get("n"), Some("too big"));
    }
}
