//! Scalar type modifiers

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use jsonclass_value::Value;

use crate::ctx::Ctx;
use crate::error::Result;
use crate::fdef::{Fdef, FieldType};
use crate::graph::Graph;
use crate::modifier::Modifier;

/// Declares and checks a scalar type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TypeCheck {
    kind: FieldType,
}

impl TypeCheck {
    pub(crate) fn new(kind: FieldType) -> Self {
        Self { kind }
    }

    fn label(self) -> &'static str {
        match self.kind {
            FieldType::Str => "str",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            _ => "any",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self.kind {
            FieldType::Str => matches!(value, Value::Str(_)),
            FieldType::Int => matches!(value, Value::Int(_)),
            FieldType::Float => matches!(value, Value::Float(_)),
            FieldType::Bool => matches!(value, Value::Bool(_)),
            FieldType::Date => matches!(value, Value::Date(_)),
            FieldType::Datetime => matches!(value, Value::Datetime(_)),
            _ => true,
        }
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    let trimmed = s.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

impl Modifier for TypeCheck {
    fn define(&self, fdef: &mut Fdef) {
        fdef.field_type = self.kind;
    }

    #[allow(clippy::cast_precision_loss)]
    fn transform(&self, ctx: &Ctx, _graph: &mut Graph) -> Result<Value> {
        match (self.kind, &ctx.value) {
            (FieldType::Float, Value::Int(i)) => Ok(Value::Float(*i as f64)),
            (FieldType::Date, Value::Str(s)) => parse_date(s)
                .or_else(|| parse_datetime(s).map(|dt| dt.date()))
                .map(Value::Date)
                .ok_or_else(|| {
                    ctx.fail(format!("Value at '{}' should be date string.", ctx.keypath_root))
                }),
            (FieldType::Date, Value::Datetime(dt)) => Ok(Value::Date(dt.date())),
            (FieldType::Datetime, Value::Str(s)) => {
                parse_datetime(s).map(Value::Datetime).ok_or_else(|| {
                    ctx.fail(format!(
                        "Value at '{}' should be datetime string.",
                        ctx.keypath_root
                    ))
                })
            }
            (FieldType::Datetime, Value::Date(d)) => Ok(d
                .and_hms_opt(0, 0, 0)
                .map_or_else(|| ctx.value.clone(), Value::Datetime)),
            _ => Ok(ctx.value.clone()),
        }
    }

    fn validate(&self, ctx: &Ctx, _graph: &Graph) -> Result<()> {
        if self.accepts(&ctx.value) {
            Ok(())
        } else {
            Err(ctx.fail(format!(
                "Value at '{}' should be {}.",
                ctx.keypath_root,
                self.label()
            )))
        }
    }
}
