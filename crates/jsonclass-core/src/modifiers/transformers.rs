//! Value transformers
//!
//! A transformer reshapes values it understands and passes everything else
//! through untouched, leaving rejection to the validators after it.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use regex::Regex;

use jsonclass_value::Value;

use crate::ctx::Ctx;
use crate::error::{Result, SchemaError};
use crate::graph::Graph;
use crate::modifier::Modifier;

type Generator = Arc<dyn Fn() -> Value + Send + Sync>;
type Mapper = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Value used when the input is null
#[derive(Clone)]
pub(crate) enum DefaultValue {
    Literal(Value),
    Generated(Generator),
}

impl DefaultValue {
    pub(crate) fn literal(value: Value) -> Self {
        Self::Literal(value)
    }

    pub(crate) fn generated(generate: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self::Generated(Arc::new(generate))
    }
}

impl Debug for DefaultValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Generated(_) => f.write_str("Generated(..)"),
        }
    }
}

impl Modifier for DefaultValue {
    fn eager(&self) -> bool {
        true
    }

    fn transform(&self, ctx: &Ctx, _graph: &mut Graph) -> Result<Value> {
        if !ctx.value.is_null() {
            return Ok(ctx.value.clone());
        }
        Ok(match self {
            Self::Literal(value) => value.clone(),
            Self::Generated(generate) => generate(),
        })
    }
}

/// Built-in and custom value transformations
#[derive(Clone)]
pub(crate) enum Transformer {
    Truncate(usize),
    Trim,
    ToTitle,
    ToCap,
    ToLower,
    ToUpper,
    Replace(String, String),
    Replacer(Regex, String),
    Split(String),
    Join(String),
    Reverse,
    ToList,
    ToBool,
    ToInt,
    ToFloat,
    ToStr,
    Round,
    Ceil,
    Floor,
    Abs,
    Add(Value),
    Sub(Value),
    Mul(Value),
    Div(Value),
    Mod(Value),
    Custom(Mapper),
}

impl Debug for Transformer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncate(len) => write!(f, "Truncate({len})"),
            Self::Replace(from, to) => write!(f, "Replace({from:?}, {to:?})"),
            Self::Replacer(regex, to) => write!(f, "Replacer({:?}, {to:?})", regex.as_str()),
            Self::Split(sep) => write!(f, "Split({sep:?})"),
            Self::Join(sep) => write!(f, "Join({sep:?})"),
            Self::Add(v) => write!(f, "Add({v:?})"),
            Self::Sub(v) => write!(f, "Sub({v:?})"),
            Self::Mul(v) => write!(f, "Mul({v:?})"),
            Self::Div(v) => write!(f, "Div({v:?})"),
            Self::Mod(v) => write!(f, "Mod({v:?})"),
            Self::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name()),
        }
    }
}

impl Transformer {
    pub(crate) fn replacer(pattern: &str, to: String) -> Result<Self, SchemaError> {
        Regex::new(pattern)
            .map(|regex| Self::Replacer(regex, to))
            .map_err(|e| SchemaError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Checked divisor for `div` and `modulo`
    pub(crate) fn divisor(modifier: &'static str, operand: Value) -> Result<Value, SchemaError> {
        match operand.as_f64() {
            Some(n) if n == 0.0 => Err(SchemaError::invalid_argument(modifier, "division by zero")),
            Some(_) => Ok(operand),
            None => Err(SchemaError::invalid_argument(
                modifier,
                format!("expected a number, got {}", operand.type_name()),
            )),
        }
    }

    pub(crate) fn custom(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Truncate(_) => "Truncate",
            Self::Trim => "Trim",
            Self::ToTitle => "ToTitle",
            Self::ToCap => "ToCap",
            Self::ToLower => "ToLower",
            Self::ToUpper => "ToUpper",
            Self::Replace(..) => "Replace",
            Self::Replacer(..) => "Replacer",
            Self::Split(_) => "Split",
            Self::Join(_) => "Join",
            Self::Reverse => "Reverse",
            Self::ToList => "ToList",
            Self::ToBool => "ToBool",
            Self::ToInt => "ToInt",
            Self::ToFloat => "ToFloat",
            Self::ToStr => "ToStr",
            Self::Round => "Round",
            Self::Ceil => "Ceil",
            Self::Floor => "Floor",
            Self::Abs => "Abs",
            Self::Add(_) => "Add",
            Self::Sub(_) => "Sub",
            Self::Mul(_) => "Mul",
            Self::Div(_) => "Div",
            Self::Mod(_) => "Mod",
            Self::Custom(_) => "Custom",
        }
    }

    fn apply(&self, value: &Value) -> Value {
        match (self, value) {
            (Self::Truncate(len), Value::Str(s)) => Value::Str(s.chars().take(*len).collect()),
            (Self::Truncate(len), Value::List(items)) => {
                Value::List(items.iter().take(*len).cloned().collect())
            }
            (Self::Trim, Value::Str(s)) => Value::Str(s.trim().to_string()),
            (Self::ToTitle, Value::Str(s)) => Value::Str(title(s)),
            (Self::ToCap, Value::Str(s)) => Value::Str(capitalize(s)),
            (Self::ToLower, Value::Str(s)) => Value::Str(s.to_lowercase()),
            (Self::ToUpper, Value::Str(s)) => Value::Str(s.to_uppercase()),
            (Self::Replace(from, to), Value::Str(s)) => Value::Str(s.replace(from.as_str(), to)),
            (Self::Replacer(regex, to), Value::Str(s)) => {
                Value::Str(regex.replace_all(s, to.as_str()).into_owned())
            }
            (Self::Split(sep), Value::Str(s)) => {
                Value::List(s.split(sep.as_str()).map(Value::from).collect())
            }
            (Self::Join(sep), Value::List(items)) => Value::Str(
                items
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(sep),
            ),
            (Self::Reverse, Value::Str(s)) => Value::Str(s.chars().rev().collect()),
            (Self::Reverse, Value::List(items)) => {
                Value::List(items.iter().rev().cloned().collect())
            }
            (Self::ToList, Value::List(_)) => value.clone(),
            (Self::ToList, other) => Value::List(vec![other.clone()]),
            (Self::ToBool, other) => to_bool(other).map_or_else(|| other.clone(), Value::Bool),
            (Self::ToInt, other) => to_int(other).map_or_else(|| other.clone(), Value::Int),
            (Self::ToFloat, other) => to_float(other).map_or_else(|| other.clone(), Value::Float),
            (Self::ToStr, Value::Str(_)) => value.clone(),
            (Self::ToStr, other) if !matches!(other, Value::List(_) | Value::Dict(_)) => {
                Value::Str(other.to_string())
            }
            (Self::Round, Value::Float(f)) => float_to_int(f.round()),
            (Self::Ceil, Value::Float(f)) => float_to_int(f.ceil()),
            (Self::Floor, Value::Float(f)) => float_to_int(f.floor()),
            (Self::Abs, Value::Int(i)) => Value::Int(i.saturating_abs()),
            (Self::Abs, Value::Float(f)) => Value::Float(f.abs()),
            (Self::Add(rhs), lhs) => arithmetic(lhs, rhs, i64::checked_add, |a, b| a + b),
            (Self::Sub(rhs), lhs) => arithmetic(lhs, rhs, i64::checked_sub, |a, b| a - b),
            (Self::Mul(rhs), lhs) => arithmetic(lhs, rhs, i64::checked_mul, |a, b| a * b),
            (Self::Div(rhs), lhs) => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => Value::Float(a / b),
                _ => lhs.clone(),
            },
            (Self::Mod(rhs), lhs) => arithmetic(
                lhs,
                rhs,
                |a, b| a.checked_rem_euclid(b).map(|r| if b < 0 && r != 0 { r + b } else { r }),
                |a, b| a - b * (a / b).floor(),
            ),
            (Self::Custom(f), other) => f(other),
            _ => value.clone(),
        }
    }
}

impl Modifier for Transformer {
    fn transform(&self, ctx: &Ctx, _graph: &mut Graph) -> Result<Value> {
        Ok(self.apply(&ctx.value))
    }
}

fn title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut boundary = true;
    for c in s.chars() {
        if boundary {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        boundary = !c.is_alphabetic();
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int(i) => Some(*i != 0),
        Value::Float(f) => Some(*f != 0.0),
        Value::Str(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Value::Str(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| to_int(&Value::Float(s.parse::<f64>().ok()?)))
        }
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Str(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => other.as_f64(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_int(f: f64) -> Value {
    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Value::Int(f as i64)
    } else {
        Value::Float(f)
    }
}

/// Integer arithmetic when both sides are integers and the result fits,
/// float arithmetic otherwise
fn arithmetic(
    lhs: &Value,
    rhs: &Value,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> Value {
    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        if let Some(result) = int_op(*a, *b) {
            return Value::Int(result);
        }
    }
    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => Value::Float(float_op(a, b)),
        _ => lhs.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(t: &Transformer, value: impl Into<Value>) -> Value {
        t.apply(&value.into())
    }

    #[test]
    fn string_transforms() {
        assert_eq!(apply(&Transformer::Trim, "  a b "), Value::from("a b"));
        assert_eq!(apply(&Transformer::ToTitle, "hello wORLD"), Value::from("Hello World"));
        assert_eq!(apply(&Transformer::ToCap, "hello World"), Value::from("Hello World"));
        assert_eq!(apply(&Transformer::Truncate(3), "abcdef"), Value::from("abc"));
        assert_eq!(
            apply(&Transformer::Split(",".into()), "a,b"),
            Value::from(vec!["a", "b"])
        );
        assert_eq!(
            apply(&Transformer::Join("-".into()), vec!["a", "b"]),
            Value::from("a-b")
        );
        let replacer = Transformer::replacer(r"\d", "#".into()).unwrap();
        assert_eq!(apply(&replacer, "a1b22"), Value::from("a#b##"));
    }

    #[test]
    fn coercions() {
        assert_eq!(apply(&Transformer::ToInt, "42"), Value::Int(42));
        assert_eq!(apply(&Transformer::ToInt, "4.7"), Value::Int(4));
        assert_eq!(apply(&Transformer::ToInt, "x"), Value::from("x"));
        assert_eq!(apply(&Transformer::ToFloat, 2), Value::Float(2.0));
        assert_eq!(apply(&Transformer::ToBool, "Yes"), Value::Bool(true));
        assert_eq!(apply(&Transformer::ToBool, 0), Value::Bool(false));
        assert_eq!(apply(&Transformer::ToStr, 5), Value::from("5"));
        assert_eq!(apply(&Transformer::ToList, 5), Value::from(vec![5]));
    }

    #[test]
    fn arithmetic_keeps_ints() {
        assert_eq!(apply(&Transformer::Add(Value::Int(2)), 3), Value::Int(5));
        assert_eq!(apply(&Transformer::Add(Value::Float(0.5)), 3), Value::Float(3.5));
        assert_eq!(apply(&Transformer::Mul(Value::Int(2)), i64::MAX), Value::Float(i64::MAX as f64 * 2.0));
        assert_eq!(apply(&Transformer::Div(Value::Int(2)), 3), Value::Float(1.5));
        assert_eq!(apply(&Transformer::Mod(Value::Int(3)), -7), Value::Int(2));
        assert_eq!(apply(&Transformer::Mod(Value::Int(-3)), 7), Value::Int(-2));
        assert_eq!(apply(&Transformer::Round, 2.5), Value::Int(3));
        assert_eq!(apply(&Transformer::Floor, -1.5), Value::Int(-2));
        assert_eq!(apply(&Transformer::Abs, -4), Value::Int(4));
    }

    #[test]
    fn divisor_checks() {
        assert!(Transformer::divisor("div", Value::Int(0)).is_err());
        assert!(Transformer::divisor("div", Value::from("2")).is_err());
        assert_eq!(Transformer::divisor("div", Value::Int(2)).unwrap(), Value::Int(2));
    }

    #[test]
    fn unknown_kinds_pass_through() {
        assert_eq!(apply(&Transformer::Trim, 3), Value::Int(3));
        assert_eq!(apply(&Transformer::Add(Value::Int(1)), "a"), Value::from("a"));
    }
}
