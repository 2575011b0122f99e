//! Leaf validators
//!
//! Each check inspects one value and ignores values of a kind it does not
//! apply to; type mismatches are reported by the type modifiers.

use once_cell::sync::Lazy;
use regex::Regex;

use jsonclass_value::Value;

use crate::ctx::Ctx;
use crate::error::{Result, SchemaError};
use crate::graph::Graph;
use crate::modifier::Modifier;

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:http|ftp)s?://(?:(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+(?:[a-z]{2,6}\.?|[a-z0-9-]{2,}\.?)|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .expect("url pattern compiles")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern compiles")
});

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?(?:[0-9a-fA-F]{3}){1,2}$").expect("hex color pattern compiles"));

/// Single-value check
#[derive(Debug, Clone)]
pub(crate) enum Check {
    MinLength(usize),
    MaxLength(usize),
    Length(usize, usize),
    Min(f64),
    Max(f64),
    Lt(f64),
    Gt(f64),
    Positive,
    Negative,
    NonNegative,
    NonPositive,
    Odd,
    Even,
    OneOf(Vec<Value>),
    Matches(Regex),
    Url,
    Email,
    Digit,
    Alpha,
    Numeric,
    Alnum,
    HexColor,
}

impl Check {
    pub(crate) fn matches(pattern: &str) -> Result<Self, SchemaError> {
        Regex::new(pattern)
            .map(Self::Matches)
            .map_err(|e| SchemaError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Rejection message, `None` when the value passes
    fn reject(&self, value: &Value, kp: &str) -> Option<String> {
        match self {
            Self::MinLength(min) => {
                let len = value.len()?;
                (len < *min).then(|| {
                    format!("Length of value '{value}' at '{kp}' should not be less than {min}.")
                })
            }
            Self::MaxLength(max) => {
                let len = value.len()?;
                (len > *max).then(|| {
                    format!("Length of value '{value}' at '{kp}' should not be greater than {max}.")
                })
            }
            Self::Length(min, max) => Self::MinLength(*min)
                .reject(value, kp)
                .or_else(|| Self::MaxLength(*max).reject(value, kp)),
            Self::Min(min) => {
                let n = value.as_f64()?;
                (n < *min)
                    .then(|| format!("Value '{value}' at '{kp}' should not be less than {min}."))
            }
            Self::Max(max) => {
                let n = value.as_f64()?;
                (n > *max)
                    .then(|| format!("Value '{value}' at '{kp}' should not be greater than {max}."))
            }
            Self::Lt(bound) => {
                let n = value.as_f64()?;
                (n >= *bound)
                    .then(|| format!("Value '{value}' at '{kp}' should be less than {bound}."))
            }
            Self::Gt(bound) => {
                let n = value.as_f64()?;
                (n <= *bound)
                    .then(|| format!("Value '{value}' at '{kp}' should be greater than {bound}."))
            }
            Self::Positive => Self::sign(value, kp, |n| n > 0.0, "positive"),
            Self::Negative => Self::sign(value, kp, |n| n < 0.0, "negative"),
            Self::NonNegative => Self::sign(value, kp, |n| n >= 0.0, "non negative"),
            Self::NonPositive => Self::sign(value, kp, |n| n <= 0.0, "non positive"),
            Self::Odd => {
                let n = value.as_i64()?;
                (n % 2 == 0).then(|| format!("Value '{value}' at '{kp}' should be odd."))
            }
            Self::Even => {
                let n = value.as_i64()?;
                (n % 2 != 0).then(|| format!("Value '{value}' at '{kp}' should be even."))
            }
            Self::OneOf(options) => (!options.contains(value)).then(|| {
                let listed: Vec<String> = options.iter().map(ToString::to_string).collect();
                format!(
                    "Value '{value}' at '{kp}' should be one of [{}].",
                    listed.join(", ")
                )
            }),
            Self::Matches(regex) => {
                let s = value.as_str()?;
                (!regex.is_match(s)).then(|| {
                    format!("Value '{value}' at '{kp}' should match '{}'.", regex.as_str())
                })
            }
            Self::Url => Self::pattern(value, &URL, || {
                format!("Value '{value}' at '{kp}' is not valid url.")
            }),
            Self::Email => Self::pattern(value, &EMAIL, || {
                format!("Value '{value}' at '{kp}' is not valid email.")
            }),
            Self::HexColor => {
                Self::pattern(value, &HEX_COLOR, || "value is not hex color string".to_string())
            }
            Self::Digit => Self::chars(value, |c| c.is_ascii_digit(), || {
                format!("Value '{value}' at '{kp}' is not a digit.")
            }),
            Self::Alpha => Self::chars(value, char::is_alphabetic, || {
                format!("Value '{value}' at '{kp}' is not alpha.")
            }),
            Self::Numeric => Self::chars(value, char::is_numeric, || {
                format!("Value '{value}' at '{kp}' is not numeric.")
            }),
            Self::Alnum => Self::chars(value, char::is_alphanumeric, || {
                format!("Value '{value}' at '{kp}' is not alnum.")
            }),
        }
    }

    fn sign(value: &Value, kp: &str, ok: impl Fn(f64) -> bool, label: &str) -> Option<String> {
        let n = value.as_f64()?;
        (!ok(n)).then(|| format!("Value '{value}' at '{kp}' should be {label}."))
    }

    fn pattern(value: &Value, regex: &Regex, message: impl FnOnce() -> String) -> Option<String> {
        let s = value.as_str()?;
        (!regex.is_match(s)).then(message)
    }

    fn chars(
        value: &Value,
        ok: impl Fn(char) -> bool,
        message: impl FnOnce() -> String,
    ) -> Option<String> {
        let s = value.as_str()?;
        (s.is_empty() || !s.chars().all(ok)).then(message)
    }
}

impl Modifier for Check {
    fn validate(&self, ctx: &Ctx, _graph: &Graph) -> Result<()> {
        match self.reject(&ctx.value, &ctx.keypath_root.to_string()) {
            Some(message) => Err(ctx.fail(message)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejects(check: &Check, value: impl Into<Value>) -> Option<String> {
        check.reject(&value.into(), "v")
    }

    #[test]
    fn length_messages() {
        assert_eq!(
            rejects(&Check::MinLength(3), "ab").as_deref(),
            Some("Length of value 'ab' at 'v' should not be less than 3.")
        );
        assert_eq!(
            rejects(&Check::MaxLength(1), "ab").as_deref(),
            Some("Length of value 'ab' at 'v' should not be greater than 1.")
        );
        assert!(rejects(&Check::Length(1, 2), "ab").is_none());
        assert!(rejects(&Check::MinLength(3), vec![1, 2, 3]).is_none());
    }

    #[test]
    fn numeric_bounds() {
        assert_eq!(
            rejects(&Check::Positive, -1).as_deref(),
            Some("Value '-1' at 'v' should be positive.")
        );
        assert!(rejects(&Check::Positive, 0.5).is_none());
        assert!(rejects(&Check::Min(2.0), 1).is_some());
        assert!(rejects(&Check::Lt(2.0), 2).is_some());
        assert!(rejects(&Check::Gt(2.0), 3).is_none());
        assert!(rejects(&Check::Odd, 4).is_some());
        assert!(rejects(&Check::Even, 4).is_none());
    }

    #[test]
    fn inapplicable_kinds_pass() {
        assert!(rejects(&Check::Positive, "abc").is_none());
        assert!(rejects(&Check::Url, 5).is_none());
        assert!(rejects(&Check::MinLength(10), true).is_none());
    }

    #[test]
    fn formats() {
        assert!(rejects(&Check::Url, "https://example.com/a?b=c").is_none());
        assert_eq!(
            rejects(&Check::Url, "example").as_deref(),
            Some("Value 'example' at 'v' is not valid url.")
        );
        assert!(rejects(&Check::Email, "a.b@example.org").is_none());
        assert!(rejects(&Check::Email, "a.b@").is_some());
        assert!(rejects(&Check::Digit, "0123").is_none());
        assert_eq!(
            rejects(&Check::Digit, "12a").as_deref(),
            Some("Value '12a' at 'v' is not a digit.")
        );
        assert!(rejects(&Check::Alpha, "").is_some());
        assert!(rejects(&Check::Alnum, "a1").is_none());
    }

    #[test]
    fn hexcolor_message_is_fixed() {
        assert!(rejects(&Check::HexColor, "01FD6F").is_none());
        assert!(rejects(&Check::HexColor, "#fff").is_none());
        assert_eq!(
            rejects(&Check::HexColor, "ZZZZZZ").as_deref(),
            Some("value is not hex color string")
        );
    }

    #[test]
    fn oneof_and_matches() {
        let check = Check::OneOf(vec![Value::from("a"), Value::from("b")]);
        assert_eq!(
            rejects(&check, "c").as_deref(),
            Some("Value 'c' at 'v' should be one of [a, b].")
        );
        let check = Check::matches(r"^\d+$").unwrap();
        assert!(rejects(&check, "123").is_none());
        assert!(rejects(&check, "12x").is_some());
        assert!(Check::matches("(").is_err());
    }
}
