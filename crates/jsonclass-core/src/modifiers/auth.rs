//! Operator assignment and password helpers

use rand::Rng;
use sha2::{Digest, Sha256};

use jsonclass_value::Value;

use crate::ctx::Ctx;
use crate::error::Result;
use crate::fdef::{Fdef, OperatorTransformer};
use crate::graph::Graph;
use crate::modifier::Modifier;

const SALT_SCHEME: &str = "sha256";

fn digest(salt: &str, plain: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(plain.as_bytes());
    hex::encode(hasher.finalize())
}

fn is_salted(s: &str) -> bool {
    let mut parts = s.split('$');
    parts.next() == Some(SALT_SCHEME) && parts.count() == 2
}

/// Salt and hash a plain password as `sha256$<salt>$<digest>`
pub(crate) fn hash_password(plain: &str) -> String {
    let salt = hex::encode(rand::random::<[u8; 8]>());
    let hashed = digest(&salt, plain);
    format!("{SALT_SCHEME}${salt}${hashed}")
}

/// Check a plain password against a stored `sha256$<salt>$<digest>` value
///
/// ```rust
/// use jsonclass_core::verify_password;
///
/// assert!(!verify_password("not-salted", "secret"));
/// ```
#[must_use]
pub fn verify_password(stored: &str, plain: &str) -> bool {
    let mut parts = stored.split('$');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(SALT_SCHEME), Some(salt), Some(hashed), None) => digest(salt, plain) == hashed,
        _ => false,
    }
}

/// Assigned from the operator of a graph
#[derive(Debug, Clone)]
pub(crate) struct Asop {
    transformer: OperatorTransformer,
}

impl Asop {
    pub(crate) fn new(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        Self {
            transformer: OperatorTransformer::new(f),
        }
    }
}

impl Modifier for Asop {
    fn define(&self, fdef: &mut Fdef) {
        fdef.requires_operator_assign = true;
        fdef.operator_transformer = Some(self.transformer.clone());
    }

    fn checks_presence(&self) -> bool {
        true
    }

    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        if !ctx.value.is_null() {
            return Ok(());
        }
        let pending = match (ctx.owner, ctx.keypath_owner.segments().first()) {
            (Some(owner), Some(field)) => {
                let object = graph.object(owner)?;
                object.is_new() || object.is_modified(field)
            }
            _ => true,
        };
        if pending {
            Err(ctx.fail("no operator being assigned"))
        } else {
            Ok(())
        }
    }
}

/// Replaces a plain string with its salted digest
#[derive(Debug, Clone, Copy)]
pub(crate) struct Salt;

impl Modifier for Salt {
    fn transform(&self, ctx: &Ctx, _graph: &mut Graph) -> Result<Value> {
        Ok(match &ctx.value {
            Value::Str(s) if !is_salted(s) => Value::Str(hash_password(s)),
            other => other.clone(),
        })
    }
}

/// Plain value must match the salted digest stored in a sibling field
#[derive(Debug, Clone)]
pub(crate) struct CheckPw {
    field: String,
}

impl CheckPw {
    pub(crate) fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Modifier for CheckPw {
    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        let Some(owner) = ctx.owner else {
            return Ok(());
        };
        let stored = graph.get(owner, &self.field)?;
        let matched = match (stored.as_str(), ctx.value.as_str()) {
            (Some(stored), Some(plain)) => verify_password(stored, plain),
            _ => false,
        };
        if matched {
            Ok(())
        } else {
            Err(ctx.fail(format!(
                "Value at '{}' does not match '{}'.",
                ctx.keypath_root, self.field
            )))
        }
    }
}

/// Random digit string generated when null
#[derive(Debug, Clone, Copy)]
pub(crate) struct RandomDigits {
    len: usize,
}

impl RandomDigits {
    pub(crate) fn new(len: usize) -> Self {
        Self { len }
    }
}

impl Modifier for RandomDigits {
    fn eager(&self) -> bool {
        true
    }

    fn transform(&self, ctx: &Ctx, _graph: &mut Graph) -> Result<Value> {
        if !ctx.value.is_null() {
            return Ok(ctx.value.clone());
        }
        let mut rng = rand::rng();
        let digits: String = (0..self.len)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect();
        Ok(Value::Str(digits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let stored = hash_password("secret");
        assert!(stored.starts_with("sha256$"));
        assert!(is_salted(&stored));
        assert!(verify_password(&stored, "secret"));
        assert!(!verify_password(&stored, "Secret"));
        assert!(!verify_password("secret", "secret"));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("a"), hash_password("a"));
    }

    #[test]
    fn random_digits_length() {
        let mut graph = crate::graph::tests::empty_graph();
        let ctx = Ctx::new(Value::Null, 4);
        let value = RandomDigits::new(6).transform(&ctx, &mut graph).unwrap();
        let s = value.as_str().unwrap();
        assert_eq!(s.len(), 6);
        assert!(s.chars().all(|c| c.is_ascii_digit()));
    }
}
