//! Pipelines
//!
//! [`Types`] is an immutable pair of a field definition and an ordered
//! modifier sequence. Every builder method returns a new pipeline and leaves
//! the receiver untouched, so one pipeline can be shared by many fields:
//!
//! ```rust
//! use jsonclass_core::types;
//!
//! let name = types().str().trim();
//! let required_name = name.required();
//! assert_eq!(name.len(), 2);
//! assert_eq!(required_name.len(), 3);
//! ```
//!
//! The pipeline runs four passes: transform, validate, tojson and the
//! pre-save serialize pass.

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use jsonclass_value::Value;

use crate::ctx::Ctx;
use crate::error::{Result, SchemaError};
use crate::fdef::{DeleteRule, EnumInput, EnumOutput, Fdef, FieldType, FieldUsage, Strictness};
use crate::graph::Graph;
use crate::modifier::Modifier;
use crate::modifiers::{
    Asop, Check, CheckPw, Compare, DefaultValue, DictOf, EnumOf, Equals, EqualsField, Fval,
    InstanceOf, Invalid, ListOf, Marker, Nonnull, OnSave, Preserialize, Present, PresentWith,
    PresentWithout, RandomDigits, Required, Salt, SetOnSave, Shape, Transformer, TypeCheck, Union,
    ValidateWith, Verdict,
};

/// Root pipeline: default field definition, no modifiers
#[inline]
#[must_use]
pub fn types() -> Types {
    <Types as Default>::default()
}

/// Immutable modifier pipeline
#[derive(Debug, Clone, Default)]
pub struct Types {
    fdef: Arc<Fdef>,
    modifiers: im::Vector<Arc<dyn Modifier>>,
}

impl Types {
    /// Field definition derived from every appended modifier
    #[inline]
    #[must_use]
    pub fn fdef(&self) -> &Fdef {
        &self.fdef
    }

    /// Modifiers in chain order
    pub fn modifiers(&self) -> impl Iterator<Item = &Arc<dyn Modifier>> {
        self.modifiers.iter()
    }

    /// Number of modifiers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    /// Check for the root pipeline
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// New pipeline with `modifier` appended
    ///
    /// The field definition is copied and the modifier's `define` applied to
    /// the copy; `self` is not changed.
    #[must_use]
    pub fn append(&self, modifier: impl Modifier + 'static) -> Self {
        let mut fdef = (*self.fdef).clone();
        modifier.define(&mut fdef);
        let mut modifiers = self.modifiers.clone();
        modifiers.push_back(Arc::new(modifier));
        Self {
            fdef: Arc::new(fdef),
            modifiers,
        }
    }

    pub(crate) fn with_owner(&self, class: &str) -> Self {
        let mut fdef = (*self.fdef).clone();
        fdef.owner_class = Some(class.to_string());
        Self {
            fdef: Arc::new(fdef),
            modifiers: self.modifiers.clone(),
        }
    }

    fn enter(&self, ctx: &Ctx) -> Ctx {
        let mut ctx = ctx.clone();
        ctx.fdef = Arc::clone(&self.fdef);
        ctx
    }

    /// Run the transform pass
    ///
    /// Modifiers that are not eager are skipped while the value is null.
    ///
    /// # Errors
    /// Returns the first error raised by a modifier
    pub fn run_transform(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        let mut ctx = self.enter(ctx);
        for modifier in &self.modifiers {
            if ctx.value.is_null() && !modifier.eager() {
                continue;
            }
            ctx.value = modifier.transform(&ctx, graph)?;
        }
        Ok(ctx.value)
    }

    /// Run the validate pass up to the first pre-save marker
    ///
    /// Modifiers that do not check presence are skipped for null values.
    ///
    /// # Errors
    /// Returns the first error raised by a modifier
    pub fn run_validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        let ctx = self.enter(ctx);
        for modifier in &self.modifiers {
            if modifier.is_preserialize() {
                break;
            }
            if ctx.value.is_null() && !modifier.checks_presence() {
                continue;
            }
            modifier.validate(&ctx, graph)?;
        }
        Ok(())
    }

    /// Run the output pass
    ///
    /// # Errors
    /// Returns the first error raised by a modifier
    pub fn run_tojson(&self, ctx: &Ctx, graph: &Graph) -> Result<Value> {
        let mut ctx = self.enter(ctx);
        for modifier in &self.modifiers {
            if ctx.value.is_null() {
                break;
            }
            ctx.value = modifier.tojson(&ctx, graph)?;
        }
        Ok(ctx.value)
    }

    /// Run the pre-save pass over the whole chain
    ///
    /// # Errors
    /// Returns the first error raised by a modifier
    pub fn run_serialize(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        let mut ctx = self.enter(ctx);
        for modifier in &self.modifiers {
            if ctx.value.is_null() && !modifier.eager() && !modifier.checks_presence() {
                continue;
            }
            ctx.value = modifier.serialize(&ctx, graph)?;
        }
        Ok(ctx.value)
    }

    // Types

    /// String
    #[must_use]
    pub fn str(&self) -> Self {
        self.append(TypeCheck::new(FieldType::Str))
    }

    /// Integer
    #[must_use]
    pub fn int(&self) -> Self {
        self.append(TypeCheck::new(FieldType::Int))
    }

    /// Float, integers are widened
    #[must_use]
    pub fn float(&self) -> Self {
        self.append(TypeCheck::new(FieldType::Float))
    }

    /// Boolean
    #[must_use]
    pub fn bool(&self) -> Self {
        self.append(TypeCheck::new(FieldType::Bool))
    }

    /// Date, parsed from `YYYY-MM-DD`
    #[must_use]
    pub fn date(&self) -> Self {
        self.append(TypeCheck::new(FieldType::Date))
    }

    /// Datetime, parsed from ISO 8601
    #[must_use]
    pub fn datetime(&self) -> Self {
        self.append(TypeCheck::new(FieldType::Datetime))
    }

    /// Any value
    #[must_use]
    pub fn any(&self) -> Self {
        self.append(TypeCheck::new(FieldType::Any))
    }

    /// Member of a registered enum
    #[must_use]
    pub fn enumeration(&self, enum_name: impl Into<String>) -> Self {
        self.append(EnumOf::new(enum_name))
    }

    /// Object of a registered class
    #[must_use]
    pub fn instanceof(&self, class: impl Into<String>) -> Self {
        self.append(InstanceOf::new(class))
    }

    /// List of items; items are required unless declared otherwise
    #[must_use]
    pub fn listof(&self, item: Types) -> Self {
        self.append(ListOf::new(item))
    }

    /// Dict of values; values are required unless declared otherwise
    #[must_use]
    pub fn dictof(&self, item: Types) -> Self {
        self.append(DictOf::new(item))
    }

    /// Dict with fixed typed keys
    #[must_use]
    pub fn shape<K: Into<String>>(&self, keys: impl IntoIterator<Item = (K, Types)>) -> Self {
        let keys: IndexMap<String, Types> = keys.into_iter().map(|(k, t)| (k.into(), t)).collect();
        self.append(Shape::new(keys))
    }

    /// First candidate that accepts the value
    #[must_use]
    pub fn union(&self, candidates: impl IntoIterator<Item = Types>) -> Self {
        self.append(Union::new(candidates.into_iter().collect()))
    }

    // Markers

    /// Primary key
    #[must_use]
    pub fn primary(&self) -> Self {
        self.append(Marker::Primary)
    }

    /// Never assigned from input
    #[must_use]
    pub fn readonly(&self) -> Self {
        self.append(Marker::ReadOnly)
    }

    /// Never serialized
    #[must_use]
    pub fn writeonly(&self) -> Self {
        self.append(Marker::WriteOnly)
    }

    /// Readable and writable
    #[must_use]
    pub fn readwrite(&self) -> Self {
        self.append(Marker::ReadWrite)
    }

    /// Assignable while null
    #[must_use]
    pub fn writeonce(&self) -> Self {
        self.append(Marker::WriteOnce)
    }

    /// Null input ignored
    #[must_use]
    pub fn writenonnull(&self) -> Self {
        self.append(Marker::WriteNonnull)
    }

    /// Neither readable nor writable
    #[must_use]
    pub fn internal(&self) -> Self {
        self.append(Marker::Internal)
    }

    /// Cleared after save
    #[must_use]
    pub fn temp(&self) -> Self {
        self.append(Marker::Temp)
    }

    /// Indexed
    #[must_use]
    pub fn index(&self) -> Self {
        self.append(Marker::Index)
    }

    /// Unique
    #[must_use]
    pub fn unique(&self) -> Self {
        self.append(Marker::Unique)
    }

    /// Stored on the object itself
    #[must_use]
    pub fn embedded(&self) -> Self {
        self.append(Marker::Embedded)
    }

    /// Reference keyed on this side
    #[must_use]
    pub fn linkto(&self) -> Self {
        self.append(Marker::LinkTo)
    }

    /// Reference keyed by `key` on the other side
    #[must_use]
    pub fn linkedby(&self, key: impl Into<String>) -> Self {
        self.append(Marker::LinkedBy(key.into()))
    }

    /// Many-to-many reference paired with the field `key` on the other side
    #[must_use]
    pub fn linkedthru(&self, key: impl Into<String>) -> Self {
        self.append(Marker::LinkedThru(key.into()))
    }

    /// Many-to-many reference through an explicit join class
    #[must_use]
    pub fn linkedin(&self, class: impl Into<String>) -> Self {
        self.append(Marker::LinkedIn(class.into()))
    }

    /// Referrer column of the join class
    #[must_use]
    pub fn referrer(&self, key: impl Into<String>) -> Self {
        self.append(Marker::Referrer(key.into()))
    }

    /// Referee column of the join class
    #[must_use]
    pub fn referee(&self, key: impl Into<String>) -> Self {
        self.append(Marker::Referee(key.into()))
    }

    /// Clear on owner deletion
    #[must_use]
    pub fn nullify(&self) -> Self {
        self.append(Marker::Delete(DeleteRule::Nullify))
    }

    /// Delete with the owner
    #[must_use]
    pub fn cascade(&self) -> Self {
        self.append(Marker::Delete(DeleteRule::Cascade))
    }

    /// Block owner deletion
    #[must_use]
    pub fn deny(&self) -> Self {
        self.append(Marker::Delete(DeleteRule::Deny))
    }

    /// Reject unknown keys
    #[must_use]
    pub fn strict(&self) -> Self {
        self.append(Marker::Strictness(Strictness::Strict))
    }

    /// Ignore unknown keys
    #[must_use]
    pub fn unstrict(&self) -> Self {
        self.append(Marker::Strictness(Strictness::Unstrict))
    }

    /// Enum input by member name
    #[must_use]
    pub fn inputname(&self) -> Self {
        self.append(Marker::EnumInput(EnumInput::NAME))
    }

    /// Enum input by lowercase member name
    #[must_use]
    pub fn inputlname(&self) -> Self {
        self.append(Marker::EnumInput(EnumInput::LOWERCASE_NAME))
    }

    /// Enum input by member value
    #[must_use]
    pub fn inputvalue(&self) -> Self {
        self.append(Marker::EnumInput(EnumInput::VALUE))
    }

    /// Enum input by any encoding
    #[must_use]
    pub fn inputall(&self) -> Self {
        self.append(Marker::EnumInput(EnumInput::ALL))
    }

    /// Enum output as member name
    #[must_use]
    pub fn outputname(&self) -> Self {
        self.append(Marker::EnumOutput(EnumOutput::Name))
    }

    /// Enum output as lowercase member name
    #[must_use]
    pub fn outputlname(&self) -> Self {
        self.append(Marker::EnumOutput(EnumOutput::LowercaseName))
    }

    /// Enum output as member value
    #[must_use]
    pub fn outputvalue(&self) -> Self {
        self.append(Marker::EnumOutput(EnumOutput::Value))
    }

    /// Null accepted
    #[must_use]
    pub fn nullable(&self) -> Self {
        self.append(Marker::Nullable)
    }

    /// Creation timestamp, defaults to now
    #[must_use]
    pub fn tscreated(&self) -> Self {
        self.append(Marker::Usage(FieldUsage::CreatedAt))
            .default_with(|| Value::Datetime(Utc::now().naive_utc()))
    }

    /// Update timestamp, defaults to now and refreshed on save
    #[must_use]
    pub fn tsupdated(&self) -> Self {
        self.append(Marker::Usage(FieldUsage::UpdatedAt))
            .default_with(|| Value::Datetime(Utc::now().naive_utc()))
            .setonsave(|_| Value::Datetime(Utc::now().naive_utc()))
    }

    /// Soft deletion timestamp
    #[must_use]
    pub fn tsdeleted(&self) -> Self {
        self.append(Marker::Usage(FieldUsage::DeletedAt))
    }

    // Presence

    /// Value must not be null
    #[must_use]
    pub fn required(&self) -> Self {
        self.append(Required)
    }

    /// Value must be present, references included
    #[must_use]
    pub fn present(&self) -> Self {
        self.append(Present)
    }

    /// Present whenever the sibling field `key` is
    #[must_use]
    pub fn presentwith(&self, key: impl Into<String>) -> Self {
        self.append(PresentWith::new(key))
    }

    /// Present whenever every sibling field in `keys` is absent
    #[must_use]
    pub fn presentwithout<K: Into<String>>(&self, keys: impl IntoIterator<Item = K>) -> Self {
        self.append(PresentWithout::new(keys.into_iter().map(Into::into).collect()))
    }

    /// Always rejected
    #[must_use]
    pub fn invalid(&self) -> Self {
        self.append(Invalid)
    }

    /// Null lists and dicts become empty
    #[must_use]
    pub fn nonnull(&self) -> Self {
        self.append(Nonnull)
    }

    // Leaf checks

    /// String matches a regular expression
    ///
    /// # Errors
    /// Returns [`SchemaError::InvalidPattern`] if the pattern does not compile
    pub fn matches(&self, pattern: &str) -> Result<Self, SchemaError> {
        Ok(self.append(Check::matches(pattern)?))
    }

    /// Value is one of `options`
    #[must_use]
    pub fn oneof<V: Into<Value>>(&self, options: impl IntoIterator<Item = V>) -> Self {
        self.append(Check::OneOf(options.into_iter().map(Into::into).collect()))
    }

    /// Length at least `min`
    #[must_use]
    pub fn minlength(&self, min: usize) -> Self {
        self.append(Check::MinLength(min))
    }

    /// Length at most `max`
    #[must_use]
    pub fn maxlength(&self, max: usize) -> Self {
        self.append(Check::MaxLength(max))
    }

    /// Length between `min` and `max`
    ///
    /// # Errors
    /// Returns [`SchemaError::InvalidArgument`] if `min > max`
    pub fn length(&self, min: usize, max: usize) -> Result<Self, SchemaError> {
        if min > max {
            return Err(SchemaError::invalid_argument(
                "length",
                format!("minimum {min} is greater than maximum {max}"),
            ));
        }
        Ok(self.append(Check::Length(min, max)))
    }

    /// Number at least `min`
    #[must_use]
    pub fn min(&self, min: f64) -> Self {
        self.append(Check::Min(min))
    }

    /// Number at most `max`
    #[must_use]
    pub fn max(&self, max: f64) -> Self {
        self.append(Check::Max(max))
    }

    /// Number less than `bound`
    #[must_use]
    pub fn lt(&self, bound: f64) -> Self {
        self.append(Check::Lt(bound))
    }

    /// Number greater than `bound`
    #[must_use]
    pub fn gt(&self, bound: f64) -> Self {
        self.append(Check::Gt(bound))
    }

    /// Number between `min` and `max`
    ///
    /// # Errors
    /// Returns [`SchemaError::InvalidArgument`] if `min > max`
    pub fn range(&self, min: f64, max: f64) -> Result<Self, SchemaError> {
        if min > max {
            return Err(SchemaError::invalid_argument(
                "range",
                format!("minimum {min} is greater than maximum {max}"),
            ));
        }
        Ok(self.append(Check::Min(min)).append(Check::Max(max)))
    }

    /// Number greater than zero
    #[must_use]
    pub fn positive(&self) -> Self {
        self.append(Check::Positive)
    }

    /// Number less than zero
    #[must_use]
    pub fn negative(&self) -> Self {
        self.append(Check::Negative)
    }

    /// Number not less than zero
    #[must_use]
    pub fn nonnegative(&self) -> Self {
        self.append(Check::NonNegative)
    }

    /// Number not greater than zero
    #[must_use]
    pub fn nonpositive(&self) -> Self {
        self.append(Check::NonPositive)
    }

    /// Odd integer
    #[must_use]
    pub fn odd(&self) -> Self {
        self.append(Check::Odd)
    }

    /// Even integer
    #[must_use]
    pub fn even(&self) -> Self {
        self.append(Check::Even)
    }

    /// Absolute http(s) or ftp(s) URL
    #[must_use]
    pub fn url(&self) -> Self {
        self.append(Check::Url)
    }

    /// Email address
    #[must_use]
    pub fn email(&self) -> Self {
        self.append(Check::Email)
    }

    /// ASCII digits only
    #[must_use]
    pub fn digit(&self) -> Self {
        self.append(Check::Digit)
    }

    /// Letters only
    #[must_use]
    pub fn alpha(&self) -> Self {
        self.append(Check::Alpha)
    }

    /// Numeric characters only
    #[must_use]
    pub fn numeric(&self) -> Self {
        self.append(Check::Numeric)
    }

    /// Letters and digits only
    #[must_use]
    pub fn alnum(&self) -> Self {
        self.append(Check::Alnum)
    }

    /// Six hex digits, optionally prefixed with `#`
    #[must_use]
    pub fn hexcolor(&self) -> Self {
        self.append(Check::HexColor)
    }

    // Transformers

    /// Literal used when the value is null
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn default(&self, value: impl Into<Value>) -> Self {
        self.append(DefaultValue::literal(value.into()))
    }

    /// Generated value used when the value is null
    #[must_use]
    pub fn default_with(&self, generate: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.append(DefaultValue::generated(generate))
    }

    /// Keep the first `len` chars or items
    #[must_use]
    pub fn truncate(&self, len: usize) -> Self {
        self.append(Transformer::Truncate(len))
    }

    /// Strip surrounding whitespace
    #[must_use]
    pub fn trim(&self) -> Self {
        self.append(Transformer::Trim)
    }

    /// Capitalize every word
    #[must_use]
    pub fn totitle(&self) -> Self {
        self.append(Transformer::ToTitle)
    }

    /// Capitalize the first char
    #[must_use]
    pub fn tocap(&self) -> Self {
        self.append(Transformer::ToCap)
    }

    /// Lowercase
    #[must_use]
    pub fn tolower(&self) -> Self {
        self.append(Transformer::ToLower)
    }

    /// Uppercase
    #[must_use]
    pub fn toupper(&self) -> Self {
        self.append(Transformer::ToUpper)
    }

    /// Replace every occurrence of `from`
    #[must_use]
    pub fn replace(&self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.append(Transformer::Replace(from.into(), to.into()))
    }

    /// Replace every match of a regular expression
    ///
    /// # Errors
    /// Returns [`SchemaError::InvalidPattern`] if the pattern does not compile
    pub fn replacer(&self, pattern: &str, to: impl Into<String>) -> Result<Self, SchemaError> {
        Ok(self.append(Transformer::replacer(pattern, to.into())?))
    }

    /// Split a string into a list
    #[must_use]
    pub fn split(&self, separator: impl Into<String>) -> Self {
        self.append(Transformer::Split(separator.into()))
    }

    /// Join a list of strings
    #[must_use]
    pub fn join(&self, separator: impl Into<String>) -> Self {
        self.append(Transformer::Join(separator.into()))
    }

    /// Reverse a string or list
    #[must_use]
    pub fn reverse(&self) -> Self {
        self.append(Transformer::Reverse)
    }

    /// Wrap a single value into a list
    #[must_use]
    pub fn tolist(&self) -> Self {
        self.append(Transformer::ToList)
    }

    /// Coerce to bool
    #[must_use]
    pub fn tobool(&self) -> Self {
        self.append(Transformer::ToBool)
    }

    /// Coerce to int
    #[must_use]
    pub fn toint(&self) -> Self {
        self.append(Transformer::ToInt)
    }

    /// Coerce to float
    #[must_use]
    pub fn tofloat(&self) -> Self {
        self.append(Transformer::ToFloat)
    }

    /// Coerce to string
    #[must_use]
    pub fn tostr(&self) -> Self {
        self.append(Transformer::ToStr)
    }

    /// Round to the nearest integer
    #[must_use]
    pub fn round(&self) -> Self {
        self.append(Transformer::Round)
    }

    /// Round up
    #[must_use]
    pub fn ceil(&self) -> Self {
        self.append(Transformer::Ceil)
    }

    /// Round down
    #[must_use]
    pub fn floor(&self) -> Self {
        self.append(Transformer::Floor)
    }

    /// Absolute value
    #[must_use]
    pub fn abs(&self) -> Self {
        self.append(Transformer::Abs)
    }

    /// Add a number
    #[must_use]
    pub fn add(&self, operand: impl Into<Value>) -> Self {
        self.append(Transformer::Add(operand.into()))
    }

    /// Subtract a number
    #[must_use]
    pub fn sub(&self, operand: impl Into<Value>) -> Self {
        self.append(Transformer::Sub(operand.into()))
    }

    /// Multiply by a number
    #[must_use]
    pub fn mul(&self, operand: impl Into<Value>) -> Self {
        self.append(Transformer::Mul(operand.into()))
    }

    /// Divide by a non-zero number
    ///
    /// # Errors
    /// Returns [`SchemaError::InvalidArgument`] for zero or non-numeric divisors
    pub fn div(&self, operand: impl Into<Value>) -> Result<Self, SchemaError> {
        Ok(self.append(Transformer::Div(Transformer::divisor("div", operand.into())?)))
    }

    /// Remainder of division by a non-zero number
    ///
    /// # Errors
    /// Returns [`SchemaError::InvalidArgument`] for zero or non-numeric divisors
    pub fn modulo(&self, operand: impl Into<Value>) -> Result<Self, SchemaError> {
        Ok(self.append(Transformer::Mod(Transformer::divisor("modulo", operand.into())?)))
    }

    /// Arbitrary value transformation
    #[must_use]
    pub fn transform(&self, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.append(Transformer::custom(f))
    }

    // Callbacks

    /// Arbitrary validation
    ///
    /// The callback returns anything convertible into a [`Verdict`]: `true`,
    /// `false`, `()` or a message.
    #[must_use]
    pub fn validate<V: Into<Verdict>>(
        &self,
        f: impl Fn(&Value) -> V + Send + Sync + 'static,
    ) -> Self {
        self.append(ValidateWith::new(move |v| f(v).into()))
    }

    /// Validation of changes to persisted objects, given old and new value
    #[must_use]
    pub fn compare<V: Into<Verdict>>(
        &self,
        f: impl Fn(&Value, &Value) -> V + Send + Sync + 'static,
    ) -> Self {
        self.append(Compare::new(move |old, new| f(old, new).into()))
    }

    /// Value replaced on save; later modifiers only validate on save
    #[must_use]
    pub fn setonsave(&self, setter: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.append(Preserialize).append(SetOnSave::new(setter))
    }

    /// Side effect run on save
    #[must_use]
    pub fn onsave(&self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.append(OnSave::new(callback))
    }

    // Cross-field

    /// Value of the sibling field `field`
    #[must_use]
    pub fn fval(&self, field: impl Into<String>) -> Self {
        self.append(Fval::new(field))
    }

    /// Equal to a literal
    #[must_use]
    pub fn equals(&self, value: impl Into<Value>) -> Self {
        self.append(Equals::new(value.into()))
    }

    /// Equal to the sibling field `field`
    #[must_use]
    pub fn equals_field(&self, field: impl Into<String>) -> Self {
        self.append(EqualsField::new(field))
    }

    // Authorization and crypto

    /// Assigned from the operator through `transformer`
    #[must_use]
    pub fn asop(&self, transformer: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.append(Asop::new(transformer))
    }

    /// Assigned the operator itself
    #[must_use]
    pub fn asopd(&self) -> Self {
        self.append(Asop::new(Value::clone))
    }

    /// Salted SHA-256 digest of the input
    #[must_use]
    pub fn salt(&self) -> Self {
        self.append(Salt)
    }

    /// Plain input matched against the salted field `field`
    #[must_use]
    pub fn checkpw(&self, field: impl Into<String>) -> Self {
        self.append(CheckPw::new(field))
    }

    /// Random digit string of `len` chars when null
    #[must_use]
    pub fn randomdigits(&self, len: usize) -> Self {
        self.append(RandomDigits::new(len))
    }
}
