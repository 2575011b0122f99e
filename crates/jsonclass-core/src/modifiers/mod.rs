//! Modifier catalog
//!
//! Concrete [`Modifier`](crate::Modifier) implementations, grouped by concern:
//! - markers: metadata only
//! - typed, enumeration: scalar and enum types
//! - instance, collection, shape, union: composite types that recurse
//! - presence, checks: validators
//! - transformers: value transformations
//! - callback, fields, auth: user callbacks, cross-field rules, operator and crypto helpers

mod auth;
mod callback;
mod checks;
mod collection;
mod enumeration;
mod fields;
mod instance;
mod markers;
mod presence;
mod shape;
mod transformers;
mod typed;
mod union;

pub(crate) use auth::{Asop, CheckPw, RandomDigits, Salt};
pub(crate) use callback::{Compare, OnSave, Preserialize, SetOnSave, ValidateWith};
pub use callback::Verdict;
pub(crate) use checks::Check;
pub(crate) use collection::{DictOf, ListOf};
pub(crate) use enumeration::EnumOf;
pub(crate) use fields::{Equals, EqualsField, Fval};
pub(crate) use instance::InstanceOf;
pub(crate) use markers::Marker;
pub(crate) use presence::{Invalid, Nonnull, Present, PresentWith, PresentWithout, Required};
pub(crate) use shape::Shape;
pub(crate) use transformers::{DefaultValue, Transformer};
pub(crate) use typed::TypeCheck;
pub(crate) use union::Union;

pub use auth::verify_password;
