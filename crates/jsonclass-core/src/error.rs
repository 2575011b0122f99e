//! Error types for JSON classes
//!
//! Three families of failures:
//! - [`SchemaError`]: programmer errors found while building pipelines and classes
//! - [`ValidationError`]: keypath → message map describing rejected input
//! - [`Error`]: everything a pass can return, including lookup failures

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use jsonclass_value::{Keypath, ObjectId};

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Input was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Invalid schema definition
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Operator assignment requested without an operator
    #[error("no operator is present to assign to '{class}.{field}'")]
    Unauthorized {
        /// Class of the object being assigned
        class: String,
        /// Operator field
        field: String,
    },

    /// Class name not registered
    #[error("unknown class '{0}'")]
    UnknownClass(String),

    /// Enum name not registered
    #[error("unknown enum '{0}'")]
    UnknownEnum(String),

    /// Field name not declared on a class
    #[error("class '{class}' has no field named '{field}'")]
    UnknownField {
        /// Class searched
        class: String,
        /// Missing field
        field: String,
    },

    /// Object handle outside the graph
    #[error("object {0} does not exist in this graph")]
    UnknownObject(ObjectId),

    /// Abstract classes cannot be instantiated
    #[error("class '{0}' is abstract")]
    AbstractClass(String),
}

impl Error {
    /// Single-entry validation error
    #[inline]
    pub fn validation(keypath: &Keypath, message: impl Into<String>, root: Option<ObjectId>) -> Self {
        Self::Validation(ValidationError::single(keypath, message, root))
    }

    /// Unknown field on a class
    #[inline]
    pub fn unknown_field(class: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            class: class.into(),
            field: field.into(),
        }
    }

    /// Validation payload, if this is a validation failure
    #[inline]
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this is a validation failure
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Rejected input
///
/// Carries every keypath → message pair gathered under the active
/// aggregation mode, keyed by dotted keypaths absolute from the root object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationError {
    messages: IndexMap<String, String>,
    root: Option<ObjectId>,
}

impl ValidationError {
    /// Empty aggregate
    #[inline]
    #[must_use]
    pub fn new(root: Option<ObjectId>) -> Self {
        Self {
            messages: IndexMap::new(),
            root,
        }
    }

    /// Error with one entry
    #[must_use]
    pub fn single(keypath: &Keypath, message: impl Into<String>, root: Option<ObjectId>) -> Self {
        let mut error = Self::new(root);
        error.insert(keypath, message);
        error
    }

    /// Add one entry, replacing a message already stored at `keypath`
    pub fn insert(&mut self, keypath: &Keypath, message: impl Into<String>) {
        self.messages.insert(keypath.to_string(), message.into());
    }

    /// Merge another aggregate's entries into this one
    pub fn merge(&mut self, other: Self) {
        self.messages.extend(other.messages);
    }

    /// Fold one step's outcome into the aggregate
    ///
    /// In collect mode a validation failure is merged and `Ok(None)` returned
    /// so the caller moves on to the next sibling. Every other error, and any
    /// failure in fail-fast mode, is propagated.
    ///
    /// # Errors
    /// Returns the step's error when it cannot be absorbed
    pub fn absorb<T>(&mut self, step: Result<T>, collect: bool) -> Result<Option<T>> {
        match step {
            Ok(value) => Ok(Some(value)),
            Err(Error::Validation(e)) if collect => {
                self.merge(e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Message stored at a keypath
    #[inline]
    #[must_use]
    pub fn get(&self, keypath: &str) -> Option<&str> {
        self.messages.get(keypath).map(String::as_str)
    }

    /// All entries in insertion order
    #[inline]
    #[must_use]
    pub fn messages(&self) -> &IndexMap<String, String> {
        &self.messages
    }

    /// Keypaths with messages
    pub fn keypaths(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check for an empty aggregate
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Root object the failing pass was invoked on
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<ObjectId> {
        self.root
    }

    /// `Err(self)` when entries were collected, `Ok(())` otherwise
    ///
    /// # Errors
    /// Returns the aggregate itself when it is not empty
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, (keypath, message)) in self.messages.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}'{keypath}' {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Invalid schema definitions
///
/// Raised while pipelines, classes and schemas are being built, never while
/// processing input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Modifier received an unusable argument
    #[error("invalid argument to '{modifier}': {reason}")]
    InvalidArgument {
        /// Modifier name
        modifier: &'static str,
        /// What was wrong
        reason: String,
    },

    /// Regular expression failed to compile
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Source pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// Class registered twice
    #[error("class '{0}' is already defined")]
    DuplicateClass(String),

    /// Enum registered twice
    #[error("enum '{0}' is already defined")]
    DuplicateEnum(String),

    /// Field declared twice on one class
    #[error("field '{field}' is declared twice on class '{class}'")]
    DuplicateField {
        /// Class name
        class: String,
        /// Field name
        field: String,
    },

    /// Two fields claim the same unique role
    #[error("class '{class}' has more than one {role} field: '{first}' and '{second}'")]
    DuplicateRole {
        /// Class name
        class: String,
        /// Role, e.g. `primary`
        role: &'static str,
        /// Field holding the role first
        first: String,
        /// Second claimant
        second: String,
    },

    /// Delete rule on a field that does not hold references
    #[error("field '{class}.{field}' has a delete rule but is not a reference field")]
    DeleteRuleOnPlainField {
        /// Class name
        class: String,
        /// Field name
        field: String,
    },

    /// Pipeline references a class that was never registered
    #[error("field '{class}.{field}' references unknown class '{target}'")]
    UnresolvedClass {
        /// Declaring class
        class: String,
        /// Declaring field
        field: String,
        /// Missing class
        target: String,
    },

    /// Foreign-key relationship without a matching field on the other side
    #[error("field '{class}.{field}' has no counterpart on class '{target}'")]
    UnresolvedLink {
        /// Declaring class
        class: String,
        /// Declaring field
        field: String,
        /// Class expected to hold the counterpart
        target: String,
    },

    /// Pipeline references an enum that was never registered
    #[error("field '{class}.{field}' references unknown enum '{target}'")]
    UnresolvedEnum {
        /// Declaring class
        class: String,
        /// Declaring field
        field: String,
        /// Missing enum
        target: String,
    },
}

impl SchemaError {
    /// Invalid modifier argument
    #[inline]
    pub fn invalid_argument(modifier: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            modifier,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_both_entries() {
        let mut a = ValidationError::single(&Keypath::single("name"), "bad", None);
        let b = ValidationError::single(&Keypath::single("age").child("x"), "worse", None);
        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("age.x"), Some("worse"));
        let keys: Vec<_> = a.keypaths().collect();
        assert_eq!(keys, vec!["name", "age.x"]);
    }

    #[test]
    fn empty_aggregate_is_ok() {
        assert!(ValidationError::new(None).into_result().is_ok());
        let err = ValidationError::single(&Keypath::single("a"), "m", Some(ObjectId::new(0)))
            .into_result()
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.as_validation().unwrap().root(), Some(ObjectId::new(0)));
    }

    #[test]
    fn absorb_respects_mode() {
        let failing = || -> Result<()> { Err(Error::validation(&Keypath::single("a"), "m", None)) };
        let mut collected = ValidationError::new(None);
        assert_eq!(collected.absorb(failing(), true).unwrap(), None);
        assert_eq!(collected.absorb(Ok(3), true).unwrap(), Some(3));
        assert_eq!(collected.len(), 1);
        let mut fast = ValidationError::new(None);
        assert!(fast.absorb(failing(), false).is_err());
        let other: Result<()> = Err(Error::UnknownClass("X".into()));
        assert!(collected.absorb(other, true).is_err());
    }

    #[test]
    fn display_lists_entries() {
        let mut e = ValidationError::new(None);
        e.insert(&Keypath::single("a"), "x");
        e.insert(&Keypath::single("b"), "y");
        assert_eq!(e.to_string(), "validation failed: 'a' x; 'b' y");
    }

    #[test]
    fn schema_error_messages() {
        let e = SchemaError::DuplicateRole {
            class: "User".into(),
            role: "primary",
            first: "id".into(),
            second: "uid".into(),
        };
        assert_eq!(
            e.to_string(),
            "class 'User' has more than one primary field: 'id' and 'uid'"
        );
    }
}
