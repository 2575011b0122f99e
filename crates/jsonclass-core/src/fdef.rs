//! Field definitions
//!
//! An [`Fdef`] is the metadata half of a pipeline. It starts as
//! [`Fdef::default`] and every appended modifier records its effect on a
//! fresh copy through [`Modifier::define`](crate::Modifier::define).

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use jsonclass_value::Value;
use serde::{Deserialize, Serialize};

use crate::types::Types;

/// Declared value type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldType {
    /// No type modifier yet
    #[default]
    Any,
    /// String
    Str,
    /// Integer
    Int,
    /// Float
    Float,
    /// Boolean
    Bool,
    /// Date
    Date,
    /// Date and time
    Datetime,
    /// Enum member
    Enum,
    /// Nested object
    Instance,
    /// List
    List,
    /// String-keyed dict
    Dict,
    /// Dict with a fixed set of typed keys
    Shape,
    /// First matching of several pipelines
    Union,
}

/// Where a field's value lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldStorage {
    /// Value stored on the object itself
    #[default]
    Embedded,
    /// Reference whose key is stored on this side
    LocalKey,
    /// Reference whose key is stored on the other side
    ForeignKey,
    /// Never persisted, cleared after save
    Temp,
}

/// Item or collection nullability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Nullability {
    /// Not declared
    #[default]
    Undefined,
    /// Items must be present
    Required,
    /// Null accepted
    Nullable,
    /// Collection is replaced by an empty one when null
    Nonnull,
}

/// Serialization visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReadRule {
    /// Present in output
    #[default]
    Readable,
    /// Omitted from output
    NoRead,
}

/// Input assignment rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WriteRule {
    /// Always assignable
    #[default]
    Writable,
    /// Never assigned from input
    NoWrite,
    /// Assignable while null
    WriteOnce,
    /// Null input is ignored
    WriteNonnull,
}

/// What happens to linked objects when the owner is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeleteRule {
    /// Refuse deletion while linked
    Deny,
    /// Clear the reference
    Nullify,
    /// Delete linked objects too
    Cascade,
}

/// Timestamp role of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldUsage {
    /// Set once on creation
    CreatedAt,
    /// Set on every update
    UpdatedAt,
    /// Set on soft deletion
    DeletedAt,
}

impl FieldUsage {
    /// Role name used in schema errors
    #[must_use]
    pub fn role(self) -> &'static str {
        match self {
            Self::CreatedAt => "created-at",
            Self::UpdatedAt => "updated-at",
            Self::DeletedAt => "deleted-at",
        }
    }
}

/// Unknown-key policy of object and shape input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strictness {
    /// Use the class default
    #[default]
    Undefined,
    /// Reject unknown keys
    Strict,
    /// Ignore unknown keys
    Unstrict,
}

/// Accepted enum input encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumInput {
    /// Member name, `MALE`
    pub name: bool,
    /// Member value, `"male"` or `1`
    pub value: bool,
    /// Lowercased member name, `male`
    pub lowercase_name: bool,
}

impl EnumInput {
    /// Names only
    pub const NAME: Self = Self {
        name: true,
        value: false,
        lowercase_name: false,
    };
    /// Values only
    pub const VALUE: Self = Self {
        name: false,
        value: true,
        lowercase_name: false,
    };
    /// Lowercase names only
    pub const LOWERCASE_NAME: Self = Self {
        name: false,
        value: false,
        lowercase_name: true,
    };
    /// Every encoding
    pub const ALL: Self = Self {
        name: true,
        value: true,
        lowercase_name: true,
    };
}

/// Enum output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnumOutput {
    /// Member name
    Name,
    /// Lowercased member name
    LowercaseName,
    /// Member value
    Value,
}

/// Computes an operator field's value from the operator
#[derive(Clone)]
pub struct OperatorTransformer(Arc<dyn Fn(&Value) -> Value + Send + Sync>);

impl OperatorTransformer {
    /// Wrap a transformer
    pub fn new(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Apply to an operator
    #[must_use]
    pub fn apply(&self, operator: &Value) -> Value {
        (self.0)(operator)
    }
}

impl fmt::Debug for OperatorTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OperatorTransformer(..)")
    }
}

/// Metadata of one field
#[derive(Debug, Clone, Default)]
pub struct Fdef {
    /// Value type
    pub field_type: FieldType,
    /// Storage kind
    pub storage: FieldStorage,
    /// Nullability of the value itself, or of list and dict items
    pub item_nullability: Nullability,
    /// Nullability of a list or dict as a whole
    pub collection_nullability: Nullability,
    /// Output visibility
    pub read_rule: ReadRule,
    /// Input assignment rule
    pub write_rule: WriteRule,
    /// Delete rule of reference fields
    pub delete_rule: Option<DeleteRule>,
    /// Accepted enum input, `None` until an enum or input marker is applied
    pub enum_input: Option<EnumInput>,
    /// Enum output, `None` until an enum or output marker is applied
    pub enum_output: Option<EnumOutput>,
    /// Primary key
    pub primary: bool,
    /// Indexed
    pub index: bool,
    /// Unique
    pub unique: bool,
    /// Timestamp role
    pub usage: Option<FieldUsage>,
    /// Unknown key policy
    pub strictness: Strictness,
    /// Class of an instance field
    pub instance_class: Option<String>,
    /// Enum of an enum field
    pub enum_class: Option<String>,
    /// Item pipeline of lists and dicts
    pub item_types: Option<Types>,
    /// Key pipelines of shapes
    pub shape_types: Option<Arc<IndexMap<String, Types>>>,
    /// Candidate pipelines of unions
    pub union_types: Option<Arc<Vec<Types>>>,
    /// Field on the other side holding the key
    pub foreign_key: Option<String>,
    /// Many-to-many link through a join table
    pub use_join_table: bool,
    /// Explicit join class of a many-to-many link
    pub join_class: Option<String>,
    /// Referrer column of a join table
    pub referrer_key: Option<String>,
    /// Referee column of a join table
    pub referee_key: Option<String>,
    /// Field is assigned from the operator
    pub requires_operator_assign: bool,
    /// How the operator is turned into the field value
    pub operator_transformer: Option<OperatorTransformer>,
    /// Class declaring this field, set when the class is built
    pub owner_class: Option<String>,
}

impl Fdef {
    /// Reference storage (local or foreign key)
    #[inline]
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self.storage, FieldStorage::LocalKey | FieldStorage::ForeignKey)
    }

    /// Class referenced by an instance field or a list of instances
    #[must_use]
    pub fn target_class(&self) -> Option<&str> {
        match self.field_type {
            FieldType::Instance => self.instance_class.as_deref(),
            FieldType::List => self
                .item_types
                .as_ref()
                .and_then(|t| t.fdef().instance_class.as_deref()),
            _ => None,
        }
    }

    /// Holds a list of references
    #[inline]
    #[must_use]
    pub fn is_many(&self) -> bool {
        self.field_type == FieldType::List
    }

    /// Effective enum input encodings
    #[inline]
    #[must_use]
    pub fn effective_enum_input(&self) -> EnumInput {
        self.enum_input.unwrap_or(EnumInput::NAME)
    }

    /// Effective enum output encoding
    #[inline]
    #[must_use]
    pub fn effective_enum_output(&self) -> EnumOutput {
        self.enum_output.unwrap_or(EnumOutput::Name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::types;

    #[test]
    fn default_is_plain_any() {
        let fdef = Fdef::default();
        assert_eq!(fdef.field_type, FieldType::Any);
        assert_eq!(fdef.storage, FieldStorage::Embedded);
        assert!(!fdef.is_reference());
        assert_eq!(fdef.effective_enum_input(), EnumInput::NAME);
        assert_eq!(fdef.effective_enum_output(), EnumOutput::Name);
    }

    #[test]
    fn target_class_of_instance_list() {
        let single = types().instanceof("User");
        assert_eq!(single.fdef().target_class(), Some("User"));
        let many = types().listof(types().instanceof("Tag"));
        assert_eq!(many.fdef().target_class(), Some("Tag"));
        assert!(many.fdef().is_many());
        assert_eq!(types().str().fdef().target_class(), None);
    }

    #[test]
    fn operator_transformer_applies() {
        let t = OperatorTransformer::new(|op| op.clone());
        assert_eq!(t.apply(&Value::Int(3)), Value::Int(3));
        assert_eq!(format!("{t:?}"), "OperatorTransformer(..)");
    }
}
