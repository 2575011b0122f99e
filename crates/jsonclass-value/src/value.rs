//! Dynamic values flowing through field pipelines
//!
//! [`Value`] is the single currency of every pass: raw input, transformed
//! field values and serialized output are all values. Objects are never
//! embedded; they are referenced through an [`ObjectId`] into an arena owned
//! by the caller, so linked objects can point at each other freely.

use std::fmt::{self, Display, Formatter};

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Output format for dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Output format for datetimes
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Ordered string-keyed map used for dicts and raw object input
pub type Dict = IndexMap<String, Value>;

/// Handle of an object inside an object arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Wrap an arena index
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A resolved enum member
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    /// Registered enum name
    pub enum_name: String,
    /// Member name, e.g. `MALE`
    pub name: String,
    /// Member value, e.g. `"male"` or `1`
    pub value: Box<Value>,
}

impl EnumValue {
    /// Create a member reference
    #[must_use]
    pub fn new(enum_name: impl Into<String>, name: impl Into<String>, value: Value) -> Self {
        Self {
            enum_name: enum_name.into(),
            name: name.into(),
            value: Box::new(value),
        }
    }
}

/// Dynamic field value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent or null
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(String),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time, UTC
    Datetime(NaiveDateTime),
    /// Enum member
    Enum(EnumValue),
    /// Ordered list
    List(Vec<Value>),
    /// Ordered string-keyed map
    Dict(Dict),
    /// Reference to an object in the arena
    Object(ObjectId),
}

impl Value {
    /// Check for null
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type name used in messages
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Date(_) => "date",
            Self::Datetime(_) => "datetime",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Object(_) => "object",
        }
    }

    /// Boolean payload
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric payload, integers widened
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String payload
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// List payload
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Dict payload
    #[inline]
    #[must_use]
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(map) => Some(map),
            _ => None,
        }
    }

    /// Object handle
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Enum member
    #[inline]
    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Object handles held by this value: itself, or the objects of a list
    #[must_use]
    pub fn object_ids(&self) -> Vec<ObjectId> {
        match self {
            Self::Object(id) => vec![*id],
            Self::List(items) => items.iter().filter_map(Self::as_object).collect(),
            _ => Vec::new(),
        }
    }

    /// Length of strings (in chars), lists and dicts
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Str(s) => Some(s.chars().count()),
            Self::List(items) => Some(items.len()),
            Self::Dict(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Check for an empty string, list or dict
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Convert to plain JSON
    ///
    /// Dates use [`DATE_FORMAT`], datetimes [`DATETIME_FORMAT`], enum members
    /// their name. Object handles become their arena index; whole-object
    /// serialization goes through the owning arena.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::Str(s) => Json::String(s.clone()),
            Self::Date(d) => Json::String(d.format(DATE_FORMAT).to_string()),
            Self::Datetime(dt) => Json::String(dt.format(DATETIME_FORMAT).to_string()),
            Self::Enum(e) => Json::String(e.name.clone()),
            Self::List(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            Self::Dict(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Object(id) => Json::from(id.index()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Object(id) => write!(f, "{id}"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Json::String(s) => Self::Str(s),
            Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => Self::Dict(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Datetime(dt)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self::Object(id)
    }
}

impl From<EnumValue> for Value {
    fn from(e: EnumValue) -> Self {
        Self::Enum(e)
    }
}

impl From<Dict> for Value {
    fn from(map: Dict) -> Self {
        Self::Dict(map)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}
