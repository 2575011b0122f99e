//! Configuration
//!
//! Three layers, from widest to narrowest:
//! - [`SchemaConfig`]: defaults for every class of a schema, loadable from JSON
//! - [`ClassConfig`]: per-class overrides
//! - [`PassOptions`]: per-call options of one graph operation

use jsonclass_value::keys;
use jsonclass_value::Value;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Derives the reference key of a local-key field from its name
///
/// The flag tells whether the field holds a list of references.
pub type KeyTransformer = fn(&str, bool) -> String;

/// Schema-wide defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Output keys and nested dict keys are camelized
    pub camelize_json_keys: bool,
    /// Unknown input keys are rejected
    pub strict_input: bool,
    /// Validation collects every failure instead of stopping at the first
    pub validate_all_fields: bool,
    /// Nesting depth at which a pass gives up
    pub max_depth: usize,
}

impl SchemaConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON; missing keys take their defaults
    ///
    /// # Errors
    /// Returns [`SchemaError::InvalidArgument`] when the JSON is malformed
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json)
            .map_err(|e| SchemaError::invalid_argument("schema config", e.to_string()))
    }

    /// With key camelization
    #[inline]
    #[must_use]
    pub fn with_camelize_json_keys(mut self, camelize: bool) -> Self {
        self.camelize_json_keys = camelize;
        self
    }

    /// With strict input
    #[inline]
    #[must_use]
    pub fn with_strict_input(mut self, strict: bool) -> Self {
        self.strict_input = strict;
        self
    }

    /// With collect-all validation
    #[inline]
    #[must_use]
    pub fn with_validate_all_fields(mut self, all: bool) -> Self {
        self.validate_all_fields = all;
        self
    }

    /// With nesting limit
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            camelize_json_keys: true,
            strict_input: true,
            validate_all_fields: false,
            max_depth: 64,
        }
    }
}

/// Per-class overrides of [`SchemaConfig`]
#[derive(Debug, Clone, Default)]
pub struct ClassConfig {
    /// Overrides [`SchemaConfig::camelize_json_keys`]
    pub camelize_json_keys: Option<bool>,
    /// Overrides [`SchemaConfig::strict_input`]
    pub strict_input: Option<bool>,
    /// Overrides [`SchemaConfig::validate_all_fields`]
    pub validate_all_fields: Option<bool>,
    /// Class cannot be instantiated
    pub is_abstract: bool,
    /// Reference key naming, [`keys::reference_key`] when unset
    pub key_transformer: Option<KeyTransformer>,
}

impl ClassConfig {
    /// Create empty overrides
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With key camelization
    #[inline]
    #[must_use]
    pub fn with_camelize_json_keys(mut self, camelize: bool) -> Self {
        self.camelize_json_keys = Some(camelize);
        self
    }

    /// With strict input
    #[inline]
    #[must_use]
    pub fn with_strict_input(mut self, strict: bool) -> Self {
        self.strict_input = Some(strict);
        self
    }

    /// With collect-all validation
    #[inline]
    #[must_use]
    pub fn with_validate_all_fields(mut self, all: bool) -> Self {
        self.validate_all_fields = Some(all);
        self
    }

    /// As abstract class
    #[inline]
    #[must_use]
    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// With reference key naming
    #[inline]
    #[must_use]
    pub fn with_key_transformer(mut self, transformer: KeyTransformer) -> Self {
        self.key_transformer = Some(transformer);
        self
    }

    /// Reference key for a local-key field
    #[must_use]
    pub fn reference_key(&self, field: &str, many: bool) -> String {
        self.key_transformer.unwrap_or(keys::reference_key)(field, many)
    }
}

/// Options of one graph operation
#[derive(Debug, Clone, Default)]
pub struct PassOptions {
    /// Collect-all (`Some(true)`) or fail-fast (`Some(false)`); class config when `None`
    pub all_fields: Option<bool>,
    /// Fill fields absent from input with their defaults
    pub fill_blanks: bool,
    /// Include write-only fields in output
    pub ignore_writeonly: bool,
    /// Caller acting on the graph
    pub operator: Option<Value>,
}

impl PassOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With aggregation mode
    #[inline]
    #[must_use]
    pub fn with_all_fields(mut self, all: bool) -> Self {
        self.all_fields = Some(all);
        self
    }

    /// With default filling
    #[inline]
    #[must_use]
    pub fn with_fill_blanks(mut self, fill: bool) -> Self {
        self.fill_blanks = fill;
        self
    }

    /// With write-only fields in output
    #[inline]
    #[must_use]
    pub fn with_ignore_writeonly(mut self, ignore: bool) -> Self {
        self.ignore_writeonly = ignore;
        self
    }

    /// With operator
    #[inline]
    #[must_use]
    pub fn with_operator(mut self, operator: impl Into<Value>) -> Self {
        self.operator = Some(operator.into());
        self
    }
}
