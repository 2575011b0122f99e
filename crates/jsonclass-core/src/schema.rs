//! Schemas
//!
//! A [`Schema`] is the immutable registry of classes and enums every graph
//! works against. It replaces a global class table: classes are declared with
//! [`ClassDef`], registered on a [`SchemaBuilder`], and cross-checked once in
//! [`SchemaBuilder::build`]: referenced classes and enums must exist and
//! every foreign-key relationship must find its counterpart field.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use jsonclass_value::{EnumValue, Value};
use tracing::info;

use crate::cdef::{Cdef, JField};
use crate::config::{ClassConfig, SchemaConfig};
use crate::error::{Error, Result, SchemaError};
use crate::fdef::{Fdef, FieldStorage};
use crate::types::Types;

/// Class declaration
#[derive(Debug, Clone)]
pub struct ClassDef {
    name: String,
    fields: Vec<(String, Types, Option<Value>)>,
    config: ClassConfig,
}

impl ClassDef {
    /// Empty class
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            config: ClassConfig::default(),
        }
    }

    /// With a field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, types: Types) -> Self {
        self.fields.push((name.into(), types, None));
        self
    }

    /// With a field that defaults to `value` when filling blanks
    #[must_use]
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        types: Types,
        value: impl Into<Value>,
    ) -> Self {
        self.fields.push((name.into(), types, Some(value.into())));
        self
    }

    /// With class overrides
    #[must_use]
    pub fn with_config(mut self, config: ClassConfig) -> Self {
        self.config = config;
        self
    }

    /// Class name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_parts(self) -> (String, Vec<(String, Types, Option<Value>)>, ClassConfig) {
        (self.name, self.fields, self.config)
    }
}

/// Enum declaration
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    name: String,
    members: IndexMap<String, Value>,
}

impl EnumDef {
    /// Enum without members
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: IndexMap::new(),
        }
    }

    /// With a member
    #[must_use]
    pub fn with_member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    /// Enum name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    fn make(&self, name: &str, value: &Value) -> EnumValue {
        EnumValue::new(self.name.clone(), name, value.clone())
    }

    /// Member by name
    #[must_use]
    pub fn member(&self, name: &str) -> Option<EnumValue> {
        self.members
            .get_key_value(name)
            .map(|(name, value)| self.make(name, value))
    }

    /// Member by value
    #[must_use]
    pub fn by_value(&self, value: &Value) -> Option<EnumValue> {
        self.members
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, v)| self.make(name, v))
    }

    /// Member whose lowercased name is `name`
    #[must_use]
    pub fn by_lowercase_name(&self, name: &str) -> Option<EnumValue> {
        self.members
            .iter()
            .find(|(n, _)| n.to_lowercase() == name)
            .map(|(n, v)| self.make(n, v))
    }
}

/// Counterpart of a foreign-key relationship field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignLink {
    /// Class on the other side
    pub class: String,
    /// Field on the other side
    pub field: String,
    /// Other side holds a list
    pub many: bool,
}

/// Immutable class and enum registry
#[derive(Debug)]
pub struct Schema {
    config: SchemaConfig,
    classes: IndexMap<String, Arc<Cdef>>,
    enums: IndexMap<String, EnumDef>,
    links: HashMap<(String, String), ForeignLink>,
}

impl Schema {
    /// Start declaring a schema with default configuration
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new(SchemaConfig::default())
    }

    /// Schema-wide configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Class by name
    ///
    /// # Errors
    /// Returns [`Error::UnknownClass`] for unregistered names
    pub fn cdef(&self, name: &str) -> Result<&Arc<Cdef>> {
        self.classes
            .get(name)
            .ok_or_else(|| Error::UnknownClass(name.to_string()))
    }

    /// Registered classes in registration order
    pub fn classes(&self) -> impl Iterator<Item = &Arc<Cdef>> {
        self.classes.values()
    }

    /// Enum by name
    ///
    /// # Errors
    /// Returns [`Error::UnknownEnum`] for unregistered names
    pub fn enum_def(&self, name: &str) -> Result<&EnumDef> {
        self.enums
            .get(name)
            .ok_or_else(|| Error::UnknownEnum(name.to_string()))
    }

    /// Counterpart of a relationship field, if it has one
    #[must_use]
    pub fn link(&self, class: &str, field: &str) -> Option<&ForeignLink> {
        self.links.get(&(class.to_string(), field.to_string()))
    }
}

/// Collects declarations for a [`Schema`]
#[derive(Debug)]
pub struct SchemaBuilder {
    config: SchemaConfig,
    classes: Vec<ClassDef>,
    enums: Vec<EnumDef>,
}

impl SchemaBuilder {
    /// Builder with explicit configuration
    #[must_use]
    pub fn new(config: SchemaConfig) -> Self {
        Self {
            config,
            classes: Vec::new(),
            enums: Vec::new(),
        }
    }

    /// With a class
    #[must_use]
    pub fn class(mut self, def: ClassDef) -> Self {
        self.classes.push(def);
        self
    }

    /// With an enum
    #[must_use]
    pub fn enumeration(mut self, def: EnumDef) -> Self {
        self.enums.push(def);
        self
    }

    /// Compile and cross-check every declaration
    ///
    /// # Errors
    /// Returns a [`SchemaError`] for duplicate names, invalid classes,
    /// unresolved class or enum references, and relationships without a
    /// counterpart
    pub fn build(self) -> Result<Arc<Schema>, SchemaError> {
        let mut enums = IndexMap::new();
        for def in self.enums {
            if enums.contains_key(def.name()) {
                return Err(SchemaError::DuplicateEnum(def.name));
            }
            enums.insert(def.name.clone(), def);
        }

        let mut classes = IndexMap::new();
        for def in self.classes {
            if classes.contains_key(def.name()) {
                return Err(SchemaError::DuplicateClass(def.name));
            }
            let cdef = Cdef::new(def, &self.config)?;
            classes.insert(cdef.name().to_string(), Arc::new(cdef));
        }

        let mut schema = Schema {
            config: self.config,
            classes,
            enums,
            links: HashMap::new(),
        };
        schema.check_references()?;
        schema.links = schema.resolve_links()?;

        info!(
            classes = schema.classes.len(),
            enums = schema.enums.len(),
            links = schema.links.len(),
            "schema built"
        );
        Ok(Arc::new(schema))
    }
}

/// Class and enum names mentioned anywhere in a pipeline
fn mentioned(fdef: &Fdef, classes: &mut Vec<String>, enums: &mut Vec<String>) {
    classes.extend(fdef.instance_class.iter().cloned());
    enums.extend(fdef.enum_class.iter().cloned());
    classes.extend(fdef.join_class.iter().cloned());
    if let Some(item) = &fdef.item_types {
        mentioned(item.fdef(), classes, enums);
    }
    for types in fdef.shape_types.iter().flat_map(|keys| keys.values()) {
        mentioned(types.fdef(), classes, enums);
    }
    for types in fdef.union_types.iter().flat_map(|candidates| candidates.iter()) {
        mentioned(types.fdef(), classes, enums);
    }
}

impl Schema {
    fn check_references(&self) -> Result<(), SchemaError> {
        for cdef in self.classes.values() {
            for field in cdef.fields() {
                let (mut classes, mut enums) = (Vec::new(), Vec::new());
                mentioned(field.fdef(), &mut classes, &mut enums);
                if let Some(target) = classes.into_iter().find(|c| !self.classes.contains_key(c)) {
                    return Err(SchemaError::UnresolvedClass {
                        class: cdef.name().to_string(),
                        field: field.name().to_string(),
                        target,
                    });
                }
                if let Some(target) = enums.into_iter().find(|e| !self.enums.contains_key(e)) {
                    return Err(SchemaError::UnresolvedEnum {
                        class: cdef.name().to_string(),
                        field: field.name().to_string(),
                        target,
                    });
                }
            }
        }
        Ok(())
    }

    /// Pair every relationship field with its counterpart
    ///
    /// Local keys may be one-sided; foreign keys must find their partner.
    fn resolve_links(&self) -> Result<HashMap<(String, String), ForeignLink>, SchemaError> {
        let mut links = HashMap::new();
        for cdef in self.classes.values() {
            for field in cdef.fields() {
                let fdef = field.fdef();
                let Some(target) = fdef.target_class() else {
                    continue;
                };
                let counterpart = match fdef.storage {
                    FieldStorage::LocalKey => self.find_counterpart(target, cdef.name(), |f| {
                        f.storage == FieldStorage::ForeignKey
                            && !f.use_join_table
                            && f.foreign_key.as_deref() == Some(field.name())
                    }),
                    FieldStorage::ForeignKey => {
                        let found = match (&fdef.foreign_key, &fdef.join_class) {
                            (Some(key), _) => self
                                .classes
                                .get(target)
                                .and_then(|t| t.field(key))
                                .filter(|other| {
                                    let f = other.fdef();
                                    f.is_reference() && f.target_class() == Some(cdef.name())
                                }),
                            (None, Some(join)) => {
                                self.find_counterpart(target, cdef.name(), |f| {
                                    f.join_class.as_deref() == Some(join)
                                })
                            }
                            (None, None) => None,
                        };
                        if found.is_none() {
                            return Err(SchemaError::UnresolvedLink {
                                class: cdef.name().to_string(),
                                field: field.name().to_string(),
                                target: target.to_string(),
                            });
                        }
                        found
                    }
                    FieldStorage::Embedded | FieldStorage::Temp => None,
                };
                if let Some(other) = counterpart {
                    links.insert(
                        (cdef.name().to_string(), field.name().to_string()),
                        ForeignLink {
                            class: target.to_string(),
                            field: other.name().to_string(),
                            many: other.fdef().is_many(),
                        },
                    );
                }
            }
        }
        Ok(links)
    }

    /// Field of `target` referring back to `class` and matching `accept`
    fn find_counterpart(
        &self,
        target: &str,
        class: &str,
        accept: impl Fn(&Fdef) -> bool,
    ) -> Option<&JField> {
        self.classes.get(target)?.fields().iter().find(|f| {
            let fdef = f.fdef();
            fdef.is_reference() && fdef.target_class() == Some(class) && accept(fdef)
        })
    }
}
