//! Class definitions
//!
//! A [`Cdef`] is the compiled form of a [`ClassDef`](crate::ClassDef): its
//! fields with their output names, plus every role lookup a pass needs
//! (primary key, timestamps, delete rules, reference keys, operator fields)
//! computed once when the schema is built.

use std::collections::{HashMap, HashSet};

use jsonclass_value::keys::camelize;
use jsonclass_value::{Dict, Value};

use crate::config::{ClassConfig, SchemaConfig};
use crate::error::{Error, Result, SchemaError};
use crate::fdef::{DeleteRule, Fdef, FieldStorage, FieldUsage};
use crate::schema::ClassDef;
use crate::types::Types;

/// Field of a class
#[derive(Debug, Clone)]
pub struct JField {
    name: String,
    json_name: String,
    types: Types,
    default: Option<Value>,
    reference_key: Option<String>,
}

impl JField {
    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key used in output, camelized when the class camelizes
    #[inline]
    #[must_use]
    pub fn json_name(&self) -> &str {
        &self.json_name
    }

    /// Field pipeline
    #[inline]
    #[must_use]
    pub fn types(&self) -> &Types {
        &self.types
    }

    /// Field definition
    #[inline]
    #[must_use]
    pub fn fdef(&self) -> &Fdef {
        self.types.fdef()
    }

    /// Class-level default value
    #[inline]
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Key holding the stored id(s) of a local-key reference
    #[inline]
    #[must_use]
    pub fn reference_key(&self) -> Option<&str> {
        self.reference_key.as_deref()
    }
}

/// Compiled class
#[derive(Debug)]
pub struct Cdef {
    name: String,
    fields: Vec<JField>,
    by_name: HashMap<String, usize>,
    camelize_json_keys: bool,
    strict_input: bool,
    validate_all_fields: bool,
    is_abstract: bool,
    primary: Option<usize>,
    created_at: Option<usize>,
    updated_at: Option<usize>,
    deleted_at: Option<usize>,
    deny: Vec<usize>,
    nullify: Vec<usize>,
    cascade: Vec<usize>,
    operator_fields: Vec<usize>,
    reference_names: HashMap<String, usize>,
    accepted_keys: HashSet<String>,
}

fn claim(
    slot: &mut Option<usize>,
    index: usize,
    fields: &[JField],
    class: &str,
    role: &'static str,
) -> Result<(), SchemaError> {
    if let Some(first) = *slot {
        return Err(SchemaError::DuplicateRole {
            class: class.to_string(),
            role,
            first: fields[first].name.clone(),
            second: fields[index].name.clone(),
        });
    }
    *slot = Some(index);
    Ok(())
}

impl Cdef {
    /// Compile a class definition under schema-wide defaults
    ///
    /// # Errors
    /// Returns a [`SchemaError`] for duplicate fields, conflicting roles, or
    /// delete rules on fields that hold no references
    pub fn new(def: ClassDef, defaults: &SchemaConfig) -> Result<Self, SchemaError> {
        let (name, field_defs, config) = def.into_parts();
        let camelize_json_keys = config
            .camelize_json_keys
            .unwrap_or(defaults.camelize_json_keys);

        let mut cdef = Self {
            name,
            fields: Vec::with_capacity(field_defs.len()),
            by_name: HashMap::new(),
            camelize_json_keys,
            strict_input: config.strict_input.unwrap_or(defaults.strict_input),
            validate_all_fields: config
                .validate_all_fields
                .unwrap_or(defaults.validate_all_fields),
            is_abstract: config.is_abstract,
            primary: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
            deny: Vec::new(),
            nullify: Vec::new(),
            cascade: Vec::new(),
            operator_fields: Vec::new(),
            reference_names: HashMap::new(),
            accepted_keys: HashSet::new(),
        };

        for (field_name, types, default) in field_defs {
            if cdef.by_name.contains_key(&field_name) {
                return Err(SchemaError::DuplicateField {
                    class: cdef.name.clone(),
                    field: field_name,
                });
            }
            let index = cdef.fields.len();
            let types = types.with_owner(&cdef.name);
            let field = cdef.compile_field(field_name, types, default, &config);
            cdef.accepted_keys.insert(field.name.clone());
            cdef.accepted_keys.insert(field.json_name.clone());
            if let Some(key) = &field.reference_key {
                cdef.accepted_keys.insert(key.clone());
                cdef.accepted_keys.insert(camelize(key));
                cdef.reference_names.insert(key.clone(), index);
                cdef.reference_names.insert(camelize(key), index);
            }
            cdef.by_name.insert(field.name.clone(), index);
            cdef.fields.push(field);
            cdef.assign_roles(index)?;
        }
        Ok(cdef)
    }

    fn compile_field(
        &self,
        name: String,
        types: Types,
        default: Option<Value>,
        config: &ClassConfig,
    ) -> JField {
        let json_name = if self.camelize_json_keys {
            camelize(&name)
        } else {
            name.clone()
        };
        let fdef = types.fdef();
        let reference_key = (fdef.storage == FieldStorage::LocalKey)
            .then(|| config.reference_key(&name, fdef.is_many()));
        JField {
            name,
            json_name,
            types,
            default,
            reference_key,
        }
    }

    fn assign_roles(&mut self, index: usize) -> Result<(), SchemaError> {
        let fdef = self.fields[index].fdef().clone();
        let class = self.name.clone();
        if fdef.primary {
            claim(&mut self.primary, index, &self.fields, &class, "primary")?;
        }
        if let Some(usage) = fdef.usage {
            let slot = match usage {
                FieldUsage::CreatedAt => &mut self.created_at,
                FieldUsage::UpdatedAt => &mut self.updated_at,
                FieldUsage::DeletedAt => &mut self.deleted_at,
            };
            claim(slot, index, &self.fields, &class, usage.role())?;
        }
        if let Some(rule) = fdef.delete_rule {
            if !fdef.is_reference() {
                return Err(SchemaError::DeleteRuleOnPlainField {
                    class,
                    field: self.fields[index].name.clone(),
                });
            }
            match rule {
                DeleteRule::Deny => self.deny.push(index),
                DeleteRule::Nullify => self.nullify.push(index),
                DeleteRule::Cascade => self.cascade.push(index),
            }
        }
        if fdef.requires_operator_assign {
            self.operator_fields.push(index);
        }
        Ok(())
    }

    /// Class name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[JField] {
        &self.fields
    }

    /// Field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&JField> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Field by name, failing for undeclared names
    ///
    /// # Errors
    /// Returns [`Error::UnknownField`] when the class has no such field
    pub fn field_named(&self, name: &str) -> Result<&JField> {
        self.field(name)
            .ok_or_else(|| Error::unknown_field(&self.name, name))
    }

    fn pick(&self, slot: Option<usize>) -> Option<&JField> {
        slot.map(|i| &self.fields[i])
    }

    fn pick_all<'a>(&'a self, slots: &'a [usize]) -> impl Iterator<Item = &'a JField> + 'a {
        slots.iter().map(|&i| &self.fields[i])
    }

    /// Primary key field
    #[must_use]
    pub fn primary_field(&self) -> Option<&JField> {
        self.pick(self.primary)
    }

    /// Creation timestamp field
    #[must_use]
    pub fn created_at_field(&self) -> Option<&JField> {
        self.pick(self.created_at)
    }

    /// Update timestamp field
    #[must_use]
    pub fn updated_at_field(&self) -> Option<&JField> {
        self.pick(self.updated_at)
    }

    /// Soft deletion timestamp field
    #[must_use]
    pub fn deleted_at_field(&self) -> Option<&JField> {
        self.pick(self.deleted_at)
    }

    /// Reference fields blocking deletion
    pub fn deny_fields(&self) -> impl Iterator<Item = &JField> {
        self.pick_all(&self.deny)
    }

    /// Reference fields cleared on deletion
    pub fn nullify_fields(&self) -> impl Iterator<Item = &JField> {
        self.pick_all(&self.nullify)
    }

    /// Reference fields deleted along with the owner
    pub fn cascade_fields(&self) -> impl Iterator<Item = &JField> {
        self.pick_all(&self.cascade)
    }

    /// Fields assigned from the operator
    pub fn operator_fields(&self) -> impl Iterator<Item = &JField> {
        self.pick_all(&self.operator_fields)
    }

    /// Output keys are camelized
    #[inline]
    #[must_use]
    pub fn camelize_json_keys(&self) -> bool {
        self.camelize_json_keys
    }

    /// Unknown input keys are rejected
    #[inline]
    #[must_use]
    pub fn strict_input(&self) -> bool {
        self.strict_input
    }

    /// Validation collects every failure
    #[inline]
    #[must_use]
    pub fn validate_all_fields(&self) -> bool {
        self.validate_all_fields
    }

    /// Class cannot be instantiated
    #[inline]
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Input key names a field or a reference key
    #[must_use]
    pub fn accepts_key(&self, key: &str) -> bool {
        self.accepted_keys.contains(key)
    }

    /// Local-key field named by a reference key, in either casing
    #[must_use]
    pub fn field_for_reference_key(&self, key: &str) -> Option<&JField> {
        self.reference_names.get(key).map(|&i| &self.fields[i])
    }

    /// Output key for a field's reference key
    #[must_use]
    pub fn reference_json_key(&self, field: &JField) -> Option<String> {
        let key = field.reference_key()?;
        Some(if self.camelize_json_keys {
            camelize(key)
        } else {
            key.to_string()
        })
    }

    /// Input value of a field, looked up by output name then field name
    #[must_use]
    pub fn input_value<'a>(&self, input: &'a Dict, field: &JField) -> Option<&'a Value> {
        input
            .get(field.json_name())
            .or_else(|| input.get(field.name()))
    }

    /// Reference key input of a local-key field, in either casing
    #[must_use]
    pub fn reference_input<'a>(&self, input: &'a Dict, field: &JField) -> Option<&'a Value> {
        let key = field.reference_key()?;
        input.get(&camelize(key)).or_else(|| input.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassConfig;
    use crate::types::types;

    fn compile(def: ClassDef) -> Result<Cdef, SchemaError> {
        Cdef::new(def, &SchemaConfig::default())
    }

    #[test]
    fn json_names_follow_camelization() {
        let def = ClassDef::new("Post").field("created_at", types().datetime().tscreated());
        let cdef = compile(def).unwrap();
        let field = cdef.field("created_at").unwrap();
        assert_eq!(field.json_name(), "createdAt");
        assert_eq!(cdef.created_at_field().unwrap().name(), "created_at");

        let def = ClassDef::new("Post")
            .field("created_at", types().datetime())
            .with_config(ClassConfig::new().with_camelize_json_keys(false));
        let cdef = compile(def).unwrap();
        assert_eq!(cdef.field("created_at").unwrap().json_name(), "created_at");
    }

    #[test]
    fn reference_keys_are_accepted_in_both_casings() {
        let def = ClassDef::new("Article")
            .field("author", types().instanceof("Author").linkto())
            .field("tags", types().listof(types().instanceof("Tag")).linkto());
        let cdef = compile(def).unwrap();
        assert_eq!(cdef.field("author").unwrap().reference_key(), Some("author_id"));
        assert_eq!(cdef.field("tags").unwrap().reference_key(), Some("tag_ids"));
        assert!(cdef.accepts_key("authorId"));
        assert!(cdef.accepts_key("author_id"));
        assert_eq!(cdef.field_for_reference_key("tagIds").unwrap().name(), "tags");
        assert!(!cdef.accepts_key("editorId"));
    }

    #[test]
    fn duplicate_roles_are_rejected() {
        let def = ClassDef::new("User")
            .field("id", types().int().primary())
            .field("uid", types().int().primary());
        assert!(matches!(
            compile(def),
            Err(SchemaError::DuplicateRole { role: "primary", .. })
        ));
        let def = ClassDef::new("User")
            .field("a", types().datetime().tsupdated())
            .field("b", types().datetime().tsupdated());
        assert!(matches!(
            compile(def),
            Err(SchemaError::DuplicateRole { role: "updated-at", .. })
        ));
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let def = ClassDef::new("User")
            .field("name", types().str())
            .field("name", types().int());
        assert!(matches!(compile(def), Err(SchemaError::DuplicateField { .. })));
    }

    #[test]
    fn delete_rules_need_references() {
        let def = ClassDef::new("User").field("name", types().str().cascade());
        assert!(matches!(
            compile(def),
            Err(SchemaError::DeleteRuleOnPlainField { .. })
        ));
        let def = ClassDef::new("User").field(
            "posts",
            types().listof(types().instanceof("Post")).linkedby("author").cascade(),
        );
        let cdef = compile(def).unwrap();
        assert_eq!(cdef.cascade_fields().count(), 1);
    }

    #[test]
    fn fields_know_their_owner() {
        let cdef = compile(ClassDef::new("User").field("name", types().str())).unwrap();
        let fdef = cdef.field("name").unwrap().fdef();
        assert_eq!(fdef.owner_class.as_deref(), Some("User"));
        assert!(cdef.field_named("age").is_err());
    }
}
