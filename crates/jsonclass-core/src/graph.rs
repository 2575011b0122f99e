//! Object graphs
//!
//! A [`Graph`] is an arena of objects of one [`Schema`]. Objects refer to
//! each other by [`ObjectId`], so bidirectional relationships never form
//! ownership cycles. Every pass over an object (create, validate, output,
//! save) starts here and threads a fresh [`Ctx`] through the pipelines.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use jsonclass_value::{Keypath, ObjectId, Value};
use tracing::debug;

use crate::cdef::Cdef;
use crate::config::PassOptions;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::fdef::FieldStorage;
use crate::schema::Schema;
use crate::types::{types, Types};

/// One object of a graph
#[derive(Debug, Clone)]
pub struct Object {
    cdef: Arc<Cdef>,
    values: IndexMap<String, Value>,
    is_new: bool,
    modified: IndexSet<String>,
    previous: HashMap<String, Value>,
    local_keys: HashMap<String, Value>,
    pub(crate) detached: HashMap<String, Vec<ObjectId>>,
}

impl Object {
    fn new(cdef: Arc<Cdef>) -> Self {
        let values = cdef
            .fields()
            .iter()
            .map(|f| (f.name().to_string(), Value::Null))
            .collect();
        Self {
            cdef,
            values,
            is_new: true,
            modified: IndexSet::new(),
            previous: HashMap::new(),
            local_keys: HashMap::new(),
            detached: HashMap::new(),
        }
    }

    /// Class of the object
    #[inline]
    #[must_use]
    pub fn class(&self) -> &Arc<Cdef> {
        &self.cdef
    }

    /// Current value of a field
    #[inline]
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// All field values in declaration order
    #[inline]
    #[must_use]
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Not yet saved
    #[inline]
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Field changed since the object was last saved
    #[inline]
    #[must_use]
    pub fn is_modified(&self, field: &str) -> bool {
        self.modified.contains(field)
    }

    /// Fields changed since the object was last saved, in change order
    pub fn modified_fields(&self) -> impl Iterator<Item = &str> {
        self.modified.iter().map(String::as_str)
    }

    /// Value a modified field had when the object was last saved
    #[inline]
    #[must_use]
    pub fn previous(&self, field: &str) -> Option<&Value> {
        self.previous.get(field)
    }

    /// Stored reference key of a local-key field
    #[inline]
    #[must_use]
    pub fn local_key(&self, field: &str) -> Option<&Value> {
        self.local_keys.get(field)
    }

    /// Objects unlinked from a field by its latest assignment
    #[must_use]
    pub fn detached(&self, field: &str) -> &[ObjectId] {
        self.detached.get(field).map_or(&[], Vec::as_slice)
    }

    fn mark_saved(&mut self) {
        self.is_new = false;
        self.modified.clear();
        self.previous.clear();
        for field in self.cdef.fields() {
            if field.fdef().storage == FieldStorage::Temp {
                self.values.insert(field.name().to_string(), Value::Null);
            }
        }
    }
}

/// Arena of objects sharing one schema
#[derive(Debug, Clone)]
pub struct Graph {
    schema: Arc<Schema>,
    objects: Vec<Object>,
}

impl Graph {
    /// Empty graph
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            objects: Vec::new(),
        }
    }

    /// Schema of the graph
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Number of objects
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check for an empty graph
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object by id
    ///
    /// # Errors
    /// Returns [`Error::UnknownObject`] for ids outside this graph
    pub fn object(&self, id: ObjectId) -> Result<&Object> {
        self.objects.get(id.index()).ok_or(Error::UnknownObject(id))
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object> {
        self.objects
            .get_mut(id.index())
            .ok_or(Error::UnknownObject(id))
    }

    /// Current value of a field
    ///
    /// # Errors
    /// Returns an error for unknown objects or undeclared fields
    pub fn get(&self, id: ObjectId, field: &str) -> Result<Value> {
        let object = self.object(id)?;
        object.cdef.field_named(field)?;
        Ok(object.values.get(field).cloned().unwrap_or_default())
    }

    pub(crate) fn alloc(&mut self, cdef: Arc<Cdef>) -> Result<ObjectId> {
        if cdef.is_abstract() {
            return Err(Error::AbstractClass(cdef.name().to_string()));
        }
        let id = ObjectId::new(self.objects.len());
        self.objects.push(Object::new(cdef));
        Ok(id)
    }

    /// Raw field write, tracking changes of saved objects
    pub(crate) fn write(&mut self, id: ObjectId, field: &str, value: Value) -> Result<()> {
        let object = self.object_mut(id)?;
        let current = object.values.get(field).cloned().unwrap_or_default();
        if current == value {
            return Ok(());
        }
        if !object.is_new {
            object.previous.entry(field.to_string()).or_insert(current);
            object.modified.insert(field.to_string());
        }
        object.values.insert(field.to_string(), value);
        Ok(())
    }

    pub(crate) fn set_local_key(&mut self, id: ObjectId, field: &str, key: Value) -> Result<()> {
        self.object_mut(id)?.local_keys.insert(field.to_string(), key);
        Ok(())
    }

    fn root_types(&self, id: ObjectId) -> Result<Types> {
        Ok(types().instanceof(self.object(id)?.cdef.name()))
    }

    fn root_ctx(&self, value: Value, root: Option<ObjectId>, options: &PassOptions) -> Ctx {
        let mut ctx = Ctx::new(value, self.schema.config().max_depth);
        ctx.root = root;
        ctx.dest = root;
        ctx.all_fields = options.all_fields;
        ctx.fill_blanks = options.fill_blanks;
        ctx.ignore_writeonly = options.ignore_writeonly;
        ctx.operator.clone_from(&options.operator);
        ctx
    }

    fn transform_into(&mut self, id: ObjectId, input: Value, options: &PassOptions) -> Result<()> {
        if !matches!(input, Value::Dict(_)) {
            let class = self.object(id)?.cdef.name().to_string();
            return Err(Error::validation(
                &Keypath::root(),
                format!("Input of '{class}' should be dict."),
                Some(id),
            ));
        }
        let ctx = self.root_ctx(input, Some(id), options);
        self.root_types(id)?.run_transform(&ctx, self)?;
        if let Some(operator) = &options.operator {
            self.assign_operator(id, Some(operator))?;
        }
        Ok(())
    }

    /// New object from input, filling absent fields with defaults
    ///
    /// # Errors
    /// Returns an error for unknown or abstract classes and rejected input
    pub fn create(&mut self, class: &str, input: impl Into<Value>) -> Result<ObjectId> {
        self.create_with(class, input, &PassOptions::new().with_fill_blanks(true))
    }

    /// New object from input under explicit options
    ///
    /// With an operator in `options`, operator fields are assigned too.
    ///
    /// # Errors
    /// Returns an error for unknown or abstract classes and rejected input
    pub fn create_with(
        &mut self,
        class: &str,
        input: impl Into<Value>,
        options: &PassOptions,
    ) -> Result<ObjectId> {
        let cdef = Arc::clone(self.schema.cdef(class)?);
        let id = self.alloc(cdef)?;
        debug!(class, %id, "create");
        self.transform_into(id, input.into(), options)?;
        Ok(id)
    }

    /// Object from input that is already saved
    ///
    /// Every object built from the input starts unmodified and not new.
    ///
    /// # Errors
    /// Returns an error for unknown or abstract classes and rejected input
    pub fn load(&mut self, class: &str, input: impl Into<Value>) -> Result<ObjectId> {
        let mark = self.objects.len();
        let id = self.create_with(class, input, &PassOptions::new())?;
        for object in &mut self.objects[mark..] {
            object.mark_saved();
        }
        Ok(id)
    }

    /// Patch an object from input without filling blanks
    ///
    /// # Errors
    /// Returns an error for unknown objects and rejected input
    pub fn set(&mut self, id: ObjectId, input: impl Into<Value>) -> Result<()> {
        self.set_with(id, input, &PassOptions::new())
    }

    /// Patch an object from input under explicit options
    ///
    /// # Errors
    /// Returns an error for unknown objects and rejected input
    pub fn set_with(
        &mut self,
        id: ObjectId,
        input: impl Into<Value>,
        options: &PassOptions,
    ) -> Result<()> {
        debug!(%id, "set");
        self.transform_into(id, input.into(), options)
    }

    /// Assign a field directly, keeping linked objects in sync
    ///
    /// The value is not transformed and write rules do not apply.
    ///
    /// # Errors
    /// Returns an error for unknown objects or undeclared fields
    pub fn assign(&mut self, id: ObjectId, field: &str, value: impl Into<Value>) -> Result<()> {
        debug!(%id, field, "assign");
        self.assign_field(id, field, value.into())
    }

    /// Validate an object and everything reachable from it
    ///
    /// # Errors
    /// Returns [`Error::Validation`] describing every rejected value gathered
    /// under the class's aggregation mode
    pub fn validate(&self, id: ObjectId) -> Result<()> {
        self.validate_with(id, &PassOptions::new())
    }

    /// Validate under explicit options
    ///
    /// # Errors
    /// Returns [`Error::Validation`] describing the rejected values
    pub fn validate_with(&self, id: ObjectId, options: &PassOptions) -> Result<()> {
        debug!(%id, all_fields = ?options.all_fields, "validate");
        let mut ctx = self.root_ctx(Value::Object(id), Some(id), options);
        ctx.dest = None;
        self.root_types(id)?.run_validate(&ctx, self)
    }

    /// Output form of an object
    ///
    /// # Errors
    /// Returns an error for unknown objects
    pub fn to_json(&self, id: ObjectId) -> Result<serde_json::Value> {
        self.to_json_with(id, &PassOptions::new())
    }

    /// Output form under explicit options
    ///
    /// # Errors
    /// Returns an error for unknown objects
    pub fn to_json_with(&self, id: ObjectId, options: &PassOptions) -> Result<serde_json::Value> {
        debug!(%id, "to_json");
        let mut ctx = self.root_ctx(Value::Object(id), Some(id), options);
        ctx.dest = None;
        Ok(self.root_types(id)?.run_tojson(&ctx, self)?.to_json())
    }

    /// Run the save pass: setters, save callbacks and save-time validation
    ///
    /// # Errors
    /// Returns [`Error::Validation`] when a save-time validator rejects a value
    pub fn set_on_save(&mut self, id: ObjectId) -> Result<()> {
        debug!(%id, "set_on_save");
        let mut ctx = self.root_ctx(Value::Object(id), Some(id), &PassOptions::new());
        ctx.dest = None;
        self.root_types(id)?.run_serialize(&ctx, self)?;
        Ok(())
    }

    /// Assign every operator field of an object from `operator`
    ///
    /// # Errors
    /// Returns [`Error::Unauthorized`] when the class has operator fields and
    /// no operator is given
    pub fn assign_operator(&mut self, id: ObjectId, operator: Option<&Value>) -> Result<()> {
        let cdef = Arc::clone(&self.object(id)?.cdef);
        for field in cdef.operator_fields() {
            let Some(operator) = operator.filter(|o| !o.is_null()) else {
                return Err(Error::Unauthorized {
                    class: cdef.name().to_string(),
                    field: field.name().to_string(),
                });
            };
            let value = field
                .fdef()
                .operator_transformer
                .as_ref()
                .map_or_else(|| operator.clone(), |t| t.apply(operator));
            debug!(%id, field = field.name(), "assign operator");
            self.assign_field(id, field.name(), value)?;
        }
        Ok(())
    }

    /// Mark an object saved: clears change tracking and temp fields
    ///
    /// # Errors
    /// Returns [`Error::UnknownObject`] for ids outside this graph
    pub fn mark_saved(&mut self, id: ObjectId) -> Result<()> {
        self.object_mut(id)?.mark_saved();
        Ok(())
    }

    /// Objects unlinked from a field by its latest assignment
    ///
    /// # Errors
    /// Returns an error for unknown objects or undeclared fields
    pub fn detached(&self, id: ObjectId, field: &str) -> Result<&[ObjectId]> {
        let object = self.object(id)?;
        object.cdef.field_named(field)?;
        Ok(object.detached(field))
    }

    /// Object not yet saved
    ///
    /// # Errors
    /// Returns [`Error::UnknownObject`] for ids outside this graph
    pub fn is_new(&self, id: ObjectId) -> Result<bool> {
        Ok(self.object(id)?.is_new)
    }

    /// Fields changed since the object was last saved
    ///
    /// # Errors
    /// Returns [`Error::UnknownObject`] for ids outside this graph
    pub fn modified_fields(&self, id: ObjectId) -> Result<Vec<&str>> {
        Ok(self.object(id)?.modified_fields().collect())
    }

    /// Value a modified field had when the object was last saved
    ///
    /// # Errors
    /// Returns an error for unknown objects or undeclared fields
    pub fn previous_value(&self, id: ObjectId, field: &str) -> Result<Option<&Value>> {
        let object = self.object(id)?;
        object.cdef.field_named(field)?;
        Ok(object.previous(field))
    }

    /// Stored reference key of a local-key field
    ///
    /// # Errors
    /// Returns an error for unknown objects or undeclared fields
    pub fn local_key(&self, id: ObjectId, field: &str) -> Result<Option<&Value>> {
        let object = self.object(id)?;
        object.cdef.field_named(field)?;
        Ok(object.local_key(field))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::ClassDef;
    use serde_json::json;

    pub(crate) fn empty_graph() -> Graph {
        Graph::new(Schema::builder().build().unwrap())
    }

    fn note_graph() -> Graph {
        let schema = Schema::builder()
            .class(
                ClassDef::new("Note")
                    .field("title", types().str().required())
                    .field("draft", types().str().temp())
                    .field("views", types().int().default(0)),
            )
            .build()
            .unwrap();
        Graph::new(schema)
    }

    #[test]
    fn unknown_ids_and_fields() {
        let graph = empty_graph();
        assert_eq!(
            graph.object(ObjectId::new(3)).unwrap_err(),
            Error::UnknownObject(ObjectId::new(3))
        );
        let mut graph = note_graph();
        let id = graph.create("Note", json!({"title": "a"})).unwrap();
        assert!(matches!(graph.get(id, "body"), Err(Error::UnknownField { .. })));
    }

    #[test]
    fn create_fills_defaults_and_set_does_not() {
        let mut graph = note_graph();
        let id = graph.create("Note", json!({"title": "a"})).unwrap();
        assert_eq!(graph.get(id, "views").unwrap(), Value::Int(0));
        let other = graph
            .create_with("Note", json!({"title": "b"}), &PassOptions::new())
            .unwrap();
        assert_eq!(graph.get(other, "views").unwrap(), Value::Null);
        graph.set(id, json!({"views": 3})).unwrap();
        assert_eq!(graph.get(id, "views").unwrap(), Value::Int(3));
        assert_eq!(graph.get(id, "title").unwrap(), Value::from("a"));
    }

    #[test]
    fn change_tracking_after_save() {
        let mut graph = note_graph();
        let id = graph.create("Note", json!({"title": "a", "draft": "x"})).unwrap();
        assert!(graph.is_new(id).unwrap());
        assert!(graph.modified_fields(id).unwrap().is_empty());
        graph.mark_saved(id).unwrap();
        assert!(!graph.is_new(id).unwrap());
        assert_eq!(graph.get(id, "draft").unwrap(), Value::Null);
        graph.set(id, json!({"title": "b"})).unwrap();
        graph.set(id, json!({"title": "c"})).unwrap();
        assert_eq!(graph.modified_fields(id).unwrap(), vec!["title"]);
        assert_eq!(
            graph.previous_value(id, "title").unwrap(),
            Some(&Value::from("a"))
        );
    }

    #[test]
    fn non_dict_input_is_rejected() {
        let mut graph = note_graph();
        let err = graph.create("Note", json!([1, 2])).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn load_starts_saved() {
        let mut graph = note_graph();
        let id = graph.load("Note", json!({"title": "a"})).unwrap();
        assert!(!graph.is_new(id).unwrap());
    }
}
