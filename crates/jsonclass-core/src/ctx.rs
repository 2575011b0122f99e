//! Execution context
//!
//! A [`Ctx`] is created fresh for every top-level pass (one create, one
//! validate, one serialization) and threaded by value through the recursive
//! descent. Each step derives a new context with the value, keypaths, owner
//! or field definition replaced. The only state shared between sibling
//! branches is the [`LookupMap`], which deduplicates objects by
//! `(class, primary key)` for the duration of the pass.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::rc::Rc;
use std::sync::Arc;

use jsonclass_value::{Keypath, ObjectId, Value};

use crate::cdef::{Cdef, JField};
use crate::error::{Error, Result};
use crate::fdef::Fdef;

/// Identity map of one traversal
#[derive(Debug, Clone, Default)]
pub struct LookupMap {
    objects: HashMap<(String, String), ObjectId>,
    visited: HashSet<ObjectId>,
}

impl LookupMap {
    fn key(class: &str, id: &Value) -> Option<(String, String)> {
        let id = match id {
            Value::Str(s) => format!("s:{s}"),
            Value::Int(i) => format!("i:{i}"),
            _ => return None,
        };
        Some((class.to_string(), id))
    }

    /// Object already seen with this primary key
    #[must_use]
    pub fn fetch(&self, class: &str, id: &Value) -> Option<ObjectId> {
        Self::key(class, id).and_then(|key| self.objects.get(&key).copied())
    }

    /// Record an object under its primary key
    ///
    /// Keys that are neither strings nor integers are not recorded.
    pub fn put(&mut self, class: &str, id: &Value, object: ObjectId) {
        if let Some(key) = Self::key(class, id) {
            self.objects.insert(key, object);
        }
    }

    /// Mark an object visited, returning `false` if it already was
    pub fn visit(&mut self, object: ObjectId) -> bool {
        self.visited.insert(object)
    }

    /// Take over primary key registrations made on another map
    pub fn adopt(&mut self, other: &LookupMap) {
        self.objects
            .extend(other.objects.iter().map(|(key, id)| (key.clone(), *id)));
    }

    /// Number of objects registered by primary key
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check for an empty map
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// State of one pipeline invocation
#[derive(Debug, Clone)]
pub struct Ctx {
    /// Value being processed
    pub value: Value,
    /// Keypath from the root object, in output key names
    pub keypath_root: Keypath,
    /// Keypath from the owning object, in field names
    pub keypath_owner: Keypath,
    /// Object the pass was invoked on
    pub root: Option<ObjectId>,
    /// Object owning the current field
    pub owner: Option<ObjectId>,
    /// Existing object to transform input into
    pub dest: Option<ObjectId>,
    /// Class of the owning object
    pub cdef_owner: Option<Arc<Cdef>>,
    /// Definition of the current field
    pub fdef: Arc<Fdef>,
    /// Collect-all (`Some(true)`) or fail-fast (`Some(false)`); `None` follows class config
    pub all_fields: Option<bool>,
    /// Fill fields absent from input with their defaults
    pub fill_blanks: bool,
    /// Serialize write-only fields too
    pub ignore_writeonly: bool,
    /// Caller acting on the graph
    pub operator: Option<Value>,
    /// Class names being serialized, outermost first
    pub entity_chain: im::Vector<String>,
    /// Current nesting depth
    pub depth: usize,
    /// Nesting depth limit
    pub max_depth: usize,
    lookup: Rc<RefCell<LookupMap>>,
}

impl Ctx {
    /// Root context with a fresh lookup map
    #[must_use]
    pub fn new(value: Value, max_depth: usize) -> Self {
        Self {
            value,
            keypath_root: Keypath::root(),
            keypath_owner: Keypath::root(),
            root: None,
            owner: None,
            dest: None,
            cdef_owner: None,
            fdef: Arc::new(Fdef::default()),
            all_fields: None,
            fill_blanks: false,
            ignore_writeonly: false,
            operator: None,
            entity_chain: im::Vector::new(),
            depth: 0,
            max_depth,
            lookup: Rc::new(RefCell::new(LookupMap::default())),
        }
    }

    /// Same context, another value
    #[inline]
    #[must_use]
    pub fn with_value(&self, value: Value) -> Self {
        let mut ctx = self.clone();
        ctx.value = value;
        ctx
    }

    /// Context for an item or key one level down
    ///
    /// # Errors
    /// Returns a validation error when the nesting limit is exceeded
    pub fn descend(&self, value: Value, key: impl Display) -> Result<Self> {
        let mut ctx = self.clone();
        ctx.value = value;
        ctx.keypath_root = self.keypath_root.child(&key);
        ctx.keypath_owner = self.keypath_owner.child(&key);
        ctx.dest = None;
        ctx.deeper()?;
        Ok(ctx)
    }

    /// Context for a field of `owner`
    ///
    /// # Errors
    /// Returns a validation error when the nesting limit is exceeded
    pub fn for_field(
        &self,
        owner: ObjectId,
        cdef: &Arc<Cdef>,
        field: &JField,
        value: Value,
    ) -> Result<Self> {
        let mut ctx = self.clone();
        ctx.value = value;
        ctx.keypath_root = self.keypath_root.child(field.json_name());
        ctx.keypath_owner = Keypath::single(field.name());
        ctx.owner = Some(owner);
        ctx.dest = None;
        ctx.cdef_owner = Some(Arc::clone(cdef));
        ctx.deeper()?;
        Ok(ctx)
    }

    fn deeper(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.fail(format!(
                "Value at '{}' exceeds the maximum nesting depth of {}.",
                self.keypath_root, self.max_depth
            )));
        }
        Ok(())
    }

    /// Copy with a private snapshot of the lookup map
    ///
    /// Used for speculative passes whose registrations must not leak.
    #[must_use]
    pub fn isolated(&self) -> Self {
        let mut ctx = self.clone();
        let snapshot = self.lookup.borrow().clone();
        ctx.lookup = Rc::new(RefCell::new(snapshot));
        ctx
    }

    /// Keep the primary key registrations of an accepted isolated pass
    pub fn commit(&self, trial: &Ctx) {
        if Rc::ptr_eq(&self.lookup, &trial.lookup) {
            return;
        }
        let registered = trial.lookup.borrow();
        self.lookup.borrow_mut().adopt(&registered);
    }

    /// Object already seen with this primary key
    #[must_use]
    pub fn fetch(&self, class: &str, id: &Value) -> Option<ObjectId> {
        self.lookup.borrow().fetch(class, id)
    }

    /// Record an object under its primary key
    pub fn put(&self, class: &str, id: &Value, object: ObjectId) {
        self.lookup.borrow_mut().put(class, id, object);
    }

    /// Mark an object visited, returning `false` if it already was
    pub fn visit(&self, object: ObjectId) -> bool {
        self.lookup.borrow_mut().visit(object)
    }

    /// Effective aggregation mode for a class
    #[inline]
    #[must_use]
    pub fn collect_all(&self, cdef: &Cdef) -> bool {
        self.all_fields.unwrap_or(cdef.validate_all_fields())
    }

    /// Aggregation mode for collections, following the owning class
    #[must_use]
    pub fn collect_items(&self) -> bool {
        self.all_fields
            .or_else(|| self.cdef_owner.as_ref().map(|c| c.validate_all_fields()))
            .unwrap_or(false)
    }

    /// Validation error at the current keypath
    #[must_use]
    pub fn fail(&self, message: impl Into<String>) -> Error {
        Error::validation(&self.keypath_root, message, self.root)
    }
}
