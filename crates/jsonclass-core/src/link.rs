//! Bidirectional relationship maintenance
//!
//! Assigning a relationship field keeps its counterpart on the linked
//! objects in sync and records which objects the assignment unlinked.
//! Counterparts are resolved once when the schema is built; fields without
//! one are written as plain values.

use std::sync::Arc;

use jsonclass_value::{Keypath, ObjectId, Value};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::schema::ForeignLink;

/// Object ids in first-seen order without repeats
fn dedup(ids: Vec<ObjectId>) -> Vec<ObjectId> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

fn as_list(ids: &[ObjectId]) -> Value {
    Value::List(ids.iter().copied().map(Value::Object).collect())
}

impl Graph {
    /// Assign a field, keeping linked objects in sync
    pub(crate) fn assign_field(&mut self, id: ObjectId, field: &str, value: Value) -> Result<()> {
        let cdef = Arc::clone(self.object(id)?.class());
        let many = cdef.field_named(field)?.fdef().is_many();
        self.object_mut(id)?.detached.remove(field);
        let Some(link) = self.schema().link(cdef.name(), field).cloned() else {
            return self.write(id, field, value);
        };
        if many {
            self.assign_many(id, field, &link, value)
        } else {
            self.assign_one(id, field, &link, value)
        }
    }

    /// Append objects to a list field
    ///
    /// Objects already in the list are kept once, linked counterparts are
    /// updated like for any assignment.
    ///
    /// # Errors
    /// Returns an error for unknown objects, undeclared fields, or fields
    /// that do not hold a list
    pub fn extend(
        &mut self,
        id: ObjectId,
        field: &str,
        items: impl IntoIterator<Item = ObjectId>,
    ) -> Result<()> {
        let object = self.object(id)?;
        if !object.class().field_named(field)?.fdef().is_many() {
            let class = object.class().name().to_string();
            return Err(Error::validation(
                &Keypath::single(field),
                format!("Value at '{field}' of '{class}' should be list."),
                Some(id),
            ));
        }
        let mut ids = self.get(id, field)?.object_ids();
        ids.extend(items);
        debug!(%id, field, "extend");
        self.assign_field(id, field, as_list(&ids))
    }

    fn assign_one(&mut self, id: ObjectId, field: &str, link: &ForeignLink, value: Value) -> Result<()> {
        if !value.is_null() && value.as_object().is_none() {
            return self.write(id, field, value);
        }
        let old = self.get(id, field)?.as_object();
        let new = value.as_object();
        if old != new {
            if let Some(old) = old {
                trace!(%id, field, remote = %old, "unlink");
                self.remove_reference(old, &link.field, id)?;
                self.record_detached(old, &link.field, id)?;
                self.record_detached(id, field, old)?;
            }
        }
        self.write(id, field, value)?;
        if let Some(new) = new {
            self.link_remote(new, link, id, field)?;
        }
        Ok(())
    }

    fn assign_many(&mut self, id: ObjectId, field: &str, link: &ForeignLink, value: Value) -> Result<()> {
        let new = match &value {
            Value::List(items) if items.iter().all(|item| item.as_object().is_some()) => {
                dedup(value.object_ids())
            }
            Value::Null => Vec::new(),
            // left for validation to report at the item keypaths
            _ => return self.write(id, field, value),
        };
        let old = self.get(id, field)?.object_ids();
        for &removed in old.iter().filter(|o| !new.contains(o)) {
            trace!(%id, field, remote = %removed, "unlink");
            self.remove_reference(removed, &link.field, id)?;
            self.record_detached(removed, &link.field, id)?;
            self.record_detached(id, field, removed)?;
        }
        let stored = if value.is_null() { Value::Null } else { as_list(&new) };
        self.write(id, field, stored)?;
        for &added in &new {
            self.link_remote(added, link, id, field)?;
        }
        Ok(())
    }

    /// Point the counterpart field of `remote` at `id`
    fn link_remote(&mut self, remote: ObjectId, link: &ForeignLink, id: ObjectId, field: &str) -> Result<()> {
        let current = self.get(remote, &link.field)?;
        if link.many {
            let mut ids = current.object_ids();
            if !ids.contains(&id) {
                trace!(%remote, field = %link.field, target = %id, "link");
                ids.push(id);
                self.write(remote, &link.field, as_list(&ids))?;
            }
            return Ok(());
        }
        match current.as_object() {
            Some(holder) if holder == id => Ok(()),
            Some(holder) => {
                // remote moves away from its previous holder
                trace!(%remote, field = %link.field, from = %holder, to = %id, "relink");
                self.remove_reference(holder, field, remote)?;
                self.record_detached(holder, field, remote)?;
                self.record_detached(remote, &link.field, holder)?;
                self.write(remote, &link.field, Value::Object(id))
            }
            None => {
                trace!(%remote, field = %link.field, target = %id, "link");
                self.write(remote, &link.field, Value::Object(id))
            }
        }
    }

    /// Drop `target` from a reference field, returning whether it was there
    fn remove_reference(&mut self, id: ObjectId, field: &str, target: ObjectId) -> Result<bool> {
        let next = match self.get(id, field)? {
            Value::List(items) => {
                let kept: Vec<Value> = items
                    .iter()
                    .filter(|v| v.as_object() != Some(target))
                    .cloned()
                    .collect();
                if kept.len() == items.len() {
                    return Ok(false);
                }
                Value::List(kept)
            }
            Value::Object(current) if current == target => Value::Null,
            _ => return Ok(false),
        };
        self.write(id, field, next)?;
        Ok(true)
    }

    fn record_detached(&mut self, id: ObjectId, field: &str, other: ObjectId) -> Result<()> {
        let record = self
            .object_mut(id)?
            .detached
            .entry(field.to_string())
            .or_default();
        if !record.contains(&other) {
            record.push(other);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ClassDef, Schema};
    use crate::types::types;
    use serde_json::json;

    fn graph() -> Graph {
        let schema = Schema::builder()
            .class(
                ClassDef::new("User")
                    .field("name", types().str())
                    .field("profile", types().instanceof("Profile").linkedby("user"))
                    .field("posts", types().listof(types().instanceof("Post")).linkedby("author")),
            )
            .class(
                ClassDef::new("Profile")
                    .field("bio", types().str())
                    .field("user", types().instanceof("User").linkto()),
            )
            .class(
                ClassDef::new("Post")
                    .field("title", types().str())
                    .field("author", types().instanceof("User").linkto()),
            )
            .build()
            .unwrap();
        Graph::new(schema)
    }

    #[test]
    fn one_to_one_stays_symmetric() {
        let mut g = graph();
        let user = g.create("User", json!({"name": "a"})).unwrap();
        let profile = g.create("Profile", json!({"bio": "b"})).unwrap();
        g.assign(profile, "user", user).unwrap();
        assert_eq!(g.get(user, "profile").unwrap(), Value::Object(profile));

        let other = g.create("Profile", json!({"bio": "c"})).unwrap();
        g.assign(user, "profile", other).unwrap();
        assert_eq!(g.get(other, "user").unwrap(), Value::Object(user));
        assert_eq!(g.get(profile, "user").unwrap(), Value::Null);
        assert_eq!(g.detached(user, "profile").unwrap(), &[profile]);
        assert_eq!(g.detached(profile, "user").unwrap(), &[user]);
    }

    #[test]
    fn one_to_many_moves_items_between_owners() {
        let mut g = graph();
        let a = g.create("User", json!({"name": "a"})).unwrap();
        let b = g.create("User", json!({"name": "b"})).unwrap();
        let post = g.create("Post", json!({"title": "t"})).unwrap();
        g.extend(a, "posts", [post]).unwrap();
        assert_eq!(g.get(post, "author").unwrap(), Value::Object(a));

        g.assign(post, "author", b).unwrap();
        assert_eq!(g.get(a, "posts").unwrap(), Value::List(vec![]));
        assert_eq!(g.get(b, "posts").unwrap(), Value::List(vec![Value::Object(post)]));
        assert_eq!(g.detached(post, "author").unwrap(), &[a]);
    }

    #[test]
    fn list_assignment_diffs_and_dedups() {
        let mut g = graph();
        let user = g.create("User", json!({"name": "a"})).unwrap();
        let p1 = g.create("Post", json!({"title": "1"})).unwrap();
        let p2 = g.create("Post", json!({"title": "2"})).unwrap();
        g.assign(user, "posts", vec![p1, p2, p1]).unwrap();
        assert_eq!(g.get(user, "posts").unwrap().object_ids(), vec![p1, p2]);

        g.assign(user, "posts", vec![p2]).unwrap();
        assert_eq!(g.get(p1, "author").unwrap(), Value::Null);
        assert_eq!(g.get(p2, "author").unwrap(), Value::Object(user));
        assert_eq!(g.detached(user, "posts").unwrap(), &[p1]);

        g.assign(user, "posts", vec![p2]).unwrap();
        assert!(g.detached(user, "posts").unwrap().is_empty());
    }

    #[test]
    fn extend_rejects_single_fields() {
        let mut g = graph();
        let user = g.create("User", json!({"name": "a"})).unwrap();
        let post = g.create("Post", json!({"title": "t"})).unwrap();
        assert!(g.extend(post, "author", [user]).unwrap_err().is_validation());
    }
}
