//! Union fields
//!
//! Candidates are tried in declaration order on an isolated, fail-fast copy
//! of the context; the first one that both transforms and validates the
//! value wins, and only its primary key registrations are kept. Objects
//! allocated by a rejected candidate stay in the graph but are unreachable
//! from the result.

use std::sync::Arc;

use jsonclass_value::Value;

use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::fdef::{Fdef, FieldType};
use crate::graph::Graph;
use crate::modifier::Modifier;
use crate::types::Types;

/// First matching candidate pipeline
#[derive(Debug, Clone)]
pub(crate) struct Union {
    candidates: Arc<Vec<Types>>,
}

impl Union {
    pub(crate) fn new(candidates: Vec<Types>) -> Self {
        Self {
            candidates: Arc::new(candidates),
        }
    }

    fn trial(ctx: &Ctx) -> Ctx {
        let mut trial = ctx.isolated();
        trial.all_fields = Some(false);
        trial
    }

    /// Candidate accepting the value as it is
    fn matching(&self, ctx: &Ctx, graph: &Graph) -> Result<Option<&Types>> {
        for candidate in self.candidates.iter() {
            match candidate.run_validate(&Self::trial(ctx), graph) {
                Ok(()) => return Ok(Some(candidate)),
                Err(Error::Validation(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    fn mismatch(ctx: &Ctx) -> Error {
        ctx.fail(format!(
            "Value at '{}' does not match any union type.",
            ctx.keypath_root
        ))
    }
}

impl Modifier for Union {
    fn define(&self, fdef: &mut Fdef) {
        fdef.field_type = FieldType::Union;
        fdef.union_types = Some(Arc::clone(&self.candidates));
    }

    fn transform(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        for candidate in self.candidates.iter() {
            let trial = Self::trial(ctx);
            let value = match candidate.run_transform(&trial, graph) {
                Ok(value) => value,
                Err(Error::Validation(_)) => continue,
                Err(e) => return Err(e),
            };
            match candidate.run_validate(&trial.with_value(value.clone()), graph) {
                Ok(()) => {
                    ctx.commit(&trial);
                    return Ok(value);
                }
                Err(Error::Validation(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Err(Self::mismatch(ctx))
    }

    fn validate(&self, ctx: &Ctx, graph: &Graph) -> Result<()> {
        match self.matching(ctx, graph)? {
            Some(_) => Ok(()),
            None => Err(Self::mismatch(ctx)),
        }
    }

    fn tojson(&self, ctx: &Ctx, graph: &Graph) -> Result<Value> {
        match self.matching(ctx, graph)? {
            Some(candidate) => candidate.run_tojson(ctx, graph),
            None => Ok(ctx.value.clone()),
        }
    }

    fn serialize(&self, ctx: &Ctx, graph: &mut Graph) -> Result<Value> {
        match self.matching(ctx, graph)? {
            Some(candidate) => candidate.run_serialize(ctx, graph),
            None => Err(Self::mismatch(ctx)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::Graph;
    use crate::schema::{ClassDef, Schema};
    use crate::types::types;
    use jsonclass_value::Value;
    use serde_json::json;

    fn graph() -> Graph {
        let schema = Schema::builder()
            .class(
                ClassDef::new("Tag")
                    .field("id", types().str().primary())
                    .field("name", types().str()),
            )
            .class(
                ClassDef::new("Board")
                    .field("slot", types().union([types().int(), types().str()]))
                    .field(
                        "tags",
                        types().listof(types().union([types().instanceof("Tag")])),
                    ),
            )
            .build()
            .unwrap();
        Graph::new(schema)
    }

    #[test]
    fn first_accepting_candidate_wins() {
        let mut g = graph();
        let id = g.create("Board", json!({"slot": 3})).unwrap();
        assert_eq!(g.get(id, "slot").unwrap(), Value::Int(3));
        let id = g.create("Board", json!({"slot": "x"})).unwrap();
        assert_eq!(g.get(id, "slot").unwrap(), Value::from("x"));

        let err = g.create("Board", json!({"slot": true})).unwrap_err();
        assert_eq!(
            err.as_validation().unwrap().get("slot"),
            Some("Value at 'slot' does not match any union type.")
        );
    }

    #[test]
    fn validate_reports_mismatch() {
        let mut g = graph();
        let id = g.create("Board", json!({"slot": 3})).unwrap();
        assert!(g.validate(id).is_ok());
        g.assign(id, "slot", Value::Bool(true)).unwrap();
        let err = g.validate(id).unwrap_err();
        assert_eq!(
            err.as_validation().unwrap().get("slot"),
            Some("Value at 'slot' does not match any union type.")
        );
    }

    #[test]
    fn accepted_candidate_keeps_identity() {
        let mut g = graph();
        let board = g
            .create(
                "Board",
                json!({"tags": [{"id": "t1", "name": "a"}, {"id": "t1"}]}),
            )
            .unwrap();
        let tags = g.get(board, "tags").unwrap().object_ids();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], tags[1]);
        assert_eq!(g.get(tags[0], "name").unwrap(), Value::from("a"));
        assert!(g.validate(board).is_ok());
    }

    #[test]
    fn output_uses_matching_candidate() {
        let mut g = graph();
        let board = g
            .create("Board", json!({"slot": "x", "tags": [{"id": "t1", "name": "a"}]}))
            .unwrap();
        assert_eq!(
            g.to_json(board).unwrap(),
            json!({"slot": "x", "tags": [{"id": "t1", "name": "a"}]})
        );
    }
}
