//! JSON classes
//!
//! Declarative schemas for structured data objects:
//! - Fields are declared with chainable, immutable modifier pipelines
//! - Input is transformed into objects of a [`Graph`] arena
//! - Objects are validated with keypath-addressed error messages
//! - Bidirectional relationships stay consistent on every assignment
//! - Objects serialize back to JSON with camelized keys
//!
//! # Example
//!
//! ```rust
//! use jsonclass_core::{types, ClassDef, Graph, Schema};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::builder()
//!     .class(
//!         ClassDef::new("User")
//!             .field("user_name", types().str().trim().required())
//!             .field("age", types().int().min(0.0)),
//!     )
//!     .build()?;
//!
//! let mut graph = Graph::new(schema);
//! let user = graph.create("User", json!({"userName": "  kat ", "age": 3}))?;
//! graph.validate(user)?;
//!
//! let output = graph.to_json(user)?;
//! assert_eq!(output["userName"], json!("kat"));
//! # Ok(())
//! # }
//! ```

pub mod cdef;
pub mod config;
pub mod ctx;
pub mod error;
pub mod fdef;
pub mod graph;
pub mod modifier;
pub mod schema;
pub mod types;

mod link;
mod modifiers;

pub use cdef::{Cdef, JField};
pub use config::{ClassConfig, KeyTransformer, PassOptions, SchemaConfig};
pub use ctx::{Ctx, LookupMap};
pub use error::{Error, Result, SchemaError, ValidationError};
pub use fdef::{
    DeleteRule, EnumInput, EnumOutput, Fdef, FieldStorage, FieldType, FieldUsage, Nullability,
    ReadRule, Strictness, WriteRule,
};
pub use graph::{Graph, Object};
pub use modifier::Modifier;
pub use modifiers::{verify_password, Verdict};
pub use schema::{ClassDef, EnumDef, ForeignLink, Schema, SchemaBuilder};
pub use types::{types, Types};

pub use jsonclass_value::{keys, Dict, EnumValue, Keypath, ObjectId, Value};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for declaring schemas and working with graphs
    pub use crate::{
        types, ClassConfig, ClassDef, EnumDef, Error, Graph, ObjectId, PassOptions, Schema,
        SchemaConfig, Types, Value, Verdict,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
