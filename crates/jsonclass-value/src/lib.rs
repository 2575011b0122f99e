//! JSON class values
//!
//! The data layer shared by every pass of the JSON class engine.
//!
//! # Core Concepts
//!
//! - [`Value`]: dynamic value (scalars, dates, enum members, lists, dicts, object handles)
//! - [`ObjectId`]: handle of an object inside an arena
//! - [`Keypath`]: dotted location of a value, the key of validation messages
//! - [`keys`]: camelize / underscore and reference key naming
//!
//! # Example
//!
//! ```rust
//! use jsonclass_value::{Keypath, Value};
//!
//! let value = Value::from(serde_json::json!({"counts": [1, 2]}));
//! assert!(value.as_dict().is_some());
//!
//! let path = Keypath::single("counts").child(0);
//! assert_eq!(path.to_string(), "counts.0");
//! ```

mod keypath;
pub mod keys;
mod value;

pub use keypath::{Keypath, KeypathError};
pub use value::{Dict, EnumValue, ObjectId, Value, DATETIME_FORMAT, DATE_FORMAT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
