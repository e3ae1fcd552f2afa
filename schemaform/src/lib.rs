//! # schemaform
//!
//! Renders HTML forms from JSON Schema documents and binds them to a JSON
//! value tree.
//!
//! Every bound control carries the dotted path of the value it edits
//! (`customer.address.street`, `items[2].price`), so reading the form back
//! is a matter of walking the controls and writing each value at its path.
//!
//! ## Features
//!
//! - Field generation for strings, numbers, integers, booleans, enums,
//!   consts, objects, arrays and `anyOf`/`oneOf` unions
//! - Variant detection for union values, with discriminator support
//! - Array items that can be appended and removed, with dense re-indexing
//! - Type-preserving data collection (numbers stay numbers)
//! - Native constraint validation before submission
//! - Schemas and data from JSON or TOML files, or derived with `schemars`
//!
//! ## Quick Start
//!
//! ```rust
//! use schemaform::SchemaForm;
//! use serde_json::json;
//!
//! let mut form = SchemaForm::new();
//! form.set_schema(&json!({
//!     "type": "object",
//!     "properties": {
//!         "name": {"type": "string"},
//!         "age": {"type": "integer", "minimum": 0, "maximum": 120}
//!     }
//! }));
//! form.set_data(json!({"name": "Ada", "age": 36}));
//! form.flush();
//!
//! form.input_path("age", "37").unwrap();
//! assert_eq!(form.get_data().unwrap(), json!({"name": "Ada", "age": 37}));
//! ```
//!
//! ## Modules
//!
//! - [`schema`] - Schema model and display metadata
//! - [`render`] - Schema to element tree rendering
//! - [`collect`] - Reading values back from the controls
//! - [`form`] - The form component

#[macro_use]
extern crate log;

/// Errors raised by path writes and form interactions.
pub mod error;

/// Path strings addressing locations in a value tree.
pub mod path;

/// Typed schema model parsed from JSON Schema documents.
pub mod schema;

/// Union variant detection.
pub mod detect;

/// Element tree the form renders into.
pub mod dom;

pub mod render;

pub mod collect;

/// Constraint validation of bound controls.
pub mod validity;

/// Presentation options.
pub mod options;

/// Loading documents from disk.
pub mod source;

pub mod form;

pub use error::{FormError, PathError};
pub use form::{EventCallback, FormEvent, FormState, SchemaForm};
pub use options::FormOptions;
pub use schema::Schema;
pub use serde_json::Value;
