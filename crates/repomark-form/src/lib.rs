//! Form bridge: flat form submissions in, typed data and redisplayable echo out.
//!
//! ## Overview
//!
//! A browser form posts a flat list of `key=value` pairs. Keys carry a path:
//! dot-separated property names, with `#<n>` segments addressing list
//! indices (`tags.#0`, `owners.#1.name`). This crate turns such a submission
//! into:
//!
//! - `data`: the schema-validated, transformed value deserialized into the
//!   caller's type. Present only when validation succeeds.
//! - `echo`: the submitted values reshaped to the schema with per-field
//!   error lists attached, so a failed form can be rendered again with every
//!   entry preserved.
//!
//! ## Pipeline
//!
//! ```text
//! Submission ──decode──> RawNode ──shape(schema)──> Shaped ──┐
//!                           │                                 ├─merge─> EchoNode
//!                           └──schema.validate──> ErrorTree ──┘
//!                                       │
//!                                       └─ Ok(Value) ──serde──> T
//! ```
//!
//! | Module   | Responsibility                                            |
//! |----------|-----------------------------------------------------------|
//! | `value`  | `FormValue`, `Blob`, `Submission`, `RawNode`              |
//! | `path`   | `PathSegment` tagging of key segments                     |
//! | `decode` | Flat pairs → nested `RawNode`, `DecodeLimits`             |
//! | `schema` | `Schema` variants, leaf pipelines, validation             |
//! | `errors` | `ErrorTree` produced by validation                        |
//! | `shape`  | Structural projection of input onto a schema              |
//! | `echo`   | `EchoNode` and the error-tree merge                       |
//! | `parse`  | `parse_form` orchestration and `ParsedForm<T>`            |
//!
//! Echo values are never validated. Backend code must read `ParsedForm::data`
//! and only hand the echo back to the view layer.

pub mod decode;
pub mod echo;
pub mod error;
pub mod errors;
pub mod parse;
pub mod path;
pub mod schema;
pub mod shape;
pub mod value;

pub use decode::{DecodeLimits, decode, decode_with_limits};
pub use echo::{EchoNode, merge};
pub use error::{DecodeError, FormError};
pub use errors::ErrorTree;
pub use parse::{ParsedForm, parse_form, parse_form_with_limits};
pub use path::{PathSegment, format_path, parse_key};
pub use schema::{ArraySchema, LeafSchema, ObjectSchema, Schema, SchemaKind};
pub use shape::{Shaped, shape};
pub use value::{Blob, FormValue, RawNode, Submission};
