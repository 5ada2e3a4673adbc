//! Infer a JSON-Schema-like description from sample JSON documents.
//!
//! Feed raw samples to [`Infer`] one at a time; each call widens the schema
//! tree just enough to accept everything seen so far. Integers widen to
//! numbers, incompatible types branch into unions, nulls set a nullable flag,
//! objects keep a shrink-only required set. The tree renders into the wire
//! form with [`SchemaNode::to_raw`] and serializes to JSON or YAML; raw
//! schema documents (which may carry multi-tag `type` fields) are validated
//! and collapsed into single-typed schemas by [`resolve`].
//!
//! ```
//! use json_mold::Infer;
//!
//! let mut inf = Infer::new();
//! inf.apply(br#"{"id": 1, "tag": "a"}"#).unwrap();
//! inf.apply(br#"{"id": 2.5}"#).unwrap();
//!
//! let raw = inf.target().to_raw();
//! assert_eq!(
//!     serde_json::to_value(&raw).unwrap(),
//!     serde_json::json!({
//!         "type": "object",
//!         "properties": {
//!             "id": {"type": "number"},
//!             "tag": {"type": "string"},
//!         },
//!         "required": ["id"],
//!     }),
//! );
//! ```

pub mod cli;
pub mod inference;
pub mod jq;
pub mod path_de;
pub mod raw;
pub mod resolve;
pub mod schema;

pub use inference::Infer;
pub use path_de::DecodeError;
pub use raw::{RawSchema, RawType};
pub use resolve::{ResolveError, Schema, SchemaType, resolve};
pub use schema::{ObjectShape, SchemaNode, Shape, TypeTag};
