//! Incremental schema inference.
//!
//! Stream JSON samples in, one [`Infer::apply`] call per document, and the
//! engine folds each value into a single mutable schema tree. The merge is
//! deterministic for any permutation of an observation multiset:
//! - integer widens to number once a non-integral value is seen, irreversibly;
//! - incompatible primitive tags branch into a union of scalar alternatives;
//! - nulls only set the nullable flag, never branch;
//! - array elements share one item node, object keys merge recursively and
//!   the required set only ever shrinks after the first object.

use serde_json::{Map, Number, Value};

use crate::path_de::{self, DecodeError};
use crate::schema::{SchemaNode, TypeTag};

// ------------------------------ Front API --------------------------------- //

/// Folds JSON samples into a schema tree it owns.
///
/// Single-threaded by design: calls against one instance must be serialized
/// by the caller. The tree is handed over with [`Infer::into_target`] once
/// inference is complete.
#[derive(Debug, Clone, Default)]
pub struct Infer {
    target: SchemaNode,
}

impl Infer {
    pub fn new() -> Self {
        Infer::default()
    }

    /// Decode exactly one JSON value from `data` and merge it into the tree.
    ///
    /// Decoding completes before any mutation, so a failed call leaves the
    /// tree untouched; the error carries the JSON path (array index or
    /// property key) at which the input stopped being well-formed. Any
    /// well-formed value succeeds, however exotic.
    pub fn apply(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        let value: Value = path_de::from_slice(data)?;
        self.apply_value(&value);
        Ok(())
    }

    /// Merge an already-decoded value into the tree. Infallible.
    pub fn apply_value(&mut self, value: &Value) {
        merge(&mut self.target, value);
    }

    /// The current root. Not a snapshot: callers must not hold on to it
    /// across further applies.
    pub fn target(&self) -> &SchemaNode {
        &self.target
    }

    /// Hand the inferred tree over by value.
    pub fn into_target(self) -> SchemaNode {
        self.target
    }
}

// ------------------------------- Merge ------------------------------------ //

fn merge(node: &mut SchemaNode, value: &Value) {
    match value {
        Value::Null => node.nullable = true,
        Value::Bool(_) => node.ensure_type(TypeTag::Boolean),
        Value::String(_) => node.ensure_type(TypeTag::String),
        Value::Number(number) => merge_number(node, number),
        Value::Array(elements) => {
            node.ensure_type(TypeTag::Array);
            for element in elements {
                let item = node.items.get_or_insert_with(Box::default);
                merge(item, element);
            }
        }
        Value::Object(map) => {
            node.ensure_type(TypeTag::Object);
            merge_object(node, map);
        }
    }
}

fn merge_number(node: &mut SchemaNode, number: &Number) {
    let integral = number.is_i64() || number.is_u64();
    if integral && !node.has_type(TypeTag::Number) {
        node.ensure_type(TypeTag::Integer);
        return;
    }
    if node.widen_integer_to_number() {
        return;
    }
    node.ensure_type(TypeTag::Number);
}

fn merge_object(node: &mut SchemaNode, map: &Map<String, Value>) {
    let first = node.object.is_none();
    let object = node.object.get_or_insert_with(Default::default);

    for (key, value) in map {
        if let Some(child) = object.properties.get_mut(key) {
            merge(child, value);
            continue;
        }
        // Unknown key: required only while recording the very first object.
        if first {
            object.required.insert(key.clone());
        }
        let mut child = SchemaNode::default();
        merge(&mut child, value);
        object.properties.insert(key.clone(), child);
    }

    // Required keys missing from this instance are gone for good.
    object.required.retain(|key| map.contains_key(key));
    object.normalize();
}

// ------------------------------- Tests ------------------------------------ //
