//! The node model the inference engine mutates.
//!
//! Every position in the sampled data gets one [`SchemaNode`]. A node is
//! either scalar (at most one primitive tag) or a union of scalar branches;
//! the conversion is one-way and happens the first time an incompatible tag
//! is observed at the position. Nullability, array item evidence and object
//! property evidence live on the node itself, orthogonal to its shape.

use std::collections::BTreeSet;
use std::fmt;
use std::mem;

use indexmap::IndexMap;

use crate::raw::RawSchema;

// ------------------------------ Type tags --------------------------------- //

/// Primitive tag vocabulary the engine can record.
///
/// `null` is deliberately not a tag: observing a null only sets the node's
/// nullable flag and never creates a union branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TypeTag {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl TypeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Integer => "integer",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ------------------------------ Node shape -------------------------------- //

/// Scalar-vs-union duality of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Zero or one primitive tag observed so far.
    Scalar(Option<TypeTag>),
    /// Two or more incompatible tags observed. Each branch is scalar-shaped
    /// by construction; once branched, the node's own marker slot is gone and
    /// membership checks traverse the branch list.
    Union(Vec<SchemaNode>),
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Scalar(None)
    }
}

/// Structural description inferred so far at one JSON position.
///
/// Nodes are exclusively owned by their parent: the tree is strictly
/// hierarchical, with no sharing and no cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    pub shape: Shape,
    /// Set once a null has been observed here; never causes branching.
    pub nullable: bool,
    /// Single child shared by every element of every array observed here,
    /// created lazily on the first element seen. Position-independent.
    pub items: Option<Box<SchemaNode>>,
    /// Object evidence. `None` means no object has been observed here yet,
    /// which is distinct from having observed an empty object.
    pub object: Option<ObjectShape>,
}

/// Property evidence for a node that has seen at least one object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    /// Name to child node, re-sorted by name after every merge so rendering
    /// never depends on encounter order.
    pub properties: IndexMap<String, SchemaNode>,
    /// Names present in every object instance since first recorded. Shrinks
    /// or stays equal after the first object; never grows back.
    pub required: BTreeSet<String>,
}

impl ObjectShape {
    /// Post-merge normalization: property order is sorted-by-name, not
    /// encounter order. `required` is kept lexicographic by its set type.
    pub(crate) fn normalize(&mut self) {
        self.properties.sort_keys();
    }
}

impl SchemaNode {
    /// A fresh node carrying exactly one tag.
    pub fn tagged(tag: TypeTag) -> Self {
        SchemaNode {
            shape: Shape::Scalar(Some(tag)),
            ..SchemaNode::default()
        }
    }

    /// Whether `tag` is already recorded, on the own marker or any branch.
    pub fn has_type(&self, tag: TypeTag) -> bool {
        match &self.shape {
            Shape::Scalar(marker) => *marker == Some(tag),
            Shape::Union(branches) => branches.iter().any(|branch| branch.has_type(tag)),
        }
    }

    /// Record `tag`, branching into a union if an incompatible tag is
    /// already present. A no-op when the tag is already recorded.
    pub(crate) fn ensure_type(&mut self, tag: TypeTag) {
        if self.has_type(tag) {
            return;
        }
        if let Shape::Union(branches) = &mut self.shape {
            branches.push(SchemaNode::tagged(tag));
            return;
        }
        if matches!(self.shape, Shape::Scalar(None)) {
            self.shape = Shape::Scalar(Some(tag));
            return;
        }
        // Incompatible tag on a typed scalar: promote the whole prior
        // description (marker, nullability, payload) into the first branch.
        let prior = mem::take(self);
        self.shape = Shape::Union(vec![prior, SchemaNode::tagged(tag)]);
    }

    /// Replace an `integer` marker with `number`, in place, wherever it
    /// lives. Widening never creates a branch. Returns false if no integer
    /// marker exists.
    pub(crate) fn widen_integer_to_number(&mut self) -> bool {
        match &mut self.shape {
            Shape::Scalar(Some(tag @ TypeTag::Integer)) => {
                *tag = TypeTag::Number;
                true
            }
            Shape::Scalar(_) => false,
            Shape::Union(branches) => branches
                .iter_mut()
                .any(|branch| branch.widen_integer_to_number()),
        }
    }

    /// Render into the wire form. A single marker becomes a one-tag `type`,
    /// a union becomes `oneOf`, and the never-an-object sentinel stays
    /// distinguishable from an observed empty object.
    pub fn to_raw(&self) -> RawSchema {
        let mut raw = RawSchema::default();
        match &self.shape {
            Shape::Scalar(None) => {}
            Shape::Scalar(Some(tag)) => raw.ty = crate::raw::RawType::single(tag.as_str()),
            Shape::Union(branches) => {
                raw.one_of = branches.iter().map(SchemaNode::to_raw).collect();
            }
        }
        raw.nullable = self.nullable;
        raw.items = self.items.as_deref().map(|item| Box::new(item.to_raw()));
        if let Some(object) = &self.object {
            raw.properties = Some(
                object
                    .properties
                    .iter()
                    .map(|(name, node)| (name.clone(), node.to_raw()))
                    .collect(),
            );
            raw.required = object.required.iter().cloned().collect();
        }
        raw
    }
}
