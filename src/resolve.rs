//! Raw schema resolution.
//!
//! Collapses a raw, possibly multi-tag schema into a validated single-typed
//! one: a `"null"` tag beside other tags folds into the nullable flag, one
//! remaining tag becomes a plain typed schema, several become an explicit
//! union, and anything outside the tag vocabulary is a validation failure.
//! The inference engine only ever writes tags it computed from value kinds,
//! so resolving engine output cannot fail; this guards external producers.

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::raw::RawSchema;

/// Validated single type position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// No type constraint recorded at this position.
    #[default]
    Empty,
    String,
    Integer,
    Number,
    Boolean,
    Null,
    Array,
    Object,
}

impl SchemaType {
    /// Parse one raw tag against the fixed vocabulary.
    pub fn from_tag(tag: &str) -> Result<Self, ResolveError> {
        Ok(match tag {
            "string" => SchemaType::String,
            "integer" => SchemaType::Integer,
            "number" => SchemaType::Number,
            "boolean" => SchemaType::Boolean,
            "null" => SchemaType::Null,
            "array" => SchemaType::Array,
            "object" => SchemaType::Object,
            other => {
                return Err(ResolveError::UnknownType {
                    tag: other.to_owned(),
                });
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SchemaType::Empty)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown type tag `{tag}`")]
    UnknownType { tag: String },
}

/// Validated, single-typed schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "SchemaType::is_empty")]
    pub ty: SchemaType,
    #[serde(skip_serializing_if = "crate::raw::is_false")]
    pub nullable: bool,
    #[serde(rename = "oneOf", skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// Resolve `raw` recursively, validating every tag on the way.
pub fn resolve(raw: &RawSchema) -> Result<Schema, ResolveError> {
    let mut out = Schema::default();

    // Explicit branches first; branches expanded from a multi-tag `type`
    // are appended after them.
    for branch in &raw.one_of {
        out.one_of.push(resolve(branch)?);
    }

    let mut tags = Vec::new();
    let mut nullable = raw.nullable;
    for tag in raw.ty.iter() {
        let ty = SchemaType::from_tag(tag)?;
        if ty == SchemaType::Null && raw.ty.len() > 1 {
            // `"null"` beside other tags is the nullable flag, not a branch.
            nullable = true;
        } else {
            tags.push(ty);
        }
    }
    out.nullable = nullable;

    match tags.as_slice() {
        [] => {}
        [ty] => out.ty = *ty,
        types => out.one_of.extend(types.iter().map(|ty| Schema {
            ty: *ty,
            ..Schema::default()
        })),
    }

    out.items = match &raw.items {
        Some(items) => Some(Box::new(resolve(items)?)),
        None => None,
    };
    if let Some(props) = &raw.properties {
        let mut properties = IndexMap::with_capacity(props.len());
        for (name, child) in props {
            properties.insert(name.clone(), resolve(child)?);
        }
        out.properties = Some(properties);
    }
    out.required = raw.required.clone();

    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::inference::Infer;
    use crate::raw::RawType;

    fn raw_with(ty: RawType) -> RawSchema {
        RawSchema {
            ty,
            ..RawSchema::default()
        }
    }

    fn typed(ty: SchemaType) -> Schema {
        Schema {
            ty,
            ..Schema::default()
        }
    }

    #[test]
    fn single_tags_resolve_directly() {
        let cases = [
            ("string", SchemaType::String),
            ("integer", SchemaType::Integer),
            ("number", SchemaType::Number),
            ("boolean", SchemaType::Boolean),
            ("array", SchemaType::Array),
            ("object", SchemaType::Object),
            ("null", SchemaType::Null),
        ];
        for (tag, expected) in cases {
            assert_eq!(resolve(&raw_with(RawType::single(tag))).unwrap(), typed(expected));
        }
        assert_eq!(resolve(&RawSchema::default()).unwrap(), Schema::default());
    }

    #[test]
    fn null_tag_beside_another_folds_into_nullable() {
        let cases = [
            ("string", SchemaType::String),
            ("integer", SchemaType::Integer),
            ("number", SchemaType::Number),
            ("boolean", SchemaType::Boolean),
        ];
        for (tag, expected) in cases {
            let schema = resolve(&raw_with(RawType::from([tag, "null"]))).unwrap();
            assert_eq!(
                schema,
                Schema {
                    ty: expected,
                    nullable: true,
                    ..Schema::default()
                },
                "tag: {tag}"
            );
        }
    }

    #[test]
    fn multi_tags_expand_into_a_union() {
        let schema = resolve(&raw_with(RawType::from(["string", "integer", "boolean"]))).unwrap();
        assert_eq!(
            schema,
            Schema {
                one_of: vec![
                    typed(SchemaType::String),
                    typed(SchemaType::Integer),
                    typed(SchemaType::Boolean),
                ],
                ..Schema::default()
            }
        );
    }

    #[test]
    fn nullable_union() {
        let schema = resolve(&raw_with(RawType::from(["string", "number", "null"]))).unwrap();
        assert_eq!(
            schema,
            Schema {
                nullable: true,
                one_of: vec![typed(SchemaType::String), typed(SchemaType::Number)],
                ..Schema::default()
            }
        );
    }

    #[test]
    fn unknown_tags_are_rejected() {
        for (tags, bad) in [
            (RawType::from(["string", "invalid"]), "invalid"),
            (RawType::from(["integer", "unknown", "null"]), "unknown"),
            (RawType::single("Object"), "Object"),
        ] {
            assert_eq!(
                resolve(&raw_with(tags)).unwrap_err(),
                ResolveError::UnknownType { tag: bad.to_owned() }
            );
        }
    }

    #[test]
    fn unknown_tags_are_rejected_anywhere_in_the_tree() {
        let raw: RawSchema = serde_json::from_value(json!({
            "type": "object",
            "properties": {"foo": {"type": "array", "items": {"type": "widget"}}},
        }))
        .unwrap();
        assert_eq!(
            resolve(&raw).unwrap_err(),
            ResolveError::UnknownType { tag: "widget".to_owned() }
        );

        let raw: RawSchema = serde_json::from_value(json!({
            "oneOf": [{"type": "string"}, {"type": "bogus"}],
        }))
        .unwrap();
        assert!(resolve(&raw).is_err());
    }

    #[test]
    fn explicit_branches_resolve_recursively() {
        let raw: RawSchema = serde_json::from_value(json!({
            "oneOf": [
                {"type": "integer", "nullable": true},
                {"type": "string"},
            ],
        }))
        .unwrap();
        let schema = resolve(&raw).unwrap();
        assert_eq!(
            schema.one_of,
            vec![
                Schema {
                    ty: SchemaType::Integer,
                    nullable: true,
                    ..Schema::default()
                },
                typed(SchemaType::String),
            ]
        );
        assert!(schema.ty.is_empty());
    }

    #[test]
    fn engine_output_always_resolves() {
        let mut inf = Infer::new();
        for sample in [
            r#"{"id": 1, "name": "a", "tags": ["x", 2], "meta": null}"#,
            r#"{"id": 2.5, "tags": [true]}"#,
            r#"[1, "mixed", null]"#,
            "true",
        ] {
            inf.apply(sample.as_bytes()).unwrap();
        }
        let schema = resolve(&inf.target().to_raw()).unwrap();
        assert!(schema.ty.is_empty());
        assert_eq!(schema.one_of.len(), 3, "object, array, boolean branches");
    }

    #[test]
    fn resolved_view_serializes_compactly() {
        let schema = Schema {
            ty: SchemaType::String,
            nullable: true,
            ..Schema::default()
        };
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": "string", "nullable": true})
        );
    }
}
