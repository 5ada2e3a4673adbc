//! Wire form of a schema document.
//!
//! This is the untyped representation as it travels in JSON or YAML. The
//! `type` field may carry several tags at once (producers are allowed to
//! write `["string", "null"]` directly); tags are kept as plain strings so
//! unknown ones survive decoding and are rejected by the resolver instead of
//! the decoder.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ------------------------------ RawType ----------------------------------- //

/// The raw `type` field: zero or more tag strings.
///
/// One tag encodes as a bare string, any other count as an array; decoding
/// accepts both forms. No vocabulary validation happens here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawType(Vec<String>);

impl RawType {
    pub fn single(tag: impl Into<String>) -> Self {
        RawType(vec![tag.into()])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for RawType {
    fn from(tags: Vec<String>) -> Self {
        RawType(tags)
    }
}

impl<const N: usize> From<[&str; N]> for RawType {
    fn from(tags: [&str; N]) -> Self {
        RawType(tags.into_iter().map(str::to_owned).collect())
    }
}

impl Serialize for RawType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [tag] => serializer.serialize_str(tag),
            tags => tags.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RawType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagsVisitor;

        impl<'de> Visitor<'de> for TagsVisitor {
            type Value = RawType;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a type tag or an array of type tags")
            }

            fn visit_str<E: de::Error>(self, tag: &str) -> Result<RawType, E> {
                Ok(RawType::single(tag))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawType, A::Error> {
                let mut tags = Vec::new();
                while let Some(tag) = seq.next_element::<String>()? {
                    tags.push(tag);
                }
                Ok(RawType(tags))
            }
        }

        deserializer.deserialize_any(TagsVisitor)
    }
}

// ----------------------------- RawSchema ---------------------------------- //

pub(crate) fn is_false(flag: &bool) -> bool {
    !*flag
}

/// One schema node as it appears on the wire. Empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSchema {
    #[serde(rename = "type", default, skip_serializing_if = "RawType::is_empty")]
    pub ty: RawType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<RawSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<RawSchema>>,
    /// Absent means no object evidence; `{}` means an empty object was seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, RawSchema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}
