//! Dictionary value types
//!
//! This module defines the dictionary side of the codec: [`MetadataValue`]
//! for the content of one element, [`Member`] for an entry of an object and
//! [`Document`] for a whole single-rooted dictionary.

use indexmap::IndexMap;
use std::fmt;

/// Key prefix marking an attribute entry
pub const ATTRIBUTE_PREFIX: char = '@';

/// Key holding an element's text when it also has attributes or children
pub const TEXT_KEY: &str = "#text";

/// Ordered object map
pub type ObjectMap = IndexMap<String, Member>;

/// Content of one element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MetadataValue {
    /// No attributes, no text, no children
    #[default]
    Empty,
    /// Text only
    Text(String),
    /// Attributes (`@name`), text (`#text`) and child tags
    Object(ObjectMap),
}

impl MetadataValue {
    /// Create an empty object value
    pub fn object() -> Self {
        MetadataValue::Object(ObjectMap::new())
    }

    /// Check if this is the empty value
    pub fn is_empty(&self) -> bool {
        matches!(self, MetadataValue::Empty)
    }

    /// Get the text, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the object map, if this is an object value
    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            MetadataValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Get a mutable reference to the object map, if this is an object value
    pub fn as_object_mut(&mut self) -> Option<&mut ObjectMap> {
        match self {
            MetadataValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a member of an object value
    pub fn get(&self, key: &str) -> Option<&Member> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Look up a mutable member of an object value
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Member> {
        self.as_object_mut().and_then(|map| map.get_mut(key))
    }

    /// Insert a member, turning `Empty` and `Text` values into objects
    ///
    /// Existing text is kept under `#text`.
    pub fn insert(&mut self, key: impl Into<String>, member: impl Into<Member>) -> Option<Member> {
        if !matches!(self, MetadataValue::Object(_)) {
            let mut map = ObjectMap::new();
            if let MetadataValue::Text(text) = std::mem::take(self) {
                map.insert(TEXT_KEY.to_string(), Member::text(text));
            }
            *self = MetadataValue::Object(map);
        }
        match self {
            MetadataValue::Object(map) => map.insert(key.into(), member.into()),
            _ => None,
        }
    }

    /// Remove a member of an object value
    pub fn remove(&mut self, key: &str) -> Option<Member> {
        self.as_object_mut().and_then(|map| map.shift_remove(key))
    }
}

impl From<&str> for MetadataValue {
    fn from(text: &str) -> Self {
        MetadataValue::Text(text.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(text: String) -> Self {
        MetadataValue::Text(text)
    }
}

impl From<ObjectMap> for MetadataValue {
    fn from(map: ObjectMap) -> Self {
        MetadataValue::Object(map)
    }
}

/// One entry of an object value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// A single value (also used for `@name` and `#text` strings)
    Value(MetadataValue),
    /// A child tag that occurs more than once, in document order
    Repeated(Vec<MetadataValue>),
}

impl Member {
    /// Create a text member
    pub fn text(text: impl Into<String>) -> Self {
        Member::Value(MetadataValue::Text(text.into()))
    }

    /// Get the single value, if this is not a sequence
    pub fn as_value(&self) -> Option<&MetadataValue> {
        match self {
            Member::Value(value) => Some(value),
            Member::Repeated(_) => None,
        }
    }

    /// Get the text, if this is a single text value
    pub fn as_text(&self) -> Option<&str> {
        self.as_value().and_then(MetadataValue::as_text)
    }

    /// Iterate over every value regardless of repetition
    pub fn values(&self) -> std::slice::Iter<'_, MetadataValue> {
        match self {
            Member::Value(value) => std::slice::from_ref(value).iter(),
            Member::Repeated(values) => values.iter(),
        }
    }
}

impl From<MetadataValue> for Member {
    fn from(value: MetadataValue) -> Self {
        Member::Value(value)
    }
}

impl From<Vec<MetadataValue>> for Member {
    fn from(values: Vec<MetadataValue>) -> Self {
        Member::Repeated(values)
    }
}

impl From<&str> for Member {
    fn from(text: &str) -> Self {
        Member::text(text)
    }
}

impl From<String> for Member {
    fn from(text: String) -> Self {
        Member::text(text)
    }
}

/// A document dictionary
///
/// Produced by the encoder with exactly one entry, `{root_tag: value}`.
/// Documents assembled by callers may hold any number of entries; the
/// decoder rejects everything but one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    entries: IndexMap<String, MetadataValue>,
}

impl Document {
    /// Create a single-rooted document
    pub fn new(root_tag: impl Into<String>, value: MetadataValue) -> Self {
        let mut entries = IndexMap::new();
        entries.insert(root_tag.into(), value);
        Self { entries }
    }

    /// Create a document from top-level entries
    pub fn from_entries(entries: IndexMap<String, MetadataValue>) -> Self {
        Self { entries }
    }

    /// Top-level entries
    pub fn entries(&self) -> &IndexMap<String, MetadataValue> {
        &self.entries
    }

    /// Number of top-level entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the document has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The root tag and value of a single-rooted document
    pub fn root(&self) -> Option<(&str, &MetadataValue)> {
        if self.entries.len() != 1 {
            return None;
        }
        self.entries
            .first()
            .map(|(tag, value)| (tag.as_str(), value))
    }

    /// Mutable root value of a single-rooted document
    pub fn root_mut(&mut self) -> Option<&mut MetadataValue> {
        if self.entries.len() != 1 {
            return None;
        }
        self.entries.first_mut().map(|(_, value)| value)
    }

    /// Get a top-level value by tag
    pub fn get(&self, tag: &str) -> Option<&MetadataValue> {
        self.entries.get(tag)
    }

    /// Get a mutable top-level value by tag
    pub fn get_mut(&mut self, tag: &str) -> Option<&mut MetadataValue> {
        self.entries.get_mut(tag)
    }

    /// Insert a top-level entry
    pub fn insert(&mut self, tag: impl Into<String>, value: MetadataValue) -> Option<MetadataValue> {
        self.entries.insert(tag.into(), value)
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Empty => write!(f, "null"),
            MetadataValue::Text(text) => write!(f, "{:?}", text),
            MetadataValue::Object(map) => {
                write!(f, "{{")?;
                for (i, (key, member)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, member)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Value(value) => write!(f, "{}", value),
            Member::Repeated(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (tag, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", tag, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(feature = "json")]
mod json {
    use super::*;
    use crate::core::error::{MetaError, MetaResult};
    use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
    use serde_json::Value;

    impl Serialize for MetadataValue {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                MetadataValue::Empty => serializer.serialize_unit(),
                MetadataValue::Text(text) => serializer.serialize_str(text),
                MetadataValue::Object(map) => {
                    let mut out = serializer.serialize_map(Some(map.len()))?;
                    for (key, member) in map {
                        out.serialize_entry(key, member)?;
                    }
                    out.end()
                }
            }
        }
    }

    impl Serialize for Member {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Member::Value(value) => value.serialize(serializer),
                Member::Repeated(values) => {
                    let mut out = serializer.serialize_seq(Some(values.len()))?;
                    for value in values {
                        out.serialize_element(value)?;
                    }
                    out.end()
                }
            }
        }
    }

    impl Serialize for Document {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut out = serializer.serialize_map(Some(self.entries.len()))?;
            for (tag, value) in &self.entries {
                out.serialize_entry(tag, value)?;
            }
            out.end()
        }
    }

    impl Document {
        /// Convert a JSON value into a document
        ///
        /// Numbers and booleans are rejected: every dictionary leaf is a
        /// string or `null`.
        pub fn from_json_value(value: &Value) -> MetaResult<Self> {
            let Value::Object(map) = value else {
                return Err(MetaError::schema(
                    "",
                    format!("document must be an object, found {}", kind(value)),
                ));
            };
            let mut entries = IndexMap::with_capacity(map.len());
            for (tag, value) in map {
                entries.insert(tag.clone(), to_value(value, tag)?);
            }
            Ok(Self { entries })
        }

        /// Parse JSON text into a document
        pub fn from_json_str(json: &str) -> MetaResult<Self> {
            let value: Value = serde_json::from_str(json)?;
            Self::from_json_value(&value)
        }

        /// Convert the document into a JSON value
        pub fn to_json_value(&self) -> MetaResult<Value> {
            Ok(serde_json::to_value(self)?)
        }

        /// Serialize the document to JSON text
        pub fn to_json_string(&self) -> MetaResult<String> {
            Ok(serde_json::to_string(self)?)
        }

        /// Serialize the document to indented JSON text
        pub fn to_json_string_pretty(&self) -> MetaResult<String> {
            Ok(serde_json::to_string_pretty(self)?)
        }
    }

    fn to_value(value: &Value, path: &str) -> MetaResult<MetadataValue> {
        match value {
            Value::Null => Ok(MetadataValue::Empty),
            Value::String(text) => Ok(MetadataValue::Text(text.clone())),
            Value::Object(map) => {
                let mut object = ObjectMap::with_capacity(map.len());
                for (key, value) in map {
                    let member_path = format!("{}/{}", path, key);
                    object.insert(key.clone(), to_member(value, &member_path)?);
                }
                Ok(MetadataValue::Object(object))
            }
            Value::Array(_) => Err(MetaError::schema(
                path,
                "a sequence is only allowed as the value of a child tag",
            )),
            Value::Bool(_) | Value::Number(_) => Err(MetaError::schema(
                path,
                format!("expected a string, object or null, found {}", kind(value)),
            )),
        }
    }

    fn to_member(value: &Value, path: &str) -> MetaResult<Member> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| to_value(item, &format!("{}[{}]", path, i)))
                .collect::<MetaResult<Vec<_>>>()
                .map(Member::Repeated),
            other => to_value(other, path).map(Member::Value),
        }
    }

    fn kind(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        }
    }
}
