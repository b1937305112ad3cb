//! Element tree to dictionary encoder
//!
//! Encoding rules, applied bottom-up:
//!
//! - attributes become `@name` keys, text becomes `#text` (trimmed) when
//!   the element also has attributes or children;
//! - a text-only element becomes [`MetadataValue::Text`], an element with
//!   nothing at all becomes [`MetadataValue::Empty`];
//! - children are grouped by tag in first-occurrence order; a tag seen
//!   more than once becomes a [`Member::Repeated`] in document order.

use crate::core::node::XmlNode;
use crate::types::value::{Document, Member, MetadataValue, ObjectMap, ATTRIBUTE_PREFIX, TEXT_KEY};
use indexmap::IndexMap;

/// Encode an element tree as a single-rooted document
pub fn encode(node: &XmlNode) -> Document {
    Document::new(node.tag.clone(), encode_value(node))
}

/// Encode the content of one element
///
/// Walks the subtree with an explicit stack, so depth is bounded by memory
/// rather than by the call stack.
pub fn encode_value(node: &XmlNode) -> MetadataValue {
    let mut parents: Vec<Frame<'_>> = Vec::new();
    let mut current = Frame::new(node);
    loop {
        if let Some(child) = current.node.children.get(current.next) {
            current.next += 1;
            parents.push(std::mem::replace(&mut current, Frame::new(child)));
            continue;
        }
        let tag = current.node.tag.as_str();
        let value = current.finish();
        match parents.pop() {
            Some(mut parent) => {
                parent.groups.entry(tag).or_default().push(value);
                current = parent;
            }
            None => return value,
        }
    }
}

/// An element whose children are being encoded
struct Frame<'a> {
    node: &'a XmlNode,
    /// Index of the next child to encode
    next: usize,
    groups: IndexMap<&'a str, Vec<MetadataValue>>,
}

impl<'a> Frame<'a> {
    fn new(node: &'a XmlNode) -> Self {
        Self {
            node,
            next: 0,
            groups: IndexMap::new(),
        }
    }

    /// Build the value once every child is encoded
    fn finish(self) -> MetadataValue {
        let node = self.node;
        let text = node.trimmed_text();

        if !node.has_children() && node.attributes.is_empty() {
            return match text {
                Some(text) => MetadataValue::Text(text.to_string()),
                None => MetadataValue::Empty,
            };
        }

        let mut map = ObjectMap::new();
        for (tag, mut values) in self.groups {
            let member = if values.len() == 1 {
                Member::Value(values.remove(0))
            } else {
                Member::Repeated(values)
            };
            map.insert(tag.to_string(), member);
        }

        for (name, value) in &node.attributes {
            map.insert(format!("{}{}", ATTRIBUTE_PREFIX, name), Member::text(value.as_str()));
        }

        if let Some(text) = text {
            map.insert(TEXT_KEY.to_string(), Member::text(text));
        }

        MetadataValue::Object(map)
    }
}
