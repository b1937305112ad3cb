//! Dictionary to element tree decoder
//!
//! The inverse of [`encode`](crate::core::encoder::encode). Keys are read in
//! stored order: `@name` sets an attribute, `#text` sets the text and any
//! other key creates one child per value. Decoding stops at the first
//! structural problem and reports it as [`MetaError::Schema`] with the key
//! path of the offending entry. Strings holding characters XML cannot carry
//! and values nested deeper than the depth limit are structural problems too.

use crate::core::error::{MetaError, MetaResult};
use crate::core::node::{is_xml_char, is_xml_name, XmlNode, DEFAULT_MAX_DEPTH};
use crate::core::serializer::XmlSerializer;
use crate::types::value::{Document, Member, MetadataValue, ATTRIBUTE_PREFIX, TEXT_KEY};

/// Decode a single-rooted document into an element tree
pub fn decode(document: &Document) -> MetaResult<XmlNode> {
    decode_with_max_depth(document, DEFAULT_MAX_DEPTH)
}

/// Decode a document whose elements nest at most `max_depth` levels
///
/// A `max_depth` of 0 means unlimited.
pub fn decode_with_max_depth(document: &Document, max_depth: usize) -> MetaResult<XmlNode> {
    if document.len() != 1 {
        return Err(MetaError::schema(
            "",
            format!(
                "document must have exactly one top-level key, found {}",
                document.len()
            ),
        ));
    }
    let Some((tag, value)) = document.root() else {
        return Err(MetaError::schema("", "document has no root"));
    };
    if !is_xml_name(tag) {
        return Err(MetaError::schema(tag, "root key is not a valid tag name"));
    }

    let decoder = Decoder { max_depth };
    let mut root = XmlNode::new(tag);
    decoder.populate(&mut root, value, tag, 1)?;
    Ok(root)
}

/// Decode a document and serialize the tree with default options
pub fn decode_to_string(document: &Document) -> MetaResult<String> {
    XmlSerializer::new().serialize(&decode(document)?)
}

/// Convert a JSON value into a document and decode it
#[cfg(feature = "json")]
pub fn decode_json(value: &serde_json::Value) -> MetaResult<XmlNode> {
    decode(&Document::from_json_value(value)?)
}

struct Decoder {
    max_depth: usize,
}

impl Decoder {
    /// Fill `node`, found at `depth`, from the dictionary value at `path`
    fn populate(
        &self,
        node: &mut XmlNode,
        value: &MetadataValue,
        path: &str,
        depth: usize,
    ) -> MetaResult<()> {
        if self.max_depth > 0 && depth > self.max_depth {
            return Err(MetaError::schema(
                path,
                format!("elements nested deeper than {} levels", self.max_depth),
            ));
        }
        match value {
            MetadataValue::Empty => Ok(()),
            MetadataValue::Text(text) => {
                check_chars(text, path)?;
                node.text = Some(text.clone());
                Ok(())
            }
            MetadataValue::Object(map) => {
                for (key, member) in map {
                    let member_path = format!("{}/{}", path, key);
                    if let Some(name) = key.strip_prefix(ATTRIBUTE_PREFIX) {
                        if !is_xml_name(name) {
                            return Err(MetaError::schema(
                                member_path,
                                "attribute key does not name a valid attribute",
                            ));
                        }
                        let value = string_member(member, &member_path, "attribute value")?;
                        node.set_attribute(name, value);
                    } else if key == TEXT_KEY {
                        let text = string_member(member, &member_path, "text value")?;
                        node.text = Some(text.to_string());
                    } else if is_xml_name(key) {
                        self.add_children(node, key, member, &member_path, depth + 1)?;
                    } else {
                        return Err(MetaError::schema(
                            member_path,
                            "key is neither '@name', '#text' nor a valid tag name",
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    /// Append the child elements described by one object member
    fn add_children(
        &self,
        node: &mut XmlNode,
        tag: &str,
        member: &Member,
        path: &str,
        depth: usize,
    ) -> MetaResult<()> {
        match member {
            Member::Value(value) => {
                let mut child = XmlNode::new(tag);
                self.populate(&mut child, value, path, depth)?;
                node.push_child(child);
            }
            Member::Repeated(values) => {
                for (i, value) in values.iter().enumerate() {
                    let mut child = XmlNode::new(tag);
                    self.populate(&mut child, value, &format!("{}[{}]", path, i), depth)?;
                    node.push_child(child);
                }
            }
        }
        Ok(())
    }
}

/// Require a plain string under an `@name` or `#text` key
fn string_member<'a>(member: &'a Member, path: &str, what: &str) -> MetaResult<&'a str> {
    let text = member
        .as_text()
        .ok_or_else(|| MetaError::schema(path, format!("{} must be a string", what)))?;
    check_chars(text, path)?;
    Ok(text)
}

fn check_chars(text: &str, path: &str) -> MetaResult<()> {
    match text.chars().find(|ch| !is_xml_char(*ch)) {
        Some(ch) => Err(MetaError::schema(
            path,
            format!("contains a character not allowed in XML (U+{:04X})", ch as u32),
        )),
        None => Ok(()),
    }
}
