//! XML serializer
//!
//! This module writes an [`XmlNode`] tree as XML text with the quick-xml
//! writer. Text is escaped by the writer. Attribute values are escaped here
//! so that tabs and line breaks survive attribute value normalization.

use crate::core::error::{MetaError, MetaResult};
use crate::core::node::{is_xml_char, XmlNode, DEFAULT_MAX_DEPTH};
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::Cursor;

/// Options controlling serialized output.
///
/// The default produces compact output without an XML declaration.
///
/// # Example
///
/// ```rust
/// use metadict::{SerializeOptions, XmlNode, XmlSerializer};
///
/// let node = XmlNode::new("metadata").with_child(XmlNode::new("idinfo"));
/// let xml = XmlSerializer::with_options(SerializeOptions::default().indent(2).declaration())
///     .serialize(&node)?;
/// assert!(xml.starts_with("<?xml"));
/// # Ok::<(), metadict::MetaError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Indentation width in spaces, `None` for compact output
    pub indent: Option<usize>,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first
    pub declaration: bool,
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: None,
            declaration: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SerializeOptions {
    /// Indent nested elements by `width` spaces.
    pub fn indent(mut self, width: usize) -> Self {
        self.indent = Some(width);
        self
    }

    /// Write everything on one line.
    pub fn compact(mut self) -> Self {
        self.indent = None;
        self
    }

    /// Start the output with an XML declaration.
    pub fn declaration(mut self) -> Self {
        self.declaration = true;
        self
    }

    /// Refuse trees nested deeper than `depth` elements, 0 for no limit.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Serializer for XML element trees
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlSerializer {
    options: SerializeOptions,
}

impl XmlSerializer {
    /// Create a new serializer with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a serializer with the given options
    pub fn with_options(options: SerializeOptions) -> Self {
        Self { options }
    }

    /// Serialize an element tree to XML text
    pub fn serialize(&self, root: &XmlNode) -> MetaResult<String> {
        let mut writer = match self.options.indent {
            Some(width) => Writer::new_with_indent(Cursor::new(Vec::new()), b' ', width),
            None => Writer::new(Cursor::new(Vec::new())),
        };

        if self.options.declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        self.serialize_node(&mut writer, root, 1)?;

        let result = writer.into_inner().into_inner();
        String::from_utf8(result)
            .map_err(|e| MetaError::SerializationError(format!("UTF-8 encoding error: {}", e)))
    }

    /// Serialize one element and its subtree
    fn serialize_node(
        &self,
        writer: &mut Writer<Cursor<Vec<u8>>>,
        node: &XmlNode,
        depth: usize,
    ) -> MetaResult<()> {
        if node.tag.is_empty() {
            return Err(MetaError::SerializationError(
                "Element with an empty tag".to_string(),
            ));
        }
        let max_depth = self.options.max_depth;
        if max_depth > 0 && depth > max_depth {
            return Err(MetaError::SerializationError(format!(
                "Element <{}> nested deeper than {} levels",
                node.tag, max_depth
            )));
        }

        let mut start = BytesStart::new(node.tag.as_str());
        for (name, value) in &node.attributes {
            check_chars(value, &node.tag)?;
            start.push_attribute(Attribute {
                key: QName(name.as_bytes()),
                value: Cow::Owned(escape_attribute(value).into_bytes()),
            });
        }

        // Elements without content use a self-closing tag
        if node.text.is_none() && node.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = node.text.as_deref() {
            if !text.is_empty() {
                check_chars(text, &node.tag)?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
            }
        }
        for child in &node.children {
            self.serialize_node(writer, child, depth + 1)?;
        }
        writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
        Ok(())
    }
}

/// Escape markup characters and the whitespace that attribute value
/// normalization would turn into spaces
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\t', "&#9;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
}

fn check_chars(text: &str, tag: &str) -> MetaResult<()> {
    match text.chars().find(|ch| !is_xml_char(*ch)) {
        Some(ch) => Err(MetaError::SerializationError(format!(
            "Element <{}> contains a character not allowed in XML (U+{:04X})",
            tag, ch as u32
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::XmlParser;

    #[test]
    fn test_serialize_compact() {
        let node = XmlNode::new("n")
            .with_attribute("k", "1")
            .with_text("hi")
            .with_child(XmlNode::new("c"));
        let xml = XmlSerializer::new().serialize(&node).unwrap();
        assert_eq!(xml, r#"<n k="1">hi<c/></n>"#);
    }

    #[test]
    fn test_serialize_escapes() {
        let node = XmlNode::new("n")
            .with_attribute("q", "say \"a\" & <b>")
            .with_text("1 < 2 & 3 > 2");
        let xml = XmlSerializer::new().serialize(&node).unwrap();
        assert!(!xml.contains("\"a\""));
        assert!(xml.contains("&lt;"));
        assert!(xml.contains("&amp;"));

        let parsed = XmlParser::new().parse(&xml).unwrap();
        assert_eq!(parsed, node);
    }

    #[test]
    fn test_serialize_declaration_and_indent() {
        let node = XmlNode::new("metadata")
            .with_child(XmlNode::new("idinfo").with_child(XmlNode::new("title").with_text("x")));
        let xml = XmlSerializer::with_options(SerializeOptions::default().indent(2).declaration())
            .serialize(&node)
            .unwrap();
        eprintln!("Serialized:\n{}", xml);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("\n  <idinfo>"));

        let parsed = XmlParser::new().parse(&xml).unwrap();
        assert_eq!(parsed.normalized(), node);
    }

    #[test]
    fn test_attribute_whitespace_is_preserved() {
        let node = XmlNode::new("n").with_attribute("k", "a\nb\tc\r");
        let xml = XmlSerializer::new().serialize(&node).unwrap();
        assert_eq!(xml, r#"<n k="a&#10;b&#9;c&#13;"/>"#);
        assert_eq!(XmlParser::new().parse(&xml).unwrap(), node);
    }

    #[test]
    fn test_invalid_characters_fail() {
        let node = XmlNode::new("n").with_child(XmlNode::new("t").with_text("x\u{1}y"));
        let result = XmlSerializer::new().serialize(&node);
        assert!(matches!(result, Err(MetaError::SerializationError(ref m)) if m.contains("<t>")));

        let node = XmlNode::new("n").with_attribute("k", "\u{1B}");
        let result = XmlSerializer::new().serialize(&node);
        assert!(matches!(result, Err(MetaError::SerializationError(_))));
    }

    #[test]
    fn test_depth_limit() {
        let mut node = XmlNode::new("a");
        for _ in 1..(DEFAULT_MAX_DEPTH + 1) {
            node = XmlNode::new("a").with_child(node);
        }
        let result = XmlSerializer::new().serialize(&node);
        assert!(matches!(result, Err(MetaError::SerializationError(_))));

        let unlimited = SerializeOptions::default().max_depth(0);
        assert!(XmlSerializer::with_options(unlimited).serialize(&node).is_ok());
    }

    #[test]
    fn test_serialize_empty_tag_fails() {
        let result = XmlSerializer::new().serialize(&XmlNode::new(""));
        assert!(matches!(result, Err(MetaError::SerializationError(_))));
    }
}
