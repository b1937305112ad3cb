//! XML parser
//!
//! This module builds an [`XmlNode`] tree from XML text with the quick-xml
//! event reader. Comments, processing instructions, the XML declaration and
//! doctype are skipped; prefixed names are kept verbatim.

use crate::core::error::{MetaError, MetaResult};
use crate::core::node::{XmlNode, DEFAULT_MAX_DEPTH};
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parser for XML documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlParser {
    max_depth: usize,
}

impl Default for XmlParser {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl XmlParser {
    /// Create a new XML parser nesting at most [`DEFAULT_MAX_DEPTH`] elements
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser nesting at most `max_depth` elements (0 means unlimited)
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Maximum element nesting depth, 0 when unlimited
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Parse a complete document and return its root element
    pub fn parse(&self, xml: &str) -> MetaResult<XmlNode> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                MetaError::ParseError(format!(
                    "XML parsing error at position {}: {}",
                    reader.error_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(e) => {
                    Self::check_single_root(&root, &stack)?;
                    self.check_depth(stack.len() + 1)?;
                    stack.push(Self::open_element(&e)?);
                }
                Event::Empty(e) => {
                    Self::check_single_root(&root, &stack)?;
                    self.check_depth(stack.len() + 1)?;
                    let node = Self::open_element(&e)?;
                    Self::attach(node, &mut stack, &mut root);
                }
                Event::End(_) => {
                    // quick-xml verifies that end names match
                    let node = stack.pop().ok_or_else(|| {
                        MetaError::ParseError("Unexpected closing tag".to_string())
                    })?;
                    Self::attach(node, &mut stack, &mut root);
                }
                Event::Text(e) => {
                    // Decode XML entities (e.g., &quot; -> ")
                    let raw_text = String::from_utf8_lossy(e.as_ref());
                    let text = match unescape(&raw_text) {
                        Ok(unescaped) => unescaped.to_string(),
                        Err(_) => raw_text.to_string(),
                    };
                    Self::push_text(&mut stack, &text)?;
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).to_string();
                    Self::push_text(&mut stack, &text)?;
                }
                Event::GeneralRef(e) => {
                    let text = if let Some(ch) = e
                        .resolve_char_ref()
                        .map_err(|e| MetaError::ParseError(e.to_string()))?
                    {
                        ch.to_string()
                    } else {
                        let name = String::from_utf8_lossy(&e);
                        resolve_predefined_entity(&name)
                            .ok_or_else(|| {
                                MetaError::ParseError(format!("Unknown entity '&{};'", name))
                            })?
                            .to_string()
                    };
                    Self::push_text(&mut stack, &text)?;
                }
                Event::Eof => break,
                // Comments, processing instructions, declaration and doctype
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(MetaError::ParseError(format!(
                "Unclosed element <{}>",
                open.tag
            )));
        }

        root.ok_or_else(|| MetaError::ParseError("Document has no root element".to_string()))
    }

    /// Build an element (without children) from a start or empty tag
    fn open_element(e: &BytesStart<'_>) -> MetaResult<XmlNode> {
        let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let mut node = XmlNode::new(tag);
        for attr in e.attributes() {
            let attr = attr.map_err(|e| MetaError::ParseError(format!("Bad attribute: {}", e)))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let raw_value = String::from_utf8_lossy(attr.value.as_ref());
            let value = unescape(&raw_value)
                .map_err(|e| MetaError::ParseError(format!("Bad attribute '{}': {}", key, e)))?
                .to_string();
            node.set_attribute(key, value);
        }
        Ok(node)
    }

    /// Attach a finished element to its parent, or make it the root
    fn attach(node: XmlNode, stack: &mut [XmlNode], root: &mut Option<XmlNode>) {
        match stack.last_mut() {
            Some(parent) => parent.push_child(node),
            None => *root = Some(node),
        }
    }

    /// Reject a second top-level element
    fn check_single_root(root: &Option<XmlNode>, stack: &[XmlNode]) -> MetaResult<()> {
        if stack.is_empty() && root.is_some() {
            return Err(MetaError::ParseError(
                "Document has more than one root element".to_string(),
            ));
        }
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> MetaResult<()> {
        if self.max_depth > 0 && depth > self.max_depth {
            return Err(MetaError::ParseError(format!(
                "Elements nested deeper than {} levels",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Append character data to the open element
    ///
    /// Whitespace outside the root element is ignored; anything else there
    /// is an error.
    fn push_text(stack: &mut [XmlNode], text: &str) -> MetaResult<()> {
        match stack.last_mut() {
            Some(open) => {
                open.append_text(text);
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(MetaError::ParseError(
                "Text content outside of the root element".to_string(),
            )),
        }
    }
}
