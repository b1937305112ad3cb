//! XML element tree
//!
//! This module defines [`XmlNode`], the parsed form of one XML element:
//! a tag, ordered attributes, optional text and ordered children.

use indexmap::IndexMap;

/// Default limit on element nesting for parsing, decoding and serializing
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// One element of a parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    /// Element tag, including any prefix verbatim (e.g. `gmd:title`)
    pub tag: String,
    /// Attributes in document order
    pub attributes: IndexMap<String, String>,
    /// Character data directly inside this element
    pub text: Option<String>,
    /// Child elements in document order
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create a new element with no attributes, text or children
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Builder: set an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set an attribute, replacing any previous value with the same name
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Get an attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Append a child element
    pub fn push_child(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// Append character data, concatenating with any existing text
    pub fn append_text(&mut self, text: &str) {
        match self.text {
            Some(ref mut existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    /// Text with surrounding whitespace removed, `None` when nothing remains
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Check if this element has child elements
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Iterate over the direct children with the given tag
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// Drop whitespace-only text and trim retained text, recursively
    ///
    /// The result is the canonical form the dictionary codec reproduces
    /// exactly.
    pub fn normalized(&self) -> XmlNode {
        XmlNode {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            text: self.trimmed_text().map(str::to_string),
            children: self.children.iter().map(XmlNode::normalized).collect(),
        }
    }
}

/// Check that `name` is usable as an XML element or attribute name
///
/// Follows the `Name` production of XML 1.0 (fifth edition).
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_name_start_char(first) && chars.all(is_name_char)
}

/// Check that `ch` may appear in XML character data
pub fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{9}' | '\u{A}' | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn is_name_start_char(ch: char) -> bool {
    matches!(
        ch,
        ':' | 'A'..='Z'
            | '_'
            | 'a'..='z'
            | '\u{C0}'..='\u{D6}'
            | '\u{D8}'..='\u{F6}'
            | '\u{F8}'..='\u{2FF}'
            | '\u{370}'..='\u{37D}'
            | '\u{37F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}'
    )
}

fn is_name_char(ch: char) -> bool {
    is_name_start_char(ch)
        || matches!(
            ch,
            '-' | '.'
                | '0'..='9'
                | '\u{B7}'
                | '\u{300}'..='\u{36F}'
                | '\u{203F}'..='\u{2040}'
        )
}
