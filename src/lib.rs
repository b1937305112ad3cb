//! # metadict
//!
//! Lossless conversion between XML metadata documents and ordered
//! dictionaries.
//!
//! An XML element becomes a [`MetadataValue`]: plain text when it only
//! carries text, nothing when it is empty, and otherwise an ordered object
//! whose `@name` keys hold attributes, whose `#text` key holds the trimmed
//! text and whose remaining keys hold child elements. A child tag that
//! repeats maps to a sequence. [`decode`] reverses [`encode`].
//!
//! ```rust
//! use metadict::{decode, encode, XmlParser};
//!
//! let tree = XmlParser::new()
//!     .parse(r#"<n k="1"><item>a</item><item>b</item></n>"#)?;
//! let doc = encode(&tree);
//! let (tag, value) = doc.root().expect("single root");
//! assert_eq!(tag, "n");
//! assert_eq!(value.get("@k").and_then(|k| k.as_text()), Some("1"));
//! assert_eq!(value.get("item").map(|items| items.values().count()), Some(2));
//! assert_eq!(decode(&doc)?, tree);
//! # Ok::<(), metadict::MetaError>(())
//! ```
//!
//! [`Record`] binds the codec to one dataset of a [`MetadataSource`], and the
//! field helpers on [`XmlNode`] (`text_at`, `modify_text`, ...) edit a tree
//! in place by element path.
//!
//! ## Features
//!
//! - `json` (default): JSON conversion of documents via `serde_json`

pub mod core;
pub mod record;
pub mod types;

#[cfg(feature = "json")]
pub use crate::core::decode_json;
pub use crate::core::{
    build_path, decode, decode_to_string, decode_with_max_depth, encode, encode_value,
    is_xml_char, is_xml_name, parse_path, MetaError, MetaResult, PathComponent, PathComponents,
    SerializeOptions, XmlNode, XmlParser, XmlSerializer, DEFAULT_MAX_DEPTH,
};
pub use record::{
    CommandSource, FileSource, MemorySource, MetadataSource, Record, RecordOptions, SyncMethod,
    TempStorage,
};
pub use types::{
    DatasetProperties, DatasetRef, Document, Member, MetadataValue, WorkspaceProperties,
    ATTRIBUTE_PREFIX, TEXT_KEY,
};
