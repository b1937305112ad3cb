//! Codec core
//!
//! This module contains the element tree, the XML text layer and the
//! dictionary encoder and decoder, plus path-based field access.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod fields;
pub mod node;
pub mod parser;
pub mod path;
pub mod serializer;

#[cfg(feature = "json")]
pub use decoder::decode_json;
pub use decoder::{decode, decode_to_string, decode_with_max_depth};
pub use encoder::{encode, encode_value};
pub use error::{MetaError, MetaResult};
pub use node::{is_xml_char, is_xml_name, XmlNode, DEFAULT_MAX_DEPTH};
pub use parser::XmlParser;
pub use path::{build_path, parse_path, PathComponent, PathComponents, Step};
pub use serializer::{SerializeOptions, XmlSerializer};
