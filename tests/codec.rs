//! Tests for the dictionary codec
//!
//! These tests exercise encode and decode through the public API, from XML
//! text to dictionaries and back.

#[path = "fixtures/mod.rs"]
mod fixtures;

use fixtures::roads_tree;
use metadict::{decode, encode, Document, XmlParser};

fn encode_str(xml: &str) -> Document {
    encode(&XmlParser::new().parse(xml).unwrap())
}

#[test]
fn round_trip_fixture() {
    let tree = roads_tree();
    assert_eq!(decode(&encode(&tree)).unwrap(), tree.normalized());
}

#[test]
fn encode_is_deterministic() {
    let tree = roads_tree();
    assert_eq!(encode(&tree), encode(&tree));
    assert_eq!(
        decode(&encode(&tree)).unwrap(),
        decode(&encode(&tree)).unwrap()
    );
}

#[test]
fn unicode_tag_names_round_trip() {
    let tree = XmlParser::new()
        .parse("<a\u{B7}b><e\u{301}>x</e\u{301}><\u{5730}\u{540D}/></a\u{B7}b>")
        .unwrap();
    assert_eq!(decode(&encode(&tree)).unwrap(), tree);
}

#[test]
fn deep_documents_are_rejected() {
    let depth = 100_000;
    let xml = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
    assert!(matches!(
        XmlParser::new().parse(&xml),
        Err(metadict::MetaError::ParseError(_))
    ));
}

mod encoding {
    use super::*;
    use metadict::{Member, MetadataValue};
    use pretty_assertions::assert_eq;

    #[test]
    fn nested_keys_follow_document_order() {
        let doc = encode(&roads_tree());
        let (tag, root) = doc.root().unwrap();
        assert_eq!(tag, "metadata");
        let keys: Vec<&str> = root.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Esri", "idinfo", "mdDateSt", "@xml:lang"]);
    }

    #[test]
    fn entities_are_resolved() {
        let doc = encode(&roads_tree());
        let abstract_text = doc
            .get("metadata")
            .and_then(|root| root.get("idinfo"))
            .and_then(Member::as_value)
            .and_then(|idinfo| idinfo.get("descript"))
            .and_then(Member::as_value)
            .and_then(|descript| descript.get("abstract"))
            .and_then(Member::as_text);
        assert_eq!(
            abstract_text,
            Some("Road centerlines & ramps maintained by the county.")
        );
    }

    #[test]
    fn text_with_attribute_goes_under_text_key() {
        let doc = encode_str(r#"<t Sync="TRUE"> roads </t>"#);
        let mut expected = MetadataValue::object();
        expected.insert("@Sync", "TRUE");
        expected.insert("#text", "roads");
        assert_eq!(doc, Document::new("t", expected));
    }

    #[test]
    fn split_text_is_concatenated() {
        let doc = encode_str("<p>one<br/>two</p>");
        let (_, value) = doc.root().unwrap();
        assert_eq!(value.get("#text").and_then(Member::as_text), Some("onetwo"));
    }

    #[test]
    fn interleaved_repeats_are_grouped() {
        let doc = encode_str("<n><a>1</a><b>2</b><a>3</a></n>");
        let (_, value) = doc.root().unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(value.get("a").map(|a| a.values().count()), Some(2));
    }

    #[test]
    fn comments_and_declaration_are_skipped() {
        let doc = encode_str("<?xml version=\"1.0\"?><!-- c --><n><!-- inner -->x</n>");
        assert_eq!(doc, Document::new("n", MetadataValue::from("x")));
    }
}

mod decoding {
    use super::*;
    use metadict::{decode_to_string, MetaError, MetadataValue, XmlNode};

    #[test]
    fn escapes_special_characters() {
        let mut value = MetadataValue::object();
        value.insert("@title", "Roads \"A\" & <B>");
        value.insert("note", "x < y && y > z");
        let xml = decode_to_string(&Document::new("n", value)).unwrap();

        let expected = XmlNode::new("n")
            .with_attribute("title", "Roads \"A\" & <B>")
            .with_child(XmlNode::new("note").with_text("x < y && y > z"));
        assert_eq!(XmlParser::new().parse(&xml).unwrap(), expected);
    }

    #[test]
    fn repeated_children_in_order() {
        let mut value = MetadataValue::object();
        value.insert(
            "themekey",
            vec![MetadataValue::from("roads"), MetadataValue::from("streets")],
        );
        assert_eq!(
            decode_to_string(&Document::new("theme", value)).unwrap(),
            "<theme><themekey>roads</themekey><themekey>streets</themekey></theme>"
        );
    }

    #[test]
    fn empty_values_become_empty_elements() {
        let mut value = MetadataValue::object();
        value.insert("status", MetadataValue::Empty);
        assert_eq!(
            decode_to_string(&Document::new("idinfo", value)).unwrap(),
            "<idinfo><status/></idinfo>"
        );
    }

    #[test]
    fn rejects_multiple_roots() {
        let mut doc = Document::new("a", MetadataValue::Empty);
        doc.insert("b", MetadataValue::Empty);
        let err = decode(&doc).unwrap_err();
        assert!(matches!(err, MetaError::Schema { .. }));
        assert!(err.to_string().contains("exactly one"));
    }

    #[test]
    fn rejects_bad_child_key() {
        let mut value = MetadataValue::object();
        value.insert("not a tag", "x");
        let err = decode(&Document::new("root", value)).unwrap_err();
        assert!(matches!(err, MetaError::Schema { ref path, .. } if path == "root/not a tag"));
    }

    #[test]
    fn attribute_line_breaks_survive() {
        let mut value = MetadataValue::object();
        value.insert("@k", "a\nb\tc");
        value.insert("t", "x");
        let doc = Document::new("n", value);
        let xml = decode_to_string(&doc).unwrap();
        assert!(xml.contains(r#"k="a&#10;b&#9;c""#), "{xml}");
        assert_eq!(encode(&XmlParser::new().parse(&xml).unwrap()), doc);
    }

    #[test]
    fn rejects_control_characters() {
        let mut value = MetadataValue::object();
        value.insert("@k", "a\nb\tc");
        value.insert("t", "x\u{1}y");
        let err = decode(&Document::new("n", value)).unwrap_err();
        assert!(matches!(err, MetaError::Schema { ref path, .. } if path == "n/t"));
    }
}

#[cfg(feature = "json")]
mod json {
    use super::*;
    use metadict::{decode_json, decode_to_string, MetaError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn json_of(xml: &str) -> serde_json::Value {
        encode_str(xml).to_json_value().unwrap()
    }

    #[test]
    fn repeated_tag_becomes_array() {
        assert_eq!(
            json_of("<n><item>a</item><item>b</item><item>c</item></n>"),
            json!({"n": {"item": ["a", "b", "c"]}})
        );
    }

    #[test]
    fn single_occurrence_is_not_wrapped() {
        assert_eq!(json_of("<n><item>X</item></n>"), json!({"n": {"item": "X"}}));
    }

    #[test]
    fn attribute_only_leaf() {
        assert_eq!(json_of(r#"<n k="1"/>"#), json!({"n": {"@k": "1"}}));
    }

    #[test]
    fn mixed_content() {
        assert_eq!(
            json_of(r#"<n k="1">hi<c/></n>"#),
            json!({"n": {"@k": "1", "#text": "hi", "c": null}})
        );
    }

    #[test]
    fn whitespace_only_text_vanishes() {
        assert_eq!(json_of("<n>   </n>"), json!({"n": null}));
    }

    #[test]
    fn key_order_is_preserved_in_text() {
        assert_eq!(
            encode_str(r#"<n k="1">hi<c/></n>"#).to_json_string().unwrap(),
            r##"{"n":{"c":null,"@k":"1","#text":"hi"}}"##
        );
    }

    #[test]
    fn two_top_level_keys_fail() {
        let result = decode_json(&json!({"a": "1", "b": "2"}));
        assert!(matches!(result, Err(MetaError::Schema { .. })));
    }

    #[test]
    fn numeric_attribute_fails() {
        let result = Document::from_json_str(r#"{"root": {"@x": 5}}"#);
        match result {
            Err(MetaError::Schema { path, .. }) => assert_eq!(path, "root/@x"),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn nested_array_fails() {
        let result = Document::from_json_str(r#"{"root": {"k": [["a"]]}}"#);
        assert!(matches!(result, Err(MetaError::Schema { .. })));
    }

    #[test]
    fn malformed_json_fails() {
        let result = Document::from_json_str("{not json");
        assert!(matches!(result, Err(MetaError::JsonError(_))));
    }

    #[test]
    fn json_to_xml() {
        let doc = Document::from_json_str(
            r#"{"metadata": {"idinfo": {"keyword": ["a", "b"]}, "@v": "1"}}"#,
        )
        .unwrap();
        assert_eq!(
            decode_to_string(&doc).unwrap(),
            r#"<metadata v="1"><idinfo><keyword>a</keyword><keyword>b</keyword></idinfo></metadata>"#
        );
    }

    #[test]
    fn json_text_round_trip() {
        let doc = encode(&roads_tree());
        let text = doc.to_json_string_pretty().unwrap();
        assert_eq!(Document::from_json_str(&text).unwrap(), doc);
    }
}
