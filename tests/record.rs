//! Tests for the Record API
//!
//! These tests run records against file-backed and in-memory sources.

#[path = "fixtures/mod.rs"]
mod fixtures;

use fixtures::{roads_file_source, roads_tree, ROADS_XML};
use metadict::{MetaError, MetadataValue, Record, RecordOptions, XmlParser};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

mod open {
    use super::*;
    use pretty_assertions::assert_eq;
    use metadict::FileSource;

    #[test]
    fn missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let result = Record::open(FileSource::new(dir.path()), "roads");
        assert!(matches!(result, Err(MetaError::SourceUnavailable(_))));
    }

    #[test]
    fn load_parses_document() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let mut record = Record::open(roads_file_source(dir.path()), "roads").unwrap();
        assert_eq!(record.load().unwrap(), &roads_tree());
    }

    #[test]
    fn dataset_properties() {
        let dir = tempfile::tempdir().unwrap();
        let record = Record::open(roads_file_source(dir.path()), "roads").unwrap();
        let props = record.dataset_properties().unwrap();
        assert_eq!(props.table_name, "roads");
        assert_eq!(props.workspace.workspace_type, "FileSystem");
    }
}

mod save {
    use super::*;
    use pretty_assertions::assert_eq;
    use metadict::{Document, FileSource, Member};

    #[test]
    fn save_none_keeps_document() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let mut record = Record::open(roads_file_source(dir.path()), "roads").unwrap();

        let before = record.convert().unwrap();
        record.save(None).unwrap();
        assert_eq!(record.convert().unwrap(), before);
    }

    #[test]
    fn save_edited_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = Record::open(roads_file_source(dir.path()), "roads").unwrap();

        let mut doc = record.convert().unwrap();
        let root = doc.root_mut().unwrap();
        root.insert("@xml:lang", "de");
        root.remove("Esri");
        record.save(Some(doc)).unwrap();

        let mut reopened = Record::open(FileSource::new(dir.path()), "roads").unwrap();
        let doc = reopened.convert().unwrap();
        let (_, root) = doc.root().unwrap();
        assert_eq!(root.get("@xml:lang").and_then(Member::as_text), Some("de"));
        assert!(root.get("Esri").is_none());
    }

    #[test]
    fn schema_error_leaves_source_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = Record::open(roads_file_source(dir.path()), "roads").unwrap();

        let mut bad = MetadataValue::object();
        bad.insert("@x", MetadataValue::object());
        let result = record.save(Some(Document::new("metadata", bad)));

        assert!(matches!(result, Err(MetaError::Schema { .. })));
        let stored = std::fs::read_to_string(dir.path().join("roads.xml")).unwrap();
        assert_eq!(stored, ROADS_XML);
    }

    #[test]
    fn read_only_source_rejects() {
        let dir = tempfile::tempdir().unwrap();
        roads_file_source(dir.path());
        let source = FileSource::new(dir.path()).read_only();
        let mut record = Record::open(source, "roads").unwrap();

        assert!(matches!(record.save(None), Err(MetaError::SinkRejected(_))));
        let stored = std::fs::read_to_string(dir.path().join("roads.xml")).unwrap();
        assert_eq!(stored, ROADS_XML);
    }

    #[test]
    fn written_with_options() {
        let dir = tempfile::tempdir().unwrap();
        let source = roads_file_source(dir.path());
        let options = RecordOptions::default().indent(2).declaration();
        let mut record = Record::open_with(source, "roads", options).unwrap();
        record.save(None).unwrap();

        let stored = std::fs::read_to_string(dir.path().join("roads.xml")).unwrap();
        assert!(stored.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(stored.contains("\n  <Esri>"));
    }
}

mod fields {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn edit_and_commit() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = Record::open(roads_file_source(dir.path()), "roads").unwrap();

        let tree = record.tree_mut().unwrap();
        assert!(tree.modify_text("idinfo/descript/purpose", "Dispatch").unwrap());
        assert!(tree
            .create_text("idinfo/keywords/place/placekey", "Shelbyville")
            .unwrap());
        assert!(tree.delete("Esri").unwrap());
        record.commit().unwrap();

        let tree = record.tree().unwrap();
        assert_eq!(tree.text_at("idinfo/descript/purpose").unwrap(), "Dispatch");
        assert_eq!(
            tree.list_text("idinfo/keywords/theme/themekey").unwrap(),
            "transportation, roads"
        );
        assert_eq!(
            tree.all_text("idinfo/keywords/place/placekey").unwrap(),
            vec!["Springfield", "Shelbyville"]
        );
        assert!(tree.find("Esri").unwrap().is_none());
    }

    #[test]
    fn bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = Record::open(roads_file_source(dir.path()), "roads").unwrap();
        let tree = record.tree().unwrap();
        assert!(matches!(tree.text_at("idinfo[x]"), Err(MetaError::BadPath(_))));
    }
}

mod export {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn generated_name() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let mut record = Record::open(roads_file_source(dir.path()), "roads").unwrap();

        let path = record.export_to_xml(Some(out.path()), None).unwrap();
        assert_eq!(path.parent(), Some(out.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with(".xml"));
        assert_eq!(name.len(), 32 + 4);

        let exported = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            XmlParser::new().parse(&exported).unwrap(),
            roads_tree().normalized()
        );
    }

    #[test]
    fn extension_appended_and_folder_created() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let folder = out.path().join("exports").join("2024");
        let mut record = Record::open(roads_file_source(dir.path()), "roads").unwrap();

        let path = record.export_to_xml(Some(folder.as_path()), Some("roads_copy")).unwrap();
        assert_eq!(path, folder.join("roads_copy.xml"));
        assert!(path.is_file());

        let path = record.export_to_xml(Some(folder.as_path()), Some("keep.XML")).unwrap();
        assert_eq!(path, folder.join("keep.XML"));
    }

    #[test]
    fn default_folder_from_options() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let options = RecordOptions::default().export_dir(out.path());
        let mut record =
            Record::open_with(roads_file_source(dir.path()), "roads", options).unwrap();

        let path = record.export_to_xml(None, Some("roads")).unwrap();
        assert_eq!(path, out.path().join("roads.xml"));
    }
}

mod import {
    use super::*;
    use pretty_assertions::assert_eq;

    const IMPORTED: &str = "<metadata><idinfo><title>Imported</title></idinfo></metadata>";

    #[test]
    fn replaces_metadata() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let files = tempfile::tempdir().unwrap();
        let file = files.path().join("new.xml");
        std::fs::write(&file, IMPORTED).unwrap();

        let mut record = Record::open(roads_file_source(dir.path()), "roads").unwrap();
        record.tree().unwrap();
        let doc = record.import_xml_file(&file).unwrap().unwrap();

        assert_eq!(doc, metadict::encode(&XmlParser::new().parse(IMPORTED).unwrap()));
        assert_eq!(record.convert().unwrap(), doc);
        let stored = std::fs::read_to_string(dir.path().join("roads.xml")).unwrap();
        assert_eq!(stored, IMPORTED);
    }

    #[test]
    fn ignores_non_xml_paths() {
        let dir = tempfile::tempdir().unwrap();
        let files = tempfile::tempdir().unwrap();
        let text = files.path().join("notes.txt");
        std::fs::write(&text, IMPORTED).unwrap();

        let mut record = Record::open(roads_file_source(dir.path()), "roads").unwrap();
        assert_eq!(record.import_xml_file(&text).unwrap(), None);
        assert_eq!(
            record.import_xml_file(files.path().join("missing.xml")).unwrap(),
            None
        );
        let stored = std::fs::read_to_string(dir.path().join("roads.xml")).unwrap();
        assert_eq!(stored, ROADS_XML);
    }

    #[test]
    fn malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let files = tempfile::tempdir().unwrap();
        let file = files.path().join("broken.xml");
        std::fs::write(&file, "<metadata><idinfo></metadata>").unwrap();

        let mut record = Record::open(roads_file_source(dir.path()), "roads").unwrap();
        assert!(matches!(
            record.import_xml_file(&file),
            Err(MetaError::ParseError(_))
        ));
        let stored = std::fs::read_to_string(dir.path().join("roads.xml")).unwrap();
        assert_eq!(stored, ROADS_XML);
    }
}

#[cfg(feature = "json")]
mod json {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = Record::open(roads_file_source(dir.path()), "roads").unwrap();

        let value: serde_json::Value = serde_json::from_str(&record.json().unwrap()).unwrap();
        assert_eq!(value["metadata"]["idinfo"]["descript"]["purpose"], "Routing");
        assert_eq!(
            value["metadata"]["idinfo"]["keywords"]["theme"]["themekey"],
            serde_json::json!(["transportation", "roads"])
        );
        assert_eq!(value["metadata"]["idinfo"]["status"], serde_json::Value::Null);
        assert!(record.json_pretty().unwrap().contains("\n  \"metadata\""));
    }
}

#[cfg(unix)]
mod command {
    use super::*;
    use pretty_assertions::assert_eq;
    use metadict::{CommandSource, TempStorage};

    #[test]
    fn round_trip_through_tool() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        let dataset = dir.path().join("roads.xml");
        std::fs::write(&dataset, ROADS_XML).unwrap();

        let source = CommandSource::new("cp").scratch(TempStorage::in_dir(&scratch));
        let mut record = Record::open(source, dataset.as_path()).unwrap();
        let mut doc = record.convert().unwrap();
        doc.root_mut().unwrap().insert("mdStanName", "FGDC-STD-001-1998");
        record.save(Some(doc)).unwrap();

        let stored = std::fs::read_to_string(&dataset).unwrap();
        assert!(stored.contains("<mdStanName>FGDC-STD-001-1998</mdStanName>"));
        assert_eq!(std::fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[test]
    fn failing_tool_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        let dataset = dir.path().join("roads.xml");
        std::fs::write(&dataset, ROADS_XML).unwrap();

        let source = CommandSource::new("false").scratch(TempStorage::in_dir(&scratch));
        let mut record = Record::open(source, dataset.as_path()).unwrap();
        assert!(matches!(record.load(), Err(MetaError::SourceUnavailable(_))));
        assert_eq!(std::fs::read_dir(&scratch).unwrap().count(), 0);
    }
}
