//! Record API
//!
//! A [`Record`] binds the dictionary codec to one dataset of a metadata
//! source.

use crate::core::decoder::decode;
use crate::core::encoder::encode;
use crate::core::error::{MetaError, MetaResult};
use crate::core::node::XmlNode;
use crate::core::parser::XmlParser;
use crate::core::serializer::XmlSerializer;
use crate::record::source::{MetadataSource, RecordOptions, SyncMethod};
use crate::types::dataset::{DatasetProperties, DatasetRef};
use crate::types::value::Document;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Metadata of one dataset
///
/// The parsed document is fetched on first use and cached until the next
/// [`save`](Record::save) or [`commit`](Record::commit). Every stateful
/// operation takes `&mut self`; share a record between threads behind a
/// lock.
///
/// # Example
///
/// ```rust
/// use metadict::{MemorySource, MetadataValue, Record};
///
/// # fn main() -> Result<(), metadict::MetaError> {
/// let source = MemorySource::new();
/// source.insert("roads", "<metadata><idinfo><title>Roads</title></idinfo></metadata>");
///
/// let mut record = Record::open(&source, "roads")?;
/// let mut doc = record.convert()?;
/// if let Some(root) = doc.root_mut() {
///     root.insert("status", MetadataValue::from("complete"));
/// }
/// record.save(Some(doc))?;
///
/// assert!(source.get("roads").unwrap().contains("<status>complete</status>"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Record<S: MetadataSource> {
    source: S,
    dataset: DatasetRef,
    options: RecordOptions,
    tree: Option<XmlNode>,
}

impl<S: MetadataSource> Record<S> {
    /// Open the record of `dataset` with default options
    ///
    /// # Errors
    ///
    /// Returns [`MetaError::SourceUnavailable`] when the source does not
    /// know the dataset.
    pub fn open(source: S, dataset: impl Into<DatasetRef>) -> MetaResult<Self> {
        Self::open_with(source, dataset, RecordOptions::default())
    }

    /// Open the record of `dataset` with options
    pub fn open_with(
        source: S,
        dataset: impl Into<DatasetRef>,
        options: RecordOptions,
    ) -> MetaResult<Self> {
        let dataset = dataset.into();
        if !source.exists(&dataset) {
            return Err(MetaError::SourceUnavailable(format!(
                "dataset '{}' does not exist",
                dataset
            )));
        }
        debug!(dataset = %dataset, "opened record");
        Ok(Self {
            source,
            dataset,
            options,
            tree: None,
        })
    }

    /// The dataset this record is bound to
    pub fn dataset(&self) -> &DatasetRef {
        &self.dataset
    }

    /// The source this record reads from and writes to
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Options the record was opened with
    pub fn options(&self) -> &RecordOptions {
        &self.options
    }

    /// Give back the source
    pub fn into_source(self) -> S {
        self.source
    }

    /// Fetch and parse the document, replacing any cached tree
    #[instrument(skip(self), fields(dataset = %self.dataset))]
    pub fn load(&mut self) -> MetaResult<&XmlNode> {
        let xml = self.source.fetch_xml(&self.dataset)?;
        let tree = XmlParser::new().parse(&xml)?;
        debug!(root = %tree.tag, bytes = xml.len(), "loaded metadata");
        Ok(self.tree.insert(tree))
    }

    /// Cached element tree, loading it first if needed
    pub fn tree(&mut self) -> MetaResult<&XmlNode> {
        self.cached().map(|tree| &*tree)
    }

    /// Cached element tree for in-place edits
    ///
    /// Edits are written back by [`commit`](Record::commit).
    pub fn tree_mut(&mut self) -> MetaResult<&mut XmlNode> {
        self.cached()
    }

    /// Encode the document as a dictionary
    ///
    /// The result is a fresh copy; changes to it reach the source only
    /// through [`save`](Record::save).
    pub fn convert(&mut self) -> MetaResult<Document> {
        Ok(encode(self.cached()?))
    }

    /// Validate `document` and write it to the source
    ///
    /// `None` writes back the current document unchanged. Nothing is written
    /// when decoding fails.
    ///
    /// # Errors
    ///
    /// - [`MetaError::Schema`] when `document` does not follow the encoding
    ///   rules
    /// - [`MetaError::SinkRejected`] when the source refuses the write
    #[instrument(skip_all, fields(dataset = %self.dataset))]
    pub fn save(&mut self, document: Option<Document>) -> MetaResult<()> {
        let document = match document {
            Some(document) => document,
            None => self.convert()?,
        };
        let tree = decode(&document)?;
        self.write(&tree)
    }

    /// Write the cached tree, with any in-place edits, to the source
    #[instrument(skip_all, fields(dataset = %self.dataset))]
    pub fn commit(&mut self) -> MetaResult<()> {
        let tree = self.cached()?.clone();
        self.write(&tree)
    }

    /// Serialized text of the current document
    pub fn xml_text(&mut self) -> MetaResult<String> {
        let serializer = XmlSerializer::with_options(self.options.serialize_options());
        serializer.serialize(self.cached()?)
    }

    /// JSON text of [`convert`](Record::convert)
    #[cfg(feature = "json")]
    pub fn json(&mut self) -> MetaResult<String> {
        self.convert()?.to_json_string()
    }

    /// Indented JSON text of [`convert`](Record::convert)
    #[cfg(feature = "json")]
    pub fn json_pretty(&mut self) -> MetaResult<String> {
        self.convert()?.to_json_string_pretty()
    }

    /// Write the current document to `folder/name`
    ///
    /// `folder` defaults to [`RecordOptions::export_dir`], then the system
    /// temp directory, and is created if missing. `name` defaults to a random
    /// identifier; `.xml` is appended when missing. Returns the written path.
    #[instrument(skip(self), fields(dataset = %self.dataset))]
    pub fn export_to_xml(
        &mut self,
        folder: Option<&Path>,
        name: Option<&str>,
    ) -> MetaResult<PathBuf> {
        let folder = match folder {
            Some(folder) => folder.to_path_buf(),
            None => self
                .options
                .export_dir
                .clone()
                .unwrap_or_else(std::env::temp_dir),
        };
        let mut name = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => uuid::Uuid::new_v4().simple().to_string(),
        };
        if !name.to_ascii_lowercase().ends_with(".xml") {
            name.push_str(".xml");
        }

        let tree = decode(&self.convert()?)?;
        let xml = XmlSerializer::with_options(self.options.serialize_options()).serialize(&tree)?;

        std::fs::create_dir_all(&folder)?;
        let path = folder.join(name);
        std::fs::write(&path, xml)?;
        info!(path = %path.display(), "exported metadata");
        Ok(path)
    }

    /// Replace the metadata with the contents of an XML file
    ///
    /// Returns the new document, or `None` (leaving the metadata untouched)
    /// when `path` is not an existing `.xml` file.
    ///
    /// # Errors
    ///
    /// - [`MetaError::ParseError`] when the file is not well-formed XML
    /// - [`MetaError::SinkRejected`] when the source refuses the write
    #[instrument(skip(self, path), fields(dataset = %self.dataset, path = %path.as_ref().display()))]
    pub fn import_xml_file(&mut self, path: impl AsRef<Path>) -> MetaResult<Option<Document>> {
        let path = path.as_ref();
        let is_xml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if !is_xml || !path.is_file() {
            warn!("not an XML file, nothing imported");
            return Ok(None);
        }

        let xml = std::fs::read_to_string(path)?;
        XmlParser::new().parse(&xml)?;
        self.source.replace_xml(&self.dataset, &xml)?;
        info!("imported metadata");

        self.load()?;
        self.convert().map(Some)
    }

    /// Have the source refresh the metadata from the dataset's properties
    ///
    /// Drops the cached tree so the next read sees the refreshed document.
    ///
    /// # Errors
    ///
    /// Returns [`MetaError::NotSupported`] when the source cannot
    /// synchronize, or the source's error when synchronization fails.
    #[instrument(skip(self), fields(dataset = %self.dataset))]
    pub fn set_sync_method(&mut self, method: SyncMethod) -> MetaResult<&DatasetRef> {
        self.source.synchronize(&self.dataset, method)?;
        self.tree = None;
        info!(%method, "synchronized metadata");
        Ok(&self.dataset)
    }

    /// Properties of the dataset and its workspace
    pub fn dataset_properties(&self) -> MetaResult<DatasetProperties> {
        self.source.describe(&self.dataset)
    }

    fn cached(&mut self) -> MetaResult<&mut XmlNode> {
        if self.tree.is_none() {
            self.load()?;
        }
        match self.tree.as_mut() {
            Some(tree) => Ok(tree),
            None => Err(MetaError::SourceUnavailable(format!(
                "no metadata loaded for '{}'",
                self.dataset
            ))),
        }
    }

    /// Serialize `tree`, hand it to the source and drop the cache
    fn write(&mut self, tree: &XmlNode) -> MetaResult<()> {
        let xml = XmlSerializer::with_options(self.options.serialize_options()).serialize(tree)?;
        self.source.replace_xml(&self.dataset, &xml)?;
        self.tree = None;
        info!(bytes = xml.len(), "saved metadata");
        Ok(())
    }
}
