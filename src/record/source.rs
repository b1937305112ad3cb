//! Metadata source trait
//!
//! This module defines the trait every metadata source implements, and the
//! options a [`Record`](crate::record::Record) is opened with.

use crate::core::error::{MetaError, MetaResult};
use crate::core::serializer::SerializeOptions;
use crate::types::dataset::{DatasetProperties, DatasetRef};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Options for record operations.
///
/// Use the builder pattern to configure options. These options control how
/// a record serializes its documents and where exports land by default.
///
/// # Example
///
/// ```rust,no_run
/// use metadict::{MemorySource, Record, RecordOptions};
///
/// let source = MemorySource::new();
/// source.insert("roads", "<metadata/>");
/// let mut record = Record::open_with(
///     source,
///     "roads",
///     RecordOptions::default().indent(2).declaration(),
/// )?;
/// let path = record.export_to_xml(None, Some("roads"))?;
/// # Ok::<(), metadict::MetaError>(())
/// ```
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct RecordOptions {
    /// Indentation width for XML handed to the source, `None` for compact
    pub indent: Option<usize>,
    /// Emit an XML declaration in written documents
    pub declaration: bool,
    /// Default folder of [`Record::export_to_xml`](crate::record::Record::export_to_xml),
    /// the system temp directory when unset
    pub export_dir: Option<PathBuf>,
}

impl RecordOptions {
    /// Indent written documents by `width` spaces.
    pub fn indent(mut self, width: usize) -> Self {
        self.indent = Some(width);
        self
    }

    /// Write documents on one line (default).
    pub fn compact(mut self) -> Self {
        self.indent = None;
        self
    }

    /// Start written documents with an XML declaration.
    pub fn declaration(mut self) -> Self {
        self.declaration = true;
        self
    }

    /// Export into `dir` when no folder is given.
    pub fn export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    /// Serializer options derived from these options
    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            indent: self.indent,
            declaration: self.declaration,
            ..SerializeOptions::default()
        }
    }
}

/// How a source refreshes metadata from the properties of its dataset
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncMethod {
    /// Always add or update dataset properties, creating metadata if needed
    #[default]
    Always,
    /// Create metadata only for datasets that have none
    Created,
    /// Update existing metadata only
    NotCreated,
    /// Like `Always`, but replace every property a person may have typed in
    Overwrite,
    /// Like `Overwrite`, but keep the title and content type
    Selective,
    /// Add or update dataset properties whenever the dataset is accessed
    Accessed,
}

impl SyncMethod {
    /// Every method, in declaration order
    pub const ALL: [SyncMethod; 6] = [
        SyncMethod::Always,
        SyncMethod::Created,
        SyncMethod::NotCreated,
        SyncMethod::Overwrite,
        SyncMethod::Selective,
        SyncMethod::Accessed,
    ];

    /// Upper-case name of the method, e.g. `NOT_CREATED`
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMethod::Always => "ALWAYS",
            SyncMethod::Created => "CREATED",
            SyncMethod::NotCreated => "NOT_CREATED",
            SyncMethod::Overwrite => "OVERWRITE",
            SyncMethod::Selective => "SELECTIVE",
            SyncMethod::Accessed => "ACCESSED",
        }
    }
}

impl fmt::Display for SyncMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncMethod {
    type Err = MetaError;

    /// Parse a method name, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| MetaError::NotSupported(format!("invalid sync method '{}'", s)))
    }
}

/// Trait for metadata sources
///
/// A source materializes the metadata of a dataset as XML text and accepts
/// a replacement document. Sources are shared between threads, so every
/// implementation must be `Send + Sync`.
pub trait MetadataSource: Send + Sync {
    /// Check if the dataset exists in this source
    fn exists(&self, dataset: &DatasetRef) -> bool;

    /// Read the metadata document of a dataset
    ///
    /// # Errors
    ///
    /// Returns [`MetaError::SourceUnavailable`](crate::MetaError::SourceUnavailable)
    /// when the document cannot be delivered.
    fn fetch_xml(&self, dataset: &DatasetRef) -> MetaResult<String>;

    /// Replace the metadata document of a dataset
    ///
    /// The replacement is all-or-nothing: on error the stored document is
    /// left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`MetaError::SinkRejected`](crate::MetaError::SinkRejected)
    /// when the source refuses the write.
    fn replace_xml(&self, dataset: &DatasetRef, xml: &str) -> MetaResult<()>;

    /// Describe the dataset and its workspace
    ///
    /// The default derives the properties from the shape of the reference.
    fn describe(&self, dataset: &DatasetRef) -> MetaResult<DatasetProperties> {
        Ok(DatasetProperties::from_ref(dataset))
    }

    /// Refresh the metadata of a dataset from its current properties
    ///
    /// # Errors
    ///
    /// The default returns [`MetaError::NotSupported`]; sources without
    /// access to dataset properties keep it.
    fn synchronize(&self, dataset: &DatasetRef, method: SyncMethod) -> MetaResult<()> {
        Err(MetaError::NotSupported(format!(
            "cannot synchronize '{}' with method {}",
            dataset, method
        )))
    }
}

impl<T: MetadataSource + ?Sized> MetadataSource for &T {
    fn exists(&self, dataset: &DatasetRef) -> bool {
        (**self).exists(dataset)
    }

    fn fetch_xml(&self, dataset: &DatasetRef) -> MetaResult<String> {
        (**self).fetch_xml(dataset)
    }

    fn replace_xml(&self, dataset: &DatasetRef, xml: &str) -> MetaResult<()> {
        (**self).replace_xml(dataset, xml)
    }

    fn describe(&self, dataset: &DatasetRef) -> MetaResult<DatasetProperties> {
        (**self).describe(dataset)
    }

    fn synchronize(&self, dataset: &DatasetRef, method: SyncMethod) -> MetaResult<()> {
        (**self).synchronize(dataset, method)
    }
}

impl<T: MetadataSource + ?Sized> MetadataSource for std::sync::Arc<T> {
    fn exists(&self, dataset: &DatasetRef) -> bool {
        (**self).exists(dataset)
    }

    fn fetch_xml(&self, dataset: &DatasetRef) -> MetaResult<String> {
        (**self).fetch_xml(dataset)
    }

    fn replace_xml(&self, dataset: &DatasetRef, xml: &str) -> MetaResult<()> {
        (**self).replace_xml(dataset, xml)
    }

    fn describe(&self, dataset: &DatasetRef) -> MetaResult<DatasetProperties> {
        (**self).describe(dataset)
    }

    fn synchronize(&self, dataset: &DatasetRef, method: SyncMethod) -> MetaResult<()> {
        (**self).synchronize(dataset, method)
    }
}
