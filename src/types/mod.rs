//! Dictionary and dataset types
//!
//! This module defines the dictionary side of the codec and the dataset
//! descriptions used by the record facade.

pub mod dataset;
pub mod value;

pub use dataset::{DatasetProperties, DatasetRef, WorkspaceProperties};
pub use value::{Document, Member, MetadataValue, ObjectMap, ATTRIBUTE_PREFIX, TEXT_KEY};
