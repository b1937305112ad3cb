//! Dataset records
//!
//! This module binds the dictionary codec to metadata sources: the
//! [`MetadataSource`] trait, the built-in sources, scratch storage for
//! external tools and the [`Record`] facade.

pub mod api;
pub mod scratch;
pub mod source;
pub mod sources;

pub use api::Record;
pub use scratch::TempStorage;
pub use source::{MetadataSource, RecordOptions, SyncMethod};
pub use sources::{CommandSource, FileSource, MemorySource};
