//! Scratch file storage
//!
//! Scratch files stage XML text for external tools. Each one is handed out
//! as a [`TempPath`], which deletes the file when dropped.

use crate::core::error::MetaResult;
use std::path::PathBuf;
use tempfile::TempPath;

const SCRATCH_PREFIX: &str = "metadict-";

/// Provider of scratch file paths
#[derive(Debug, Clone, Default)]
pub struct TempStorage {
    dir: Option<PathBuf>,
}

impl TempStorage {
    /// Scratch files in the system temp directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Scratch files in `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Directory scratch files are created in
    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Create an empty scratch file ending in `suffix`
    ///
    /// The file is removed when the returned path is dropped.
    pub fn new_scratch_path(&self, suffix: &str) -> MetaResult<TempPath> {
        let dir = self.dir();
        std::fs::create_dir_all(&dir)?;
        let file = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(suffix)
            .tempfile_in(&dir)?;
        let path = file.into_temp_path();
        tracing::trace!(path = %path.display(), "created scratch file");
        Ok(path)
    }
}
