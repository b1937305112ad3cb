//! Built-in metadata sources
//!
//! - [`MemorySource`]: documents held in process
//! - [`FileSource`]: one `.xml` file per dataset under a root folder
//! - [`CommandSource`]: an external conversion tool run as
//!   `<program> [args..] <from> <to>`, with an optional synchronization
//!   tool run as `<program> <dataset> <METHOD>`

use crate::core::error::{MetaError, MetaResult};
use crate::record::scratch::TempStorage;
use crate::record::source::{MetadataSource, SyncMethod};
use crate::types::dataset::DatasetRef;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-process metadata store
///
/// Useful for tests and for documents that never touch the filesystem.
#[derive(Debug, Default)]
pub struct MemorySource {
    documents: Mutex<HashMap<DatasetRef, String>>,
    read_only: bool,
}

impl MemorySource {
    /// Create an empty, writable store
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every write with [`MetaError::SinkRejected`]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Store the document of a dataset, returning the previous one
    pub fn insert(&self, dataset: impl Into<DatasetRef>, xml: impl Into<String>) -> Option<String> {
        self.lock().insert(dataset.into(), xml.into())
    }

    /// Current document of a dataset
    pub fn get(&self, dataset: impl Into<DatasetRef>) -> Option<String> {
        self.lock().get(&dataset.into()).cloned()
    }

    /// Remove a dataset
    pub fn remove(&self, dataset: impl Into<DatasetRef>) -> Option<String> {
        self.lock().remove(&dataset.into())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DatasetRef, String>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetadataSource for MemorySource {
    fn exists(&self, dataset: &DatasetRef) -> bool {
        self.lock().contains_key(dataset)
    }

    fn fetch_xml(&self, dataset: &DatasetRef) -> MetaResult<String> {
        self.lock()
            .get(dataset)
            .cloned()
            .ok_or_else(|| MetaError::SourceUnavailable(format!("'{}' not found", dataset)))
    }

    fn replace_xml(&self, dataset: &DatasetRef, xml: &str) -> MetaResult<()> {
        if self.read_only {
            return Err(MetaError::SinkRejected(format!(
                "'{}' is read-only",
                dataset
            )));
        }
        self.lock().insert(dataset.clone(), xml.to_string());
        Ok(())
    }
}

/// Folder of `.xml` metadata files
///
/// The document of dataset `a/b` lives at `<root>/a/b.xml`. Replacements are
/// written to a temporary file next to the target and renamed over it.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    read_only: bool,
}

impl FileSource {
    /// Create a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: false,
        }
    }

    /// Refuse every write with [`MetaError::SinkRejected`]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Root folder of this source
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the metadata file of a dataset
    pub fn xml_path(&self, dataset: &DatasetRef) -> PathBuf {
        let mut path = self.root.join(dataset.path()).into_os_string();
        path.push(".xml");
        PathBuf::from(path)
    }
}

impl MetadataSource for FileSource {
    fn exists(&self, dataset: &DatasetRef) -> bool {
        self.xml_path(dataset).is_file()
    }

    fn fetch_xml(&self, dataset: &DatasetRef) -> MetaResult<String> {
        let path = self.xml_path(dataset);
        std::fs::read_to_string(&path).map_err(|e| {
            MetaError::SourceUnavailable(format!("cannot read '{}': {}", path.display(), e))
        })
    }

    fn replace_xml(&self, dataset: &DatasetRef, xml: &str) -> MetaResult<()> {
        let path = self.xml_path(dataset);
        if self.read_only {
            return Err(MetaError::SinkRejected(format!(
                "'{}' is read-only",
                path.display()
            )));
        }
        let rejected =
            |e: std::io::Error| MetaError::SinkRejected(format!("'{}': {}", path.display(), e));

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(rejected)?;
        let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(rejected)?;
        staged.write_all(xml.as_bytes()).map_err(rejected)?;
        staged.flush().map_err(rejected)?;
        staged.persist(&path).map_err(|e| rejected(e.error))?;
        Ok(())
    }
}

/// External conversion tool
///
/// The tool is invoked as `<program> [args..] <from> <to>`. Reading a
/// dataset converts the dataset into a scratch file; writing converts a
/// scratch file into the dataset. A dataset exists when its path exists.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: OsString,
    args: Vec<OsString>,
    sync_program: Option<OsString>,
    scratch: TempStorage,
}

impl CommandSource {
    /// Create a source running `program`
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            sync_program: None,
            scratch: TempStorage::new(),
        }
    }

    /// Pass `arg` before the file paths
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Synchronize datasets by running `program <dataset> <METHOD>`
    pub fn sync_program(mut self, program: impl Into<OsString>) -> Self {
        self.sync_program = Some(program.into());
        self
    }

    /// Stage documents in `storage`
    pub fn scratch(mut self, storage: TempStorage) -> Self {
        self.scratch = storage;
        self
    }

    /// Run the conversion tool, returning a description of the failure
    fn run(&self, from: &Path, to: &Path) -> Result<(), String> {
        tracing::debug!(
            program = %Path::new(&self.program).display(),
            from = %from.display(),
            to = %to.display(),
            "running conversion tool"
        );
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(from).arg(to);
        run_command(&self.program, &mut command)
    }
}

fn run_command(program: &OsStr, command: &mut Command) -> Result<(), String> {
    let program = Path::new(program);
    let output = command
        .output()
        .map_err(|e| format!("cannot run '{}': {}", program.display(), e))?;
    if output.status.success() {
        Ok(())
    } else {
        Err(format!(
            "'{}' exited with {}: {}",
            program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

impl MetadataSource for CommandSource {
    fn exists(&self, dataset: &DatasetRef) -> bool {
        dataset.path().exists()
    }

    fn fetch_xml(&self, dataset: &DatasetRef) -> MetaResult<String> {
        let scratch = self.scratch.new_scratch_path(".xml")?;
        self.run(dataset.path(), &scratch)
            .map_err(MetaError::SourceUnavailable)?;
        let xml = std::fs::read_to_string(&scratch)
            .map_err(|e| MetaError::SourceUnavailable(format!("cannot read export: {}", e)))?;
        if xml.trim().is_empty() {
            return Err(MetaError::SourceUnavailable(format!(
                "'{}' produced no metadata",
                dataset
            )));
        }
        Ok(xml)
    }

    fn replace_xml(&self, dataset: &DatasetRef, xml: &str) -> MetaResult<()> {
        let scratch = self.scratch.new_scratch_path(".xml")?;
        std::fs::write(&scratch, xml)?;
        self.run(&scratch, dataset.path())
            .map_err(MetaError::SinkRejected)
    }

    fn synchronize(&self, dataset: &DatasetRef, method: SyncMethod) -> MetaResult<()> {
        let Some(program) = &self.sync_program else {
            return Err(MetaError::NotSupported(format!(
                "no synchronization tool configured for '{}'",
                dataset
            )));
        };
        tracing::debug!(
            program = %Path::new(program).display(),
            dataset = %dataset,
            method = %method,
            "running synchronization tool"
        );
        let mut command = Command::new(program);
        command.arg(dataset.path()).arg(method.as_str());
        run_command(program, &mut command).map_err(MetaError::SinkRejected)
    }
}
