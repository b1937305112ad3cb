//! Dataset identity and properties
//!
//! A [`DatasetRef`] names one dataset of a metadata source. Its last
//! component may be a qualified table name (`database.owner.table`).

use std::fmt;
use std::path::{Path, PathBuf};

/// File extensions recognized as file-backed datasets rather than
/// qualified table names
const FILE_EXTENSIONS: &[&str] = &["shp", "dbf", "csv", "xml", "json", "tif", "tiff", "gpkg"];

/// Reference to one dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetRef(PathBuf);

impl DatasetRef {
    /// Create a dataset reference from a path or name
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The reference as a path
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Last component of the reference (e.g. `owner.roads` or `roads.shp`)
    pub fn name(&self) -> String {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Containing workspace, empty for bare names
    pub fn workspace(&self) -> &Path {
        self.0.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Lowercase file extension when the last component is a data file
    pub fn file_extension(&self) -> Option<String> {
        let ext = self.0.extension()?.to_string_lossy().to_lowercase();
        FILE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for DatasetRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for DatasetRef {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for DatasetRef {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for DatasetRef {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

/// Workspace part of [`DatasetProperties`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "camelCase"))]
pub struct WorkspaceProperties {
    /// Data type of the workspace (e.g. `Folder`, `Workspace`)
    #[cfg_attr(feature = "json", serde(rename = "type"))]
    pub kind: String,
    /// Workspace path
    pub path: String,
    /// Connection string, empty for file workspaces
    pub connection_string: String,
    /// `FileSystem`, `LocalDatabase` or `RemoteDatabase`
    pub workspace_type: String,
    /// Identifier of the workspace factory, if the source has one
    #[cfg_attr(feature = "json", serde(rename = "workspaceFactoryProgID"))]
    pub workspace_factory_prog_id: String,
}

/// Common properties of a dataset and its workspace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "camelCase"))]
pub struct DatasetProperties {
    pub owner: String,
    pub table_name: String,
    pub alias: String,
    pub database: String,
    /// Data type of the workspace, same as [`WorkspaceProperties::kind`]
    pub data_type: String,
    pub dataset_type: String,
    pub workspace: WorkspaceProperties,
}

impl DatasetProperties {
    /// Derive properties from the shape of a dataset reference
    ///
    /// File datasets use the file stem as table name. Other names are read
    /// as `[[database.]owner.]table`.
    pub fn from_ref(dataset: &DatasetRef) -> Self {
        let name = dataset.name();
        let workspace_path = dataset.workspace().to_string_lossy().into_owned();

        let (database, owner, table_name, dataset_type) = match dataset.file_extension() {
            Some(ext) => {
                let stem = dataset
                    .path()
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                (String::new(), String::new(), stem, file_dataset_type(&ext))
            }
            None => {
                let (database, owner, table) = parse_table_name(&name);
                (database, owner, table, "Table".to_string())
            }
        };

        let (kind, workspace_type) = workspace_kind(&workspace_path);

        Self {
            owner,
            table_name,
            alias: String::new(),
            database,
            data_type: kind.to_string(),
            dataset_type,
            workspace: WorkspaceProperties {
                kind: kind.to_string(),
                path: workspace_path,
                connection_string: String::new(),
                workspace_type: workspace_type.to_string(),
                workspace_factory_prog_id: String::new(),
            },
        }
    }
}

/// Split `[[database.]owner.]table` into its parts
fn parse_table_name(name: &str) -> (String, String, String) {
    let mut parts = name.rsplitn(3, '.');
    let table = parts.next().unwrap_or_default().to_string();
    let owner = parts.next().unwrap_or_default().to_string();
    let database = parts.next().unwrap_or_default().to_string();
    (database, owner, table)
}

fn file_dataset_type(ext: &str) -> String {
    match ext {
        "shp" => "ShapeFile",
        "dbf" | "csv" => "Table",
        "tif" | "tiff" => "RasterDataset",
        "gpkg" => "GeoPackage",
        _ => "File",
    }
    .to_string()
}

fn workspace_kind(workspace: &str) -> (&'static str, &'static str) {
    let lower = workspace.to_lowercase();
    if lower.ends_with(".gdb") || lower.ends_with(".gpkg") {
        ("Workspace", "LocalDatabase")
    } else if lower.ends_with(".sde") {
        ("Workspace", "RemoteDatabase")
    } else {
        ("Folder", "FileSystem")
    }
}
