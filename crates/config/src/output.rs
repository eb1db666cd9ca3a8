use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where and how generated files are written.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Output {
    /// Root directory for all generated files.
    pub path: PathBuf,
    /// Per-library directory, relative to [`path`](Self::path). An `upon`
    /// template with `library` in scope.
    pub path_format: String,
    /// Replace files that already exist.
    pub overwrite: bool,
    pub file_name_format: FileNameFormats,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data"),
            path_format: "{{ library.path|clean }}".into(),
            overwrite: false,
            file_name_format: FileNameFormats::default(),
        }
    }
}

/// File name templates (without extension) for each kind of generated file.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct FileNameFormats {
    pub collections: String,
    pub metadata: String,
    pub template: String,
    pub library_report: String,
    pub collections_report: String,
    pub metadata_report: String,
}
impl Default for FileNameFormats {
    fn default() -> Self {
        Self {
            collections: "{{ collection.title|clean }}".into(),
            metadata: "{{ item.display_title|clean }}".into(),
            template: "templates".into(),
            library_report: "{{ library.path|clean }}".into(),
            collections_report: "collections".into(),
            metadata_report: "metadata".into(),
        }
    }
}
