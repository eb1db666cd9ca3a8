use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;

/// Media server connection and library selection.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Plex {
    pub server_url: String,
    /// Authentication token. Never serialized, so it can't leak into
    /// generated files or debug dumps.
    #[serde(skip_serializing)]
    pub token: String,
    /// Catalog snapshot used as the media server data source.
    pub catalog: Option<PathBuf>,
    /// Libraries to process. `None` means auto-discover every movie and show
    /// library, sorted by name.
    pub libraries: Option<Vec<LibrarySettings>>,
}
impl Debug for Plex {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Plex")
            .field("server_url", &self.server_url)
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("catalog", &self.catalog)
            .field("libraries", &self.libraries)
            .finish()
    }
}

/// Per-library options.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Library title as reported by the media server.
    pub name: String,
    /// Output directory name for this library; defaults to the library title.
    pub path: Option<String>,
    /// Folder of existing Plex Meta Manager documents to ingest.
    pub pmm_path: Option<PathBuf>,
    /// Skip collections and items that already have an ingested entry.
    pub pmm_delta: bool,
}
impl LibrarySettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Directory name used under the output root.
    pub fn output_name(&self) -> &str {
        self.path.as_deref().filter(|p| !p.trim().is_empty()).unwrap_or(&self.name)
    }
}

/// Behavior of the existing-document cache.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PlexMetaManager {
    /// Ingest each library's `pmm_path` before walking it.
    pub cache_existing_files: bool,
    /// Write the ingested index to `reports/pmm_summary.yaml`.
    pub export_summary: bool,
}
impl Default for PlexMetaManager {
    fn default() -> Self {
        Self { cache_existing_files: true, export_summary: false }
    }
}

/// Poster database search endpoints.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PosterDatabase {
    pub search_url: String,
    pub search_url_pro: String,
    /// Use the pro search, which understands categories, years and ids.
    pub enable_pro: bool,
}
impl Default for PosterDatabase {
    fn default() -> Self {
        Self {
            search_url: "https://theposterdb.com/search".into(),
            search_url_pro: "https://theposterdb.com/search/pro".into(),
            enable_pro: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_redacted() {
        let plex = Plex { token: "secret".into(), ..Plex::default() };
        let debug = format!("{plex:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_output_name_falls_back_to_title() {
        let mut library = LibrarySettings::new("Movies");
        assert_eq!(library.output_name(), "Movies");
        library.path = Some("  ".into());
        assert_eq!(library.output_name(), "Movies");
        library.path = Some("films".into());
        assert_eq!(library.output_name(), "films");
    }
}
