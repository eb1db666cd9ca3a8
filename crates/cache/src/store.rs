use crate::entry::Entry;
use crate::error::{ErrorKind, Result};
use crate::value::{key_to_string, kind_of};
use crate::view::{CollectionView, MetadataView, SeasonPosters};
use derive_more::Display;
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::instrument;
use walkdir::WalkDir;

/// The three partitions of a [`DocumentStore`], named after the top-level
/// document key each is read from.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Namespace {
    #[display("collections")]
    Collections,
    #[display("metadata")]
    Metadata,
    #[display("overlays")]
    Overlays,
}
impl Namespace {
    pub const ALL: [Namespace; 3] = [Self::Collections, Self::Metadata, Self::Overlays];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collections => "collections",
            Self::Metadata => "metadata",
            Self::Overlays => "overlays",
        }
    }
}

/// Entries of one namespace, unique by key, iterated in first-insertion order.
#[derive(Clone, Debug, Default)]
pub struct Index {
    entries: Vec<Entry>,
    positions: HashMap<String, usize>,
}
impl Index {
    /// Replacing an existing key keeps its original position.
    fn insert(&mut self, entry: Entry) {
        match self.positions.get(entry.key()) {
            Some(&position) => self.entries[position] = entry,
            None => {
                self.positions.insert(entry.key().to_string(), self.entries.len());
                self.entries.push(entry);
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.positions.get(key).map(|&position| &self.entries[position])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn to_mapping(&self) -> Mapping {
        self.entries
            .iter()
            .map(|entry| (Value::String(entry.key().to_string()), Value::Mapping(entry.fields().clone())))
            .collect()
    }
}

/// Number of entries held in each namespace.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Deserialize, Serialize)]
#[display("{collections} collections, {metadata} metadata, {overlays} overlays")]
pub struct Counts {
    pub collections: usize,
    pub metadata: usize,
    pub overlays: usize,
}

/// Outcome of ingesting a folder.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IngestReport {
    /// Files merged successfully.
    pub files: usize,
    /// Entries merged from those files, duplicates included.
    pub entries: usize,
    /// Files that could not be read, parsed or merged.
    pub failed: Vec<PathBuf>,
    /// Namespace sizes once the folder has been merged.
    pub counts: Counts,
}

#[derive(Default)]
struct Staged(Vec<(Namespace, Entry)>);
impl Staged {
    fn document(&mut self, document: Value) -> Result<()> {
        let document = match document {
            Value::Mapping(document) => document,
            Value::Null => return Ok(()),
            other => {
                tracing::debug!(shape = kind_of(&other), "Ignoring document that is not a mapping");
                return Ok(());
            },
        };
        for namespace in Namespace::ALL {
            match document.get(namespace.as_str()) {
                None | Some(Value::Null) => {},
                Some(Value::Mapping(entries)) => self.namespace(namespace, entries)?,
                Some(other) => exn::bail!(ErrorKind::Shape(format!("'{namespace}' is a {}, not a mapping", kind_of(other)))),
            }
        }
        Ok(())
    }

    fn namespace(&mut self, namespace: Namespace, entries: &Mapping) -> Result<()> {
        for (key, value) in entries {
            if value.is_null() {
                continue;
            }
            let Some(key) = key_to_string(key) else {
                exn::bail!(ErrorKind::Shape(format!("'{namespace}' has a {} key", kind_of(key))));
            };
            self.0.push((namespace, Entry::new(key, value.clone())?));
        }
        Ok(())
    }
}

/// Index of existing Plex Meta Manager documents for one library.
///
/// Documents are merged key by key into three namespaces; a key seen again
/// replaces the earlier entry (last write wins, walk order is file name
/// order). After ingestion the store is only read: the walk asks it whether a
/// collection or item was already customized, and for the values to carry
/// forward when it was.
#[derive(Clone, Debug, Default)]
pub struct DocumentStore {
    collections: Index,
    metadata: Index,
    overlays: Index,
}
impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self, namespace: Namespace) -> &Index {
        match namespace {
            Namespace::Collections => &self.collections,
            Namespace::Metadata => &self.metadata,
            Namespace::Overlays => &self.overlays,
        }
    }

    fn index_mut(&mut self, namespace: Namespace) -> &mut Index {
        match namespace {
            Namespace::Collections => &mut self.collections,
            Namespace::Metadata => &mut self.metadata,
            Namespace::Overlays => &mut self.overlays,
        }
    }

    pub fn counts(&self) -> Counts {
        Counts { collections: self.collections.len(), metadata: self.metadata.len(), overlays: self.overlays.len() }
    }

    // =========================================================================
    // Ingest
    // =========================================================================

    /// Merge every file below `path`, in file name order.
    ///
    /// A folder that does not exist is nothing to ingest. Files that fail to
    /// read, parse or merge are logged and skipped; they never abort the walk.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn ingest_folder(&mut self, path: &Path) -> IngestReport {
        let mut report = IngestReport::default();
        if !path.is_dir() {
            tracing::warn!("Folder does not exist; nothing to ingest");
            report.counts = self.counts();
            return report;
        }
        tracing::info!("Processing folder");
        for item in WalkDir::new(path).follow_links(true).sort_by_file_name() {
            let item = match item {
                Ok(item) => item,
                Err(err) => {
                    tracing::error!(error = %err, "Unable to walk folder entry");
                    if let Some(path) = err.path() {
                        report.failed.push(path.to_path_buf());
                    }
                    continue;
                },
            };
            if !item.file_type().is_file() {
                continue;
            }
            match self.ingest_file(item.path()) {
                Ok(entries) => {
                    report.files += 1;
                    report.entries += entries;
                },
                Err(err) => {
                    tracing::error!(file = %item.path().display(), error = ?err, "Skipping document");
                    report.failed.push(item.path().to_path_buf());
                },
            }
        }
        report.counts = self.counts();
        tracing::info!(
            collections = report.counts.collections,
            metadata = report.counts.metadata,
            overlays = report.counts.overlays,
            failed = report.failed.len(),
            "Finished processing folder"
        );
        report
    }

    /// Merge a single file. Returns the number of entries merged.
    pub fn ingest_file(&mut self, path: &Path) -> Result<usize> {
        tracing::debug!(file = %path.display(), "Loading file");
        let text = std::fs::read_to_string(path).or_raise(|| ErrorKind::Read(path.to_path_buf()))?;
        self.ingest_str(&path.display().to_string(), &text)
    }

    /// Merge every YAML document in `text`, in order.
    ///
    /// All entries are staged before any is merged, so a file that fails
    /// half-way leaves the store untouched. `source` names the text in errors.
    pub fn ingest_str(&mut self, source: &str, text: &str) -> Result<usize> {
        let mut staged = Staged::default();
        for document in serde_yaml::Deserializer::from_str(text) {
            let mut document = Value::deserialize(document).or_raise(|| ErrorKind::Parse(source.to_string()))?;
            document.apply_merge().or_raise(|| ErrorKind::Parse(source.to_string()))?;
            staged.document(document)?;
        }
        let merged = staged.0.len();
        for (namespace, entry) in staged.0 {
            tracing::trace!(namespace = %namespace, key = %entry.key(), "Merging entry");
            self.index_mut(namespace).insert(entry);
        }
        Ok(merged)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Exact key first, then the first entry whose `title`, `alt_title` or
    /// `orig_title` equals `name`.
    pub fn find_collection_by_name(&self, name: &str) -> Option<&Entry> {
        self.collections.get(name).or_else(|| self.collections.iter().find(|entry| entry.matches_name(name, true)))
    }

    /// Exact key first, then the first entry matching on title, alternate or
    /// original title. With a `year`, a textual match only counts when its own
    /// year is within one year of it; otherwise the scan continues.
    pub fn find_metadata_by_name(&self, name: &str, year: Option<i64>) -> Option<&Entry> {
        self.metadata.get(name).or_else(|| {
            self.metadata.iter().find(|entry| entry.matches_name(name, true) && entry.matches_year(year))
        })
    }

    /// Exact key first, then the first entry whose `title` equals `name`.
    pub fn find_overlay_by_name(&self, name: &str) -> Option<&Entry> {
        self.overlays.get(name).or_else(|| self.overlays.iter().find(|entry| entry.matches_name(name, false)))
    }

    pub fn collection_poster_url(&self, name: &str) -> Option<String> {
        self.find_collection_by_name(name)?.poster_url()
    }

    pub fn metadata_poster_url(&self, name: &str, year: Option<i64>) -> Option<String> {
        self.find_metadata_by_name(name, year)?.poster_url()
    }

    /// Poster URL of every season that has one. Empty without a match.
    pub fn season_poster_urls(&self, name: &str, year: Option<i64>) -> SeasonPosters {
        self.find_metadata_by_name(name, year).map(SeasonPosters::from).unwrap_or_default()
    }

    /// Poster URL of one season; `year` only disambiguates the show.
    pub fn season_poster_url(&self, name: &str, season_number: u32, year: Option<i64>) -> Option<String> {
        self.find_metadata_by_name(name, year)?.season(season_number)?.poster_url()
    }

    /// A list-valued attribute of a collection; empty without a match.
    pub fn collection_list(&self, name: &str, attribute: &str) -> Vec<String> {
        self.find_collection_by_name(name).map(|entry| entry.resolve_list(attribute)).unwrap_or_default()
    }

    pub fn show_list(&self, name: &str) -> Vec<String> {
        self.collection_list(name, "show")
    }

    pub fn movie_list(&self, name: &str) -> Vec<String> {
        self.collection_list(name, "movie")
    }

    pub fn collection_references(&self, name: &str) -> Vec<String> {
        self.collection_list(name, "collection")
    }

    pub fn list_references(&self, name: &str) -> Vec<String> {
        self.collection_list(name, "list")
    }

    pub fn collection_view(&self, name: &str) -> CollectionView {
        CollectionView::new(name, self.find_collection_by_name(name))
    }

    pub fn metadata_view(&self, name: &str, year: Option<i64>) -> MetadataView {
        MetadataView::new(name, self.find_metadata_by_name(name, year))
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Every namespace as a single document, entries as they were ingested.
    pub fn summary(&self) -> Value {
        let mut summary = Mapping::new();
        for namespace in Namespace::ALL {
            summary.insert(namespace.as_str().into(), Value::Mapping(self.index(namespace).to_mapping()));
        }
        Value::Mapping(summary)
    }

    /// Write [`summary`](Self::summary) as YAML, creating parent directories.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn export_summary(&self, path: &Path) -> Result<()> {
        let raise = || ErrorKind::Export(path.to_path_buf());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).or_raise(raise)?;
        }
        let text = serde_yaml::to_string(&self.summary()).or_raise(raise)?;
        std::fs::write(path, text).or_raise(raise)?;
        tracing::info!(counts = %self.counts(), "Exported document summary");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(text: &str) -> DocumentStore {
        let mut store = DocumentStore::new();
        store.ingest_str("test", text).unwrap();
        store
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut store = store("collections: {A: {title: a}, B: {title: b}}");
        store.ingest_str("again", "collections: {A: {title: z}}").unwrap();
        let keys: Vec<&str> = store.index(Namespace::Collections).iter().map(Entry::key).collect();
        assert_eq!(keys, ["A", "B"]);
        assert_eq!(store.find_collection_by_name("A").and_then(Entry::title).as_deref(), Some("z"));
    }

    #[test]
    fn test_null_entries_are_skipped() {
        let store = store("collections: {A: ~, B: {title: b}}\nmetadata: ~");
        assert_eq!(store.counts(), Counts { collections: 1, metadata: 0, overlays: 0 });
    }

    #[test]
    fn test_numeric_keys() {
        let store = store("metadata: {603: {title: The Matrix}}");
        assert!(store.find_metadata_by_name("603", None).is_some());
    }

    #[test]
    fn test_multiple_documents() {
        let store = store("collections: {A: {title: a}}\n---\noverlays: {O: {title: o}}\n");
        assert_eq!(store.counts(), Counts { collections: 1, metadata: 0, overlays: 1 });
    }

    #[test]
    fn test_bad_file_is_merged_atomically() {
        let mut store = DocumentStore::new();
        let err = store.ingest_str("bad", "collections: {A: {title: a}}\nmetadata: [not, a, mapping]").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Shape(_)));
        assert_eq!(store.counts(), Counts::default());
    }

    #[test]
    fn test_merge_keys_are_expanded() {
        let store = store(
            "defaults: &d\n  url_poster: https://example.com/p.jpg\n  sort_prefix: '!'\n\
             collections:\n  Alien:\n    <<: *d\n    title: Alien\n",
        );
        assert_eq!(store.collection_poster_url("Alien").as_deref(), Some("https://example.com/p.jpg"));
        let entry = store.find_collection_by_name("Alien").unwrap();
        assert_eq!(entry.resolve_text("sort_prefix").as_deref(), Some("!"));
    }

    #[test]
    fn test_overlay_ignores_alternate_titles() {
        let store = store("overlays: {x: {title: 4K, alt_title: UHD}}");
        assert!(store.find_overlay_by_name("4K").is_some());
        assert!(store.find_overlay_by_name("UHD").is_none());
    }

    #[test]
    fn test_season_lookup_uses_season_number() {
        let store = store("metadata: {Show: {year: 2015, seasons: {1: {poster: one}, 2015: {poster: year}}}}");
        assert_eq!(store.season_poster_url("Show", 1, Some(2015)).as_deref(), Some("one"));
        assert_eq!(store.season_poster_url("Show", 2, Some(2015)), None);
        assert_eq!(store.season_poster_urls("Show", None).len(), 2);
    }

    #[test]
    fn test_collection_lists() {
        let store = store(
            "collections: {Saga: {template: [{name: x, show: 'a, b'}], movie: [1, 2], list: l, collection: [c]}}",
        );
        assert_eq!(store.show_list("Saga"), ["a", "b"]);
        assert_eq!(store.movie_list("Saga"), ["1", "2"]);
        assert_eq!(store.list_references("Saga"), ["l"]);
        assert_eq!(store.collection_references("Saga"), ["c"]);
        assert!(store.movie_list("Missing").is_empty());
    }
}
