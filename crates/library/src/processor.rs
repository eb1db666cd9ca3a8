//! The library walk.
//!
//! For every selected library a fresh [`DocumentStore`] is built from the
//! library's existing Plex Meta Manager folder, then collections and items
//! are enumerated, matched against the store and rendered. Failures are
//! isolated to the collection, item or template file they happen in.
//!
//! Output layout, relative to the library folder:
//!
//! ```text
//! <library>.<ext>                   library templates
//! _templates/<template>.<ext>       shared collection templates
//! collections/[sub]/<collection>.<ext>
//! metadata/[sub]/<collection>.<ext> children of a collection, one file
//! metadata/[sub]/<item>.<ext>       other items, one file each
//! reports/[sub]/<report>.<ext>
//! reports/pmm_summary.yaml          ingested documents, when exported
//! ```

use crate::error::{ErrorKind, Result};
use crate::models::{Album, Collection, Item, ItemType, Library, LibraryType, Track};
use crate::naming::{NameGenerator, append_extension, validate};
use crate::search::{SearchTarget, search_url};
use crate::server::{MediaServer, select_libraries};
use crate::stats::{LibraryStats, Stats};
use derive_more::Display;
use exn::ResultExt;
use pmmgen_cache::title::clean_for_filesystem;
use pmmgen_cache::{CollectionView, DocumentStore, Entry, MetadataView};
use pmmgen_config::{LibrarySettings, Output, Settings, TemplateFile, TemplateGroup};
use pmmgen_render::Render;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// The library as seen by templates.
#[derive(Clone, Debug, Serialize)]
pub struct LibraryContext {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: LibraryType,
    /// Folder name under the output root.
    pub path: String,
}

/// A processed collection.
#[derive(Clone, Debug, Serialize)]
pub struct CollectionRecord {
    pub key: String,
    pub title: String,
    pub labels: Vec<String>,
    pub child_count: usize,
    pub search_url: String,
    pub pmm: CollectionView,
}

#[derive(Clone, Debug, Serialize)]
pub struct SeasonRecord {
    pub index: u32,
    pub title: String,
    pub search_url: String,
    /// Poster from the existing metadata entry, if any.
    pub poster: Option<String>,
}

/// A processed movie, show or artist.
#[derive(Clone, Debug, Serialize)]
pub struct ItemRecord {
    pub key: String,
    /// Title of the collection the item was processed under, or empty.
    pub collection: String,
    pub title: String,
    pub display_title: String,
    pub year: Option<i64>,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub labels: Vec<String>,
    /// Provider to id, e.g. `tmdb: "348"`.
    pub ids: BTreeMap<String, String>,
    pub search_url: String,
    pub pmm: MetadataView,
    pub seasons: Vec<SeasonRecord>,
    pub albums: Vec<Album>,
    pub tracks: Vec<Track>,
}

/// Compiled `output.path_format` and `output.file_name_format`.
struct Names {
    path: NameGenerator,
    collections: NameGenerator,
    metadata: NameGenerator,
    template: NameGenerator,
    library_report: NameGenerator,
    collections_report: NameGenerator,
    metadata_report: NameGenerator,
}
impl Names {
    fn new(output: &Output) -> Result<Self> {
        let formats = &output.file_name_format;
        Ok(Self {
            path: output.path_format.parse()?,
            collections: formats.collections.parse()?,
            metadata: formats.metadata.parse()?,
            template: formats.template.parse()?,
            library_report: formats.library_report.parse()?,
            collections_report: formats.collections_report.parse()?,
            metadata_report: formats.metadata_report.parse()?,
        })
    }

    fn report(&self, group: TemplateGroup) -> &NameGenerator {
        match group {
            TemplateGroup::Library => &self.library_report,
            TemplateGroup::Collection => &self.collections_report,
            TemplateGroup::Metadata | TemplateGroup::Overlay => &self.metadata_report,
        }
    }
}

/// Walks every selected library of a [`MediaServer`] and renders its files.
pub struct LibraryWalkProcessor<'a, S, R> {
    settings: &'a Settings,
    server: &'a S,
    renderer: &'a R,
    names: Names,
}
impl<'a, S: MediaServer, R: Render> LibraryWalkProcessor<'a, S, R> {
    /// Fails with [`ErrorKind::Settings`] when a file name format doesn't compile.
    pub fn new(settings: &'a Settings, server: &'a S, renderer: &'a R) -> Result<Self> {
        let names = Names::new(&settings.output)?;
        Ok(Self { settings, server, renderer, names })
    }

    /// Process every library and return the run's statistics.
    ///
    /// Only failing to list the server's libraries (or finding a configured
    /// one missing) is an error; a library that fails midway is logged and
    /// the run moves on.
    #[instrument(skip_all)]
    pub fn run(&self) -> Result<Stats> {
        let configured = self.settings.plex.libraries.as_deref();
        let names: Option<Vec<String>> = configured.map(|libraries| libraries.iter().map(|l| l.name.clone()).collect());
        let libraries = select_libraries(self.server, names.as_deref())?;
        tracing::info!(count = libraries.len(), "Processing libraries");

        let mut stats = Stats::new();
        for library in &libraries {
            let options = configured
                .and_then(|libraries| libraries.iter().find(|l| l.name == library.title))
                .cloned()
                .unwrap_or_else(|| LibrarySettings::new(&library.title));
            match self.process_library(library, &options) {
                Ok(library_stats) => stats.push(library_stats),
                Err(err) => tracing::error!(library = %library.title, error = ?err, "Failed to process library"),
            }
        }
        stats.log_summary();
        Ok(stats)
    }

    /// Walk a single library.
    #[instrument(skip_all, fields(library = %library.title))]
    pub fn process_library(&self, library: &Library, options: &LibrarySettings) -> Result<LibraryStats> {
        let mut walk = Walk::new(self, library, options)?;
        walk.run()?;
        Ok(walk.stats)
    }
}

/// Whether a collection or item made it into the output.
enum Outcome<T> {
    Processed(T),
    Skipped,
}

/// State of one library walk.
struct Walk<'w, 'a, S, R> {
    processor: &'w LibraryWalkProcessor<'a, S, R>,
    settings: &'a Settings,
    library: &'w Library,
    options: &'w LibrarySettings,
    root: PathBuf,
    store: DocumentStore,
    settings_value: upon::Value,
    library_value: upon::Value,
    /// Keys of the items already written, so each item is written once.
    processed: HashSet<String>,
    collections: Vec<CollectionRecord>,
    items: Vec<ItemRecord>,
    stats: LibraryStats,
}
impl<'w, 'a, S: MediaServer, R: Render> Walk<'w, 'a, S, R> {
    fn new(
        processor: &'w LibraryWalkProcessor<'a, S, R>,
        library: &'w Library,
        options: &'w LibrarySettings,
    ) -> Result<Self> {
        let settings = processor.settings;
        let context = LibraryContext {
            key: library.key.clone(),
            title: library.title.clone(),
            kind: library.kind,
            path: options.output_name().to_string(),
        };
        let settings_value = to_value(settings)?;
        let library_value = to_value(&context)?;
        let args = upon::Value::Map(BTreeMap::from([
            ("settings".to_string(), settings_value.clone()),
            ("library".to_string(), library_value.clone()),
        ]));
        let folder = processor.names.path.generate(&args)?;
        let root = settings.output.path.join(folder);
        tracing::debug!(path = %root.display(), "Library output folder");

        Ok(Self {
            processor,
            settings,
            library,
            options,
            root,
            store: DocumentStore::new(),
            settings_value,
            library_value,
            processed: HashSet::new(),
            collections: Vec::new(),
            items: Vec::new(),
            stats: LibraryStats::start(&library.title),
        })
    }

    fn library_type(&self) -> &'static str {
        self.library.kind.as_str()
    }

    fn run(&mut self) -> Result<()> {
        tracing::info!("Started processing library '{}'", self.library.title);
        self.render_library_templates();
        self.load_existing_documents();
        self.render_shared_templates();

        let collections = self.processor.server.collections(self.library)?;
        tracing::info!(total = collections.len(), "Processing collections");
        self.stats.collections.total = collections.len();
        for (i, collection) in collections.iter().enumerate() {
            let progress = Progress(i + 1, collections.len());
            match self.process_collection(progress, collection) {
                Ok(Outcome::Processed(())) => self.stats.collections.processed += 1,
                Ok(Outcome::Skipped) => self.stats.collections.skipped += 1,
                Err(err) => {
                    self.stats.collections.failed += 1;
                    tracing::error!(title = %collection.title, error = ?err, "Failed to process collection");
                },
            }
        }

        let items = self.processor.server.items(self.library)?;
        tracing::info!(total = items.len(), "Processing items");
        self.stats.items.total += items.len();
        for (i, item) in items.iter().enumerate() {
            let progress = Progress(i + 1, items.len());
            match self.process_item(progress, item) {
                Ok(Outcome::Processed(())) => self.stats.items.processed += 1,
                Ok(Outcome::Skipped) => self.stats.items.skipped += 1,
                Err(err) => {
                    self.stats.items.failed += 1;
                    tracing::error!(title = %item.display_title(), error = ?err, "Failed to process item");
                },
            }
        }

        self.collections.sort_by(|a, b| a.title.cmp(&b.title));
        self.items.sort_by_cached_key(|item| format!("{}:{}", item.collection, item.display_title));
        self.stats.finish();
        for group in [TemplateGroup::Library, TemplateGroup::Collection, TemplateGroup::Metadata] {
            self.render_report(group);
        }
        tracing::info!(
            collections = %self.stats.collections,
            items = %self.stats.items,
            elapsed = %self.stats.elapsed,
            "Finished processing library '{}'",
            self.library.title
        );
        Ok(())
    }

    /// Template arguments: `settings` and `library`, plus `extra`.
    fn args<const N: usize>(&self, extra: [(&str, upon::Value); N]) -> upon::Value {
        let mut args = BTreeMap::from([
            ("settings".to_string(), self.settings_value.clone()),
            ("library".to_string(), self.library_value.clone()),
        ]);
        args.extend(extra.into_iter().map(|(name, value)| (name.to_string(), value)));
        upon::Value::Map(args)
    }

    fn render_library_templates(&self) {
        let files: Vec<&TemplateFile> = self
            .settings
            .templates
            .for_group(TemplateGroup::Library, self.library_type())
            .into_iter()
            .filter(|file| self.settings.generate.is_type_enabled(&file.kind))
            .collect();
        let base = PathBuf::from(clean_for_filesystem(self.options.output_name()));
        self.emit_all(&files, &self.root, &base, &self.args([]));
    }

    fn load_existing_documents(&mut self) {
        if !self.settings.plex_meta_manager.cache_existing_files {
            return;
        }
        let Some(folder) = &self.options.pmm_path else {
            tracing::debug!("No existing Plex Meta Manager folder configured");
            return;
        };
        let report = self.store.ingest_folder(folder);
        tracing::info!(files = report.files, failed = report.failed.len(), counts = %report.counts, "Loaded existing documents");
        if self.settings.plex_meta_manager.export_summary {
            let path = self.root.join("reports").join("pmm_summary.yaml");
            if let Err(err) = self.store.export_summary(&path) {
                tracing::error!(path = %path.display(), error = ?err, "Failed to export document summary");
            }
        }
    }

    fn render_shared_templates(&self) {
        if !self.settings.generate.is_type_enabled("collection.template") {
            tracing::debug!("Shared collection templates are not enabled");
            return;
        }
        tracing::info!("Saving shared collection templates");
        let files = self.settings.templates.exactly(TemplateGroup::Collection, "template");
        let args = self.args([]);
        match self.processor.names.template.generate(&args) {
            Ok(base) => self.emit_all(&files, &self.root.join("_templates"), &base, &args),
            Err(err) => tracing::error!(error = ?err, "Failed to name shared collection templates"),
        }
    }

    fn process_collection(&mut self, progress: Progress, collection: &Collection) -> Result<Outcome<()>> {
        let title = &collection.title;
        let labels = collection.labels.iter().map(String::as_str);
        if self.settings.skip.is_dynamic(title, labels) || collection.child_count == 0 {
            tracing::info!("{progress} Skipping collection: '{title}' (dynamic or empty)");
            return Ok(Outcome::Skipped);
        }
        let entry = self.store.find_collection_by_name(title);
        if entry.is_some() && self.options.pmm_delta {
            tracing::info!("{progress} Skipping collection: '{title}' (existing entry, delta only)");
            return Ok(Outcome::Skipped);
        }
        tracing::info!("{progress} Processing collection: '{title}'");

        let record = CollectionRecord {
            key: collection.key.clone(),
            title: title.clone(),
            labels: collection.labels.clone(),
            child_count: collection.child_count,
            search_url: search_url(&self.settings.poster_database, SearchTarget::Collection(title)),
            pmm: CollectionView::new(title, entry),
        };
        let raise = || ErrorKind::Collection(title.clone());
        let record_value = to_value(&record).or_raise(raise)?;
        let args = self.args([("collection", record_value.clone())]);
        let base = self.processor.names.collections.generate(&args).or_raise(raise)?;
        self.collections.push(record);

        let kind = self.library_type();
        if self.settings.generate.is_type_enabled(&format!("collection.{kind}")) {
            let files = self.settings.templates.for_group(TemplateGroup::Collection, kind);
            self.emit_all(&files, &self.root.join("collections"), &base, &args);
        } else {
            tracing::debug!("Collection files are not enabled for {kind} libraries");
        }

        let children = self.processor.server.collection_items(self.library, collection).or_raise(raise)?;
        self.stats.items.total += children.len();
        let mut records = Vec::new();
        for (i, child) in children.iter().enumerate() {
            let progress = Progress(i + 1, children.len());
            match self.visit_item(progress, child, Some(title)) {
                Ok(Outcome::Processed(record)) => {
                    self.stats.items.processed += 1;
                    records.push(record);
                },
                Ok(Outcome::Skipped) => self.stats.items.skipped += 1,
                Err(err) => {
                    self.stats.items.failed += 1;
                    tracing::error!(title = %child.display_title(), error = ?err, "Failed to process item");
                },
            }
        }
        if !records.is_empty() {
            records.sort_by_key(|record| record.year.unwrap_or_default());
            let items = to_value(&records).or_raise(raise)?;
            let args = self.args([("collection", record_value), ("items", items)]);
            self.emit_metadata(&base, &args);
        }
        Ok(Outcome::Processed(()))
    }

    fn process_item(&mut self, progress: Progress, item: &Item) -> Result<Outcome<()>> {
        let Outcome::Processed(record) = self.visit_item(progress, item, None)? else {
            return Ok(Outcome::Skipped);
        };
        let raise = || ErrorKind::Item(record.display_title.clone());
        let value = to_value(&record).or_raise(raise)?;
        let args = self.args([
            ("collection", upon::Value::None),
            ("item", value.clone()),
            ("items", upon::Value::List(vec![value])),
        ]);
        let base = self.processor.names.metadata.generate(&args).or_raise(raise)?;
        self.emit_metadata(&base, &args);
        Ok(Outcome::Processed(()))
    }

    /// Decide whether `item` is written, and record it when it is.
    fn visit_item(&mut self, progress: Progress, item: &Item, collection: Option<&str>) -> Result<Outcome<ItemRecord>> {
        let title = item.display_title();
        let year = match item.kind {
            ItemType::Movie | ItemType::Show => item.year,
            ItemType::Artist => None,
        };
        let entry = self.store.find_metadata_by_name(&item.title, year);
        if entry.is_some() && self.options.pmm_delta {
            tracing::info!("{progress} Skipping {}: '{title}' (existing entry, delta only)", item.kind);
            return Ok(Outcome::Skipped);
        }
        if self.settings.skip.is_dynamic(&item.title, item.labels.iter().map(String::as_str)) {
            tracing::info!("{progress} Skipping {}: '{title}' (dynamic)", item.kind);
            return Ok(Outcome::Skipped);
        }
        if self.processed.contains(&item.key) {
            tracing::info!("{progress} Skipping {}: '{title}' (already processed)", item.kind);
            return Ok(Outcome::Skipped);
        }
        tracing::info!("{progress} Processing {}: '{title}'", item.kind);

        let record = self.item_record(item, entry, collection);
        self.processed.insert(item.key.clone());
        self.items.push(record.clone());
        Ok(Outcome::Processed(record))
    }

    fn item_record(&self, item: &Item, entry: Option<&Entry>, collection: Option<&str>) -> ItemRecord {
        let poster_database = &self.settings.poster_database;
        let seasons = item
            .seasons
            .iter()
            .map(|season| SeasonRecord {
                index: season.index,
                title: season.title.clone(),
                search_url: search_url(poster_database, SearchTarget::Season(item, season)),
                poster: entry.and_then(|entry| entry.season(season.index)).and_then(Entry::poster_url),
            })
            .collect();
        ItemRecord {
            key: item.key.clone(),
            collection: collection.unwrap_or_default().to_string(),
            title: item.title.clone(),
            display_title: item.display_title(),
            year: item.year,
            kind: item.kind,
            labels: item.labels.clone(),
            ids: item
                .guids
                .iter()
                .filter_map(|guid| Some((guid.provider()?.to_string(), guid.value()?.to_string())))
                .collect(),
            search_url: search_url(poster_database, SearchTarget::Item(item)),
            pmm: MetadataView::new(&item.title, entry),
            seasons,
            albums: item.albums.clone(),
            tracks: item.tracks.clone(),
        }
    }

    fn emit_metadata(&self, base: &Path, args: &upon::Value) {
        let kind = self.library_type();
        if !self.settings.generate.is_type_enabled(&format!("metadata.{kind}")) {
            tracing::debug!("Metadata files are not enabled for {kind} libraries");
            return;
        }
        let files = self.settings.templates.for_group(TemplateGroup::Metadata, kind);
        if files.is_empty() {
            tracing::warn!("No metadata templates for {kind} libraries");
        }
        self.emit_all(&files, &self.root.join("metadata"), base, args);
    }

    fn render_report(&self, group: TemplateGroup) {
        if !self.settings.generate.is_report_enabled(group.as_str()) {
            tracing::debug!(group = %group, "Report is not enabled");
            return;
        }
        tracing::info!(group = %group, "Saving report");
        let args = match (to_value(&self.collections), to_value(&self.items), to_value(&self.stats)) {
            (Ok(collections), Ok(items), Ok(stats)) => {
                self.args([("collections", collections), ("items", items), ("stats", stats)])
            },
            (Err(err), _, _) | (_, Err(err), _) | (_, _, Err(err)) => {
                tracing::error!(group = %group, error = ?err, "Failed to prepare report");
                return;
            },
        };
        let files = self.settings.templates.exactly(group, "report");
        match self.processor.names.report(group).generate(&args) {
            Ok(base) => self.emit_all(&files, &self.root.join("reports"), &base, &args),
            Err(err) => tracing::error!(group = %group, error = ?err, "Failed to name report"),
        }
    }

    /// Render every enabled file into `dir/[sub_folder/]base.<ext>`, isolating
    /// failures to the file.
    fn emit_all(&self, files: &[&TemplateFile], dir: &Path, base: &Path, args: &upon::Value) {
        for file in files {
            if !self.settings.generate.is_format_enabled(file.format) {
                tracing::debug!(template = %file.file, format = %file.format, "Format is not enabled");
                continue;
            }
            if let Err(err) = self.emit(file, dir, base, args) {
                tracing::error!(template = %file.file, error = ?err, "Failed to generate file");
            }
        }
    }

    fn emit(&self, file: &TemplateFile, dir: &Path, base: &Path, args: &upon::Value) -> Result<()> {
        let dir = match file.sub_folder.as_deref().map(str::trim).filter(|sub| !sub.is_empty()) {
            Some(sub) => dir.join(validate(Path::new(sub))?),
            None => dir.to_path_buf(),
        };
        let path = dir.join(append_extension(base.to_path_buf(), file.extension()));
        if path.exists() && !self.settings.output.overwrite {
            tracing::warn!(path = %path.display(), "File exists, skipping");
            return Ok(());
        }
        let raise = || ErrorKind::Output(path.clone());
        let text = self.processor.renderer.render(&file.file, args).or_raise(raise)?;
        pmmgen_render::write_file(&path, &text).or_raise(raise)?;
        tracing::debug!(path = %path.display(), template = %file.file, "Generated file");
        Ok(())
    }
}

/// `[i/n]` prefix of walk log lines.
#[derive(Clone, Copy, Debug, Display)]
#[display("[{_0}/{_1}]")]
struct Progress(usize, usize);

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<upon::Value> {
    upon::to_value(value).or_raise(|| ErrorKind::Template)
}
