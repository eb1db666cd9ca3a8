//! The `generate` and `inspect` subcommands.

use crate::cli::{GenerateArgs, InspectArgs};
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use pmmgen_cache::DocumentStore;
use pmmgen_config::Settings;
use pmmgen_library::{CatalogSnapshot, LibraryWalkProcessor, Stats};
use pmmgen_render::TemplateManager;
use std::path::Path;

pub fn generate(config: Option<&Path>, args: &GenerateArgs) -> Result<Stats> {
    let mut settings = Settings::load(config).or_raise(|| ErrorKind::Settings)?;
    args.apply(&mut settings);
    settings.validate().or_raise(|| ErrorKind::Settings)?;

    let catalog = settings
        .plex
        .catalog
        .as_deref()
        .ok_or_raise(|| ErrorKind::Settings)
        .inspect_err(|_| tracing::error!("Set plex.catalog or pass --catalog"))?;
    let server = CatalogSnapshot::load(catalog).or_raise(|| ErrorKind::Connect)?;
    let templates = TemplateManager::new(settings.templates.path.as_deref()).or_raise(|| ErrorKind::Templates)?;
    tracing::info!(output = %settings.output.path.display(), "Generating Plex Meta Manager files");

    let processor = LibraryWalkProcessor::new(&settings, &server, &templates).or_raise(|| ErrorKind::Settings)?;
    processor.run().or_raise(|| ErrorKind::Walk)
}

/// Ingest the folder and return the counts plus every requested lookup.
pub fn inspect(args: &InspectArgs) -> Result<serde_json::Value> {
    let mut store = DocumentStore::new();
    let report = store.ingest_folder(&args.folder);
    tracing::info!(files = report.files, failed = report.failed.len(), counts = %report.counts, "Ingested folder");

    let mut output = serde_json::json!({ "counts": report.counts, "failed": report.failed });
    if let Some(name) = &args.collection {
        output["collection"] = match store.find_collection_by_name(name) {
            Some(_) => serde_json::json!(store.collection_view(name)),
            None => serde_json::Value::Null,
        };
    }
    if let Some(name) = &args.metadata {
        output["metadata"] = match store.find_metadata_by_name(name, args.year) {
            Some(_) => serde_json::json!(store.metadata_view(name, args.year)),
            None => serde_json::Value::Null,
        };
        if let Some(season) = args.season {
            output["season_poster"] = serde_json::json!(store.season_poster_url(name, season, args.year));
        }
    }
    if let Some(path) = &args.export {
        store.export_summary(path).or_raise(|| ErrorKind::Export(path.clone()))?;
    }
    Ok(output)
}
