//! Walks media server libraries and generates Plex Meta Manager files.
//!
//! The [`LibraryWalkProcessor`] reads libraries, collections and items from a
//! [`MediaServer`], matches each against the library's existing documents in
//! a [`pmmgen_cache::DocumentStore`], and renders the configured templates
//! through a [`pmmgen_render::Render`] implementation.
//!
//! ```no_run
//! use pmmgen_config::Settings;
//! use pmmgen_library::{CatalogSnapshot, LibraryWalkProcessor};
//! use pmmgen_render::TemplateManager;
//! use std::path::Path;
//!
//! let settings = Settings::load(None).unwrap();
//! let server = CatalogSnapshot::load(Path::new("catalog.yaml")).unwrap();
//! let templates = TemplateManager::new(settings.templates.path.as_deref()).unwrap();
//! let processor = LibraryWalkProcessor::new(&settings, &server, &templates).unwrap();
//! let stats = processor.run().unwrap();
//! ```

pub mod error;
pub mod models;
mod naming;
mod processor;
mod search;
mod server;
mod stats;

pub use crate::naming::{NameGenerator, validate as validate_path};
pub use crate::processor::{CollectionRecord, ItemRecord, LibraryContext, LibraryWalkProcessor, SeasonRecord};
pub use crate::search::{SearchTarget, search_url};
pub use crate::server::{CatalogSnapshot, MediaServer, select_libraries};
pub use crate::stats::{LibraryStats, Stats, Tally};
