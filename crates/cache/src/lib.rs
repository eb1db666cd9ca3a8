//! In-memory index of existing Plex Meta Manager documents.
//!
//! Before a library is generated, the folder of configuration documents that
//! Plex Meta Manager already uses for it is ingested into a [`DocumentStore`].
//! Collections, metadata and overlays found there are then looked up by name
//! (and year) while walking the library, so that hand-made customizations
//! such as posters, sort titles and list references are carried forward
//! instead of being generated again.
//!
//! # Resolution
//! Attributes of an [`Entry`] are looked up on the entry itself, then in its
//! `template` block, then in its `variables` block. See [`Entry::resolve_scalar`].

mod entry;
pub mod error;
mod resolve;
mod store;
pub mod title;
mod value;
mod view;

pub use crate::entry::{Entry, TemplateBlock};
pub use crate::store::{Counts, DocumentStore, Index, IngestReport, Namespace};
pub use crate::value::stringify;
pub use crate::view::{CollectionView, MetadataView, SeasonPosters};
