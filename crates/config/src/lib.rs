//! Configuration for pmmgen.
//!
//! A single [`Settings`] value is built once at startup by [`Settings::load`]
//! and handed by reference to every component that needs it. Sources are
//! layered with [`figment`], later sources overriding earlier ones:
//!
//! 1. Built-in defaults ([`Settings::default`])
//! 2. `config.yaml` in the user's configuration directory
//! 3. `config.yaml` in the working directory, or an explicit path
//! 4. `PMMGEN_`-prefixed environment variables, nested with `__`
//!    (for example `PMMGEN_PLEX__TOKEN`)

pub mod error;
mod generate;
mod load;
mod output;
mod plex;
mod skip;
mod templates;

pub use crate::generate::{Generate, OutputFormat};
pub use crate::output::{FileNameFormats, Output};
pub use crate::plex::{LibrarySettings, Plex, PlexMetaManager, PosterDatabase};
pub use crate::skip::Skip;
pub use crate::templates::{TemplateFile, TemplateGroup, Templates};

use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};

/// Application settings.
///
/// Serializing a [`Settings`] never emits the media server token, so the value
/// is safe to expose to templates.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub plex: Plex,
    pub plex_meta_manager: PlexMetaManager,
    pub poster_database: PosterDatabase,
    pub templates: Templates,
    pub output: Output,
    pub generate: Generate,
    pub skip: Skip,
}

impl Settings {
    /// Checks the invariants that the type system can't express.
    pub fn validate(&self) -> Result<()> {
        if self.output.path.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("output.path must not be empty".into()));
        }
        if self.output.path_format.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("output.path_format must not be empty".into()));
        }
        for format in &self.generate.formats {
            if format.parse::<OutputFormat>().is_err() {
                exn::bail!(ErrorKind::Invalid(format!("unknown generate format: {format}")));
            }
        }
        if let Some(libraries) = &self.plex.libraries
            && let Some(library) = libraries.iter().find(|l| l.name.trim().is_empty())
        {
            exn::bail!(ErrorKind::Invalid(format!("library with empty name (path: {:?})", library.path)));
        }
        Ok(())
    }
}
