//! Rendering of generated files.
//!
//! The library walk only depends on the [`Render`] seam: a template name and
//! an argument value go in, text comes out. [`TemplateManager`] implements it
//! with [`upon`], the builtin templates embedded in the binary and an optional
//! directory of user templates.

pub mod addons;
mod assets;
pub mod error;
mod manager;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::Path;

pub use crate::assets::Builtins;
pub use crate::manager::{Origin, TemplateManager};

/// Renders a named template against a set of arguments.
pub trait Render {
    fn render(&self, name: &str, args: &upon::Value) -> Result<String>;
}

/// Write `text` to `path`, creating parent directories first.
pub fn write_file(path: &Path, text: &str) -> Result<()> {
    let raise = || ErrorKind::Write(path.to_path_buf());
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).or_raise(raise)?;
    }
    std::fs::write(path, text).or_raise(raise)?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "Wrote file");
    Ok(())
}
