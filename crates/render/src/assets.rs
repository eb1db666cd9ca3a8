//! Templates embedded into the binary at compile time using
//! [`rust-embed`](rust_embed).

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;
use std::borrow::Cow;

#[derive(Embed)]
#[folder = "../../assets/templates/"]
pub struct Builtins;
impl Builtins {
    /// Get the source of a builtin template by name.
    pub fn load(name: impl AsRef<str>) -> Result<String> {
        let data = Self::get(Self::strip(name.as_ref()))
            .map(|f| f.data)
            .ok_or_raise(|| ErrorKind::AssetNotFound(Self::identifier(&name)))?;
        String::from_utf8(data.into_owned()).or_raise(|| ErrorKind::AssetNotFound(Self::identifier(&name)))
    }

    /// List all available builtin template names.
    pub fn list() -> Vec<Cow<'static, str>> {
        Self::iter().collect()
    }

    pub fn exists(name: impl AsRef<str>) -> bool {
        Self::get(Self::strip(name.as_ref())).is_some()
    }

    pub(crate) fn identifier(name: impl AsRef<str>) -> String {
        format!("builtin:{}", Self::strip(name.as_ref()))
    }

    fn strip(name: &str) -> &str {
        name.trim().trim_start_matches("builtin:")
    }
}
