//! File names for generated output.
//!
//! Every output file name (and the per-library output folder) comes from a
//! user-configured [upon] format such as `{{ collection.title|clean }}`. The
//! formatters and functions of [`pmmgen_render::addons`] are available, so
//! formats can use `clean`, `slug` and `truncate` like any other template.
//!
//! Rendered names are trimmed segment by segment and must stay inside the
//! output root: `..` may only cancel segments produced by the same format.

use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};

/// A compiled file name format.
///
/// Constructed via [`FromStr`], which compiles the format eagerly so that
/// syntax errors surface when the settings are read rather than halfway
/// through a walk.
pub struct NameGenerator {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl FromStr for NameGenerator {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut engine = Engine::new();
        pmmgen_render::addons::configure(&mut engine);
        let template = engine
            .compile(s.to_string())
            .or_raise(|| ErrorKind::Settings(format!("invalid file name format: {s}")))?;
        Ok(Self { engine, template })
    }
}
impl NameGenerator {
    /// Renders the format and returns the normalized relative path, without
    /// any file extension.
    #[instrument(skip_all)]
    pub fn generate(&self, args: &upon::Value) -> Result<PathBuf> {
        let name = self.template.render(&self.engine, args).to_string().or_raise(|| ErrorKind::Template)?;
        Self::normalize(&name)
    }

    /// Renders the format and appends `extension`; `"yml"` and `".yml"` are
    /// the same extension.
    pub fn generate_with_ext(&self, args: &upon::Value, extension: &str) -> Result<PathBuf> {
        Ok(append_extension(self.generate(args)?, extension))
    }

    fn normalize(name: &str) -> Result<PathBuf> {
        let path = name.trim().split('/').map(str::trim).collect::<Vec<_>>().join("/");
        validate(Path::new(&path))
    }
}

/// Appends `.extension` to the last segment, unless the extension is blank.
pub fn append_extension(path: PathBuf, extension: &str) -> PathBuf {
    let extension = extension.trim().trim_matches('.');
    if extension.is_empty() {
        return path;
    }
    let mut name = path.into_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Resolves `.` and `..` in a relative path, rejecting any path that would
/// leave its root, is empty, has a platform prefix or contains a null byte.
pub fn validate(path: &Path) -> Result<PathBuf> {
    let raise = || ErrorKind::InvalidPath(path.to_path_buf());
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but truncate in syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(raise());
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(raise()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(raise());
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(raise()),
        false => Ok(components.into_iter().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(title: &str) -> upon::Value {
        upon::value! { collection: upon::value! { title: title, year: 1979 } }
    }

    #[rstest]
    #[case("{{ collection.title|clean }}", "Alien: Director's Cut", "Alien- Director's Cut")]
    #[case("{{ collection.title|slug }}", "\"Alien\" Collection", "alien-collection")]
    #[case("{{ collection.title|truncate: 5 }}", "Alien Collection", "Alien")]
    #[case(" sub / {{ collection.title }} ", "Alien", "sub/Alien")]
    #[case("{{ collection.title }} ({{ collection.year }})", "Alien", "Alien (1979)")]
    fn test_generate(#[case] format: &str, #[case] title: &str, #[case] expected: &str) {
        let generator: NameGenerator = format.parse().unwrap();
        assert_eq!(generator.generate(&args(title)).unwrap(), Path::new(expected));
    }

    #[rstest]
    #[case("yml", "Alien.yml")]
    #[case(".yml", "Alien.yml")]
    #[case("", "Alien")]
    fn test_generate_with_ext(#[case] ext: &str, #[case] expected: &str) {
        let generator: NameGenerator = "{{ collection.title }}".parse().unwrap();
        assert_eq!(generator.generate_with_ext(&args("Alien"), ext).unwrap(), Path::new(expected));
    }

    #[test]
    fn test_invalid_format() {
        let err = "{{ collection.title".parse::<NameGenerator>().err().unwrap();
        assert!(matches!(&*err, ErrorKind::Settings(_)));
    }

    #[test]
    fn test_missing_variable() {
        let generator: NameGenerator = "{{ item.title }}".parse().unwrap();
        let err = generator.generate(&args("Alien")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }

    #[rstest]
    #[case("../{{ collection.title }}")]
    #[case("{{ collection.title }}/../..")]
    #[case("   ")]
    fn test_escaping_names_are_rejected(#[case] format: &str) {
        let generator: NameGenerator = format.parse().unwrap();
        let err = generator.generate(&args("Alien")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[rstest]
    #[case("a//b/./c", "a/b/c")]
    #[case("a/b/..", "a")]
    #[case("/a/b", "a/b")]
    fn test_validate(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(Path::new(input)).unwrap(), Path::new(expected));
    }

    #[test]
    fn test_validate_null_byte() {
        assert!(validate(Path::new("a\0b")).is_err());
    }
}
