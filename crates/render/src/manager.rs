use crate::Render;
use crate::addons;
use crate::assets::Builtins;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::instrument;
use upon::Engine;
use walkdir::WalkDir;

/// Where a compiled template was loaded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    Builtin,
    User(std::path::PathBuf),
}

/// Compiles every available template up front and renders them by name.
///
/// Builtin templates are always available. Files in the user template
/// directory are addressed by their path relative to it (with `/`
/// separators) and replace builtins of the same name. Compilation happens in
/// [`new`](Self::new), so a syntax error in any template is reported before
/// anything is generated.
pub struct TemplateManager {
    engine: Engine<'static>,
    origins: BTreeMap<String, Origin>,
}
impl TemplateManager {
    #[instrument(skip_all, fields(path = ?user_dir))]
    pub fn new(user_dir: Option<&Path>) -> Result<Self> {
        let mut sources = BTreeMap::new();
        for name in Builtins::list() {
            sources.insert(name.to_string(), (Builtins::load(&name)?, Origin::Builtin));
        }
        if let Some(dir) = user_dir {
            Self::collect_user_templates(dir, &mut sources)?;
        }

        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let mut origins = BTreeMap::new();
        for (name, (source, origin)) in sources {
            tracing::debug!(template = %name, origin = ?origin, "Compiling template");
            engine.add_template(name.clone(), source).or_raise(|| ErrorKind::Syntax(name.clone()))?;
            origins.insert(name, origin);
        }
        tracing::info!(templates = origins.len(), "Loaded templates");
        Ok(Self { engine, origins })
    }

    fn collect_user_templates(dir: &Path, sources: &mut BTreeMap<String, (String, Origin)>) -> Result<()> {
        let raise = || ErrorKind::TemplateDir(dir.to_path_buf());
        if !dir.is_dir() {
            exn::bail!(raise());
        }
        for item in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let item = item.or_raise(raise)?;
            if !item.file_type().is_file() {
                continue;
            }
            let relative = item.path().strip_prefix(dir).or_raise(raise)?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_str())
                .collect::<Option<Vec<_>>>()
                .ok_or_raise(raise)?
                .join("/");
            let source = std::fs::read_to_string(item.path()).or_raise(raise)?;
            if sources.contains_key(&name) {
                tracing::debug!(template = %name, "User template overrides builtin");
            }
            sources.insert(name, (source, Origin::User(item.path().to_path_buf())));
        }
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.origins.contains_key(name)
    }

    pub fn origin(&self, name: &str) -> Option<&Origin> {
        self.origins.get(name)
    }

    /// Names of every compiled template, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.origins.keys().map(String::as_str)
    }
}
impl Render for TemplateManager {
    fn render(&self, name: &str, args: &upon::Value) -> Result<String> {
        tracing::debug!(template = name, "Rendering template");
        let template = self.engine.get_template(name).ok_or_raise(|| ErrorKind::AssetNotFound(name.to_string()))?;
        template.render(args).to_string().or_raise(|| ErrorKind::Render(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_builtins_compile() {
        let manager = TemplateManager::new(None).unwrap();
        assert!(manager.exists("collection.yml"));
        assert_eq!(manager.origin("metadata.html"), Some(&Origin::Builtin));
    }

    #[test]
    fn test_user_templates_override_builtins() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("collection.yml"), "custom {{ title }}").unwrap();
        fs::create_dir_all(temp_dir.path().join("extra")).unwrap();
        fs::write(temp_dir.path().join("extra/report.txt"), "{{ title|slug }}").unwrap();

        let manager = TemplateManager::new(Some(temp_dir.path())).unwrap();
        let args = upon::value! { title: "Star Wars" };
        assert_eq!(manager.render("collection.yml", &args).unwrap(), "custom Star Wars");
        assert_eq!(manager.render("extra/report.txt", &args).unwrap(), "star-wars");
        assert!(matches!(manager.origin("collection.yml"), Some(Origin::User(_))));
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("broken.yml"), "{% if title %}never closed").unwrap();
        let err = TemplateManager::new(Some(temp_dir.path())).err().unwrap();
        assert!(matches!(&*err, ErrorKind::Syntax(name) if name == "broken.yml"));
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = TemplateManager::new(Some(&temp_dir.path().join("missing"))).err().unwrap();
        assert!(matches!(&*err, ErrorKind::TemplateDir(_)));
    }

    #[test]
    fn test_missing_template() {
        let manager = TemplateManager::new(None).unwrap();
        let err = manager.render("missing.yml", &upon::Value::None).unwrap_err();
        assert!(matches!(&*err, ErrorKind::AssetNotFound(_)));
    }

    #[test]
    fn test_render_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("strict.txt"), "{{ missing.field }}").unwrap();
        let manager = TemplateManager::new(Some(temp_dir.path())).unwrap();
        let err = manager.render("strict.txt", &upon::value! { other: 1 }).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Render(_)));
    }
}
