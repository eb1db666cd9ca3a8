use crate::generate::OutputFormat;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The four template groups, each rendered at a different point of the walk.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum TemplateGroup {
    #[display("library")]
    Library,
    #[display("collection")]
    Collection,
    #[display("metadata")]
    Metadata,
    #[display("overlay")]
    Overlay,
}
impl TemplateGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Collection => "collection",
            Self::Metadata => "metadata",
            Self::Overlay => "overlay",
        }
    }
}

/// One template and the file it produces.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TemplateFile {
    /// Dotted `<group>.<library type>`, e.g. `collection.movie` or `metadata.report`.
    #[serde(rename = "type")]
    pub kind: String,
    pub format: OutputFormat,
    /// Template name, relative to the template directory.
    pub file: String,
    #[serde(default)]
    pub file_extension: Option<String>,
    #[serde(default)]
    pub sub_folder: Option<String>,
}
impl TemplateFile {
    pub fn new(kind: impl Into<String>, format: OutputFormat, file: impl Into<String>) -> Self {
        Self { kind: kind.into(), format, file: file.into(), file_extension: None, sub_folder: None }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = Some(extension.into());
        self
    }

    /// Extension without a leading dot; defaults to the format's name.
    pub fn extension(&self) -> &str {
        self.file_extension
            .as_deref()
            .map(|e| e.trim().trim_start_matches('.'))
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| self.format.as_str())
    }

    fn matches(&self, group: TemplateGroup, library_type: &str) -> bool {
        let kind = self.kind.trim().to_lowercase();
        let exact = format!("{}.{}", group.as_str(), library_type.trim().to_lowercase());
        let any = format!("{}.any", group.as_str());
        kind == exact || kind == any
    }
}

/// Template directory and the files configured for each group.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Templates {
    /// User template directory. Builtin templates are always available and
    /// are overridden by user templates with the same name.
    pub path: Option<PathBuf>,
    pub library: Vec<TemplateFile>,
    pub collection: Vec<TemplateFile>,
    pub metadata: Vec<TemplateFile>,
    pub overlay: Vec<TemplateFile>,
}
impl Default for Templates {
    fn default() -> Self {
        use OutputFormat::*;
        Self {
            path: None,
            library: vec![TemplateFile::new("library.report", Json, "library.json")],
            collection: vec![
                TemplateFile::new("collection.any", Yaml, "collection.yml").with_extension("yml"),
                TemplateFile::new("collection.template", Yaml, "templates.yml").with_extension("yml"),
                TemplateFile::new("collection.report", Html, "collections.html"),
            ],
            metadata: vec![
                TemplateFile::new("metadata.movie", Yaml, "metadata.movie.yml").with_extension("yml"),
                TemplateFile::new("metadata.show", Yaml, "metadata.show.yml").with_extension("yml"),
                TemplateFile::new("metadata.report", Html, "metadata.html"),
            ],
            overlay: Vec::new(),
        }
    }
}
impl Templates {
    pub fn group(&self, group: TemplateGroup) -> &[TemplateFile] {
        match group {
            TemplateGroup::Library => &self.library,
            TemplateGroup::Collection => &self.collection,
            TemplateGroup::Metadata => &self.metadata,
            TemplateGroup::Overlay => &self.overlay,
        }
    }

    /// Files of `group` whose type is `<group>.<library_type>` or `<group>.any`.
    pub fn for_group(&self, group: TemplateGroup, library_type: &str) -> Vec<&TemplateFile> {
        self.group(group).iter().filter(|t| t.matches(group, library_type)).collect()
    }

    /// Files of `group` whose type is exactly `<group>.<library_type>`.
    ///
    /// Reports and shared collection templates use this, so that `.any`
    /// item templates aren't rendered in their place.
    pub fn exactly(&self, group: TemplateGroup, library_type: &str) -> Vec<&TemplateFile> {
        let kind = format!("{}.{}", group.as_str(), library_type.trim().to_lowercase());
        self.group(group).iter().filter(|t| t.kind.trim().eq_ignore_ascii_case(&kind)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TemplateGroup::Collection, "movie", &["collection.yml"])]
    #[case(TemplateGroup::Collection, "template", &["collection.yml", "templates.yml"])]
    #[case(TemplateGroup::Metadata, "show", &["metadata.show.yml"])]
    #[case(TemplateGroup::Metadata, "report", &["metadata.html"])]
    #[case(TemplateGroup::Overlay, "movie", &[])]
    fn test_for_group(#[case] group: TemplateGroup, #[case] library_type: &str, #[case] expected: &[&str]) {
        let templates = Templates::default();
        let files: Vec<&str> = templates.for_group(group, library_type).iter().map(|t| t.file.as_str()).collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_exactly_ignores_wildcards() {
        let templates = Templates::default();
        let files: Vec<&str> =
            templates.exactly(TemplateGroup::Collection, "template").iter().map(|t| t.file.as_str()).collect();
        assert_eq!(files, ["templates.yml"]);
        assert!(templates.exactly(TemplateGroup::Collection, "movie").is_empty());
    }

    #[rstest]
    #[case(None, OutputFormat::Yaml, "yaml")]
    #[case(Some(".yml"), OutputFormat::Yaml, "yml")]
    #[case(Some(""), OutputFormat::Html, "html")]
    fn test_extension(#[case] ext: Option<&str>, #[case] format: OutputFormat, #[case] expected: &str) {
        let mut file = TemplateFile::new("collection.any", format, "x");
        file.file_extension = ext.map(String::from);
        assert_eq!(file.extension(), expected);
    }
}
