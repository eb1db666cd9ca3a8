use crate::error::{ErrorKind, Result};
use crate::title::{titles_equal, year_within_tolerance};
use crate::value::{key_to_string, kind_of, scalar_text};
use serde_yaml::{Mapping, Value};

/// The `template` block of an entry, classified once when the entry is built.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateBlock {
    Single(Mapping),
    Multiple(Vec<Mapping>),
    /// Neither a mapping nor a list of mappings. Holds the offending shape.
    Invalid(&'static str),
}
impl TemplateBlock {
    fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Mapping(mapping) => Some(Self::Single(mapping.clone())),
            Value::Sequence(items) => Some(
                items
                    .iter()
                    .map(|item| item.as_mapping().cloned())
                    .collect::<Option<Vec<_>>>()
                    .map(Self::Multiple)
                    .unwrap_or(Self::Invalid("list with non-mapping items")),
            ),
            Value::Tagged(tagged) => Self::parse(&tagged.value),
            other => Some(Self::Invalid(kind_of(other))),
        }
    }
}

/// One collection, metadata item or overlay, as found in a document.
///
/// The raw mapping is kept verbatim (it is what gets exported); the well-known
/// blocks are classified up front so that resolution never has to sniff shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    key: String,
    fields: Mapping,
    template: Option<TemplateBlock>,
    variables: Option<Mapping>,
    seasons: Vec<Entry>,
}
impl Entry {
    /// Build an entry from the value stored under `key` in a namespace.
    ///
    /// Fails with [`ErrorKind::Shape`] unless the value is a mapping.
    pub fn new(key: impl Into<String>, value: Value) -> Result<Self> {
        let key = key.into();
        let fields = match value {
            Value::Mapping(fields) => fields,
            Value::Tagged(tagged) => return Self::new(key, tagged.value),
            other => exn::bail!(ErrorKind::Shape(format!("entry '{key}' is a {}, not a mapping", kind_of(&other)))),
        };

        let template = fields.get("template").and_then(TemplateBlock::parse);
        if let Some(TemplateBlock::Invalid(shape)) = &template {
            tracing::error!(entry = %key, shape, "Template block is neither a mapping nor a list of mappings");
        }

        let variables = match fields.get("variables") {
            None | Some(Value::Null) => None,
            Some(Value::Mapping(variables)) => Some(variables.clone()),
            Some(other) => {
                tracing::warn!(entry = %key, shape = kind_of(other), "Ignoring variables block that is not a mapping");
                None
            },
        };

        let seasons = match fields.get("seasons") {
            Some(Value::Mapping(seasons)) => seasons
                .iter()
                .filter(|(_, season)| !season.is_null())
                .filter_map(|(number, season)| {
                    let number = key_to_string(number)?;
                    Entry::new(number, season.clone())
                        .inspect_err(|err| tracing::warn!(entry = %key, error = ?err, "Ignoring season"))
                        .ok()
                })
                .collect(),
            _ => Vec::new(),
        };

        Ok(Self { key, fields, template, variables, seasons })
    }

    /// Native key of the entry within its namespace.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fields(&self) -> &Mapping {
        &self.fields
    }

    /// A field on the root mapping.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn template(&self) -> Option<&TemplateBlock> {
        self.template.as_ref()
    }

    pub fn variables(&self) -> Option<&Mapping> {
        self.variables.as_ref()
    }

    pub fn title(&self) -> Option<String> {
        self.get("title").and_then(scalar_text)
    }

    pub fn alt_title(&self) -> Option<String> {
        self.get("alt_title").and_then(scalar_text)
    }

    pub fn orig_title(&self) -> Option<String> {
        self.get("orig_title").and_then(scalar_text)
    }

    /// `year` as a number; quoted years are accepted.
    pub fn year(&self) -> Option<i64> {
        match self.get("year")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Season entries, in document order, keyed by their season number as a string.
    pub fn seasons(&self) -> &[Entry] {
        &self.seasons
    }

    /// Season by number. Matches `1:` as well as `"01":`.
    pub fn season(&self, number: u32) -> Option<&Entry> {
        self.seasons.iter().find(|season| {
            season.key == number.to_string() || season.key.trim().parse::<u32>().is_ok_and(|n| n == number)
        })
    }

    /// Compare `name` to `title`, and optionally also to `alt_title` and `orig_title`.
    pub(crate) fn matches_name(&self, name: &str, alternates: bool) -> bool {
        let candidates = if alternates {
            vec![self.title(), self.alt_title(), self.orig_title()]
        } else {
            vec![self.title()]
        };
        candidates.into_iter().flatten().any(|candidate| titles_equal(&candidate, name))
    }

    /// Without a target year anything matches; with one, the entry's own year
    /// must be present and within tolerance.
    pub(crate) fn matches_year(&self, year: Option<i64>) -> bool {
        match year {
            None => true,
            Some(target) => self.year().is_some_and(|candidate| year_within_tolerance(candidate, target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn entry(text: &str) -> Entry {
        Entry::new("key", serde_yaml::from_str(text).unwrap()).unwrap()
    }

    #[rstest]
    #[case("template: {a: 1}", Some("single"))]
    #[case("template: [{a: 1}, {b: 2}]", Some("multiple"))]
    #[case("template: name", Some("invalid"))]
    #[case("template: [{a: 1}, b]", Some("invalid"))]
    #[case("template: ~", None)]
    #[case("title: x", None)]
    fn test_template_block(#[case] text: &str, #[case] expected: Option<&str>) {
        let kind = entry(text).template().map(|block| match block {
            TemplateBlock::Single(_) => "single",
            TemplateBlock::Multiple(_) => "multiple",
            TemplateBlock::Invalid(_) => "invalid",
        });
        assert_eq!(kind, expected);
    }

    #[test]
    fn test_non_mapping_is_rejected() {
        let err = Entry::new("Alien", Value::String("x".into())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Shape(_)));
    }

    #[rstest]
    #[case("year: 2015", Some(2015))]
    #[case("year: '2015'", Some(2015))]
    #[case("year: soon", None)]
    #[case("title: x", None)]
    fn test_year(#[case] text: &str, #[case] expected: Option<i64>) {
        assert_eq!(entry(text).year(), expected);
    }

    #[test]
    fn test_numeric_title() {
        assert_eq!(entry("title: 1917").title().as_deref(), Some("1917"));
    }

    #[test]
    fn test_seasons_keep_document_order() {
        let entry = entry("seasons: {2: {poster: b}, 1: {poster: a}, '03': {poster: c}, 4: ~}");
        let keys: Vec<&str> = entry.seasons().iter().map(Entry::key).collect();
        assert_eq!(keys, ["2", "1", "03"]);
        assert_eq!(entry.season(3).map(Entry::key), Some("03"));
        assert!(entry.season(4).is_none());
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(2014), true)]
    #[case(Some(2016), true)]
    #[case(Some(2017), false)]
    fn test_matches_year(#[case] year: Option<i64>, #[case] expected: bool) {
        assert_eq!(entry("year: 2015").matches_year(year), expected);
    }

    #[test]
    fn test_missing_year_never_matches_a_target() {
        assert!(!entry("title: x").matches_year(Some(2015)));
    }

    #[test]
    fn test_matches_name_alternates() {
        let entry = entry("{title: Alien, alt_title: ' Alien³ ', orig_title: Alien 3}");
        assert!(entry.matches_name("Alien³", true));
        assert!(!entry.matches_name("Alien³", false));
        assert!(!entry.matches_name("alien", true));
    }
}
