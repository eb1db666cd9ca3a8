//! Attribute resolution across the three tiers of an [`Entry`].
//!
//! An attribute is looked up on the root mapping first, then in the `template`
//! block, then in the `variables` block. The first tier holding a non-null
//! value for the attribute wins, even when that value is an empty string or
//! an empty list.

use crate::entry::{Entry, TemplateBlock};
use crate::value::stringify;
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;

fn non_null<'a>(mapping: &'a Mapping, name: &str) -> Option<&'a Value> {
    mapping.get(name).filter(|value| !value.is_null())
}

impl Entry {
    /// Raw value of `name`, following root > template > variables precedence.
    ///
    /// A list-shaped template contributes the values of every element that
    /// defines the attribute, stringified and joined with `", "`.
    pub fn resolve_scalar(&self, name: &str) -> Option<Cow<'_, Value>> {
        if let Some(value) = non_null(self.fields(), name) {
            return Some(Cow::Borrowed(value));
        }
        match self.template() {
            Some(TemplateBlock::Single(template)) => {
                if let Some(value) = non_null(template, name) {
                    return Some(Cow::Borrowed(value));
                }
            },
            Some(TemplateBlock::Multiple(templates)) => {
                let joined = templates
                    .iter()
                    .filter_map(|template| non_null(template, name))
                    .map(stringify)
                    .collect::<Vec<_>>()
                    .join(", ");
                if !joined.trim().is_empty() {
                    return Some(Cow::Owned(Value::String(joined)));
                }
            },
            Some(TemplateBlock::Invalid(shape)) => {
                tracing::error!(entry = %self.key(), attribute = name, shape, "Cannot resolve attribute from malformed template block");
            },
            None => {},
        }
        self.variables().and_then(|variables| non_null(variables, name)).map(Cow::Borrowed)
    }

    /// Resolve `name` and normalize it into a list of strings.
    ///
    /// Lists are stringified element-wise, strings are split on commas, and
    /// other scalars become a single element. Blank elements are dropped.
    pub fn resolve_list(&self, name: &str) -> Vec<String> {
        let Some(value) = self.resolve_scalar(name) else {
            return Vec::new();
        };
        let items: Vec<String> = match value.as_ref() {
            Value::Sequence(items) => items.iter().map(stringify).collect(),
            Value::String(text) => text.split(',').map(String::from).collect(),
            other => vec![stringify(other)],
        };
        items.into_iter().map(|item| item.trim().to_string()).filter(|item| !item.is_empty()).collect()
    }

    /// Resolve `name` into a single trimmed string, if it is set and not blank.
    pub fn resolve_text(&self, name: &str) -> Option<String> {
        self.resolve_scalar(name)
            .map(|value| stringify(&value).trim().to_string())
            .filter(|text| !text.is_empty())
    }

    /// First `poster`, falling back to the older `url_poster`.
    pub fn poster_url(&self) -> Option<String> {
        ["poster", "url_poster"].into_iter().find_map(|name| self.resolve_list(name).into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn entry(text: &str) -> Entry {
        Entry::new("key", serde_yaml::from_str(text).unwrap()).unwrap()
    }

    fn scalar(entry: &Entry, name: &str) -> Option<String> {
        entry.resolve_scalar(name).map(|value| stringify(&value))
    }

    #[rstest]
    #[case("{foo: root, template: {foo: tpl}, variables: {foo: var}}", Some("root"))]
    #[case("{template: {foo: tpl}, variables: {foo: var}}", Some("tpl"))]
    #[case("{template: {bar: tpl}, variables: {foo: var}}", Some("var"))]
    #[case("{template: {bar: tpl}, variables: {bar: var}}", None)]
    fn test_precedence(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(scalar(&entry(text), "foo").as_deref(), expected);
    }

    #[test]
    fn test_present_but_empty_wins() {
        let entry = entry("{foo: '', template: {foo: tpl}}");
        assert_eq!(scalar(&entry, "foo").as_deref(), Some(""));
    }

    #[test]
    fn test_null_falls_through() {
        let entry = entry("{foo: ~, template: {foo: ~}, variables: {foo: var}}");
        assert_eq!(scalar(&entry, "foo").as_deref(), Some("var"));
    }

    #[rstest]
    #[case("{template: [{foo: a}, {bar: x}, {foo: [b, c]}]}", Some("a, b, c"))]
    #[case("{template: [{bar: x}], variables: {foo: var}}", Some("var"))]
    #[case("{template: [{foo: ' '}], variables: {foo: var}}", Some("var"))]
    fn test_template_list(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(scalar(&entry(text), "foo").as_deref(), expected);
    }

    #[test]
    fn test_invalid_template_falls_through_to_variables() {
        let entry = entry("{template: just-a-name, variables: {foo: var}}");
        assert_eq!(scalar(&entry, "foo").as_deref(), Some("var"));
    }

    #[rstest]
    #[case("foo: 'a, b, c'", &["a", "b", "c"])]
    #[case("foo: [a, b]", &["a", "b"])]
    #[case("foo: [1, true]", &["1", "true"])]
    #[case("foo: 42", &["42"])]
    #[case("foo: 'a,,b, '", &["a", "b"])]
    #[case("bar: x", &[])]
    fn test_resolve_list(#[case] text: &str, #[case] expected: &[&str]) {
        assert_eq!(entry(text).resolve_list("foo"), expected);
    }

    #[rstest]
    #[case("url_poster: X", Some("X"))]
    #[case("{poster: P, url_poster: U}", Some("P"))]
    #[case("{poster: '', url_poster: U}", Some("U"))]
    #[case("template: {url_poster: T}", Some("T"))]
    #[case("title: x", None)]
    fn test_poster_url(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(entry(text).poster_url().as_deref(), expected);
    }
}
