//! Helpers for loosely-typed YAML values.

use serde_yaml::Value;

/// Human-readable name of a value's shape, for log messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Mapping keys are addressed as strings; `1917:` and `"1917":` are the same key.
pub(crate) fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => key_to_string(&tagged.value),
        _ => None,
    }
}

/// String form of any value. Lists are joined with `", "` and null is empty.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items.iter().map(stringify).collect::<Vec<_>>().join(", "),
        Value::Mapping(_) => serde_yaml::to_string(value).map(|s| s.trim().to_string()).unwrap_or_default(),
        Value::Tagged(tagged) => stringify(&tagged.value),
    }
}

/// Like [`stringify`], but only for scalars.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Some(stringify(value)),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[rstest]
    #[case("~", "")]
    #[case("1917", "1917")]
    #[case("true", "true")]
    #[case("Alien", "Alien")]
    #[case("[a, 2, b]", "a, 2, b")]
    #[case("[[a, b], c]", "a, b, c")]
    fn test_stringify(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(stringify(&yaml(input)), expected);
    }

    #[rstest]
    #[case("1", Some("1"))]
    #[case("Alien", Some("Alien"))]
    #[case("[a]", None)]
    #[case("~", None)]
    fn test_key_to_string(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(key_to_string(&yaml(input)).as_deref(), expected);
    }
}
