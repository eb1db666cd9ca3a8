//! Custom [`upon`] extensions available to every template.
//!
//! Formatters (`{{ value|name }}`):
//!
//! - **`json`**: Pretty-printed JSON of any value.
//! - **`quote`**: Wraps a string in double quotes when it contains a space.
//! - **`clean`**: Replaces characters that are not allowed in file names.
//! - **`slug`**: Converts strings to URL-safe slugs, stripping quotation
//!   marks first to avoid artifacts like leading/trailing hyphens.
//!
//! Functions:
//!
//! - **`concat(a, b)`**: Union of two values as a list of strings, without
//!   duplicates or empty strings, in first-seen order.
//! - **`add_prepostfix(value, prefix, postfix)`**: Adds `prefix` and
//!   `postfix` unless the trimmed value already starts or ends with them.
//!   An empty affix is ignored.
//! - **`truncate(value, n)`**: Truncates a string to at most `n` bytes at a
//!   character boundary.

use pmmgen_cache::title::clean_for_filesystem;
use rslug::slugify;
use std::fmt::Write;
use upon::{Engine, Value, fmt as upon_fmt};

pub(crate) fn to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::None => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::List(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Map(map) => Json::Object(map.iter().map(|(k, v)| (k.clone(), to_json(v))).collect()),
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::None => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::List(_) | Value::Map(_) => to_json(value).to_string(),
    }
}

fn json_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
    // Serializing a `serde_json::Value` cannot fail.
    let json = serde_json::to_string_pretty(&to_json(value)).unwrap_or_default();
    write!(f, "{json}")?;
    Ok(())
}

fn quote_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
    match value {
        Value::String(s) if s.trim().contains(' ') => write!(f, "\"{s}\"")?,
        v => upon_fmt::default(f, v)?,
    };
    Ok(())
}

fn clean_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
    match value {
        Value::String(s) => write!(f, "{}", clean_for_filesystem(s))?,
        v => upon_fmt::default(f, v)?,
    };
    Ok(())
}

/// Custom formatter that converts strings to URL-safe slugs.
///
/// Strips quotation marks before slugifying to avoid awkward slug output
/// like `"hello"` becoming `-hello-`.
fn slug_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
    match value {
        Value::String(s) => {
            // Various quotation marks: '"''""„"`«»
            let marks = [
                '\u{0027}', '\u{0022}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201B}',
                '\u{0060}', '\u{00AB}', '\u{00BB}', '\u{2039}', '\u{203A}',
            ];
            let stripped: String = s.chars().filter(|c| !marks.contains(c)).collect();
            write!(f, "{}", slugify!(&stripped))?
        },
        v => upon_fmt::default(f, v)?,
    };
    Ok(())
}

fn concat(a: &Value, b: &Value) -> Value {
    let mut result: Vec<String> = Vec::new();
    for value in [a, b] {
        let items = match value {
            Value::None => Vec::new(),
            Value::List(items) => items.iter().map(to_text).collect(),
            other => vec![to_text(other)],
        };
        for item in items {
            if !item.is_empty() && !result.contains(&item) {
                result.push(item);
            }
        }
    }
    Value::List(result.into_iter().map(Value::String).collect())
}

fn add_prepostfix(value: &str, prefix: &str, postfix: &str) -> String {
    let mut result = value.to_string();
    if !prefix.is_empty() && !result.trim().starts_with(prefix) {
        result.insert_str(0, prefix);
    }
    if !postfix.is_empty() && !result.trim().ends_with(postfix) {
        result.push_str(postfix);
    }
    result
}

/// Truncates a string to a maximum byte length at a character boundary.
///
/// This prevents cutting UTF-8 characters in the middle, which would produce
/// invalid strings.
fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> String {
    s[..s.floor_char_boundary(max_bytes)].to_string()
}

/// Registers every formatter and function on the given engine.
pub fn configure(engine: &mut Engine<'_>) {
    engine.add_formatter("json", json_formatter);
    engine.add_formatter("quote", quote_formatter);
    engine.add_formatter("clean", clean_formatter);
    engine.add_formatter("slug", slug_formatter);
    engine.add_function("concat", concat);
    engine.add_function("add_prepostfix", add_prepostfix);
    engine.add_function("truncate", truncate_to_char_boundary);
}
