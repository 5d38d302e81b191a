//! Shorthand key expansion: `zH1`..`zH6`, `zText`, `zImage`, `zURL`, `zUL`,
//! `zOL`, `zTable`, `zMD` rewrite to their canonical `zDisplay` dispatch
//! form. Plural shorthand (`zURLs`, `zTexts`, …) passes through unchanged —
//! the dispatch collaborator expands those itself.

use serde_yaml::{Mapping, Value as YamlValue};

/// If `key` is a singular display shorthand, return its canonical
/// `(zDisplay key, rewritten value)`. Plural forms and unrecognised keys
/// return `None` and are left untouched.
pub fn expand(key: &str, value: &YamlValue) -> Option<(String, YamlValue)> {
    let event = shorthand_event(key)?;

    let mut display = Mapping::new();
    display.insert(YamlValue::String("event".into()), YamlValue::String(event.to_string()));

    if let Some(indent) = header_indent(key) {
        display.insert(YamlValue::String("indent".into()), YamlValue::Number(indent.into()));
    }

    match value {
        YamlValue::Mapping(inner) => {
            for (k, v) in inner {
                display.insert(k.clone(), v.clone());
            }
        }
        other => {
            display.insert(YamlValue::String("content".into()), other.clone());
        }
    }

    Some(("zDisplay".to_string(), YamlValue::Mapping(display)))
}

fn header_indent(key: &str) -> Option<u64> {
    key.strip_prefix('z')
        .and_then(|rest| rest.strip_prefix('H'))
        .and_then(|n| n.parse::<u64>().ok())
        .filter(|n| (1..=6).contains(n))
}

fn shorthand_event(key: &str) -> Option<&'static str> {
    if header_indent(key).is_some() {
        return Some("header");
    }
    match key {
        "zText" => Some("text"),
        "zImage" => Some("image"),
        "zURL" => Some("url"),
        "zUL" => Some("unordered_list"),
        "zOL" => Some("ordered_list"),
        "zTable" => Some("table"),
        "zMD" => Some("markdown"),
        _ => None,
    }
}
