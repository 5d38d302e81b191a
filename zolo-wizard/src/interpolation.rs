//! Variable and function interpolation: `%x.y.z` references resolved
//! against the accumulator / resolved data / session, and `&fname(args)`
//! calls resolved against a function registry.

use std::collections::HashMap;

use serde_yaml::Value as YamlValue;
use zolo_core::session::Session;
use zolo_core::Accumulator;

/// The plugin/function registry `&fname(args)` calls are resolved against.
pub trait FunctionRegistry {
    fn call(&self, name: &str, args: &[YamlValue]) -> Option<YamlValue>;
}

/// Resolve every `%x.y.z` reference and `&fname(args)` call found in
/// string-valued fields of `value`, recursing into mappings and sequences.
/// Missing references interpolate literally to `"None"` and log a warning.
pub fn resolve(
    value: &YamlValue,
    accumulator: &Accumulator<YamlValue>,
    resolved_data: &HashMap<String, YamlValue>,
    session: &Session,
    functions: &dyn FunctionRegistry,
) -> YamlValue {
    match value {
        YamlValue::String(s) => resolve_string(s, accumulator, resolved_data, session, functions),
        YamlValue::Mapping(m) => {
            let mut out = serde_yaml::Mapping::new();
            for (k, v) in m {
                out.insert(k.clone(), resolve(v, accumulator, resolved_data, session, functions));
            }
            YamlValue::Mapping(out)
        }
        YamlValue::Sequence(items) => YamlValue::Sequence(
            items.iter().map(|v| resolve(v, accumulator, resolved_data, session, functions)).collect(),
        ),
        other => other.clone(),
    }
}

/// A whole string that is *only* a `%`/`&` reference resolves to the raw
/// value it names (so `"%user"` mapping to a YAML mapping stays a mapping).
/// A reference embedded inside a longer string instead substitutes the
/// value's string form in place, since the surrounding text is necessarily
/// a string already (e.g. `"id = %user.id"` -> `"id = 42"`).
fn resolve_string(
    s: &str,
    accumulator: &Accumulator<YamlValue>,
    resolved_data: &HashMap<String, YamlValue>,
    session: &Session,
    functions: &dyn FunctionRegistry,
) -> YamlValue {
    if let Some(path) = s.strip_prefix('%') {
        if path.len() == reference_token_len(path) {
            return resolve_reference(path, accumulator, resolved_data, session);
        }
    }
    if let Some(call) = s.strip_prefix('&') {
        if call.len() == call_token_len(call) {
            return resolve_call(call, accumulator, resolved_data, session, functions)
                .unwrap_or_else(|| YamlValue::String(s.to_string()));
        }
    }

    if !s.contains('%') && !s.contains('&') {
        return YamlValue::String(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find(|c| c == '%' || c == '&') {
        out.push_str(&rest[..pos]);
        let marker = rest.as_bytes()[pos] as char;
        let tail = &rest[pos + 1..];

        let (resolved, consumed) = if marker == '%' {
            let len = reference_token_len(tail);
            if len == 0 {
                (None, 0)
            } else {
                (Some(resolve_reference(&tail[..len], accumulator, resolved_data, session)), len)
            }
        } else {
            let len = call_token_len(tail);
            if len == 0 {
                (None, 0)
            } else {
                (resolve_call(&tail[..len], accumulator, resolved_data, session, functions), len)
            }
        };

        match resolved {
            Some(value) => out.push_str(&yaml_as_display_string(&value)),
            None => out.push(marker),
        }
        rest = &tail[consumed..];
    }
    out.push_str(rest);
    YamlValue::String(out)
}

/// Length of a `%`-reference token (`x.y.z`): contiguous run of identifier
/// characters and `.`, stopping at anything else (whitespace, punctuation).
fn reference_token_len(s: &str) -> usize {
    let mut len = s
        .char_indices()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_' || *c == '.')
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    // A trailing `.` is sentence punctuation, not a path separator: "%ref."
    // means the reference `ref` followed by a literal period.
    while len > 0 && s.as_bytes()[len - 1] == b'.' {
        len -= 1;
    }
    len
}

/// Length of an `&`-call token (`fname` or `fname(args)`): identifier chars
/// followed by an optional balanced `(...)` group.
fn call_token_len(s: &str) -> usize {
    let name_len = s
        .char_indices()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    if name_len == 0 {
        return 0;
    }
    match s[name_len..].find(')') {
        Some(close) if s[name_len..].starts_with('(') => name_len + close + 1,
        _ => name_len,
    }
}

fn yaml_as_display_string(value: &YamlValue) -> String {
    match value {
        YamlValue::String(s) => s.clone(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Null => "None".to_string(),
        other => serde_yaml::to_string(other).unwrap_or_default().trim_end().to_string(),
    }
}

fn resolve_reference(
    path: &str,
    accumulator: &Accumulator<YamlValue>,
    resolved_data: &HashMap<String, YamlValue>,
    session: &Session,
) -> YamlValue {
    let mut parts = path.split('.');
    let Some(root) = parts.next() else {
        return none_literal(path);
    };
    let rest: Vec<&str> = parts.collect();

    let base = if root == "data" {
        rest.split_first().and_then(|(head, _)| resolved_data.get(*head).cloned())
    } else if root == "session" {
        session_field(session, &rest)
    } else {
        accumulator.by_key(root).map(|v| (**v).clone())
    };

    let navigate_from = if root == "data" { rest.get(1..).unwrap_or(&[]) } else { rest.as_slice() };

    match base {
        Some(v) => navigate(&v, if root == "data" { navigate_from } else { &rest }).unwrap_or_else(|| {
            tracing::warn!(reference = path, "unresolved %-reference, interpolating None");
            none_literal(path)
        }),
        None => {
            tracing::warn!(reference = path, "unresolved %-reference, interpolating None");
            none_literal(path)
        }
    }
}

fn session_field(session: &Session, rest: &[&str]) -> Option<YamlValue> {
    match rest.first().copied() {
        Some("folder") => Some(YamlValue::String(session.position.folder.clone())),
        Some("file") => Some(YamlValue::String(session.position.file.clone())),
        Some("block") => Some(YamlValue::String(session.position.block.clone())),
        Some("auth") => rest.get(1).and_then(|field| session.auth.fields.get(*field)).map(|v| YamlValue::String(v.clone())),
        _ => None,
    }
}

fn navigate(value: &YamlValue, rest: &[&str]) -> Option<YamlValue> {
    let mut current = value.clone();
    for segment in rest {
        current = match &current {
            YamlValue::Mapping(m) => m.get(YamlValue::String(segment.to_string()))?.clone(),
            _ => return None,
        };
    }
    Some(current)
}

fn none_literal(_path: &str) -> YamlValue {
    YamlValue::String("None".to_string())
}

/// Parse `fname` or `fname(arg1, arg2)` and invoke it against the registry.
fn resolve_call(
    call: &str,
    accumulator: &Accumulator<YamlValue>,
    resolved_data: &HashMap<String, YamlValue>,
    session: &Session,
    functions: &dyn FunctionRegistry,
) -> Option<YamlValue> {
    let (name, raw_args) = match call.split_once('(') {
        Some((name, rest)) => (name, rest.strip_suffix(')').unwrap_or(rest)),
        None => (call, ""),
    };

    let args: Vec<YamlValue> = if raw_args.trim().is_empty() {
        Vec::new()
    } else {
        raw_args
            .split(',')
            .map(|a| resolve_string(a.trim(), accumulator, resolved_data, session, functions))
            .collect()
    };

    functions.call(name, &args)
}
