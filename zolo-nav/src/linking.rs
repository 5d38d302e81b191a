//! `zLink` parsing and permission checks.
//!
//! The YAML step value arrives already parsed (via
//! [`zolo_core::StepValue::Link`]), so there's no expression string to
//! tokenize here — just two shapes to pattern-match: a bare zPath string, or
//! a 2-element sequence `[path, {perm: value, ...}]`.

use indexmap::IndexMap;
use serde_yaml::Value as YamlValue;
use zolo_core::session::ZAuth;
use zolo_core::ZPath;

use crate::error::NavError;

/// A parsed `zLink` target: the destination path and any required perms.
#[derive(Debug, Clone)]
pub struct LinkTarget {
    pub zpath: ZPath,
    pub required_perms: IndexMap<String, String>,
}

/// Parse a `zLink` step value into a target path and required perms.
pub fn parse(value: &YamlValue) -> Result<LinkTarget, NavError> {
    match value {
        YamlValue::String(raw) => Ok(LinkTarget {
            zpath: ZPath::parse(raw).map_err(|e| NavError::MalformedLink(e.to_string()))?,
            required_perms: IndexMap::new(),
        }),
        YamlValue::Sequence(items) if items.len() == 2 => {
            let raw = items[0]
                .as_str()
                .ok_or_else(|| NavError::MalformedLink("zLink path element must be a string".into()))?;
            let zpath = ZPath::parse(raw).map_err(|e| NavError::MalformedLink(e.to_string()))?;

            let mapping = items[1]
                .as_mapping()
                .ok_or_else(|| NavError::MalformedLink("zLink perms element must be a mapping".into()))?;

            let mut required_perms = IndexMap::new();
            for (k, v) in mapping {
                let key = k
                    .as_str()
                    .ok_or_else(|| NavError::MalformedLink("zLink perm key must be a string".into()))?;
                required_perms.insert(key.to_string(), scalar_to_string(v));
            }

            Ok(LinkTarget { zpath, required_perms })
        }
        other => Err(NavError::MalformedLink(format!("unsupported zLink shape: {other:?}"))),
    }
}

fn scalar_to_string(value: &YamlValue) -> String {
    match value {
        YamlValue::String(s) => s.clone(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        other => serde_yaml::to_string(other).unwrap_or_default().trim().to_string(),
    }
}

/// An empty `required_perms` map always grants. Otherwise every required
/// key must match the session's `zAuth` field exactly — any missing key or
/// mismatch denies, short-circuiting on the first failure.
pub fn check_permissions(required: &IndexMap<String, String>, auth: &ZAuth) -> bool {
    required
        .iter()
        .all(|(key, expected)| auth.fields.get(key) == Some(expected))
}
