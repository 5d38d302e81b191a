//! Blocks: the ordered mapping parsed from a workspace YAML file, and the
//! tagged step value it's made of.

use indexmap::IndexMap;
use serde_yaml::Value as YamlValue;

/// A single step's payload, tagged by its sigil prefix.
#[derive(Debug, Clone)]
pub enum StepValue {
    /// `zDisplay` — render-only output, no dispatch.
    Display(YamlValue),
    /// `zData` — a data-tier query/mutation step.
    Data(YamlValue),
    /// `zFunc` — a function-call step.
    Func(YamlValue),
    /// `zLink` — a navigation link, bare zPath or `(zpath, {perm: val})`.
    Link(YamlValue),
    /// `zDialog` — an interactive prompt/confirmation step.
    Dialog(YamlValue),
    /// Anything without a recognized step-type prefix: a plain scalar or
    /// nested mapping carried through as-is.
    Raw(YamlValue),
}

impl StepValue {
    /// Classify a key's step type from its sigil prefix and wrap the value.
    pub fn from_keyed(key: &str, value: YamlValue) -> Self {
        match step_kind(key) {
            Some("zDisplay") => StepValue::Display(value),
            Some("zData") => StepValue::Data(value),
            Some("zFunc") => StepValue::Func(value),
            Some("zLink") => StepValue::Link(value),
            Some("zDialog") => StepValue::Dialog(value),
            _ => StepValue::Raw(value),
        }
    }

    pub fn inner(&self) -> &YamlValue {
        match self {
            StepValue::Display(v)
            | StepValue::Data(v)
            | StepValue::Func(v)
            | StepValue::Link(v)
            | StepValue::Dialog(v)
            | StepValue::Raw(v) => v,
        }
    }
}

/// An ordered block: the parsed form of a YAML mapping under a block name,
/// preserving source key order since step execution is order-dependent.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub steps: IndexMap<String, StepValue>,
}

impl Block {
    pub fn from_yaml_mapping(mapping: &IndexMap<YamlValue, YamlValue>) -> Self {
        let mut steps = IndexMap::new();
        for (k, v) in mapping {
            if let Some(key) = k.as_str() {
                steps.insert(key.to_string(), StepValue::from_keyed(key, v.clone()));
            }
        }
        Block { steps }
    }

    pub fn get(&self, key: &str) -> Option<&StepValue> {
        self.steps.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }
}

/// Returns the step-type name implied by a key's sigil prefix, if any.
fn step_kind(key: &str) -> Option<&'static str> {
    if key.starts_with("zDisplay") {
        Some("zDisplay")
    } else if key.starts_with("zData") {
        Some("zData")
    } else if key.starts_with("zFunc") {
        Some("zFunc")
    } else if key.starts_with("zLink") {
        Some("zLink")
    } else if key.starts_with("zDialog") {
        Some("zDialog")
    } else {
        None
    }
}

/// Key-shape helpers — the sigil conventions carried by step keys
/// (`~` optional, `*` wildcard/spread, `!` required/strict, `^` hoisted,
/// leading `_` private/internal).
pub mod shape {
    pub fn is_optional(key: &str) -> bool {
        key.starts_with('~')
    }

    pub fn is_wildcard(key: &str) -> bool {
        key.starts_with('*')
    }

    pub fn is_required(key: &str) -> bool {
        key.starts_with('!')
    }

    pub fn is_hoisted(key: &str) -> bool {
        key.starts_with('^')
    }

    pub fn is_private(key: &str) -> bool {
        key.starts_with('_')
    }

    /// Strip any single leading shape sigil, returning the bare name.
    pub fn bare(key: &str) -> &str {
        key.trim_start_matches(['~', '*', '!', '^', '_'])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_step_kinds_by_prefix() {
        let v = YamlValue::Null;
        assert!(matches!(StepValue::from_keyed("zDisplay.title", v.clone()), StepValue::Display(_)));
        assert!(matches!(StepValue::from_keyed("zLink", v.clone()), StepValue::Link(_)));
        assert!(matches!(StepValue::from_keyed("plain_key", v), StepValue::Raw(_)));
    }

    #[test]
    fn shape_sigils() {
        assert!(shape::is_optional("~name"));
        assert!(shape::is_wildcard("*rest"));
        assert!(shape::is_required("!id"));
        assert!(shape::is_hoisted("^shared"));
        assert!(shape::is_private("_internal"));
        assert_eq!(shape::bare("~name"), "name");
    }

    #[test]
    fn block_preserves_key_order() {
        let mut mapping = IndexMap::new();
        mapping.insert(YamlValue::String("b".into()), YamlValue::Null);
        mapping.insert(YamlValue::String("a".into()), YamlValue::Null);
        let block = Block::from_yaml_mapping(&mapping);
        assert_eq!(block.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }
}
