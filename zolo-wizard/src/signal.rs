//! Navigation signals: the closed set a step result can normalise to, plus
//! key-jumps (any block key that isn't itself a signal name).

use serde_yaml::Value as YamlValue;

/// The closed signal set, plus a key-jump to another key in the same block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Back,
    Exit,
    Stop,
    Error,
    /// Jump iteration to this key; it must be present in the current block.
    KeyJump(String),
}

impl Signal {
    fn named(name: &str) -> Option<Self> {
        match name {
            "zBack" => Some(Signal::Back),
            "exit" => Some(Signal::Exit),
            "stop" => Some(Signal::Stop),
            "error" => Some(Signal::Error),
            "" => None,
            _ => None,
        }
    }
}

/// Classify a dispatch result into a signal, a key-jump, or "no navigation —
/// continue" (`None`). A bare scalar string is checked against the named
/// signal set first, then against the current block's keys for a key-jump.
/// A mapping with exactly one key drawn from the signal set normalises to
/// that signal; anything else is "continue".
pub fn classify(result: &YamlValue, block_keys: &[&str]) -> Option<Signal> {
    if let Some(s) = result.as_str() {
        if let Some(signal) = Signal::named(s) {
            return Some(signal);
        }
        if block_keys.contains(&s) {
            return Some(Signal::KeyJump(s.to_string()));
        }
        return None;
    }

    if let Some(mapping) = result.as_mapping() {
        if mapping.len() == 1 {
            if let Some((k, _)) = mapping.iter().next() {
                if let Some(key) = k.as_str() {
                    if let Some(signal) = Signal::named(key) {
                        return Some(signal);
                    }
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_signal_name_classifies() {
        let v = YamlValue::String("zBack".into());
        assert_eq!(classify(&v, &[]), Some(Signal::Back));
    }

    #[test]
    fn unrecognised_string_in_block_keys_is_a_key_jump() {
        let v = YamlValue::String("B".into());
        assert_eq!(classify(&v, &["A", "B"]), Some(Signal::KeyJump("B".to_string())));
    }

    #[test]
    fn unrecognised_string_not_in_block_is_no_navigation() {
        let v = YamlValue::String("nonsense".into());
        assert_eq!(classify(&v, &["A", "B"]), None);
    }

    #[test]
    fn single_key_mapping_normalises_to_signal() {
        let yaml = "exit: true";
        let v: YamlValue = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(classify(&v, &[]), Some(Signal::Exit));
    }

    #[test]
    fn non_scalar_with_no_signal_meaning_is_no_navigation() {
        let yaml = "foo: bar";
        let v: YamlValue = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(classify(&v, &[]), None);
    }
}
