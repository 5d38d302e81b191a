//! Bridges a step's `zRBAC:` YAML metadata into [`zolo_auth::RbacRequirement`]
//! and runs it through [`zolo_auth::evaluate`].

use serde_yaml::Value as YamlValue;
use zolo_auth::{evaluate, AuthenticatedUser, RbacOutcome, RbacRequirement};

/// Extract `zRBAC` metadata from a step's mapping, if present, and evaluate
/// it. Absence of `zRBAC` is public — `evaluate` already grants on an empty
/// requirement, so a missing key and an explicit `zRBAC: {}` behave
/// identically.
pub fn check(key: &str, value: &YamlValue, auth_available: bool, user: Option<&AuthenticatedUser>) -> RbacOutcome {
    let rbac = value
        .as_mapping()
        .and_then(|m| m.get(YamlValue::String("zRBAC".to_string())))
        .map(parse_requirement)
        .unwrap_or_default();

    evaluate(key, &rbac, auth_available, user)
}

fn parse_requirement(value: &YamlValue) -> RbacRequirement {
    let Some(mapping) = value.as_mapping() else {
        return RbacRequirement::default();
    };

    let zguest = mapping.get(YamlValue::String("zGuest".into())).and_then(YamlValue::as_bool).unwrap_or(false);
    let require_auth =
        mapping.get(YamlValue::String("require_auth".into())).and_then(YamlValue::as_bool).unwrap_or(false);
    let require_role = string_or_list(mapping.get(YamlValue::String("require_role".into())));
    let require_permission = string_or_list(mapping.get(YamlValue::String("require_permission".into())));

    RbacRequirement { zguest, require_auth, require_role, require_permission }
}

/// `require_role`/`require_permission` may be a bare string or a list.
fn string_or_list(value: Option<&YamlValue>) -> Vec<String> {
    match value {
        Some(YamlValue::String(s)) => vec![s.clone()],
        Some(YamlValue::Sequence(items)) => items.iter().filter_map(|v| v.as_str().map(String::from)).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_zrbac_is_public() {
        let value: YamlValue = serde_yaml::from_str("zDisplay: {}").unwrap();
        assert_eq!(check("^Home", &value, false, None), RbacOutcome::Granted);
    }

    #[test]
    fn single_role_string_parses_to_one_element_list() {
        let value: YamlValue = serde_yaml::from_str("zRBAC: {require_role: admin}").unwrap();
        let outcome = check("^Admin", &value, true, None);
        assert!(matches!(outcome, RbacOutcome::Denied { .. }));
    }

    #[test]
    fn role_list_parses() {
        let value: YamlValue = serde_yaml::from_str("zRBAC: {require_role: [admin, moderator]}").unwrap();
        let user = AuthenticatedUser {
            sub: "u1".into(),
            email: None,
            roles: vec!["moderator".into()],
            claims: serde_json::json!({}),
        };
        let outcome = check("^Admin", &value, true, Some(&user));
        assert_eq!(outcome, RbacOutcome::Granted);
    }

    #[test]
    fn zguest_flag_parses() {
        let value: YamlValue = serde_yaml::from_str("zRBAC: {zGuest: true}").unwrap();
        let user = AuthenticatedUser { sub: "u1".into(), email: None, roles: vec![], claims: serde_json::json!({}) };
        let outcome = check("^Login", &value, true, Some(&user));
        assert!(matches!(outcome, RbacOutcome::DeniedZGuest { .. }));
    }
}
