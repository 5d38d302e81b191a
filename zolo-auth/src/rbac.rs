//! RBAC evaluation for `zRBAC` step metadata.
//!
//! Check order (short-circuit): no `zRBAC` -> granted; no auth subsystem ->
//! denied (fail-safe); `zGuest` denies already-authenticated users (a
//! friendly redirect, not an error); `require_auth`; `require_role` (OR
//! logic, implies auth); `require_permission` (OR logic, implies auth).

use tracing::{debug, info, warn};

use crate::identity::AuthenticatedUser;

/// Parsed `zRBAC:` metadata from a step.
#[derive(Debug, Clone, Default)]
pub struct RbacRequirement {
    pub zguest: bool,
    pub require_auth: bool,
    pub require_role: Vec<String>,
    pub require_permission: Vec<String>,
}

impl RbacRequirement {
    pub fn is_empty(&self) -> bool {
        !self.zguest
            && !self.require_auth
            && self.require_role.is_empty()
            && self.require_permission.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RbacOutcome {
    Granted,
    /// Denied because the `zGuest` requirement doesn't hold — the user is
    /// already authenticated. Not an error: a positive, redirect-worthy
    /// outcome, logged at info level rather than warn.
    DeniedZGuest { reason: String },
    Denied { reason: String },
}

/// Evaluate a step's RBAC requirement against an optional authenticated
/// user. `user: None` with no auth subsystem configured fails safe-denied
/// for any non-empty requirement, matching the "no auth subsystem" branch.
pub fn evaluate(key: &str, rbac: &RbacRequirement, auth_available: bool, user: Option<&AuthenticatedUser>) -> RbacOutcome {
    if rbac.is_empty() {
        return RbacOutcome::Granted;
    }

    if !auth_available {
        warn!(key, "RBAC check with no auth subsystem configured — denying");
        return RbacOutcome::Denied {
            reason: "no authentication subsystem configured".into(),
        };
    }

    let is_authenticated = user.is_some();

    if rbac.zguest && is_authenticated {
        let reason = "this page is for guests only".to_string();
        info!(key, reason, "RBAC zGuest redirect (user already authenticated)");
        return RbacOutcome::DeniedZGuest { reason };
    }

    if rbac.require_auth && !is_authenticated {
        return deny(key, "authentication required".into());
    }

    if !rbac.require_role.is_empty() {
        let Some(user) = user else {
            return deny(key, "authentication required".into());
        };
        let roles: Vec<&str> = rbac.require_role.iter().map(String::as_str).collect();
        if !user.has_any_role(&roles) {
            return deny(key, format!("role required: one of {}", rbac.require_role.join(", ")));
        }
    }

    if !rbac.require_permission.is_empty() {
        let Some(user) = user else {
            return deny(key, "authentication required".into());
        };
        let granted = user
            .claims
            .get("permissions")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect::<Vec<_>>())
            .unwrap_or_default();
        let has_any = rbac.require_permission.iter().any(|p| granted.contains(&p.as_str()));
        if !has_any {
            return deny(
                key,
                format!("permission required: one of {}", rbac.require_permission.join(", ")),
            );
        }
    }

    debug!(key, "RBAC access granted");
    RbacOutcome::Granted
}

fn deny(key: &str, reason: String) -> RbacOutcome {
    warn!(key, reason = %reason, "RBAC access denied");
    RbacOutcome::Denied { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_roles(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "u1".into(),
            email: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            claims: serde_json::json!({}),
        }
    }

    #[test]
    fn no_rbac_is_public() {
        let outcome = evaluate("^Public", &RbacRequirement::default(), true, None);
        assert_eq!(outcome, RbacOutcome::Granted);
    }

    #[test]
    fn no_auth_subsystem_fails_safe_denied() {
        let rbac = RbacRequirement { require_auth: true, ..Default::default() };
        let outcome = evaluate("^Profile", &rbac, false, None);
        assert!(matches!(outcome, RbacOutcome::Denied { .. }));
    }

    #[test]
    fn zguest_denies_authenticated_users_without_erroring() {
        let rbac = RbacRequirement { zguest: true, ..Default::default() };
        let user = user_with_roles(&[]);
        let outcome = evaluate("^zLogin", &rbac, true, Some(&user));
        assert!(matches!(outcome, RbacOutcome::DeniedZGuest { .. }));
    }

    #[test]
    fn zguest_grants_unauthenticated_users() {
        let rbac = RbacRequirement { zguest: true, ..Default::default() };
        let outcome = evaluate("^zLogin", &rbac, true, None);
        assert_eq!(outcome, RbacOutcome::Granted);
    }

    #[test]
    fn require_role_is_or_logic() {
        let rbac = RbacRequirement {
            require_role: vec!["admin".into(), "moderator".into()],
            ..Default::default()
        };
        let user = user_with_roles(&["moderator"]);
        assert_eq!(evaluate("^Admin", &rbac, true, Some(&user)), RbacOutcome::Granted);
    }

    #[test]
    fn require_role_implies_auth() {
        let rbac = RbacRequirement { require_role: vec!["admin".into()], ..Default::default() };
        let outcome = evaluate("^Admin", &rbac, true, None);
        assert!(matches!(outcome, RbacOutcome::Denied { .. }));
    }

    #[test]
    fn require_permission_denies_without_matching_claim() {
        let rbac = RbacRequirement {
            require_permission: vec!["users.delete".into()],
            ..Default::default()
        };
        let user = user_with_roles(&["admin"]);
        let outcome = evaluate("^Delete_User", &rbac, true, Some(&user));
        assert!(matches!(outcome, RbacOutcome::Denied { .. }));
    }
}
