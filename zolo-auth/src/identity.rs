use serde::{Deserialize, Serialize};

/// Represents an authenticated user extracted from a validated JWT token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Subject claim ("sub") - unique user identifier.
    pub sub: String,

    /// Email claim ("email"), if present in the token.
    pub email: Option<String>,

    /// Roles extracted from the token claims.
    pub roles: Vec<String>,

    /// Raw claims for advanced access.
    pub claims: serde_json::Value,
}

impl AuthenticatedUser {
    /// Build an `AuthenticatedUser` from validated JWT claims.
    ///
    /// Roles come from a `roles` array claim if present, falling back to a
    /// comma-separated `role` string claim.
    pub fn from_claims(claims: serde_json::Value) -> Self {
        let sub = claims
            .get("sub")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let email = claims
            .get("email")
            .and_then(|v| v.as_str())
            .map(String::from);

        let roles = extract_roles(&claims);

        AuthenticatedUser {
            sub,
            email,
            roles,
            claims,
        }
    }

    /// Check whether the user has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check whether the user has any of the specified roles.
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }
}

fn extract_roles(claims: &serde_json::Value) -> Vec<String> {
    if let Some(arr) = claims.get("roles").and_then(|v| v.as_array()) {
        return arr
            .iter()
            .filter_map(|v| v.as_str())
            .map(String::from)
            .collect();
    }
    if let Some(s) = claims.get("role").and_then(|v| v.as_str()) {
        return s.split(',').map(|r| r.trim().to_string()).collect();
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_roles_array() {
        let claims = serde_json::json!({"sub": "u1", "roles": ["admin", "editor"]});
        let user = AuthenticatedUser::from_claims(claims);
        assert!(user.has_role("admin"));
        assert!(user.has_any_role(&["viewer", "editor"]));
    }

    #[test]
    fn falls_back_to_comma_separated_role_string() {
        let claims = serde_json::json!({"sub": "u1", "role": "admin, editor"});
        let user = AuthenticatedUser::from_claims(claims);
        assert_eq!(user.roles, vec!["admin", "editor"]);
    }
}
