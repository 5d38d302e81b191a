//! The process-wide session: the one mutable object shared across the
//! engine, navigation, and bridge. Mutators are concentrated in the
//! navigation and config components — this module only owns the data shape.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `session.zMode` — selects the Loop Engine's execution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZMode {
    Terminal,
    Walker,
    Bifrost,
    Empty,
}

/// Three-tier auth context, as carried in `session.zAuth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthContext {
    ZSession,
    Application,
    Dual,
    Guest,
}

/// `session.zAuth` — the authenticated identity and its scoping context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZAuth {
    pub active_context: Option<AuthContext>,
    pub active_app: Option<String>,
    /// Arbitrary role/permission fields compared against `zRBAC` and
    /// `zLink` required-perms predicates — e.g. `"role" -> "admin"`.
    pub fields: HashMap<String, String>,
}

impl ZAuth {
    pub fn is_authenticated(&self) -> bool {
        self.active_context.is_some() && self.active_context != Some(AuthContext::Guest)
    }

    pub fn roles(&self) -> Vec<&str> {
        self.fields
            .get("role")
            .map(|r| r.split(',').map(str::trim).collect())
            .unwrap_or_default()
    }

    pub fn permissions(&self) -> Vec<&str> {
        self.fields
            .get("permission")
            .map(|p| p.split(',').map(str::trim).collect())
            .unwrap_or_default()
    }
}

/// Breadcrumb state: `scope -> ordered trail`, where scope is a crumb key
/// (see [`crate::zpath::ZPath::crumb_key`]). Data shape only; the
/// APPEND/POP/POP_TO operations live in the navigation crate.
#[derive(Debug, Clone, Default)]
pub struct BreadcrumbState {
    pub scopes: IndexMap<String, Vec<String>>,
}

impl BreadcrumbState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trail(&self, scope: &str) -> &[String] {
        self.scopes.get(scope).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn banner(&self, scope: &str) -> String {
        self.trail(scope).join(" > ")
    }
}

/// The current zPath triple the session is positioned at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionTriple {
    pub folder: String,
    pub file: String,
    pub block: String,
}

/// Start-time defaults snapshotted when the session was created.
#[derive(Debug, Clone, Default)]
pub struct ZSpark {
    pub defaults: HashMap<String, String>,
}

/// The process-wide session object.
#[derive(Debug, Clone)]
pub struct Session {
    pub position: PositionTriple,
    pub mode: ZMode,
    pub crumbs: BreadcrumbState,
    pub auth: ZAuth,
    pub cache_meta: HashMap<String, String>,
    pub spark: ZSpark,
    pub session_hash: String,
}

impl Session {
    pub fn new(session_hash: impl Into<String>) -> Self {
        Self {
            position: PositionTriple::default(),
            mode: ZMode::Empty,
            crumbs: BreadcrumbState::new(),
            auth: ZAuth::default(),
            cache_meta: HashMap::new(),
            spark: ZSpark::default(),
            session_hash: session_hash.into(),
        }
    }

    /// Current scope's crumb key, for breadcrumb lookups.
    pub fn scope_key(&self) -> String {
        format!("{}.{}.{}", self.position.folder, self.position.file, self.position.block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_is_not_authenticated() {
        let mut auth = ZAuth::default();
        auth.active_context = Some(AuthContext::Guest);
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn application_context_is_authenticated() {
        let mut auth = ZAuth::default();
        auth.active_context = Some(AuthContext::Application);
        assert!(auth.is_authenticated());
    }

    #[test]
    fn roles_are_split_on_comma() {
        let mut auth = ZAuth::default();
        auth.fields.insert("role".into(), "admin, editor".into());
        assert_eq!(auth.roles(), vec!["admin", "editor"]);
    }
}
