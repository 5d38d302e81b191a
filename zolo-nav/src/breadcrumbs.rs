//! Breadcrumb trail management: one ordered trail per scope, keyed by the
//! scope's crumb key (see [`zolo_core::ZPath::crumb_key`]).

use zolo_core::session::{BreadcrumbState, PositionTriple};
use zolo_core::ZPath;

use crate::error::NavError;

/// Append `key` to `scope`'s trail, unless it's already the last entry.
pub fn append(crumbs: &mut BreadcrumbState, scope: &str, key: &str) {
    let trail = crumbs.scopes.entry(scope.to_string()).or_default();
    if trail.last().map(String::as_str) == Some(key) {
        return;
    }
    trail.push(key.to_string());
}

/// Truncate `scope`'s trail to the position of `key`, dropping everything
/// after it. No-op if `key` isn't in the trail.
pub fn pop_to(crumbs: &mut BreadcrumbState, scope: &str, key: &str) {
    if let Some(trail) = crumbs.scopes.get_mut(scope) {
        if let Some(pos) = trail.iter().position(|k| k == key) {
            trail.truncate(pos + 1);
        }
    }
}

/// Outcome of a `POP` (zBack): the scope the engine is left positioned at
/// and the key it should resume from, if the trail still had one.
#[derive(Debug, Clone)]
pub struct BackResult {
    pub position: PositionTriple,
    pub resolved_start_key: Option<String>,
}

/// `POP`: drop the active scope's last crumb; if it was already empty and
/// isn't the root scope, drop the scope entirely and pop the parent's last
/// entry too (the link that opened the now-removed child) — this can
/// cascade through several empty scopes in a row.
pub fn pop(crumbs: &mut BreadcrumbState) -> Result<BackResult, NavError> {
    if crumbs.scopes.is_empty() {
        return Err(NavError::NothingToPop);
    }

    let original_scope = crumbs.scopes.keys().next().unwrap().clone();
    let mut active_scope = crumbs.scopes.keys().last().unwrap().clone();

    pop_last_or_collapse_scope(crumbs, &mut active_scope, &original_scope);

    // The collapse above can itself leave the new active scope empty;
    // cascade one more step if so.
    let now_empty = crumbs
        .scopes
        .get(&active_scope)
        .map(Vec::is_empty)
        .unwrap_or(true);
    if now_empty && active_scope != original_scope {
        pop_last_or_collapse_scope(crumbs, &mut active_scope, &original_scope);
    }

    let trail = crumbs.scopes.get(&active_scope).cloned().unwrap_or_default();
    let resolved_start_key = trail.last().cloned();

    let position = position_from_scope(&active_scope);

    Ok(BackResult { position, resolved_start_key })
}

/// Pop `active_scope`'s last entry; if it has none and isn't root, remove
/// the scope and pop the new (parent) active scope's last entry instead,
/// advancing `active_scope` in place.
fn pop_last_or_collapse_scope(crumbs: &mut BreadcrumbState, active_scope: &mut String, original_scope: &str) {
    let trail_nonempty = crumbs
        .scopes
        .get(active_scope.as_str())
        .map(|t| !t.is_empty())
        .unwrap_or(false);

    if trail_nonempty {
        crumbs.scopes.get_mut(active_scope.as_str()).unwrap().pop();
        return;
    }

    if active_scope.as_str() == original_scope {
        return;
    }

    crumbs.scopes.shift_remove(active_scope.as_str());
    if let Some(parent) = crumbs.scopes.keys().last() {
        *active_scope = parent.clone();
        if let Some(trail) = crumbs.scopes.get_mut(active_scope.as_str()) {
            trail.pop();
        }
    }
}

/// Parse a crumb key's last 3 dotted segments into a session position
/// triple. A shorter key leaves the engine positioned where it already was
/// — the zPath precondition is validated at load time, not here.
fn position_from_scope(scope: &str) -> PositionTriple {
    let parts: Vec<&str> = scope.split('.').collect();
    if parts.len() < 3 {
        return PositionTriple::default();
    }
    let block = parts[parts.len() - 1].to_string();
    let file = parts[parts.len() - 2].to_string();
    let folder = parts[..parts.len() - 2].join(".");
    PositionTriple { folder, file, block }
}

/// Build a zPath from a scope's crumb key, for reloading through the Cache
/// Orchestrator after a `POP`.
pub fn zpath_from_position(position: &PositionTriple) -> ZPath {
    let folder = if position.folder.is_empty() {
        Vec::new()
    } else {
        position.folder.split('.').map(String::from).collect()
    };
    ZPath { folder, file: position.file.clone(), block: position.block.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_dedups_adjacent_equal_entries() {
        let mut crumbs = BreadcrumbState::new();
        append(&mut crumbs, "root", "A");
        append(&mut crumbs, "root", "A");
        append(&mut crumbs, "root", "B");
        assert_eq!(crumbs.trail("root"), &["A", "B"]);
    }

    #[test]
    fn pop_drops_last_entry_in_nonempty_trail() {
        let mut crumbs = BreadcrumbState::new();
        append(&mut crumbs, "root", "A");
        append(&mut crumbs, "root", "B");
        let result = pop(&mut crumbs).unwrap();
        assert_eq!(crumbs.trail("root"), &["A"]);
        assert_eq!(result.resolved_start_key, Some("A".to_string()));
    }

    #[test]
    fn pop_cascades_through_empty_child_scope() {
        let mut crumbs = BreadcrumbState::new();
        append(&mut crumbs, "root", "open_child");
        append(&mut crumbs, "root.child", "only_entry");

        // empties the child scope entirely
        pop(&mut crumbs).unwrap();
        assert!(!crumbs.scopes.contains_key("root.child"));
        // cascaded into popping root's last entry too
        assert!(crumbs.trail("root").is_empty());
    }

    #[test]
    fn pop_at_root_with_empty_trail_is_a_noop() {
        let mut crumbs = BreadcrumbState::new();
        crumbs.scopes.insert("root".to_string(), Vec::new());
        let result = pop(&mut crumbs).unwrap();
        assert_eq!(result.resolved_start_key, None);
    }

    #[test]
    fn pop_to_truncates_trail() {
        let mut crumbs = BreadcrumbState::new();
        append(&mut crumbs, "root", "A");
        append(&mut crumbs, "root", "B");
        append(&mut crumbs, "root", "C");
        pop_to(&mut crumbs, "root", "A");
        assert_eq!(crumbs.trail("root"), &["A"]);
    }

    #[test]
    fn banner_formats_with_arrows() {
        let mut crumbs = BreadcrumbState::new();
        append(&mut crumbs, "root", "A");
        append(&mut crumbs, "root", "B");
        assert_eq!(crumbs.banner("root"), "A > B");
    }
}
