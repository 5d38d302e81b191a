//! `pinned` tier: user-loaded aliases (`load --as`), never auto-evicted.
//! Keys are namespaced `alias:{name}` internally so they never collide with
//! any other tier's own key convention.

use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use serde_json::Value;

use crate::stats::TierStats;

#[derive(Debug, Clone)]
struct PinnedEntry {
    data: Value,
    zpath: String,
    loaded_at: SystemTime,
}

/// Metadata about a pinned alias, returned by [`PinnedTier::list`] and
/// [`PinnedTier::info`].
#[derive(Debug, Clone)]
pub struct AliasInfo {
    pub name: String,
    pub zpath: String,
    pub age: Duration,
}

pub struct PinnedTier {
    entries: DashMap<String, PinnedEntry>,
    stats: TierStats,
}

impl PinnedTier {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            stats: TierStats::default(),
        }
    }

    fn key_for(alias: &str) -> String {
        format!("alias:{alias}")
    }

    pub fn set(&self, alias: &str, value: Value, zpath: impl Into<String>) {
        self.entries.insert(
            Self::key_for(alias),
            PinnedEntry { data: value, zpath: zpath.into(), loaded_at: SystemTime::now() },
        );
    }

    pub fn get(&self, alias: &str) -> Option<Value> {
        match self.entries.get(&Self::key_for(alias)) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.data.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    pub fn has(&self, alias: &str) -> bool {
        self.entries.contains_key(&Self::key_for(alias))
    }

    pub fn remove(&self, alias: &str) -> bool {
        self.entries.remove(&Self::key_for(alias)).is_some()
    }

    /// Clear all pinned aliases, or only those whose name contains `pattern`
    /// (a bare substring match — `*` is stripped, matching the original's
    /// simple glob-to-substring convention).
    pub fn clear(&self, pattern: Option<&str>) -> usize {
        match pattern {
            None => {
                let count = self.entries.len();
                self.entries.clear();
                count
            }
            Some(pattern) => {
                let needle = pattern.replace('*', "");
                let to_remove: Vec<String> = self
                    .entries
                    .iter()
                    .map(|e| e.key().clone())
                    .filter(|k| k.contains(&needle))
                    .collect();
                let count = to_remove.len();
                for key in to_remove {
                    self.entries.remove(&key);
                }
                count
            }
        }
    }

    pub fn list(&self) -> Vec<AliasInfo> {
        self.entries
            .iter()
            .map(|e| {
                let name = e.key().trim_start_matches("alias:").to_string();
                AliasInfo {
                    name,
                    zpath: e.value().zpath.clone(),
                    age: e.value().loaded_at.elapsed().unwrap_or_default(),
                }
            })
            .collect()
    }

    pub fn stats(&self) -> crate::stats::TierStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for PinnedTier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_keys_under_alias_prefix() {
        let tier = PinnedTier::new();
        tier.set("users", Value::Null, "@.Data.users");
        assert!(tier.has("users"));
        assert_eq!(tier.list()[0].name, "users");
    }

    #[test]
    fn never_auto_evicts() {
        let tier = PinnedTier::new();
        for i in 0..1000 {
            tier.set(&format!("a{i}"), Value::Null, "@.x");
        }
        assert_eq!(tier.list().len(), 1000);
    }

    #[test]
    fn clear_by_pattern_matches_substring() {
        let tier = PinnedTier::new();
        tier.set("users", Value::Null, "@.x");
        tier.set("posts", Value::Null, "@.x");
        let removed = tier.clear(Some("user*"));
        assert_eq!(removed, 1);
        assert!(!tier.has("users"));
        assert!(tier.has("posts"));
    }
}
