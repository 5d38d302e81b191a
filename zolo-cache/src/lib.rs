//! The Cache Orchestrator: a four-tier cache routed by tier kind, exposed
//! as an explicit handle — callers hold an `Arc<CacheOrchestrator>` and pass
//! it around rather than reaching for a process-wide singleton.

pub mod error;
pub mod pinned;
pub mod plugin;
pub mod schema;
pub mod stats;
pub mod system;

use std::path::Path;

pub use error::CacheError;
pub use pinned::{AliasInfo, PinnedTier};
pub use plugin::{PluginHandle, PluginTier};
pub use schema::{ConnectionInfo, SchemaHandle, SchemaTier};
pub use stats::TierStatsSnapshot;
pub use system::SystemTier;

/// Which tier a `get`/`set`/`has`/`clear` call is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    System,
    Pinned,
    Schema,
    Plugin,
}

impl Tier {
    pub fn parse(name: &str) -> Result<Self, CacheError> {
        match name {
            "system" => Ok(Tier::System),
            "pinned" => Ok(Tier::Pinned),
            "schema" => Ok(Tier::Schema),
            "plugin" => Ok(Tier::Plugin),
            other => Err(CacheError::UnknownTier(other.to_string())),
        }
    }
}

/// Aggregated stats across tiers that track hit/miss counters.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorStats {
    pub system: TierStatsSnapshot,
    pub plugin: TierStatsSnapshot,
    pub pinned: TierStatsSnapshot,
}

/// The four-tier cache. Never stashed behind a global — construct one and
/// pass it (usually as an `Arc`) to whatever needs it.
pub struct CacheOrchestrator {
    pub system: SystemTier,
    pub pinned: PinnedTier,
    pub schema: SchemaTier,
    pub plugin: PluginTier,
}

impl CacheOrchestrator {
    pub fn new(system_max_size: usize, plugin_max_size: usize) -> Self {
        Self {
            system: SystemTier::new(system_max_size),
            pinned: PinnedTier::new(),
            schema: SchemaTier::new(),
            plugin: PluginTier::new(plugin_max_size),
        }
    }

    /// `get(key, tier, filepath)` — `filepath` is required for the `system`
    /// tier's mtime check and ignored otherwise.
    pub fn get(&self, key: &str, tier: Tier, filepath: Option<&Path>) -> Option<serde_json::Value> {
        match tier {
            Tier::System => filepath.and_then(|p| self.system.get(key, p)),
            Tier::Pinned => self.pinned.get(key),
            Tier::Plugin | Tier::Schema => None,
        }
    }

    pub fn has(&self, key: &str, tier: Tier) -> bool {
        match tier {
            Tier::System => self.system.has(key),
            Tier::Pinned => self.pinned.has(key),
            Tier::Plugin => self.plugin.has(key),
            Tier::Schema => self.schema.has(key),
        }
    }

    /// Visits every tier: `clear("all")` semantics.
    pub fn clear_all(&self) {
        self.system.clear();
        self.pinned.clear(None);
        self.schema.clear();
        self.plugin.clear();
    }

    pub fn clear(&self, tier: Tier) {
        match tier {
            Tier::System => self.system.clear(),
            Tier::Pinned => {
                self.pinned.clear(None);
            }
            Tier::Schema => self.schema.clear(),
            Tier::Plugin => self.plugin.clear(),
        }
    }

    pub fn stats(&self) -> OrchestratorStats {
        OrchestratorStats {
            system: self.system.stats(),
            plugin: self.plugin.stats(),
            pinned: self.pinned.stats(),
        }
    }
}

pub mod prelude {
    pub use crate::{
        CacheError, CacheOrchestrator, ConnectionInfo, OrchestratorStats, PinnedTier,
        PluginTier, SchemaHandle, SchemaTier, SystemTier, Tier,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tier_is_a_recoverable_error() {
        assert!(matches!(Tier::parse("bogus"), Err(CacheError::UnknownTier(_))));
    }

    #[test]
    fn clear_all_visits_every_tier() {
        let orchestrator = CacheOrchestrator::new(16, 16);
        orchestrator.pinned.set("alias1", serde_json::Value::Null, "@.x");
        assert!(orchestrator.has("alias1", Tier::Pinned));
        orchestrator.clear_all();
        assert!(!orchestrator.has("alias1", Tier::Pinned));
    }
}
