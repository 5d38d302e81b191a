//! `plugin` tier: bounded LRU of loaded module handles, keyed by path.

use std::any::Any;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::stats::TierStats;

pub type PluginHandle = Arc<dyn Any + Send + Sync>;

pub struct PluginTier {
    handles: Mutex<LruCache<String, PluginHandle>>,
    stats: TierStats,
}

impl PluginTier {
    pub fn new(max_size: usize) -> Self {
        let cap = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            handles: Mutex::new(LruCache::new(cap)),
            stats: TierStats::default(),
        }
    }

    pub fn set(&self, path: impl Into<String>, handle: PluginHandle) {
        self.handles.lock().unwrap().put(path.into(), handle);
    }

    pub fn get(&self, path: &str) -> Option<PluginHandle> {
        let mut handles = self.handles.lock().unwrap();
        match handles.get(path) {
            Some(h) => {
                self.stats.record_hit();
                Some(h.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    pub fn has(&self, path: &str) -> bool {
        self.handles.lock().unwrap().contains(path)
    }

    /// Unload every cached module handle.
    pub fn clear(&self) {
        self.handles.lock().unwrap().clear();
    }

    pub fn stats(&self) -> crate::stats::TierStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_past_capacity() {
        let tier = PluginTier::new(1);
        tier.set("a.so", Arc::new(1u32));
        tier.set("b.so", Arc::new(2u32));
        assert!(!tier.has("a.so"));
        assert!(tier.has("b.so"));
    }
}
