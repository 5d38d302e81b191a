//! `system` tier: bounded LRU of parsed documents, invalidated when the
//! backing file's mtime moves past what was cached.

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;

use lru::LruCache;
use serde_json::Value;

use crate::stats::TierStats;

struct Entry {
    value: Value,
    mtime: SystemTime,
}

pub struct SystemTier {
    entries: Mutex<LruCache<String, Entry>>,
    stats: TierStats,
}

impl SystemTier {
    pub fn new(max_size: usize) -> Self {
        let cap = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            stats: TierStats::default(),
        }
    }

    /// Look up `key`, invalidating and reporting a miss if `filepath`'s
    /// mtime has moved on since the value was cached.
    pub fn get(&self, key: &str, filepath: &Path) -> Option<Value> {
        let current_mtime = std::fs::metadata(filepath).and_then(|m| m.modified()).ok();

        let mut entries = self.entries.lock().unwrap();
        let stale = match (entries.peek(key), current_mtime) {
            (Some(entry), Some(mtime)) => entry.mtime != mtime,
            (Some(_), None) => false,
            (None, _) => false,
        };

        if stale {
            entries.pop(key);
            self.stats.record_invalidation();
            self.stats.record_miss();
            return None;
        }

        match entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    pub fn set(&self, key: impl Into<String>, value: Value, filepath: &Path) {
        let mtime = std::fs::metadata(filepath)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut entries = self.entries.lock().unwrap();
        let len_before = entries.len();
        let replaced = entries.put(key.into(), Entry { value, mtime });
        // `put` on a new key that doesn't grow the cache means it pushed a
        // different, older entry out to make room.
        if replaced.is_none() && entries.len() <= len_before {
            self.stats.record_eviction();
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains(key)
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn stats(&self) -> crate::stats::TierStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hits_until_file_mtime_changes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "v1").unwrap();

        let tier = SystemTier::new(4);
        tier.set("k", Value::String("v1".into()), file.path());
        assert!(tier.get("k", file.path()).is_some());

        std::thread::sleep(std::time::Duration::from_millis(10));
        writeln!(file, "v2").unwrap();
        file.flush().unwrap();

        assert!(tier.get("k", file.path()).is_none());
    }

    #[test]
    fn evicts_least_recently_used_past_capacity() {
        let tier = SystemTier::new(1);
        let f1 = tempfile::NamedTempFile::new().unwrap();
        let f2 = tempfile::NamedTempFile::new().unwrap();
        tier.set("a", Value::Null, f1.path());
        tier.set("b", Value::Null, f2.path());
        assert!(!tier.has("a"));
        assert!(tier.has("b"));
    }

    #[test]
    fn eviction_past_capacity_is_counted() {
        let tier = SystemTier::new(1);
        let f1 = tempfile::NamedTempFile::new().unwrap();
        let f2 = tempfile::NamedTempFile::new().unwrap();
        tier.set("a", Value::Null, f1.path());
        assert_eq!(tier.stats().evictions, 0);
        tier.set("b", Value::Null, f2.path());
        assert_eq!(tier.stats().evictions, 1);
    }

    #[test]
    fn replacing_the_same_key_is_not_an_eviction() {
        let tier = SystemTier::new(2);
        let f1 = tempfile::NamedTempFile::new().unwrap();
        tier.set("a", Value::Null, f1.path());
        tier.set("a", Value::Bool(true), f1.path());
        assert_eq!(tier.stats().evictions, 0);
    }
}
