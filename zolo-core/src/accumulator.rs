//! The triple-access accumulator: append-only, indexable by position, by
//! key, and by attribute-style lookup — all three return the same object.
//!
//! Modelled as an indexed ordered mapping with a thin view over it (Design
//! Notes: "not as runtime name injection").

use std::sync::Arc;

use indexmap::IndexMap;

/// Ordered, append-only, triple-access container of step results.
///
/// Created at the start of a top-level workflow and dropped when it
/// returns — owned by the caller of [`crate::accumulator`]'s consumers
/// (the Loop Engine), never shared across workflows.
#[derive(Debug, Clone, Default)]
pub struct Accumulator<T> {
    entries: IndexMap<String, Arc<T>>,
}

impl<T> Accumulator<T> {
    pub fn new() -> Self {
        Self { entries: IndexMap::new() }
    }

    /// Append a step result under `key`. Panics in debug builds if `key` was
    /// already bound — a key is never rebound per the accumulator invariant.
    pub fn append(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        debug_assert!(
            !self.entries.contains_key(&key),
            "accumulator key '{key}' was already bound"
        );
        self.entries.insert(key, Arc::new(value));
    }

    /// Access by key.
    pub fn by_key(&self, key: &str) -> Option<&Arc<T>> {
        self.entries.get(key)
    }

    /// Access by insertion position.
    pub fn by_index(&self, index: usize) -> Option<&Arc<T>> {
        self.entries.get_index(index).map(|(_, v)| v)
    }

    /// Attribute-style lookup — identical semantics to [`Accumulator::by_key`],
    /// exposed separately so call sites can read as `acc.attr("users")`
    /// the way the source reads `acc.users`.
    pub fn attr(&self, name: &str) -> Option<&Arc<T>> {
        self.by_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<T>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triple_access_returns_identical_object() {
        let mut acc = Accumulator::new();
        acc.append("a", 42);

        let by_key = acc.by_key("a").unwrap();
        let by_index = acc.by_index(0).unwrap();
        let by_attr = acc.attr("a").unwrap();

        assert!(Arc::ptr_eq(by_key, by_index));
        assert!(Arc::ptr_eq(by_key, by_attr));
        assert_eq!(**by_key, 42);
    }

    #[test]
    fn append_is_ordered() {
        let mut acc: Accumulator<&str> = Accumulator::new();
        acc.append("first", "1");
        acc.append("second", "2");
        assert_eq!(acc.keys().collect::<Vec<_>>(), vec!["first", "second"]);
        assert_eq!(**acc.by_index(1).unwrap(), "2");
    }

    #[test]
    #[should_panic(expected = "already bound")]
    fn rebinding_a_key_panics_in_debug() {
        let mut acc = Accumulator::new();
        acc.append("a", 1);
        acc.append("a", 2);
    }
}
