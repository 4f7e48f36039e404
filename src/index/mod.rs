//! Generic key -> id-set index
//!
//! Used by the database for both the author index and the title-word
//! index. An empty id-set is never persisted: when the last id under a
//! key is removed, the key goes with it. None of the operations fail on
//! unknown keys; structural integrity is reported through
//! [`is_consistent`](IndexStore::is_consistent), never thrown.

use std::collections::{HashMap, HashSet};

use crate::table::RecordId;

/// Key -> id-set mapping
#[derive(Debug, Default)]
pub struct IndexStore {
    entries: HashMap<String, HashSet<RecordId>>,
}

impl IndexStore {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the id into the set for the key, creating the set if absent
    pub fn put(&mut self, key: &str, id: RecordId) {
        self.entries.entry(key.to_string()).or_default().insert(id);
    }

    /// Remove the id from the set for the key; the key is dropped entirely
    /// once its set empties. Unknown keys and absent ids are no-ops.
    pub fn remove(&mut self, key: &str, id: RecordId) {
        if let Some(ids) = self.entries.get_mut(key) {
            ids.remove(&id);
            if ids.is_empty() {
                self.entries.remove(key);
            }
        }
    }

    /// The ids registered under the key; empty for an unknown key
    pub fn ids<'a>(&'a self, key: &str) -> impl Iterator<Item = RecordId> + 'a {
        self.entries.get(key).into_iter().flatten().copied()
    }

    /// Check whether the id is registered under the key
    pub fn contains(&self, key: &str, id: RecordId) -> bool {
        self.entries
            .get(key)
            .is_some_and(|ids| ids.contains(&id))
    }

    /// All live keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the index has no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Structural integrity check: no key may map to an empty set, and
    /// every (key, id) member must pass the given validator. The caller
    /// supplies domain knowledge (e.g. "the record behind this id derives
    /// this key") through the validator.
    pub fn is_consistent(&self, validator: impl Fn(&str, RecordId) -> bool) -> bool {
        self.entries.iter().all(|(key, ids)| {
            !ids.is_empty() && ids.iter().all(|id| validator(key, *id))
        })
    }
}
