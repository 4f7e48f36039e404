//! Record table and identifier allocation
//!
//! The authoritative id -> publication map. Identifiers are allocated from
//! a monotonic counter; ids of removed records are never reclaimed (a
//! re-inserted record gets a fresh id).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Publication;

/// Unique identifier assigned to a publication upon registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Create an identifier from its raw value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Id -> record map with monotonic id allocation
#[derive(Debug, Default)]
pub struct RecordTable {
    records: HashMap<RecordId, Publication>,
    counter: u64,
}

impl RecordTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Next free identifier: counter + 1, skipping forward past any id
    /// that is already live. The counter itself only advances on
    /// [`register`](Self::register).
    pub fn next_id(&self) -> RecordId {
        let mut candidate = self.counter + 1;
        while self.records.contains_key(&RecordId(candidate)) {
            candidate += 1;
        }
        RecordId(candidate)
    }

    /// Register a record under the given id, stamping the id into the
    /// record (mirror invariant).
    pub fn register(&mut self, id: RecordId, mut record: Publication) {
        record.assign_id(id);
        self.counter = self.counter.max(id.value());
        self.records.insert(id, record);
    }

    /// Remove a record, handing it back with its id cleared. Returns
    /// `None` for an unknown id.
    pub fn unregister(&mut self, id: RecordId) -> Option<Publication> {
        let mut record = self.records.remove(&id)?;
        record.clear_id();
        Some(record)
    }

    /// Look up the record registered under the given id
    pub fn lookup(&self, id: RecordId) -> Option<&Publication> {
        self.records.get(&id)
    }

    /// Mutable lookup, for mutation routed through the database
    pub fn lookup_mut(&mut self, id: RecordId) -> Option<&mut Publication> {
        self.records.get_mut(&id)
    }

    /// Check whether the id is live
    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of registered records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all (id, record) pairs
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Publication)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    /// Mirror invariant: every registered record carries exactly the id it
    /// is registered under. Index/table cross-checks are layered on top by
    /// the database (indexes check against the table, never the reverse).
    pub fn is_consistent(&self) -> bool {
        self.records
            .iter()
            .all(|(id, record)| record.id() == Some(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PublicationKind;

    fn book(title: &str) -> Publication {
        Publication::new(
            title,
            1979,
            &["Adams, Douglas"],
            PublicationKind::Book {
                publisher: "Pan Books".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_register_stamps_id() {
        let mut table = RecordTable::new();
        let id = table.next_id();
        assert_eq!(id, RecordId::new(1));

        table.register(id, book("The Hitchhiker's Guide to the Galaxy"));
        assert_eq!(table.lookup(id).unwrap().id(), Some(id));
        assert!(table.is_consistent());
    }

    #[test]
    fn test_ids_are_monotonic_and_never_reclaimed() {
        let mut table = RecordTable::new();
        let first = table.next_id();
        table.register(first, book("First"));
        let second = table.next_id();
        table.register(second, book("Second"));
        assert_eq!(second, RecordId::new(2));

        // removing the newest record must not rewind the counter
        let removed = table.unregister(second).unwrap();
        assert_eq!(removed.id(), None);
        assert_eq!(table.next_id(), RecordId::new(3));
    }

    #[test]
    fn test_next_id_skips_live_ids() {
        let mut table = RecordTable::new();
        // a record registered ahead of the counter occupies a candidate id
        table.records.insert(RecordId::new(1), book("Ahead"));
        assert_eq!(table.next_id(), RecordId::new(2));

        table.records.insert(RecordId::new(2), book("Further Ahead"));
        assert_eq!(table.next_id(), RecordId::new(3));
    }

    #[test]
    fn test_unregister_unknown_is_none() {
        let mut table = RecordTable::new();
        assert!(table.unregister(RecordId::new(42)).is_none());
    }

    #[test]
    fn test_mirror_invariant_detects_drift() {
        let mut table = RecordTable::new();
        table.register(RecordId::new(1), book("Proper"));
        assert!(table.is_consistent());

        // a record filed under the wrong key breaks the mirror invariant
        let mut stray = book("Stray");
        stray.assign_id(RecordId::new(9));
        table.records.insert(RecordId::new(5), stray);
        assert!(!table.is_consistent());
    }
}
