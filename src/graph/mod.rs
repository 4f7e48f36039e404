//! Citation graph
//!
//! Symmetric cites / cited-by adjacency between registered records. Every
//! edge lives in both directions at once; a single call mutates both
//! sides. The graph may contain cycles, so every traversal is guarded by
//! a visited set.

use std::collections::{HashMap, HashSet};

use crate::errors::{RefDbError, Result};
use crate::table::RecordId;

/// In-memory citation graph
#[derive(Debug, Default)]
pub struct CitationGraph {
    /// Adjacency: id -> records it cites
    outgoing: HashMap<RecordId, HashSet<RecordId>>,

    /// Reverse adjacency: id -> records citing it
    incoming: HashMap<RecordId, HashSet<RecordId>>,
}

impl CitationGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a record may cite another: anything but itself.
    /// Duplicate edges are absorbed by set semantics, not rejected.
    pub fn can_cite(citing: RecordId, cited: RecordId) -> bool {
        citing != cited
    }

    /// Add a citation edge. Inserts `cited` into the citing record's
    /// cites-set and `citing` into the cited record's cited-by-set in one
    /// step; fails only on a self-citation.
    pub fn add_citation(&mut self, citing: RecordId, cited: RecordId) -> Result<()> {
        if !Self::can_cite(citing, cited) {
            return Err(RefDbError::InvalidCitation {
                message: format!("record {citing} cannot cite itself"),
            });
        }
        self.outgoing.entry(citing).or_default().insert(cited);
        self.incoming.entry(cited).or_default().insert(citing);
        Ok(())
    }

    /// Remove a citation edge from both sides; a no-op if the relation is
    /// absent.
    pub fn remove_citation(&mut self, citing: RecordId, cited: RecordId) {
        Self::detach(&mut self.outgoing, citing, cited);
        Self::detach(&mut self.incoming, cited, citing);
    }

    fn detach(
        adjacency: &mut HashMap<RecordId, HashSet<RecordId>>,
        from: RecordId,
        to: RecordId,
    ) {
        if let Some(neighbors) = adjacency.get_mut(&from) {
            neighbors.remove(&to);
            if neighbors.is_empty() {
                adjacency.remove(&from);
            }
        }
    }

    /// Check whether the edge exists
    pub fn has_citation(&self, citing: RecordId, cited: RecordId) -> bool {
        self.outgoing
            .get(&citing)
            .is_some_and(|cited_set| cited_set.contains(&cited))
    }

    /// Records cited by this record (cites relation)
    pub fn references(&self, id: RecordId) -> impl Iterator<Item = RecordId> + '_ {
        self.outgoing.get(&id).into_iter().flatten().copied()
    }

    /// Records citing this record (cited-by relation)
    pub fn citations(&self, id: RecordId) -> impl Iterator<Item = RecordId> + '_ {
        self.incoming.get(&id).into_iter().flatten().copied()
    }

    /// Number of records this record cites
    pub fn reference_count(&self, id: RecordId) -> usize {
        self.outgoing.get(&id).map_or(0, HashSet::len)
    }

    /// Number of records citing this record
    pub fn citation_count(&self, id: RecordId) -> usize {
        self.incoming.get(&id).map_or(0, HashSet::len)
    }

    /// Every id participating in at least one edge
    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.outgoing.keys().chain(self.incoming.keys()).copied()
    }

    /// Drop every edge the record participates in, on both sides
    /// (removal cascade for unregistered records).
    pub fn remove_record(&mut self, id: RecordId) {
        if let Some(cited_set) = self.outgoing.remove(&id) {
            for cited in cited_set {
                Self::detach(&mut self.incoming, cited, id);
            }
        }
        if let Some(citing_set) = self.incoming.remove(&id) {
            for citing in citing_set {
                Self::detach(&mut self.outgoing, citing, id);
            }
        }
    }

    /// All records that directly or indirectly cite the given record,
    /// following cited-by edges from the direct citators. Terminates on
    /// cycles: a node's citators are descended into only the first time
    /// the node enters the result, and the start record itself is never
    /// part of its own closure. Empty for uncited or unknown ids.
    pub fn transitive_closure_cited_by(&self, id: RecordId) -> HashSet<RecordId> {
        let mut closure = HashSet::new();
        let mut pending: Vec<RecordId> = self.citations(id).collect();
        while let Some(current) = pending.pop() {
            if current != id && closure.insert(current) {
                pending.extend(self.citations(current));
            }
        }
        closure
    }

    /// Relation integrity: no self-loops, and every edge is mirrored on
    /// the other side (a cites b iff b is cited by a).
    pub fn is_consistent(&self) -> bool {
        let forward_ok = self.outgoing.iter().all(|(citing, cited_set)| {
            cited_set.iter().all(|cited| {
                Self::can_cite(*citing, *cited)
                    && self
                        .incoming
                        .get(cited)
                        .is_some_and(|citing_set| citing_set.contains(citing))
            })
        });
        let backward_ok = self.incoming.iter().all(|(cited, citing_set)| {
            citing_set.iter().all(|citing| {
                Self::can_cite(*citing, *cited)
                    && self
                        .outgoing
                        .get(citing)
                        .is_some_and(|cited_set| cited_set.contains(cited))
            })
        });
        forward_ok && backward_ok
    }
}
