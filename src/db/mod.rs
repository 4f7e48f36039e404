//! Reference database orchestration
//!
//! [`ReferenceDatabase`] ties the record table, the author index, the
//! title-word index and the citation graph together so that every
//! mutation leaves all four structures mutually consistent. It is the
//! sole writer of the derived structures: records are moved in on
//! insert, and any later title/author change routes through the methods
//! here so the old index keys come out before the new ones go in.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CitationWeights;
use crate::errors::{RefDbError, Result};
use crate::graph::CitationGraph;
use crate::index::IndexStore;
use crate::record::{Name, Publication};
use crate::table::{RecordId, RecordTable};

/// Per-structure consistency diagnostics. Produced by
/// [`ReferenceDatabase::check_consistency`]; never mutates anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// Mirror invariant: every registered record carries its own id
    pub id_table_ok: bool,
    /// Author index soundness against the table and derived keys
    pub author_index_ok: bool,
    /// Title-word index soundness against the table and derived words
    pub title_word_index_ok: bool,
    /// Citation symmetry and edge endpoints resolving in the table
    pub records_ok: bool,
}

impl ConsistencyReport {
    /// Conjunction of all structure checks
    pub fn is_consistent(&self) -> bool {
        self.id_table_ok && self.author_index_ok && self.title_word_index_ok && self.records_ok
    }
}

/// In-memory reference database for publications
#[derive(Debug, Default)]
pub struct ReferenceDatabase {
    table: RecordTable,
    author_index: IndexStore,
    title_word_index: IndexStore,
    graph: CitationGraph,
    weights: CitationWeights,
}

impl ReferenceDatabase {
    /// Create an empty database with default citation weights
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Insertion / removal
    // ------------------------------------------------------------------

    /// Insert a publication: assigns a fresh identifier, registers the
    /// record and indexes every author key and title word.
    ///
    /// Fails with [`RefDbError::AlreadyIndexed`] if the record already
    /// carries an identifier and with [`RefDbError::DuplicateRecord`] if a
    /// semantically equivalent record is registered. The duplicate search
    /// only runs the exact equivalence check against candidates gathered
    /// from the author and title-word indexes, not the whole table.
    pub fn insert(&mut self, record: Publication) -> Result<RecordId> {
        if let Some(id) = record.id() {
            warn!(%id, title = %record.title(), "insert rejected: record already indexed");
            return Err(RefDbError::AlreadyIndexed { id });
        }
        if self.has_duplicate(&record) {
            warn!(title = %record.title(), "insert rejected: duplicate record");
            return Err(RefDbError::DuplicateRecord {
                title: record.title().to_string(),
            });
        }

        // Derive every index key before the first structure mutates; past
        // this point no step can fail, so table and indexes update as one
        // logical transaction.
        let author_keys = record.author_keys();
        let title_words = record.title_words();

        let id = self.table.next_id();
        self.table.register(id, record);
        for key in &author_keys {
            self.author_index.put(key, id);
        }
        for word in &title_words {
            self.title_word_index.put(word, id);
        }

        debug!(
            %id,
            authors = author_keys.len(),
            title_words = title_words.len(),
            "publication inserted"
        );
        Ok(id)
    }

    /// Remove a publication: tears down its author and title-word index
    /// entries, detaches it from every citation edge it participates in,
    /// unregisters it and hands it back with its identifier cleared.
    ///
    /// Idempotent: an unknown id returns `None` and is not an error. A
    /// returned record can be re-inserted; it gets a fresh id.
    pub fn remove(&mut self, id: RecordId) -> Option<Publication> {
        let (author_keys, title_words) = {
            let record = self.table.lookup(id)?;
            (record.author_keys(), record.title_words())
        };

        for key in &author_keys {
            self.author_index.remove(key, id);
        }
        for word in &title_words {
            self.title_word_index.remove(word, id);
        }
        self.graph.remove_record(id);
        let record = self.table.unregister(id);

        debug!(%id, "publication removed");
        record
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// The record registered under the given id
    pub fn find_by_id(&self, id: RecordId) -> Option<&Publication> {
        self.table.lookup(id)
    }

    /// All records of the author with the given index-form name
    /// (e.g. `"A. Einstein"`). Empty for an unknown key.
    pub fn find_by_author(&self, author_key: &str) -> Vec<&Publication> {
        self.resolve(self.author_index.ids(author_key.trim()))
    }

    /// All records with the given word in their title. Empty for an
    /// unknown word; matching is case-insensitive.
    pub fn find_by_title_word(&self, word: &str) -> Vec<&Publication> {
        self.resolve(self.title_word_index.ids(&word.trim().to_lowercase()))
    }

    /// Number of registered publications
    pub fn record_count(&self) -> usize {
        self.table.len()
    }

    /// Check whether the id is registered
    pub fn contains(&self, id: RecordId) -> bool {
        self.table.contains(id)
    }

    /// Iterate over all registered (id, record) pairs
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Publication)> {
        self.table.iter()
    }

    fn resolve(&self, ids: impl Iterator<Item = RecordId>) -> Vec<&Publication> {
        ids.filter_map(|id| self.table.lookup(id)).collect()
    }

    fn require(&self, id: RecordId) -> Result<()> {
        if self.table.contains(id) {
            Ok(())
        } else {
            Err(RefDbError::UnknownId { id })
        }
    }

    // ------------------------------------------------------------------
    // Citations
    // ------------------------------------------------------------------

    /// Record a citation: the first id cites the second. Both sides of
    /// the relation are updated in one call.
    pub fn add_citation(&mut self, citing: RecordId, cited: RecordId) -> Result<()> {
        self.require(citing)?;
        self.require(cited)?;
        self.graph.add_citation(citing, cited)?;
        debug!(%citing, %cited, "citation added");
        Ok(())
    }

    /// Remove a citation; an absent relation is a no-op, unknown ids are
    /// an error.
    pub fn remove_citation(&mut self, citing: RecordId, cited: RecordId) -> Result<()> {
        self.require(citing)?;
        self.require(cited)?;
        self.graph.remove_citation(citing, cited);
        debug!(%citing, %cited, "citation removed");
        Ok(())
    }

    /// The records this record cites
    pub fn cites(&self, id: RecordId) -> Vec<&Publication> {
        self.resolve(self.graph.references(id))
    }

    /// The records citing this record
    pub fn cited_by(&self, id: RecordId) -> Vec<&Publication> {
        self.resolve(self.graph.citations(id))
    }

    /// All records that directly or indirectly cite the given record
    /// (transitive closure of the cited-by relation). Cycle-safe; empty
    /// for unknown or uncited ids.
    pub fn transitive_closure_cited_by(&self, id: RecordId) -> Vec<&Publication> {
        self.resolve(self.graph.transitive_closure_cited_by(id).into_iter())
    }

    /// The citation index of an author, given in the default name format
    /// (e.g. `"King, Martin Luther"`): the sum over all citators of all
    /// the author's publications of the citator's kind weight.
    ///
    /// Publications found under the author's index key but carrying a
    /// different full name (initials collide, `"Adams, Dirk"` vs
    /// `"Adams, Douglas"`) are skipped. Fails with
    /// [`RefDbError::AuthorNotFound`] if the key has no publications.
    pub fn citation_index(&self, author_name: &str) -> Result<f64> {
        let name = Name::parse(author_name)?;
        let publications = self.find_by_author(&name.index_key());
        if publications.is_empty() {
            return Err(RefDbError::AuthorNotFound {
                name: author_name.trim().to_string(),
            });
        }

        let full_name = name.to_string();
        let mut index = 0.0;
        for publication in publications {
            let authored = publication
                .authors()
                .iter()
                .any(|author| author.to_string().eq_ignore_ascii_case(&full_name));
            if !authored {
                continue;
            }
            let Some(id) = publication.id() else {
                continue; // unreachable for a registered record
            };
            for citator_id in self.graph.citations(id) {
                if let Some(citator) = self.table.lookup(citator_id) {
                    index += self.weights.weight_for(citator.kind().kind_tag());
                }
            }
        }
        Ok(index)
    }

    /// Citation weight configuration
    pub fn weights(&self) -> &CitationWeights {
        &self.weights
    }

    /// Mutable citation weight configuration
    pub fn weights_mut(&mut self) -> &mut CitationWeights {
        &mut self.weights
    }

    // ------------------------------------------------------------------
    // Mutation of indexed records (re-indexing is mandatory)
    // ------------------------------------------------------------------

    /// Change the title of a registered record, rebuilding its title-word
    /// index entries.
    pub fn set_title(&mut self, id: RecordId, title: &str) -> Result<()> {
        let old_words = match self.table.lookup(id) {
            Some(record) => record.title_words(),
            None => return Err(RefDbError::UnknownId { id }),
        };
        // validate before the old keys come out, so a rejected title
        // leaves the index untouched
        let normalized = Publication::normalize_title(title)?;

        for word in &old_words {
            self.title_word_index.remove(word, id);
        }
        if let Some(record) = self.table.lookup_mut(id) {
            record.replace_title(normalized);
            for word in record.title_words() {
                self.title_word_index.put(&word, id);
            }
        }
        debug!(%id, "title updated");
        Ok(())
    }

    /// Rewrite the title so every blank-separated word starts uppercased
    pub fn capitalize_title(&mut self, id: RecordId) -> Result<()> {
        let capitalized = match self.table.lookup(id) {
            Some(record) => record.capitalized_title(),
            None => return Err(RefDbError::UnknownId { id }),
        };
        self.set_title(id, &capitalized)
    }

    /// Change the year of publication (the year is not indexed)
    pub fn set_year(&mut self, id: RecordId, year: i32) -> Result<()> {
        match self.table.lookup_mut(id) {
            Some(record) => record.set_year(year),
            None => Err(RefDbError::UnknownId { id }),
        }
    }

    /// Append an author to a registered record and index the derived key
    pub fn add_author(&mut self, id: RecordId, name: &str) -> Result<()> {
        let parsed = Name::parse(name)?;
        let key = parsed.index_key();
        match self.table.lookup_mut(id) {
            Some(record) => record.push_author(parsed),
            None => return Err(RefDbError::UnknownId { id }),
        }
        self.author_index.put(&key, id);
        debug!(%id, author = %key, "author added");
        Ok(())
    }

    /// Insert an author at the given 1-based rank, shifting later ranks
    pub fn add_author_at(&mut self, id: RecordId, name: &str, rank: usize) -> Result<()> {
        let parsed = Name::parse(name)?;
        let key = parsed.index_key();
        match self.table.lookup_mut(id) {
            Some(record) => record.insert_author_at(parsed, rank)?,
            None => return Err(RefDbError::UnknownId { id }),
        }
        self.author_index.put(&key, id);
        debug!(%id, author = %key, rank, "author added");
        Ok(())
    }

    /// Remove the author at the given 1-based rank. The derived key comes
    /// out of the index using the name as it was before the author list
    /// mutated. The last remaining author cannot be removed.
    pub fn remove_author_at(&mut self, id: RecordId, rank: usize) -> Result<()> {
        let removed = match self.table.lookup_mut(id) {
            Some(record) => record.remove_author_at(rank)?,
            None => return Err(RefDbError::UnknownId { id }),
        };
        self.author_index.remove(&removed.index_key(), id);
        debug!(%id, author = %removed.index_key(), "author removed");
        Ok(())
    }

    /// Remove every author matching the given name (default format); a
    /// duplicated author name is removed at all its ranks.
    pub fn remove_author(&mut self, id: RecordId, name: &str) -> Result<()> {
        let target = Name::parse(name)?;
        loop {
            let rank = match self.table.lookup(id) {
                Some(record) => record
                    .authors()
                    .iter()
                    .position(|author| *author == target)
                    .map(|i| i + 1),
                None => return Err(RefDbError::UnknownId { id }),
            };
            match rank {
                Some(rank) => self.remove_author_at(id, rank)?,
                None => return Ok(()),
            }
        }
    }

    // ------------------------------------------------------------------
    // Consistency
    // ------------------------------------------------------------------

    /// Run every structural self-check and report per structure. Purely
    /// diagnostic; the database is never mutated.
    pub fn check_consistency(&self) -> ConsistencyReport {
        let id_table_ok = self.table.is_consistent();

        let author_index_ok = self.author_index.is_consistent(|key, id| {
            self.table.lookup(id).is_some_and(|record| {
                record
                    .author_keys()
                    .iter()
                    .any(|derived| derived.eq_ignore_ascii_case(key))
            })
        });

        let title_word_index_ok = self.title_word_index.is_consistent(|key, id| {
            self.table.lookup(id).is_some_and(|record| {
                record
                    .title_words()
                    .iter()
                    .any(|derived| derived.eq_ignore_ascii_case(key))
            })
        });

        let records_ok =
            self.graph.is_consistent() && self.graph.ids().all(|id| self.table.contains(id));

        ConsistencyReport {
            id_table_ok,
            author_index_ok,
            title_word_index_ok,
            records_ok,
        }
    }

    fn has_duplicate(&self, record: &Publication) -> bool {
        // candidate set from the indexes first; the exact equivalence
        // check never scans the whole table
        let mut candidates: HashSet<RecordId> = HashSet::new();
        for key in record.author_keys() {
            candidates.extend(self.author_index.ids(&key));
        }
        for word in record.title_words() {
            candidates.extend(self.title_word_index.ids(&word));
        }
        candidates.into_iter().any(|id| {
            self.table
                .lookup(id)
                .is_some_and(|existing| record.is_duplicate_of(existing))
        })
    }
}
