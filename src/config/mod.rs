//! Citation weight configuration
//!
//! Per-kind scoring weights used by the citation index. The table is
//! mutable shared configuration owned by the database instance, not
//! per-record state: changing a weight immediately affects every score
//! computed afterwards.

use serde::{Deserialize, Serialize};

use crate::record::PublicationType;

/// Citation weight per publication kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationWeights {
    journal_article: f64,
    conference_paper: f64,
    book: f64,
}

impl Default for CitationWeights {
    fn default() -> Self {
        Self {
            journal_article: 1.0,
            conference_paper: 0.7,
            book: 1.2,
        }
    }
}

impl CitationWeights {
    /// Weight a citation from a record of the given kind contributes
    pub fn weight_for(&self, kind: PublicationType) -> f64 {
        match kind {
            PublicationType::JournalArticle => self.journal_article,
            PublicationType::ConferencePaper => self.conference_paper,
            PublicationType::Book => self.book,
        }
    }

    /// Change the weight for a publication kind
    pub fn set_weight(&mut self, kind: PublicationType, weight: f64) {
        match kind {
            PublicationType::JournalArticle => self.journal_article = weight,
            PublicationType::ConferencePaper => self.conference_paper = weight,
            PublicationType::Book => self.book = weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = CitationWeights::default();
        assert_eq!(weights.weight_for(PublicationType::JournalArticle), 1.0);
        assert_eq!(weights.weight_for(PublicationType::ConferencePaper), 0.7);
        assert_eq!(weights.weight_for(PublicationType::Book), 1.2);
    }

    #[test]
    fn test_set_weight() {
        let mut weights = CitationWeights::default();
        weights.set_weight(PublicationType::ConferencePaper, 0.6);
        assert_eq!(weights.weight_for(PublicationType::ConferencePaper), 0.6);
        // other kinds untouched
        assert_eq!(weights.weight_for(PublicationType::Book), 1.2);
    }
}
