//! Publication records
//!
//! The record model the database indexes: structured author names with
//! their derived index keys, the closed set of publication kinds, field
//! validation, title tokenization and semantic duplicate detection.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::Datelike;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{RefDbError, Result};
use crate::table::RecordId;

/// Delimiter class separating title words; one or more repeats act as one
/// separator.
const TITLE_WORD_DELIMITERS: &str = r#"[ ./@,;+{}()"&:-]+"#;

fn title_word_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TITLE_WORD_DELIMITERS).expect("static pattern"))
}

fn last_name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z]+$").expect("static pattern"))
}

fn given_names_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z. ]+$").expect("static pattern"))
}

/// An author name in structured form.
///
/// `first` carries the first name plus any middle names, blank separated.
/// The default textual format is `"Last, First [Middle ...]"`, e.g.
/// `"Roosevelt, Franklin Delano"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    pub last: String,
    pub first: String,
}

impl Name {
    /// Parse a name in the default format.
    ///
    /// Rules:
    /// - last name, a comma, then first (and middle) names; blanks around
    ///   the comma and repeated commas are tolerated
    /// - exactly two non-empty parts
    /// - the last name is alphabetic; the given names allow alphabetic
    ///   characters, blanks and non-repeating periods (`"Downey, Robert Jr."`)
    pub fn parse(name: &str) -> Result<Self> {
        let parts: Vec<&str> = name
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.len() != 2 {
            return Err(RefDbError::InvalidAuthorName {
                name: name.to_string(),
            });
        }
        let (last, first) = (parts[0], parts[1]);
        if !last_name_pattern().is_match(last)
            || !given_names_pattern().is_match(first)
            || first.contains("..")
        {
            return Err(RefDbError::InvalidAuthorName {
                name: name.to_string(),
            });
        }
        Ok(Self {
            last: last.to_string(),
            first: first.to_string(),
        })
    }

    /// Derived author-index key: one uppercased initial per given-name
    /// token, period + space separated, followed by the last name.
    /// `"Roosevelt, Franklin Delano"` -> `"F. D. Roosevelt"`.
    pub fn index_key(&self) -> String {
        let mut key = String::new();
        for token in self.first.split_whitespace() {
            if let Some(initial) = token.chars().next() {
                key.push(initial.to_ascii_uppercase());
                key.push_str(". ");
            }
        }
        key.push_str(&self.last);
        key
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.last, self.first)
    }
}

/// Publication kind discriminant, used for citation weights and duplicate
/// detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationType {
    JournalArticle,
    ConferencePaper,
    Book,
}

/// Kind-specific publication fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PublicationKind {
    JournalArticle { journal: String, issue: u32 },
    ConferencePaper { conference: String },
    Book { publisher: String },
}

impl PublicationKind {
    /// The fieldless discriminant of this kind
    pub fn kind_tag(&self) -> PublicationType {
        match self {
            PublicationKind::JournalArticle { .. } => PublicationType::JournalArticle,
            PublicationKind::ConferencePaper { .. } => PublicationType::ConferencePaper,
            PublicationKind::Book { .. } => PublicationType::Book,
        }
    }

    fn validate(&self) -> Result<()> {
        let (value, field) = match self {
            PublicationKind::JournalArticle { journal, .. } => (journal, "journal"),
            PublicationKind::ConferencePaper { conference } => (conference, "conference"),
            PublicationKind::Book { publisher } => (publisher, "publisher"),
        };
        if value.trim().is_empty() {
            return Err(RefDbError::Validation {
                message: format!("{field} must not be blank"),
                field: Some(field.to_string()),
            });
        }
        Ok(())
    }
}

/// A publication record.
///
/// Unidentified (`id() == None`) until inserted into a
/// [`crate::db::ReferenceDatabase`]; once inserted the database owns the
/// record and all further mutation routes through it so the derived
/// indexes stay current.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    id: Option<RecordId>,
    title: String,
    year: i32,
    authors: Vec<Name>,
    kind: PublicationKind,
}

impl Publication {
    /// Create a validated, unidentified publication. Titles and author
    /// names are trimmed; at least one author is required.
    pub fn new(title: &str, year: i32, authors: &[&str], kind: PublicationKind) -> Result<Self> {
        let title = Self::normalize_title(title)?;
        if !Self::is_valid_year(year) {
            return Err(RefDbError::InvalidYear {
                year,
                min: Self::min_year(),
                max: Self::max_year(),
            });
        }
        if authors.is_empty() {
            return Err(RefDbError::Validation {
                message: "at least one author is required".into(),
                field: Some("authors".into()),
            });
        }
        let authors = authors
            .iter()
            .map(|name| Name::parse(name))
            .collect::<Result<Vec<_>>>()?;
        kind.validate()?;
        Ok(Self {
            id: None,
            title,
            year,
            authors,
            kind,
        })
    }

    /// Earliest accepted year of publication
    pub fn min_year() -> i32 {
        1
    }

    /// Latest accepted year of publication (the current year)
    pub fn max_year() -> i32 {
        chrono::Utc::now().year()
    }

    /// Check a year against the accepted range
    pub fn is_valid_year(year: i32) -> bool {
        (Self::min_year()..=Self::max_year()).contains(&year)
    }

    /// Validate and trim a title
    pub fn normalize_title(title: &str) -> Result<String> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(RefDbError::Validation {
                message: "title must not be blank".into(),
                field: Some("title".into()),
            });
        }
        Ok(trimmed.to_string())
    }

    /// The identifier, present while registered in a database
    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn authors(&self) -> &[Name] {
        &self.authors
    }

    pub fn kind(&self) -> &PublicationKind {
        &self.kind
    }

    /// Set the title. Valid for unindexed records; indexed records must go
    /// through [`crate::db::ReferenceDatabase::set_title`] so the
    /// title-word index is rebuilt.
    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.title = Self::normalize_title(title)?;
        Ok(())
    }

    pub(crate) fn replace_title(&mut self, normalized: String) {
        self.title = normalized;
    }

    /// Set the year of publication
    pub fn set_year(&mut self, year: i32) -> Result<()> {
        if !Self::is_valid_year(year) {
            return Err(RefDbError::InvalidYear {
                year,
                min: Self::min_year(),
                max: Self::max_year(),
            });
        }
        self.year = year;
        Ok(())
    }

    /// Number of authors
    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    /// The author at the given 1-based rank
    pub fn author_at(&self, rank: usize) -> Option<&Name> {
        rank.checked_sub(1).and_then(|i| self.authors.get(i))
    }

    /// Append an author (unindexed records; indexed ones go through the
    /// database)
    pub fn add_author(&mut self, name: &str) -> Result<()> {
        self.authors.push(Name::parse(name)?);
        Ok(())
    }

    pub(crate) fn push_author(&mut self, name: Name) {
        self.authors.push(name);
    }

    /// Insert an author at the given 1-based rank, shifting later ranks up
    pub fn add_author_at(&mut self, name: &str, rank: usize) -> Result<()> {
        let parsed = Name::parse(name)?;
        self.insert_author_at(parsed, rank)
    }

    pub(crate) fn insert_author_at(&mut self, name: Name, rank: usize) -> Result<()> {
        if rank == 0 || rank > self.authors.len() + 1 {
            return Err(RefDbError::Validation {
                message: format!("author rank {rank} out of range"),
                field: Some("rank".into()),
            });
        }
        self.authors.insert(rank - 1, name);
        Ok(())
    }

    /// Remove the author at the given 1-based rank. A publication always
    /// keeps at least one author.
    pub fn remove_author_at(&mut self, rank: usize) -> Result<Name> {
        if rank == 0 || rank > self.authors.len() {
            return Err(RefDbError::Validation {
                message: format!("author rank {rank} out of range"),
                field: Some("rank".into()),
            });
        }
        if self.authors.len() == 1 {
            return Err(RefDbError::Validation {
                message: "a publication must keep at least one author".into(),
                field: Some("authors".into()),
            });
        }
        Ok(self.authors.remove(rank - 1))
    }

    /// Derived author-index keys, in rank order
    pub fn author_keys(&self) -> Vec<String> {
        self.authors.iter().map(Name::index_key).collect()
    }

    /// Lowercase title words, split on the delimiter class; empty tokens
    /// are discarded
    pub fn title_words(&self) -> Vec<String> {
        let lowered = self.title.to_lowercase();
        title_word_splitter()
            .split(&lowered)
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// The title with the first letter of every blank-separated word
    /// uppercased, e.g. "Brownian motion in fluids" -> "Brownian Motion In
    /// Fluids"
    pub fn capitalized_title(&self) -> String {
        self.title
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Semantic duplicate check: case-insensitive title, same year, same
    /// kind, same author multiset (two identically named authors must
    /// appear twice on both sides).
    pub fn is_duplicate_of(&self, other: &Publication) -> bool {
        self.title.eq_ignore_ascii_case(&other.title)
            && self.year == other.year
            && self.kind.kind_tag() == other.kind.kind_tag()
            && self.author_multiset() == other.author_multiset()
    }

    fn author_multiset(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for author in &self.authors {
            *counts.entry(author.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, year: i32, authors: &[&str]) -> Publication {
        Publication::new(
            title,
            year,
            authors,
            PublicationKind::JournalArticle {
                journal: "Annalen der Physik".into(),
                issue: 17,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_name_parsing() {
        let name = Name::parse("Einstein, Albert").unwrap();
        assert_eq!(name.last, "Einstein");
        assert_eq!(name.first, "Albert");
        assert_eq!(name.to_string(), "Einstein, Albert");

        // blanks and repeated commas around the separator are tolerated
        let name = Name::parse("  Roosevelt ,, Franklin Delano ").unwrap();
        assert_eq!(name.last, "Roosevelt");
        assert_eq!(name.first, "Franklin Delano");
    }

    #[test]
    fn test_name_rejections() {
        for bad in [
            "Einstein",            // no first name
            "Einstein, ",          // blank first name
            "Ein5tein, Albert",    // digit in last name
            "Einstein, Al-bert",   // dash in given names
            "Downey, Robert Jr..", // repeating period
            "King, Martin, Luther", // three parts
            "",
        ] {
            assert!(Name::parse(bad).is_err(), "accepted {bad:?}");
        }
        // a non-repeating period is fine
        assert!(Name::parse("Downey, Robert Jr.").is_ok());
    }

    #[test]
    fn test_index_key_derivation() {
        assert_eq!(
            Name::parse("Einstein, Albert").unwrap().index_key(),
            "A. Einstein"
        );
        assert_eq!(
            Name::parse("Roosevelt, Franklin Delano").unwrap().index_key(),
            "F. D. Roosevelt"
        );
        assert_eq!(
            Name::parse("king, martin luther").unwrap().index_key(),
            "M. L. king"
        );
    }

    #[test]
    fn test_title_word_tokenization() {
        let record = article(
            "Brownian Motion: a (brief) survey/overview - part.one",
            1905,
            &["Einstein, Albert"],
        );
        assert_eq!(
            record.title_words(),
            vec!["brownian", "motion", "a", "brief", "survey", "overview", "part", "one"]
        );
    }

    #[test]
    fn test_delimiter_runs_collapse() {
        let record = article("apples,,  and -- oranges", 1999, &["Adams, Douglas"]);
        assert_eq!(record.title_words(), vec!["apples", "and", "oranges"]);
    }

    #[test]
    fn test_year_bounds() {
        assert!(Publication::new(
            "Too Early",
            0,
            &["Adams, Douglas"],
            PublicationKind::Book {
                publisher: "Pan Books".into()
            },
        )
        .is_err());
        assert!(Publication::new(
            "Too Late",
            Publication::max_year() + 1,
            &["Adams, Douglas"],
            PublicationKind::Book {
                publisher: "Pan Books".into()
            },
        )
        .is_err());
    }

    #[test]
    fn test_kind_field_validation() {
        let err = Publication::new(
            "Blank Publisher",
            1999,
            &["Adams, Douglas"],
            PublicationKind::Book {
                publisher: "  ".into(),
            },
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_zero_authors_rejected() {
        assert!(article_result("No Authors", &[]).is_err());
    }

    fn article_result(title: &str, authors: &[&str]) -> Result<Publication> {
        Publication::new(
            title,
            1999,
            authors,
            PublicationKind::JournalArticle {
                journal: "Nature".into(),
                issue: 1,
            },
        )
    }

    #[test]
    fn test_author_rank_edits() {
        let mut record = article("Ranked", 1999, &["Adams, Douglas", "Thor, Peter"]);
        record.add_author_at("King, Martin Luther", 2).unwrap();
        assert_eq!(record.author_at(2).unwrap().last, "King");
        assert_eq!(record.author_count(), 3);

        let removed = record.remove_author_at(2).unwrap();
        assert_eq!(removed.last, "King");
        assert!(record.remove_author_at(0).is_err());
        assert!(record.remove_author_at(5).is_err());
    }

    #[test]
    fn test_last_author_is_kept() {
        let mut record = article("Solo", 1999, &["Adams, Douglas"]);
        assert!(record.remove_author_at(1).is_err());
    }

    #[test]
    fn test_capitalized_title() {
        let record = article("brownian  motion in fluids", 1905, &["Einstein, Albert"]);
        assert_eq!(
            record.capitalized_title(),
            "Brownian  Motion In Fluids"
        );
    }

    #[test]
    fn test_duplicate_detection_multiset() {
        let a = article(
            "Apples and Oranges",
            1999,
            &["Adams, Douglas", "Adams, Douglas"],
        );
        let b = article(
            "APPLES AND ORANGES",
            1999,
            &["Adams, Douglas", "Adams, Douglas"],
        );
        assert!(a.is_duplicate_of(&b));

        // one occurrence instead of two is a different author multiset
        let c = article("Apples and Oranges", 1999, &["Adams, Douglas"]);
        assert!(!a.is_duplicate_of(&c));

        // different year
        let d = article(
            "Apples and Oranges",
            1998,
            &["Adams, Douglas", "Adams, Douglas"],
        );
        assert!(!a.is_duplicate_of(&d));

        // different concrete kind
        let e = Publication::new(
            "Apples and Oranges",
            1999,
            &["Adams, Douglas", "Adams, Douglas"],
            PublicationKind::Book {
                publisher: "Pan Books".into(),
            },
        )
        .unwrap();
        assert!(!a.is_duplicate_of(&e));
    }

    #[test]
    fn test_serialization_round_trip() {
        let record = article("Serialized", 2001, &["Adams, Douglas"]);
        let json = serde_json::to_string(&record).unwrap();
        let back: Publication = serde_json::from_str(&json).unwrap();
        assert_eq!(back.title(), "Serialized");
        assert_eq!(back.authors()[0].last, "Adams");
        assert!(json.contains("\"journal_article\""));
    }
}
