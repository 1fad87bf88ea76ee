//! Core domain model for the book-fair discovery engine.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `Book`: a catalog record with its click/impression counters
//! - `InteractionRecord`: one row of the append-only interaction log
//! - `Stall`: a fair stall selling a given book
//! - `BookSummary`: the shape returned to callers inside a slate
//! - Request types for each ranking path

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Oldest age the recommender accepts; anything above is out of range.
pub const MAX_AGE: u8 = 100;

/// Visitor gender as recorded on interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    /// Missing or unparseable value
    Unknown,
}

impl Default for Gender {
    fn default() -> Self {
        Self::Unknown
    }
}

impl From<&str> for Gender {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "f" | "female" => Self::Female,
            "m" | "male" => Self::Male,
            _ => Self::Unknown,
        }
    }
}

impl Gender {
    /// Wire representation, matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
            Self::Unknown => "unknown",
        }
    }
}

/// A catalog book record.
///
/// Owned by the catalog store; the ranking engine only ever reads it.
/// `id` uniquely identifies a book across every collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Stable integer identifier
    pub id: u64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub authors: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub publisher: String,

    /// Lifetime click counter, incremented outside the engine
    #[serde(default)]
    pub clicks: u64,

    /// Lifetime impression counter, incremented outside the engine
    #[serde(default)]
    pub impressions: u64,
}

impl Book {
    /// Create a minimal record for testing.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            authors: String::new(),
            category: String::new(),
            publisher: String::new(),
            clicks: 0,
            impressions: 0,
        }
    }

    /// The text fields a free-text query is matched against.
    pub fn searchable_fields(&self) -> [&str; 3] {
        [&self.title, &self.authors, &self.category]
    }
}

/// One row of the append-only interaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_id: String,

    /// Foreign key into the catalog; may be stale if the book was deleted
    pub book_id: u64,

    /// Visitor age at interaction time, 0..=100
    pub age: u8,

    #[serde(default)]
    pub gender: Gender,

    /// Click increment carried by this row
    #[serde(default)]
    pub clicks: u64,

    pub created_at: DateTime<Utc>,
}

/// A fair stall carrying a given book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stall {
    pub stall_id: u64,

    pub book_id: u64,

    /// Whether the stall is run by the book's author
    #[serde(default)]
    pub is_author: bool,

    #[serde(default)]
    pub impressions: u64,
}

/// A book entry as returned inside a slate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: u64,

    pub title: String,

    pub authors: String,

    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressions: Option<u64>,

    /// Relevance tier (0/1/2), attached to search results as a
    /// presentation hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rec: Option<u8>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            authors: book.authors.clone(),
            category: book.category.clone(),
            clicks: Some(book.clicks),
            impressions: None,
            rec: None,
        }
    }
}

/// A stall entry as returned by the stall listing, with its author flag
/// collapsed to the `rec` hint the boundary layer serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StallRec {
    pub stall_id: u64,
    pub rec: u8,
}

/// Parameters for the free-text search path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The query text, already validated/cleaned by the boundary
    pub text: String,

    /// Maximum slate size
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

impl SearchRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: default_search_limit(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Parameters for the demographic recommendation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemographicRequest {
    pub age: u8,

    pub gender: Gender,

    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

impl DemographicRequest {
    pub fn new(age: u8, gender: Gender) -> Self {
        Self {
            age,
            gender,
            limit: default_search_limit(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Parameters for the trending path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendingRequest {
    /// Restrict to the age's ten-year bucket when given
    #[serde(default)]
    pub age: Option<u8>,

    /// Restrict to one gender when given
    #[serde(default)]
    pub gender: Option<Gender>,

    /// Look-back window in days
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    #[serde(default = "default_slate_limit")]
    pub limit: usize,
}

impl TrendingRequest {
    pub fn new() -> Self {
        Self {
            age: None,
            gender: None,
            window_days: default_window_days(),
            limit: default_slate_limit(),
        }
    }

    pub fn with_age(mut self, age: u8) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Parameters for the combined top-picks feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopPicksRequest {
    /// The visitor's favourite genre, matched exactly against `category`
    pub genre: String,

    pub age: u8,

    pub gender: Gender,

    #[serde(default = "default_slate_limit")]
    pub limit: usize,
}

impl TopPicksRequest {
    pub fn new(genre: impl Into<String>, age: u8, gender: Gender) -> Self {
        Self {
            genre: genre.into(),
            age,
            gender,
            limit: default_slate_limit(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

fn default_search_limit() -> usize {
    5
}

fn default_slate_limit() -> usize {
    15
}

fn default_window_days() -> i64 {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_from_str() {
        assert_eq!(Gender::from("F"), Gender::Female);
        assert_eq!(Gender::from("female"), Gender::Female);
        assert_eq!(Gender::from("m"), Gender::Male);
        assert_eq!(Gender::from("other"), Gender::Unknown);
    }

    #[test]
    fn test_book_serialization() {
        let book = Book::new(42, "Dune");
        let json = serde_json::to_string(&book).unwrap();
        let parsed: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, 42);
        assert_eq!(parsed.title, "Dune");
    }

    #[test]
    fn test_summary_omits_absent_counters() {
        let summary = BookSummary::from(&Book::new(1, "Dune"));
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"clicks\""));
        assert!(!json.contains("impressions"));
        assert!(!json.contains("rec"));
    }

    #[test]
    fn test_request_defaults() {
        let req = SearchRequest::new("dune");
        assert_eq!(req.limit, 5);

        let req = TrendingRequest::new();
        assert_eq!(req.window_days, 7);
        assert_eq!(req.limit, 15);
    }
}
