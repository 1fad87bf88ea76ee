//! Request validation and chat-intent routing.
//!
//! Everything here runs before a ranking path is entered: free-text queries
//! are rejected when empty, ages and genders are validated rather than
//! silently coerced, and chat messages are routed on the label returned by
//! the external intent classifier.

use bookfair_model::{Gender, MAX_AGE};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Empty query text")]
    EmptyQuery,
    #[error("Age out of range: {0}")]
    AgeOutOfRange(i64),
    #[error("Unknown gender: {0}")]
    UnknownGender(String),
}

/// Filler words visitors type around what they actually want
/// ("find books by ..."). Stripped before the text reaches the search ranker.
const FILLER_WORDS: &[&str] = &[
    "search", "find", "book", "books", "by", "on", "available", "want", "fair",
    "bookfair", "written", "category", "genre", "recommend", "suggest",
];

/// Validate a free-text search query.
///
/// Whitespace-only input is rejected; the ranking core never sees an absent
/// query.
pub fn validate_search(text: &str) -> Result<String, QueryError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    Ok(trimmed.to_string())
}

/// Validate a visitor age for the demographic paths.
pub fn validate_age(age: i64) -> Result<u8, QueryError> {
    if (0..=MAX_AGE as i64).contains(&age) {
        Ok(age as u8)
    } else {
        Err(QueryError::AgeOutOfRange(age))
    }
}

/// Parse a gender parameter, rejecting values the log does not record.
pub fn parse_gender(value: &str) -> Result<Gender, QueryError> {
    match Gender::from(value) {
        Gender::Unknown => Err(QueryError::UnknownGender(value.to_string())),
        gender => Ok(gender),
    }
}

/// Strip filler words from a chat message, keeping the rest in order.
pub fn clean_message(message: &str) -> String {
    message
        .split_whitespace()
        .filter(|word| !FILLER_WORDS.contains(&word.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Intent behind a chat message, derived from the classifier's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// The visitor is looking for books
    Search,
    /// The visitor wants to book a stall visit
    Booking,
    /// Anything else; answered with the classifier's own reply
    SmallTalk,
}

impl From<&str> for Intent {
    fn from(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "searching" => Self::Search,
            "booking" => Self::Booking,
            _ => Self::SmallTalk,
        }
    }
}

/// The external intent classifier. A black box: it receives the raw message
/// and returns a reply label the routing maps to an `Intent`.
pub trait IntentClassifier {
    fn classify(&self, message: &str) -> String;
}

/// What the boundary layer should do with a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRoute {
    /// Run the search ranker over the cleaned query text
    Search(String),
    /// Hand off to the booking flow
    Booking,
    /// Return the classifier's reply as-is
    Reply(String),
}

/// Route a chat message through the classifier.
pub fn route_message<C: IntentClassifier>(classifier: &C, message: &str) -> ChatRoute {
    let message = message.to_lowercase();
    let label = classifier.classify(&message);

    match Intent::from(label.as_str()) {
        Intent::Search => ChatRoute::Search(clean_message(&message)),
        Intent::Booking => ChatRoute::Booking,
        Intent::SmallTalk => ChatRoute::Reply(label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClassifier(&'static str);

    impl IntentClassifier for FixedClassifier {
        fn classify(&self, _message: &str) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_empty_search_rejected() {
        assert!(matches!(validate_search("   "), Err(QueryError::EmptyQuery)));
        assert_eq!(validate_search(" dune ").unwrap(), "dune");
    }

    #[test]
    fn test_age_bounds() {
        assert_eq!(validate_age(0).unwrap(), 0);
        assert_eq!(validate_age(100).unwrap(), 100);
        assert!(matches!(validate_age(101), Err(QueryError::AgeOutOfRange(101))));
        assert!(matches!(validate_age(-1), Err(QueryError::AgeOutOfRange(-1))));
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!(parse_gender("F").unwrap(), Gender::Female);
        assert!(matches!(
            parse_gender("x"),
            Err(QueryError::UnknownGender(_))
        ));
    }

    #[test]
    fn test_clean_message_strips_filler() {
        assert_eq!(
            clean_message("find books by frank herbert"),
            "frank herbert"
        );
        assert_eq!(clean_message("search Books BOOKS"), "");
    }

    #[test]
    fn test_route_search_cleans_text() {
        let route = route_message(&FixedClassifier("Searching"), "Find books by Herbert");
        assert_eq!(route, ChatRoute::Search("herbert".to_string()));
    }

    #[test]
    fn test_route_booking_and_fallthrough() {
        assert_eq!(
            route_message(&FixedClassifier("booking"), "reserve a visit"),
            ChatRoute::Booking
        );
        assert_eq!(
            route_message(&FixedClassifier("Hello there!"), "hi"),
            ChatRoute::Reply("Hello there!".to_string())
        );
    }
}
