//! Catalog and interaction-log access.
//!
//! Provides the `CatalogStore` and `InteractionLog` traits and their two
//! implementations: `HttpCatalog`, a client for the catalog service, and
//! `MemoryStore`, an in-process snapshot. The traits keep the ranking logic
//! store-agnostic; every primitive is read-only and the engine treats
//! whatever a call returns as an immutable snapshot.

use bookfair_model::{Book, Gender, InteractionRecord, Stall};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Store not available")]
    Unavailable,
}

/// A searchable text field on a catalog book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Authors,
    Category,
    Publisher,
}

impl TextField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Authors => "authors",
            Self::Category => "category",
            Self::Publisher => "publisher",
        }
    }

    fn get<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            Self::Title => &book.title,
            Self::Authors => &book.authors,
            Self::Category => &book.category,
            Self::Publisher => &book.publisher,
        }
    }
}

/// A numeric counter a result set can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Clicks,
    Impressions,
}

impl NumericField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clicks => "clicks",
            Self::Impressions => "impressions",
        }
    }

    fn get(&self, book: &Book) -> u64 {
        match self {
            Self::Clicks => book.clicks,
            Self::Impressions => book.impressions,
        }
    }
}

/// One group row from a grouped aggregation (top authors, top publishers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupTotal {
    /// The grouped field value
    pub key: String,
    /// Summed clicks across the group
    pub total_clicks: u64,
}

/// Filter for interaction-log scans. All bounds are optional; age and time
/// ranges are half-open `[lo, hi)`.
#[derive(Debug, Clone, Default)]
pub struct InteractionFilter {
    pub age_range: Option<(u8, u8)>,
    pub gender: Option<Gender>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl InteractionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ages(mut self, lo: u8, hi: u8) -> Self {
        self.age_range = Some((lo, hi));
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn between(mut self, since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self.until = Some(until);
        self
    }

    /// Whether one log row passes the filter.
    pub fn matches(&self, row: &InteractionRecord) -> bool {
        if let Some((lo, hi)) = self.age_range {
            if row.age < lo || row.age >= hi {
                return false;
            }
        }
        if let Some(gender) = self.gender {
            if row.gender != gender {
                return false;
            }
        }
        if let Some(since) = self.since {
            if row.created_at < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if row.created_at >= until {
                return false;
            }
        }
        true
    }
}

/// Read-only catalog query primitives.
///
/// This abstraction keeps the ranking paths independent of where the catalog
/// lives; `MemoryStore` defines the reference semantics for each primitive.
pub trait CatalogStore {
    /// Case-insensitive substring match on a text field, sorted descending
    /// by a numeric field. An empty pattern matches every book.
    fn find_containing(
        &self,
        field: TextField,
        pattern: &str,
        sort_by: NumericField,
    ) -> impl Future<Output = Result<Vec<Book>, StoreError>> + Send;

    /// Case-insensitive equality match on a text field, sorted descending by
    /// a numeric field, capped at `limit`.
    fn find_equal(
        &self,
        field: TextField,
        value: &str,
        sort_by: NumericField,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Book>, StoreError>> + Send;

    /// Full catalog scan.
    fn all_books(&self) -> impl Future<Output = Result<Vec<Book>, StoreError>> + Send;

    /// Point lookup by id. `Ok(None)` when no record exists.
    fn book_by_id(&self, id: u64)
        -> impl Future<Output = Result<Option<Book>, StoreError>> + Send;

    /// Global top-N by a numeric field, excluding the given ids. This is the
    /// backfill primitive every ranking path pads its slate from.
    fn top_by(
        &self,
        sort_by: NumericField,
        exclude: &[u64],
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Book>, StoreError>> + Send;

    /// Group the catalog by a text field, sum clicks per group, order by the
    /// sum descending, cap at `limit`.
    fn group_totals(
        &self,
        group_by: TextField,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<GroupTotal>, StoreError>> + Send;

    /// All stalls carrying the given book.
    fn stalls_for_book(
        &self,
        book_id: u64,
    ) -> impl Future<Output = Result<Vec<Stall>, StoreError>> + Send;

    /// Check if the store is reachable.
    fn health_check(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Get the store name for logging.
    fn name(&self) -> &'static str;
}

/// Range scan over the append-only interaction log.
pub trait InteractionLog {
    fn scan(
        &self,
        filter: &InteractionFilter,
    ) -> impl Future<Output = Result<Vec<InteractionRecord>, StoreError>> + Send;
}

/// An in-process snapshot implementing both store traits.
///
/// Reference semantics for every primitive, and the substrate the ranking
/// tests run against. Ties under a sort keep insertion order (the sorts are
/// stable), which is the "store's natural iteration order" the ranking
/// contract accepts for equal-score entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    books: Vec<Book>,
    interactions: Vec<InteractionRecord>,
    stalls: Vec<Stall>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(mut self, books: Vec<Book>) -> Self {
        self.books = books;
        self
    }

    pub fn with_interactions(mut self, interactions: Vec<InteractionRecord>) -> Self {
        self.interactions = interactions;
        self
    }

    pub fn with_stalls(mut self, stalls: Vec<Stall>) -> Self {
        self.stalls = stalls;
        self
    }

    fn sorted_desc(mut books: Vec<Book>, sort_by: NumericField) -> Vec<Book> {
        books.sort_by(|a, b| sort_by.get(b).cmp(&sort_by.get(a)));
        books
    }
}

impl CatalogStore for MemoryStore {
    async fn find_containing(
        &self,
        field: TextField,
        pattern: &str,
        sort_by: NumericField,
    ) -> Result<Vec<Book>, StoreError> {
        let needle = pattern.to_lowercase();
        let matches = self
            .books
            .iter()
            .filter(|book| field.get(book).to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(Self::sorted_desc(matches, sort_by))
    }

    async fn find_equal(
        &self,
        field: TextField,
        value: &str,
        sort_by: NumericField,
        limit: usize,
    ) -> Result<Vec<Book>, StoreError> {
        let matches = self
            .books
            .iter()
            .filter(|book| field.get(book).eq_ignore_ascii_case(value))
            .cloned()
            .collect();
        let mut sorted = Self::sorted_desc(matches, sort_by);
        sorted.truncate(limit);
        Ok(sorted)
    }

    async fn all_books(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.books.clone())
    }

    async fn book_by_id(&self, id: u64) -> Result<Option<Book>, StoreError> {
        Ok(self.books.iter().find(|book| book.id == id).cloned())
    }

    async fn top_by(
        &self,
        sort_by: NumericField,
        exclude: &[u64],
        limit: usize,
    ) -> Result<Vec<Book>, StoreError> {
        let remaining = self
            .books
            .iter()
            .filter(|book| !exclude.contains(&book.id))
            .cloned()
            .collect();
        let mut sorted = Self::sorted_desc(remaining, sort_by);
        sorted.truncate(limit);
        Ok(sorted)
    }

    async fn group_totals(
        &self,
        group_by: TextField,
        limit: usize,
    ) -> Result<Vec<GroupTotal>, StoreError> {
        let mut totals: HashMap<&str, u64> = HashMap::new();
        for book in &self.books {
            *totals.entry(group_by.get(book)).or_insert(0) += book.clicks;
        }

        let mut groups: Vec<GroupTotal> = totals
            .into_iter()
            .map(|(key, total_clicks)| GroupTotal {
                key: key.to_string(),
                total_clicks,
            })
            .collect();
        groups.sort_by(|a, b| {
            b.total_clicks
                .cmp(&a.total_clicks)
                .then_with(|| a.key.cmp(&b.key))
        });
        groups.truncate(limit);
        Ok(groups)
    }

    async fn stalls_for_book(&self, book_id: u64) -> Result<Vec<Stall>, StoreError> {
        Ok(self
            .stalls
            .iter()
            .filter(|stall| stall.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

impl InteractionLog for MemoryStore {
    async fn scan(
        &self,
        filter: &InteractionFilter,
    ) -> Result<Vec<InteractionRecord>, StoreError> {
        Ok(self
            .interactions
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }
}

/// Catalog service client configuration.
#[derive(Debug, Clone)]
pub struct HttpCatalogConfig {
    /// Base URL for the catalog service HTTP API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpCatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8090".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Catalog service client speaking the store's JSON API.
pub struct HttpCatalog {
    config: HttpCatalogConfig,
    client: reqwest::Client,
}

impl HttpCatalog {
    /// Create a new catalog client.
    pub fn new(config: HttpCatalogConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, StoreError> {
        tracing::debug!(path = %path, "Querying catalog service");

        let response = self
            .client
            .get(format!("{}{}", self.config.base_url, path))
            .query(query)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::QueryFailed(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    /// Pull a typed array out of a `{"<key>": [...]}` response body.
    fn parse_rows<T: serde::de::DeserializeOwned>(
        value: serde_json::Value,
        key: &str,
    ) -> Result<Vec<T>, StoreError> {
        let rows = value
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::Parse(format!("Missing {} array", key)))?;
        serde_json::from_value(rows).map_err(|e| StoreError::Parse(e.to_string()))
    }
}

impl CatalogStore for HttpCatalog {
    async fn find_containing(
        &self,
        field: TextField,
        pattern: &str,
        sort_by: NumericField,
    ) -> Result<Vec<Book>, StoreError> {
        let value = self
            .get_json(
                "/books/search",
                &[
                    ("field", field.name().to_string()),
                    ("contains", pattern.to_string()),
                    ("sort", sort_by.name().to_string()),
                ],
            )
            .await?;
        Self::parse_rows(value, "books")
    }

    async fn find_equal(
        &self,
        field: TextField,
        value: &str,
        sort_by: NumericField,
        limit: usize,
    ) -> Result<Vec<Book>, StoreError> {
        let body = self
            .get_json(
                "/books/search",
                &[
                    ("field", field.name().to_string()),
                    ("equals", value.to_string()),
                    ("sort", sort_by.name().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Self::parse_rows(body, "books")
    }

    async fn all_books(&self) -> Result<Vec<Book>, StoreError> {
        let value = self.get_json("/books", &[]).await?;
        Self::parse_rows(value, "books")
    }

    async fn book_by_id(&self, id: u64) -> Result<Option<Book>, StoreError> {
        let response = self
            .client
            .get(format!("{}/books/{}", self.config.base_url, id))
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::QueryFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    async fn top_by(
        &self,
        sort_by: NumericField,
        exclude: &[u64],
        limit: usize,
    ) -> Result<Vec<Book>, StoreError> {
        let exclude_list = exclude
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let value = self
            .get_json(
                "/books/top",
                &[
                    ("sort", sort_by.name().to_string()),
                    ("exclude", exclude_list),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Self::parse_rows(value, "books")
    }

    async fn group_totals(
        &self,
        group_by: TextField,
        limit: usize,
    ) -> Result<Vec<GroupTotal>, StoreError> {
        let value = self
            .get_json(
                "/books/groups",
                &[
                    ("by", group_by.name().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Self::parse_rows(value, "groups")
    }

    async fn stalls_for_book(&self, book_id: u64) -> Result<Vec<Stall>, StoreError> {
        let value = self
            .get_json("/stalls", &[("book_id", book_id.to_string())])
            .await?;
        Self::parse_rows(value, "stalls")
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .get(format!("{}/health", self.config.base_url))
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    fn name(&self) -> &'static str {
        "catalog-http"
    }
}

impl InteractionLog for HttpCatalog {
    async fn scan(
        &self,
        filter: &InteractionFilter,
    ) -> Result<Vec<InteractionRecord>, StoreError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some((lo, hi)) = filter.age_range {
            query.push(("min_age", lo.to_string()));
            query.push(("max_age", hi.to_string()));
        }
        if let Some(gender) = filter.gender {
            query.push(("gender", gender.as_str().to_string()));
        }
        if let Some(since) = filter.since {
            query.push(("since", since.to_rfc3339()));
        }
        if let Some(until) = filter.until {
            query.push(("until", until.to_rfc3339()));
        }

        let value = self.get_json("/interactions", &query).await?;
        Self::parse_rows(value, "interactions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn book(id: u64, title: &str, authors: &str, clicks: u64, impressions: u64) -> Book {
        Book {
            id,
            title: title.to_string(),
            authors: authors.to_string(),
            category: String::new(),
            publisher: String::new(),
            clicks,
            impressions,
        }
    }

    fn snapshot() -> MemoryStore {
        MemoryStore::new().with_books(vec![
            book(1, "Dune", "Frank Herbert", 10, 100),
            book(2, "Dune Messiah", "Frank Herbert", 50, 20),
            book(3, "Foundation", "Isaac Asimov", 30, 300),
        ])
    }

    #[tokio::test]
    async fn test_find_containing_sorts_by_clicks() {
        let store = snapshot();
        let hits = store
            .find_containing(TextField::Title, "dune", NumericField::Clicks)
            .await
            .unwrap();
        let ids: Vec<u64> = hits.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_empty_pattern_matches_everything() {
        let store = snapshot();
        let hits = store
            .find_containing(TextField::Title, "", NumericField::Clicks)
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn test_top_by_excludes_ids() {
        let store = snapshot();
        let top = store
            .top_by(NumericField::Impressions, &[3], 2)
            .await
            .unwrap();
        let ids: Vec<u64> = top.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_group_totals_sums_and_orders() {
        let store = snapshot();
        let groups = store.group_totals(TextField::Authors, 5).await.unwrap();
        assert_eq!(groups[0].key, "Frank Herbert");
        assert_eq!(groups[0].total_clicks, 60);
        assert_eq!(groups[1].key, "Isaac Asimov");
    }

    #[tokio::test]
    async fn test_scan_applies_all_bounds() {
        let now = Utc::now();
        let row = |age: u8, gender: Gender, days_ago: i64| InteractionRecord {
            user_id: "u".to_string(),
            book_id: 1,
            age,
            gender,
            clicks: 1,
            created_at: now - Duration::days(days_ago),
        };

        let store = MemoryStore::new().with_interactions(vec![
            row(25, Gender::Female, 1),
            row(25, Gender::Male, 1),
            row(35, Gender::Female, 1),
            row(25, Gender::Female, 10),
        ]);

        let filter = InteractionFilter::new()
            .ages(20, 30)
            .gender(Gender::Female)
            .between(now - Duration::days(7), now);
        let rows = store.scan(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].age, 25);
    }

    #[test]
    fn test_parse_rows_missing_key() {
        let value = serde_json::json!({ "rows": [] });
        let result: Result<Vec<Book>, _> = HttpCatalog::parse_rows(value, "books");
        assert!(matches!(result, Err(StoreError::Parse(_))));
    }

    #[test]
    fn test_parse_rows_typed() {
        let value = serde_json::json!({
            "books": [{ "id": 7, "title": "Dune", "clicks": 3 }]
        });
        let books: Vec<Book> = HttpCatalog::parse_rows(value, "books").unwrap();
        assert_eq!(books[0].id, 7);
        assert_eq!(books[0].clicks, 3);
        assert_eq!(books[0].impressions, 0);
    }
}
