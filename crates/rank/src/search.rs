//! Free-text search: field-priority containment matching with a
//! similarity fallback.

use crate::slate::SlateBuilder;
use crate::RankError;
use bookfair_model::{Book, BookSummary, SearchRequest};
use bookfair_relevance::{classify, Thresholds};
use bookfair_similarity::best_field_score;
use bookfair_store::{CatalogStore, NumericField, TextField};
use std::cmp::Ordering;

/// Fields a query is matched against, in rank priority order. A title match
/// outranks an author match outranks a category match, whatever their click
/// counts; clicks only order hits within one field.
const FIELD_PRIORITY: [TextField; 3] = [TextField::Title, TextField::Authors, TextField::Category];

/// Resolve a free-text query into an ordered slate.
///
/// Containment matches are collected per field in priority order, each
/// field's hits sorted by clicks descending by the store, deduplicated by id
/// on first sight. If fewer than `limit` books match, the remaining catalog
/// is ranked by its best-field similarity to the query and appended in
/// descending score order until the slate fills or the catalog runs out.
/// Every entry carries its relevance tier, computed from the same catalog
/// snapshot the fallback ranks over.
pub async fn search<S: CatalogStore>(
    store: &S,
    request: &SearchRequest,
) -> Result<Vec<BookSummary>, RankError> {
    let catalog = store.all_books().await?;
    let thresholds = Thresholds::from_catalog(&catalog);

    let mut slate = SlateBuilder::new(request.limit);

    for field in FIELD_PRIORITY {
        if slate.is_full() {
            break;
        }
        let matches = store
            .find_containing(field, &request.text, NumericField::Clicks)
            .await?;
        for book in &matches {
            push_with_tier(&mut slate, book, &thresholds);
        }
    }

    if !slate.is_full() {
        let mut scored: Vec<(f64, &Book)> = catalog
            .iter()
            .map(|book| (best_field_score(&request.text, &book.searchable_fields()), book))
            .collect();
        // Stable sort: catalog order breaks score ties.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        for (_, book) in scored {
            if slate.is_full() {
                break;
            }
            push_with_tier(&mut slate, book, &thresholds);
        }
    }

    Ok(slate.finish())
}

fn push_with_tier(slate: &mut SlateBuilder, book: &Book, thresholds: &Thresholds) -> bool {
    let mut summary = BookSummary::from(book);
    summary.rec = Some(classify(book, thresholds).as_u8());
    slate.push(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookfair_store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn book(id: u64, title: &str, authors: &str, category: &str, clicks: u64) -> Book {
        Book {
            id,
            title: title.to_string(),
            authors: authors.to_string(),
            category: category.to_string(),
            publisher: String::new(),
            clicks,
            impressions: 0,
        }
    }

    fn ids(slate: &[BookSummary]) -> Vec<u64> {
        slate.iter().map(|entry| entry.id).collect()
    }

    #[tokio::test]
    async fn test_title_matches_sorted_by_clicks() {
        let store = MemoryStore::new().with_books(vec![
            book(1, "Dune", "Frank Herbert", "Science Fiction", 10),
            book(2, "Dune Messiah", "Frank Herbert", "Science Fiction", 50),
        ]);

        let slate = search(&store, &SearchRequest::new("Dune")).await.unwrap();
        assert_eq!(ids(&slate), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_title_match_outranks_author_match() {
        let store = MemoryStore::new().with_books(vec![
            book(1, "Collected Stories", "Herbert Dune", "Anthology", 900),
            book(2, "Dune", "Frank Herbert", "Science Fiction", 1),
        ]);

        let slate = search(&store, &SearchRequest::new("dune")).await.unwrap();
        assert_eq!(ids(&slate), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_multi_field_match_appears_once() {
        let store = MemoryStore::new().with_books(vec![book(
            1,
            "Dune",
            "Duncan Dune",
            "Dune Studies",
            5,
        )]);

        let slate = search(&store, &SearchRequest::new("dune")).await.unwrap();
        assert_eq!(ids(&slate), vec![1]);
    }

    #[tokio::test]
    async fn test_similarity_fallback_fills_slate() {
        let store = MemoryStore::new().with_books(vec![
            book(1, "Dune", "Frank Herbert", "Science Fiction", 10),
            book(2, "Dune Messiah", "Frank Herbert", "Science Fiction", 8),
            book(3, "Dun Cow Tales", "Walter Wangerin", "Fantasy", 50),
            book(4, "Gardening Monthly", "Various", "Hobby", 90),
            book(5, "Dane Law", "Ole Worm", "History", 2),
        ]);

        let slate = search(&store, &SearchRequest::new("dune")).await.unwrap();

        // Two containment matches, then similarity-ranked remainder.
        assert_eq!(slate.len(), 5);
        assert_eq!(&ids(&slate)[..2], &[1, 2]);
        let tail = &ids(&slate)[2..];
        assert!(tail.contains(&3) && tail.contains(&4) && tail.contains(&5));
    }

    #[tokio::test]
    async fn test_limit_and_no_duplicates() {
        let books: Vec<Book> = (1..=10)
            .map(|id| book(id, &format!("Dune {}", id), "", "", id))
            .collect();
        let store = MemoryStore::new().with_books(books);

        let slate = search(&store, &SearchRequest::new("dune").with_limit(5))
            .await
            .unwrap();
        assert_eq!(slate.len(), 5);
        let mut seen = ids(&slate);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }

    #[tokio::test]
    async fn test_search_is_idempotent() {
        let store = MemoryStore::new().with_books(vec![
            book(1, "Dune", "Frank Herbert", "Science Fiction", 10),
            book(2, "Foundation", "Isaac Asimov", "Science Fiction", 10),
            book(3, "Hyperion", "Dan Simmons", "Science Fiction", 10),
        ]);

        let request = SearchRequest::new("science");
        let first = search(&store, &request).await.unwrap();
        let second = search(&store, &request).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_entries_carry_relevance_tier() {
        let mut hot = book(1, "Dune", "Frank Herbert", "Science Fiction", 1000);
        hot.impressions = 1000;
        let store = MemoryStore::new().with_books(vec![
            hot,
            book(2, "Dune Atlas", "Various", "Reference", 0),
            book(3, "Quiet Title", "Nobody", "Misc", 0),
            book(4, "Another Title", "Nobody", "Misc", 0),
            book(5, "Third Title", "Nobody", "Misc", 0),
        ]);

        let slate = search(&store, &SearchRequest::new("dune")).await.unwrap();
        let top = slate.iter().find(|entry| entry.id == 1).unwrap();
        assert_eq!(top.rec, Some(2));
        assert!(slate.iter().all(|entry| entry.rec.is_some()));
    }

    #[tokio::test]
    async fn test_empty_catalog_yields_empty_slate() {
        let store = MemoryStore::new();
        let slate = search(&store, &SearchRequest::new("dune")).await.unwrap();
        assert!(slate.is_empty());
    }
}
