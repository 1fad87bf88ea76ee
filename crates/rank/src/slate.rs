//! Shared slate machinery: id-deduplicated accumulation and store backfill.

use crate::RankError;
use bookfair_model::{Book, BookSummary};
use bookfair_store::{CatalogStore, NumericField};
use std::collections::HashSet;

/// Accumulates slate entries with id-deduplication and a hard size cap.
///
/// Entries keep insertion order; pushing in priority order is what makes a
/// title match outrank a category match in search, or the genre leg outrank
/// the demographic leg in top picks.
#[derive(Debug)]
pub struct SlateBuilder {
    limit: usize,
    seen: HashSet<u64>,
    entries: Vec<BookSummary>,
}

impl SlateBuilder {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: HashSet::new(),
            entries: Vec::with_capacity(limit),
        }
    }

    /// Append an entry unless its id is already present or the slate is
    /// full. Returns whether the entry was taken.
    pub fn push(&mut self, summary: BookSummary) -> bool {
        if self.is_full() || !self.seen.insert(summary.id) {
            return false;
        }
        self.entries.push(summary);
        true
    }

    pub fn push_book(&mut self, book: &Book) -> bool {
        self.push(BookSummary::from(book))
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open slots left before the cap.
    pub fn remaining(&self) -> usize {
        self.limit - self.entries.len()
    }

    /// Ids selected so far, in slate order.
    pub fn ids(&self) -> Vec<u64> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub fn finish(self) -> Vec<BookSummary> {
        self.entries
    }
}

/// Top a partial slate up from the store's global ordering by `fallback`,
/// skipping ids already selected.
pub async fn backfill<S: CatalogStore>(
    builder: &mut SlateBuilder,
    store: &S,
    fallback: NumericField,
) -> Result<(), RankError> {
    if builder.is_full() {
        return Ok(());
    }

    let exclude = builder.ids();
    let books = store.top_by(fallback, &exclude, builder.remaining()).await?;
    for book in &books {
        builder.push_book(book);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookfair_store::MemoryStore;

    fn summary(id: u64) -> BookSummary {
        BookSummary::from(&Book::new(id, format!("book-{}", id)))
    }

    #[test]
    fn test_push_dedupes_by_id() {
        let mut builder = SlateBuilder::new(5);
        assert!(builder.push(summary(1)));
        assert!(!builder.push(summary(1)));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_push_respects_cap() {
        let mut builder = SlateBuilder::new(2);
        assert!(builder.push(summary(1)));
        assert!(builder.push(summary(2)));
        assert!(!builder.push(summary(3)));
        assert!(builder.is_full());
        assert_eq!(builder.ids(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_backfill_skips_selected_ids() {
        let clicked = |id: u64, clicks: u64| {
            let mut book = Book::new(id, format!("book-{}", id));
            book.clicks = clicks;
            book
        };
        let store = MemoryStore::new().with_books(vec![
            clicked(1, 100),
            clicked(2, 50),
            clicked(3, 10),
        ]);

        let mut builder = SlateBuilder::new(3);
        builder.push(summary(1));

        backfill(&mut builder, &store, NumericField::Clicks)
            .await
            .unwrap();
        assert_eq!(builder.ids(), vec![1, 2, 3]);
    }
}
