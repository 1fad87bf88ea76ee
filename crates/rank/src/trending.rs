//! Time-windowed trending aggregation.

use crate::demographic::age_group;
use crate::slate::{backfill, SlateBuilder};
use crate::RankError;
use bookfair_model::{Book, BookSummary, TrendingRequest};
use bookfair_store::{CatalogStore, InteractionFilter, InteractionLog, NumericField};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tracing::warn;

/// Rank books by recent combined click and impression volume.
///
/// Scans the interaction window (optionally restricted to an age bucket
/// and/or a gender), sums each book's interaction clicks, and adds the
/// book's catalog impressions once per book. Ordering is total volume
/// descending; ties keep first-seen interaction order. Books whose id no
/// longer resolves are skipped. The slate pads to `limit` from the
/// highest-impression books not already selected.
pub async fn trending<C, L>(
    catalog: &C,
    log: &L,
    request: &TrendingRequest,
) -> Result<Vec<BookSummary>, RankError>
where
    C: CatalogStore,
    L: InteractionLog,
{
    let until = Utc::now();
    let since = until - Duration::days(request.window_days);

    let mut filter = InteractionFilter::new().between(since, until);
    if let Some(age) = request.age {
        let (lo, hi) = age_group(age);
        filter = filter.ages(lo, hi);
    }
    if let Some(gender) = request.gender {
        filter = filter.gender(gender);
    }

    let rows = log.scan(&filter).await?;

    // First-seen order is the tie-break, so aggregation keeps ids in
    // encounter order beside the click sums.
    let mut order: Vec<u64> = Vec::new();
    let mut clicks: HashMap<u64, u64> = HashMap::new();
    for row in &rows {
        if !clicks.contains_key(&row.book_id) {
            order.push(row.book_id);
        }
        *clicks.entry(row.book_id).or_insert(0) += row.clicks;
    }

    let mut ranked: Vec<(Book, u64)> = Vec::with_capacity(order.len());
    for &book_id in &order {
        match catalog.book_by_id(book_id).await? {
            Some(book) => {
                let volume = clicks[&book_id] + book.impressions;
                ranked.push((book, volume));
            }
            None => warn!(book_id, "interaction references a missing book, skipping"),
        }
    }
    // Stable sort: equal volumes keep first-seen order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut slate = SlateBuilder::new(request.limit);
    for (book, _) in &ranked {
        if slate.is_full() {
            break;
        }
        slate.push_book(book);
    }

    backfill(&mut slate, catalog, NumericField::Impressions).await?;
    Ok(slate.finish())
}
