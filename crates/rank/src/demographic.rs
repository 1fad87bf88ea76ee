//! Demographic-personalized recommendations from interaction statistics.

use crate::RankError;
use bookfair_model::{BookSummary, DemographicRequest, MAX_AGE};
use bookfair_store::{CatalogStore, InteractionFilter, InteractionLog};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

/// Per-book statistics aggregated from one age bucket of the log.
/// Built fresh per request, never persisted.
#[derive(Debug, Default)]
struct BookStat {
    clicks_sum: u64,
    same_gender: u64,
    other_gender: u64,
}

impl BookStat {
    /// Smoothed same-gender affinity. The add-one smoothing keeps the ratio
    /// defined with no observations and tempers single-row evidence.
    fn affinity(&self) -> f64 {
        (self.same_gender + 1) as f64 / (self.same_gender + self.other_gender + 1) as f64
    }
}

/// Ten-year age bucket `[lo, hi)` for an age.
pub(crate) fn age_group(age: u8) -> (u8, u8) {
    let lo = (age / 10) * 10;
    (lo, lo + 10)
}

/// Recommend books for an age/gender pair.
///
/// Aggregates the interaction rows of the visitor's ten-year age bucket into
/// per-book click sums and gender counts, then ranks by
/// `(affinity desc, clicks_sum desc, id asc)`. The id leg makes the order
/// fully deterministic for equal-score books. Ids that no longer resolve to
/// a catalog record are skipped. An out-of-range age yields an empty slate —
/// the caller's fallback chain covers it; it is not an error here. No
/// padding happens at this level: composition layers pad.
pub async fn recommend<C, L>(
    catalog: &C,
    log: &L,
    request: &DemographicRequest,
) -> Result<Vec<BookSummary>, RankError>
where
    C: CatalogStore,
    L: InteractionLog,
{
    if request.age > MAX_AGE {
        return Ok(Vec::new());
    }

    let (lo, hi) = age_group(request.age);
    let rows = log.scan(&InteractionFilter::new().ages(lo, hi)).await?;

    let mut stats: HashMap<u64, BookStat> = HashMap::new();
    for row in &rows {
        let stat = stats.entry(row.book_id).or_default();
        stat.clicks_sum += row.clicks;
        if row.gender == request.gender {
            stat.same_gender += 1;
        } else {
            stat.other_gender += 1;
        }
    }

    let mut ranked: Vec<(u64, BookStat)> = stats.into_iter().collect();
    ranked.sort_by(|(a_id, a), (b_id, b)| {
        b.affinity()
            .partial_cmp(&a.affinity())
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.clicks_sum.cmp(&a.clicks_sum))
            .then_with(|| a_id.cmp(b_id))
    });

    let mut slate = Vec::with_capacity(request.limit);
    for (book_id, _) in ranked.into_iter().take(request.limit) {
        match catalog.book_by_id(book_id).await? {
            Some(book) => slate.push(BookSummary::from(&book)),
            None => warn!(book_id, "interaction references a missing book, skipping"),
        }
    }

    Ok(slate)
}
