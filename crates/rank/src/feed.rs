//! Composite catalog feeds: the top-picks slate, stall ranking, and the
//! author/publisher listings.

use crate::demographic::recommend;
use crate::slate::{backfill, SlateBuilder};
use crate::RankError;
use bookfair_model::{BookSummary, DemographicRequest, StallRec, TopPicksRequest};
use bookfair_store::{CatalogStore, InteractionLog, NumericField, TextField};

/// Per-leg and per-group cap in the composite feeds.
const GROUP_LIMIT: usize = 5;

/// Build a visitor's combined top-picks slate.
///
/// Up to five top-clicked books from the favourite genre, then up to five
/// demographic recommendations, deduplicated in that priority order, then
/// topped up with the globally most-clicked books. This is the documented
/// fallback chain: an out-of-range age contributes no demographic leg and
/// the backfill covers the gap.
pub async fn top_picks<C, L>(
    catalog: &C,
    log: &L,
    request: &TopPicksRequest,
) -> Result<Vec<BookSummary>, RankError>
where
    C: CatalogStore,
    L: InteractionLog,
{
    let mut slate = SlateBuilder::new(request.limit);

    let genre_books = catalog
        .find_equal(
            TextField::Category,
            &request.genre,
            NumericField::Clicks,
            GROUP_LIMIT,
        )
        .await?;
    for book in &genre_books {
        slate.push_book(book);
    }

    let demographic_request =
        DemographicRequest::new(request.age, request.gender).with_limit(GROUP_LIMIT);
    for summary in recommend(catalog, log, &demographic_request).await? {
        slate.push(summary);
    }

    backfill(&mut slate, catalog, NumericField::Clicks).await?;
    Ok(slate.finish())
}

/// Rank the stalls carrying a book.
///
/// Author-run stalls always come first; impressions order stalls within
/// each group. The `rec` flag is 1 for an author-run stall, 0 otherwise.
pub async fn stalls_for_book<C: CatalogStore>(
    catalog: &C,
    book_id: u64,
) -> Result<Vec<StallRec>, RankError> {
    let mut stalls = catalog.stalls_for_book(book_id).await?;
    stalls.sort_by(|a, b| {
        b.is_author
            .cmp(&a.is_author)
            .then_with(|| b.impressions.cmp(&a.impressions))
    });

    Ok(stalls
        .iter()
        .map(|stall| StallRec {
            stall_id: stall.stall_id,
            rec: stall.is_author as u8,
        })
        .collect())
}

/// Suggest books from the five most-clicked author groups.
pub async fn top_author_books<C: CatalogStore>(
    catalog: &C,
) -> Result<Vec<BookSummary>, RankError> {
    grouped_suggestions(catalog, TextField::Authors).await
}

/// Suggest books from the five most-clicked publisher groups.
pub async fn top_publisher_books<C: CatalogStore>(
    catalog: &C,
) -> Result<Vec<BookSummary>, RankError> {
    grouped_suggestions(catalog, TextField::Publisher).await
}

/// Group the catalog by a text field, walk the top groups in order, and
/// collect up to five books per group before capping the whole listing.
async fn grouped_suggestions<C: CatalogStore>(
    catalog: &C,
    field: TextField,
) -> Result<Vec<BookSummary>, RankError> {
    let groups = catalog.group_totals(field, GROUP_LIMIT).await?;

    let mut suggestions = Vec::new();
    for group in &groups {
        let books = catalog
            .find_equal(field, &group.key, NumericField::Clicks, GROUP_LIMIT)
            .await?;
        suggestions.extend(books.iter().map(BookSummary::from));
    }
    suggestions.truncate(GROUP_LIMIT);
    Ok(suggestions)
}
