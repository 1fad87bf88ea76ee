//! Ranking paths for the book-fair discovery engine.
//!
//! Each path resolves a request into an ordered, deduplicated, size-capped
//! slate of books:
//! - `search`: field-priority containment matching with similarity fallback
//! - `recommend`: demographic personalization from interaction statistics
//! - `trending`: time-windowed click + impression volume
//! - `feed`: composite top-picks, stall ranking, author/publisher listings
//!
//! All four share one shape — collect primary candidates, order them by a
//! path-specific key, deduplicate by id preserving priority order, backfill
//! from a store ordering until the slate is full. The shared machinery lives
//! in `slate`; every path is a pure function of its request plus one store
//! snapshot.

mod demographic;
mod feed;
mod search;
mod slate;
mod trending;

pub use demographic::recommend;
pub use feed::{stalls_for_book, top_author_books, top_picks, top_publisher_books};
pub use search::search;
pub use slate::{backfill, SlateBuilder};
pub use trending::trending;

use bookfair_store::StoreError;
use thiserror::Error;

/// Errors from ranking calls.
///
/// Ranking is total over a well-formed snapshot; the only thing that can
/// fail is store access, which surfaces unchanged for the caller to retry.
#[derive(Debug, Error)]
pub enum RankError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
