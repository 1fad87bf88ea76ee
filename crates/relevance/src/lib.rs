//! Relevance tiering for search results.
//!
//! Classifies a book into one of three tiers by comparing its counters
//! against 75th-percentile thresholds computed over the full catalog
//! snapshot. The tier travels with search results as a presentation hint;
//! it never filters or reorders a slate.

use bookfair_model::Book;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Relevance tier of a book relative to the rest of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Bottom three quartiles on both counters
    Cold,
    /// Impressions above the 75th percentile
    Warm,
    /// Clicks above the 75th percentile
    Hot,
}

impl Tier {
    /// The integer form served in the `rec` field.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Cold => 0,
            Self::Warm => 1,
            Self::Hot => 2,
        }
    }

    /// Get a human-readable label for this tier.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cold => "Catalog",
            Self::Warm => "Getting Noticed",
            Self::Hot => "Reader Favourite",
        }
    }
}

/// Percentile cut-offs over the catalog's click and impression counters.
///
/// Computed once per request from the same snapshot the slate is built from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    pub p75_clicks: f64,
    pub p75_impressions: f64,
}

impl Thresholds {
    /// Compute the 75th-percentile thresholds for a catalog snapshot.
    ///
    /// An empty catalog yields zero thresholds, under which any book with a
    /// positive counter classifies above `Cold`.
    pub fn from_catalog(books: &[Book]) -> Self {
        let clicks: Vec<f64> = books.iter().map(|b| b.clicks as f64).collect();
        let impressions: Vec<f64> = books.iter().map(|b| b.impressions as f64).collect();

        Self {
            p75_clicks: percentile(&clicks, 75.0),
            p75_impressions: percentile(&impressions, 75.0),
        }
    }
}

/// Linear-interpolation percentile of `values` at `p` in `[0, 100]`.
///
/// The rank is `(n - 1) * p / 100`; a fractional rank interpolates between
/// the two bracketing order statistics. Empty input yields `0.0`.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let rank = (sorted.len() - 1) as f64 * p / 100.0;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (rank - lower as f64) * (sorted[upper] - sorted[lower])
    }
}

/// Classify a book against catalog-wide thresholds.
///
/// Clicks dominate: a book above the click threshold is `Hot` whatever its
/// impressions. Comparisons are strict, so a book sitting exactly on a
/// threshold stays below it.
pub fn classify(book: &Book, thresholds: &Thresholds) -> Tier {
    if book.clicks as f64 > thresholds.p75_clicks {
        Tier::Hot
    } else if book.impressions as f64 > thresholds.p75_impressions {
        Tier::Warm
    } else {
        Tier::Cold
    }
}
