//! Lexical similarity scoring for search fallback.
//!
//! Implements a matching-blocks ratio (Ratcliff/Obershelp): find the longest
//! common contiguous block, recurse on the pieces to either side, and score
//! `2 * matched / (len(a) + len(b))`. Case-insensitive. Candidate texts are
//! short catalog fields (titles, author lists, category names), so the
//! O(n * m) worst case is acceptable.

use std::collections::HashMap;

/// Compute the similarity between a query and a candidate text.
///
/// Returns a score in `[0.0, 1.0]`. Identical strings score `1.0`; either
/// input empty scores `0.0`. Comparison is case-insensitive.
pub fn similarity(query: &str, text: &str) -> f64 {
    let a: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    let b: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let matched = matched_len(&a, &b);
    2.0 * matched as f64 / (a.len() + b.len()) as f64
}

/// Score a query against several fields of one candidate, keeping the best.
///
/// Used by the search fallback, where a book is as similar as its most
/// similar searchable field.
pub fn best_field_score(query: &str, fields: &[&str]) -> f64 {
    fields
        .iter()
        .map(|field| similarity(query, field))
        .fold(0.0, f64::max)
}

/// Total length of all matching blocks between `a` and `b`.
///
/// Finds the longest common block, then repeats on the non-overlapping
/// stretches before and after it. Block order does not matter for the ratio,
/// so pending stretches sit on a plain stack.
fn matched_len(a: &[char], b: &[char]) -> usize {
    // Positions of each character in b, for the inner-loop lookup.
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &ch) in b.iter().enumerate() {
        b2j.entry(ch).or_default().push(j);
    }

    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    total
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, k)` with `a[i..i + k] == b[j..j + k]`. Among maximal
/// blocks, ties resolve toward the earliest start in `a`, then the earliest
/// start in `b`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

    // j2len[j] = length of the longest block ending at a[i], b[j].
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for (i, &ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut row: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(&ch) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = if j > 0 {
                    j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                row.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = row;
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(similarity("dune", "dune"), 1.0);
        assert_eq!(similarity("Dune Messiah", "dune messiah"), 1.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(similarity("", "dune"), 0.0);
        assert_eq!(similarity("dune", ""), 0.0);
        assert_eq!(similarity("", ""), 0.0);
    }

    #[test]
    fn test_matching_blocks_ratio() {
        // Blocks "ple" and "a" match: 2 * 4 / (5 + 4)
        let score = similarity("apple", "aple");
        assert!((score - 8.0 / 9.0).abs() < 1e-9);

        // "dune" inside "dune messiah": 2 * 4 / (4 + 12)
        let score = similarity("dune", "dune messiah");
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_score_drops_with_distance() {
        let close = similarity("herbert", "herbet");
        let far = similarity("herbert", "asimov");
        assert!(close > far);
        assert!(close > 0.9);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(similarity("DUNE", "dune"), similarity("dune", "dune"));
    }

    #[test]
    fn test_best_field_score() {
        let fields = ["Dune", "Frank Herbert", "Science Fiction"];
        let best = best_field_score("frank herbert", &fields);
        assert_eq!(best, 1.0);

        assert_eq!(best_field_score("anything", &[]), 0.0);
    }
}
