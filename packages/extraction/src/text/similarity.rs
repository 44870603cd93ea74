//! String similarity via longest matching blocks.
//!
//! Implements the classic sequence-matcher ratio: find the longest
//! common substring, recurse into the unmatched regions on either side,
//! and score `2 * matched / (len_a + len_b)`. No junk heuristics.

use std::collections::HashMap;

/// Similarity ratio between two strings in `[0.0, 1.0]`.
///
/// `1.0` means identical; two empty strings are considered identical.
/// Comparison is over Unicode scalar values; callers wanting
/// case-insensitive matching lowercase first.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_size(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Total size of all matching blocks between `a` and `b`.
fn matching_size(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    // Regions still to be matched, as (alo, ahi, blo, bhi).
    let mut regions = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = regions.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        regions.push((alo, i, blo, j));
        regions.push((i + k, ahi, j + k, bhi));
    }
    total
}

/// Longest matching block within `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, k)` such that `a[i..i + k] == b[j..j + k]`, preferring
/// the earliest block in `a`, then in `b`, on ties.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // j2len[j] = length of the match ending at a[i], b[j].
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for i in alo..ahi {
        let mut row: HashMap<usize, usize> = HashMap::new();
        for j in blo..bhi {
            if b[j] != a[i] {
                continue;
            }
            let k = if j == 0 {
                1
            } else {
                j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
            };
            row.insert(j, k);
            if k > best_k {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_k = k;
            }
        }
        j2len = row;
    }
    (best_i, best_j, best_k)
}
