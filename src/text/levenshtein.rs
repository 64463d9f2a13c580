//! Levenshtein edit distance.
//!
//! Used by the concatenation rules to accept near-identical literals and by
//! the infix-expansion rule to measure progress towards the target text.

/// Maximum character count for edit distance inputs.
///
/// Longer inputs get `max(m, n)` as a pessimistic distance instead of the
/// O(m*n) computation. Statements never come close to this.
const MAX_LEVENSHTEIN_INPUT: usize = 10_000;

/// Compute the Levenshtein edit distance between two strings.
///
/// Returns the minimum number of single-character edits (insertions,
/// deletions, substitutions) required to transform `a` into `b`.
pub fn distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // oversized inputs get a pessimistic estimate
    if m > MAX_LEVENSHTEIN_INPUT || n > MAX_LEVENSHTEIN_INPUT {
        return m.max(n);
    }

    // Use two rows instead of full matrix for O(min(m,n)) space.
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Edit distance if it does not exceed `threshold`, `None` otherwise.
///
/// Inputs whose length difference alone exceeds the threshold are rejected
/// without computing the matrix.
pub fn distance_within(a: &str, b: &str, threshold: usize) -> Option<usize> {
    let m = a.chars().count();
    let n = b.chars().count();
    if m.abs_diff(n) > threshold {
        return None;
    }
    let d = distance(a, b);
    (d <= threshold).then_some(d)
}

/// Edit distance divided by the longer input's length (0.0 = identical,
/// 1.0 = completely different).
pub fn normalized_distance(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = distance(a, b) as f64 / max_len as f64;
    ratio
}
